//! Insertion directives and the arena that owns them.
//!
//! Insertions reference each other (a constructor holds its receiver and
//! declaration annotations, a receiver holds the annotations on its nested
//! types), so they live in an [`InsertionArena`] and refer to one another by
//! [`InsertionId`].

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::criteria::CriteriaList;
use crate::error::InsertError;
use crate::jtype::JavaType;
use crate::scene::{simple_name, Annotation};

/// Handle to an insertion in an [`InsertionArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InsertionId(u32);

impl InsertionId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InsertionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind tag of an insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionKind {
    Annotation,
    Cast,
    CloseParenthesis,
    Receiver,
    New,
    Constructor,
}

impl fmt::Display for InsertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InsertionKind::Annotation => "annotation",
            InsertionKind::Cast => "cast",
            InsertionKind::CloseParenthesis => "close_parenthesis",
            InsertionKind::Receiver => "receiver",
            InsertionKind::New => "new",
            InsertionKind::Constructor => "constructor",
        };
        write!(f, "{}", name)
    }
}

/// A plain annotation written at an existing declaration or type.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInsertion {
    pub text: String,
    pub criteria: CriteriaList,
    /// Declaration annotations go on their own line.
    pub separate_line: bool,
    pub annotation: Annotation,
}

/// Opening of an inserted cast: `((Type) `.
#[derive(Debug, Clone, PartialEq)]
pub struct CastInsertion {
    pub criteria: CriteriaList,
    pub ty: JavaType,
    pub separate_line: bool,
}

/// Closing `)` of an inserted cast.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseParenthesisInsertion {
    pub criteria: CriteriaList,
    pub separate_line: bool,
}

/// An annotated receiver parameter (`@A Foo this`), written when the source
/// has none.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverInsertion {
    pub criteria: CriteriaList,
    pub ty: JavaType,
    /// Annotations on nested positions of the receiver type.
    pub inner: Vec<InsertionId>,
}

/// Annotations on the type of a `new` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInsertion {
    pub criteria: CriteriaList,
    pub ty: JavaType,
    pub inner: Vec<InsertionId>,
}

/// An explicit no-argument constructor standing in for the implicit one.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorInsertion {
    pub criteria: CriteriaList,
    /// Named after the class; return-type annotations attach here.
    pub ty: JavaType,
    pub receiver: Option<InsertionId>,
    pub declarations: Vec<InsertionId>,
}

/// One insertion directive.
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    Annotation(AnnotationInsertion),
    Cast(CastInsertion),
    CloseParenthesis(CloseParenthesisInsertion),
    Receiver(ReceiverInsertion),
    New(NewInsertion),
    Constructor(ConstructorInsertion),
}

impl Insertion {
    pub fn kind(&self) -> InsertionKind {
        match self {
            Insertion::Annotation(_) => InsertionKind::Annotation,
            Insertion::Cast(_) => InsertionKind::Cast,
            Insertion::CloseParenthesis(_) => InsertionKind::CloseParenthesis,
            Insertion::Receiver(_) => InsertionKind::Receiver,
            Insertion::New(_) => InsertionKind::New,
            Insertion::Constructor(_) => InsertionKind::Constructor,
        }
    }

    pub fn criteria(&self) -> &CriteriaList {
        match self {
            Insertion::Annotation(i) => &i.criteria,
            Insertion::Cast(i) => &i.criteria,
            Insertion::CloseParenthesis(i) => &i.criteria,
            Insertion::Receiver(i) => &i.criteria,
            Insertion::New(i) => &i.criteria,
            Insertion::Constructor(i) => &i.criteria,
        }
    }

    pub fn separate_line(&self) -> bool {
        match self {
            Insertion::Annotation(i) => i.separate_line,
            Insertion::Cast(i) => i.separate_line,
            Insertion::CloseParenthesis(i) => i.separate_line,
            Insertion::Receiver(_) | Insertion::New(_) => false,
            Insertion::Constructor(_) => true,
        }
    }

    /// The type written by this insertion, if it writes one.
    pub fn java_type(&self) -> Option<&JavaType> {
        match self {
            Insertion::Cast(i) => Some(&i.ty),
            Insertion::Receiver(i) => Some(&i.ty),
            Insertion::New(i) => Some(&i.ty),
            Insertion::Constructor(i) => Some(&i.ty),
            Insertion::Annotation(_) | Insertion::CloseParenthesis(_) => None,
        }
    }

    /// Nested-type insertions carried by a receiver or `new`.
    pub fn inner(&self) -> &[InsertionId] {
        match self {
            Insertion::Receiver(i) => &i.inner,
            Insertion::New(i) => &i.inner,
            _ => &[],
        }
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Owner of every insertion created during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertionArena {
    insertions: Vec<Insertion>,
}

impl InsertionArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, insertion: Insertion) -> InsertionId {
        let id = InsertionId(self.insertions.len() as u32);
        self.insertions.push(insertion);
        id
    }

    pub fn get(&self, id: InsertionId) -> Option<&Insertion> {
        self.insertions.get(id.index())
    }

    pub fn get_mut(&mut self, id: InsertionId) -> Option<&mut Insertion> {
        self.insertions.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InsertionId, &Insertion)> {
        self.insertions
            .iter()
            .enumerate()
            .map(|(i, insertion)| (InsertionId(i as u32), insertion))
    }

    fn lookup(&self, id: InsertionId) -> Result<&Insertion, InsertError> {
        self.get(id)
            .ok_or_else(|| InsertError::invariant("[]", format!("no insertion with id {}", id)))
    }

    /// Attach an annotation to the outer type of a receiver, `new`, cast or
    /// constructor insertion.
    pub fn add_type_annotation(
        &mut self,
        id: InsertionId,
        text: impl Into<String>,
    ) -> Result<(), InsertError> {
        let insertion = self
            .insertions
            .get_mut(id.index())
            .ok_or_else(|| InsertError::invariant("[]", format!("no insertion with id {}", id)))?;
        let ty = match insertion {
            Insertion::Cast(i) => &mut i.ty,
            Insertion::Receiver(i) => &mut i.ty,
            Insertion::New(i) => &mut i.ty,
            Insertion::Constructor(i) => &mut i.ty,
            other => {
                return Err(InsertError::invariant(
                    other.criteria(),
                    format!("cannot add a type annotation to a {} insertion", other.kind()),
                ))
            }
        };
        ty.add_annotation(text);
        Ok(())
    }

    /// The source text an insertion writes.
    pub fn render(&self, id: InsertionId) -> Result<String, InsertError> {
        match self.lookup(id)? {
            Insertion::Annotation(i) => Ok(i.text.clone()),
            Insertion::Cast(i) => Ok(format!("(({}) ", i.ty)),
            Insertion::CloseParenthesis(_) => Ok(")".to_string()),
            Insertion::Receiver(i) => {
                let criteria = i.criteria.criteria();
                let class_name = criteria.class_name().ok_or_else(|| {
                    InsertError::invariant(&i.criteria, "receiver outside of a class")
                })?;
                let annotations = i.ty.to_string();
                if annotations.is_empty() {
                    Ok(format!("{} this", simple_name(class_name)))
                } else {
                    Ok(format!("{} {} this", annotations, simple_name(class_name)))
                }
            }
            Insertion::New(i) => Ok(i.ty.to_string()),
            Insertion::Constructor(i) => {
                let mut text = String::new();
                for declaration in &i.declarations {
                    text.push_str(&self.render(*declaration)?);
                    text.push('\n');
                }
                let receiver = match i.receiver {
                    Some(receiver) => self.render(receiver)?,
                    None => String::new(),
                };
                text.push_str(&format!("public {}({}) {{ super(); }}", i.ty, receiver));
                Ok(text)
            }
        }
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Which scene annotations each insertion came from.
///
/// Keys keep first-insertion order and each value list is de-duplicated.
/// Close parentheses and constructors never have an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertionSources {
    by_insertion: IndexMap<InsertionId, Vec<Annotation>>,
}

impl InsertionSources {
    pub fn put(&mut self, id: InsertionId, annotation: &Annotation) {
        let sources = self.by_insertion.entry(id).or_default();
        if !sources.contains(annotation) {
            sources.push(annotation.clone());
        }
    }

    pub fn get(&self, id: InsertionId) -> &[Annotation] {
        self.by_insertion
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (InsertionId, &[Annotation])> {
        self.by_insertion
            .iter()
            .map(|(id, annotations)| (*id, annotations.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_insertion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_insertion.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Criterion;

    fn method_list() -> CriteriaList {
        CriteriaList::empty()
            .add(Criterion::in_class("a.Outer$Box", true))
            .add(Criterion::in_method("m()V"))
    }

    fn annotation_insertion(text: &str) -> Insertion {
        Insertion::Annotation(AnnotationInsertion {
            text: text.to_string(),
            criteria: method_list(),
            separate_line: true,
            annotation: Annotation::new(text.trim_start_matches('@')),
        })
    }

    #[test]
    fn receiver_renders_with_class_simple_name() {
        let mut arena = InsertionArena::new();
        let id = arena.push(Insertion::Receiver(ReceiverInsertion {
            criteria: method_list(),
            ty: JavaType::unnamed(),
            inner: Vec::new(),
        }));
        assert_eq!(arena.render(id).unwrap(), "Box this");
        arena.add_type_annotation(id, "@A").unwrap();
        arena.add_type_annotation(id, "@B").unwrap();
        assert_eq!(arena.render(id).unwrap(), "@A @B Box this");
    }

    #[test]
    fn cast_and_close_parenthesis() {
        let mut arena = InsertionArena::new();
        let cast = arena.push(Insertion::Cast(CastInsertion {
            criteria: method_list(),
            ty: JavaType::declared("String"),
            separate_line: false,
        }));
        let close = arena.push(Insertion::CloseParenthesis(CloseParenthesisInsertion {
            criteria: method_list(),
            separate_line: false,
        }));
        arena.add_type_annotation(cast, "@NonNull").unwrap();
        assert_eq!(arena.render(cast).unwrap(), "((@NonNull String) ");
        assert_eq!(arena.render(close).unwrap(), ")");
    }

    #[test]
    fn constructor_renders_declarations_then_signature() {
        let mut arena = InsertionArena::new();
        let decl = arena.push(annotation_insertion("@Inject"));
        let receiver = arena.push(Insertion::Receiver(ReceiverInsertion {
            criteria: method_list(),
            ty: JavaType::unnamed(),
            inner: Vec::new(),
        }));
        arena.add_type_annotation(receiver, "@R").unwrap();
        let ctor = arena.push(Insertion::Constructor(ConstructorInsertion {
            criteria: method_list(),
            ty: JavaType::declared("Box"),
            receiver: Some(receiver),
            declarations: vec![decl],
        }));
        arena.add_type_annotation(ctor, "@T").unwrap();
        assert_eq!(
            arena.render(ctor).unwrap(),
            "@Inject\npublic @T Box(@R Box this) { super(); }"
        );
    }

    #[test]
    fn annotation_insertions_do_not_take_type_annotations() {
        let mut arena = InsertionArena::new();
        let id = arena.push(annotation_insertion("@A"));
        let err = arena.add_type_annotation(id, "@B").unwrap_err();
        assert!(matches!(err, InsertError::Invariant { .. }));
    }

    #[test]
    fn sources_deduplicate_per_insertion() {
        let mut sources = InsertionSources::default();
        let a = Annotation::new("A");
        let id = InsertionId(3);
        sources.put(id, &a);
        sources.put(id, &a);
        sources.put(id, &Annotation::new("B"));
        assert_eq!(sources.get(id).len(), 2);
        assert!(sources.get(InsertionId(0)).is_empty());
    }
}
