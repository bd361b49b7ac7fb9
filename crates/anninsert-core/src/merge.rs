//! Builders for the insertions that gather several annotations into one edit.
//!
//! Casts, receivers, `new` types and synthesized constructors each collect
//! every annotation that targets the same edit point. These builders create
//! them in the arena; the synthesizer adds further annotations with
//! [`InsertionArena::add_type_annotation`].

use crate::criteria::CriteriaList;
use crate::error::InsertError;
use crate::insertion::{
    CastInsertion, CloseParenthesisInsertion, ConstructorInsertion, Insertion, InsertionArena,
    InsertionId, NewInsertion, ReceiverInsertion,
};
use crate::jtype::JavaType;
use crate::scene::simple_name;

/// Create a cast of `ty` and its closing parenthesis.
///
/// `annotation` goes on the outer type. Each of `inner` must be an
/// annotation insertion whose criteria name a type path; its text is placed
/// at that position of the cast type.
pub fn cast_pair(
    arena: &mut InsertionArena,
    ty: &JavaType,
    annotation: Option<&str>,
    inner: &[InsertionId],
    clist: &CriteriaList,
) -> Result<(InsertionId, InsertionId), InsertError> {
    let mut decorated = ty.clone();
    if let Some(text) = annotation {
        decorated.add_annotation(text);
    }
    decorate(arena, &mut decorated, ty, inner, clist)?;

    let separate_line = false;
    let cast = arena.push(Insertion::Cast(CastInsertion {
        criteria: clist.clone(),
        ty: decorated,
        separate_line,
    }));
    let close = arena.push(Insertion::CloseParenthesis(CloseParenthesisInsertion {
        criteria: clist.clone(),
        separate_line,
    }));
    Ok((cast, close))
}

fn decorate(
    arena: &InsertionArena,
    target: &mut JavaType,
    original: &JavaType,
    inner: &[InsertionId],
    clist: &CriteriaList,
) -> Result<(), InsertError> {
    for id in inner {
        let Some(Insertion::Annotation(insertion)) = arena.get(*id) else {
            return Err(InsertError::invariant(
                clist,
                format!("nested insertion {} is not an annotation", id),
            ));
        };
        let criteria = insertion.criteria.criteria();
        let path = criteria.generic_array_location().ok_or_else(|| {
            InsertError::invariant(&insertion.criteria, "nested annotation without a type path")
        })?;
        let slot = target
            .at_path_mut(path)
            .ok_or_else(|| InsertError::TypePathMismatch {
                path: path.to_string(),
                ty: original.to_string(),
                criteria: clist.to_string(),
            })?;
        slot.add_annotation(insertion.text.clone());
    }
    Ok(())
}

/// Create a receiver insertion, optionally with its first annotation.
pub fn receiver(
    arena: &mut InsertionArena,
    annotation: Option<&str>,
    clist: &CriteriaList,
    inner: &[InsertionId],
) -> InsertionId {
    arena.push(Insertion::Receiver(ReceiverInsertion {
        criteria: clist.clone(),
        ty: annotated_unnamed(annotation),
        inner: inner.to_vec(),
    }))
}

/// Create a `new` insertion, optionally with its first annotation.
pub fn new_object(
    arena: &mut InsertionArena,
    annotation: Option<&str>,
    clist: &CriteriaList,
    inner: &[InsertionId],
) -> InsertionId {
    arena.push(Insertion::New(NewInsertion {
        criteria: clist.clone(),
        ty: annotated_unnamed(annotation),
        inner: inner.to_vec(),
    }))
}

fn annotated_unnamed(annotation: Option<&str>) -> JavaType {
    let mut ty = JavaType::unnamed();
    if let Some(text) = annotation {
        ty.add_annotation(text);
    }
    ty
}

/// Create the explicit constructor for the class named by `clist`.
pub fn constructor(
    arena: &mut InsertionArena,
    clist: &CriteriaList,
) -> Result<InsertionId, InsertError> {
    let criteria = clist.criteria();
    let class_name = criteria
        .class_name()
        .ok_or_else(|| InsertError::invariant(clist, "constructor criteria name no class"))?;
    Ok(arena.push(Insertion::Constructor(ConstructorInsertion {
        criteria: clist.clone(),
        ty: JavaType::declared(simple_name(class_name)),
        receiver: None,
        declarations: Vec::new(),
    })))
}

/// Make `receiver` the receiver parameter of constructor `ctor`.
///
/// A constructor has one receiver parameter. If it already has one, the
/// annotations and nested insertions of `receiver` are merged into it.
/// Returns the receiver the constructor ends up with.
pub fn attach_receiver(
    arena: &mut InsertionArena,
    ctor: InsertionId,
    receiver: InsertionId,
) -> Result<InsertionId, InsertError> {
    let current = constructor_mut(arena, ctor)?.receiver;
    let Some(existing) = current else {
        constructor_mut(arena, ctor)?.receiver = Some(receiver);
        return Ok(receiver);
    };
    if existing == receiver {
        return Ok(existing);
    }

    let (annotations, inner) = match arena.get(receiver) {
        Some(Insertion::Receiver(incoming)) => {
            (incoming.ty.annotations().to_vec(), incoming.inner.clone())
        }
        Some(other) => {
            return Err(InsertError::invariant(
                other.criteria(),
                format!("insertion {} is not a receiver", receiver),
            ))
        }
        None => {
            return Err(InsertError::invariant(
                "[]",
                format!("no insertion with id {}", receiver),
            ))
        }
    };
    let Some(Insertion::Receiver(kept)) = arena.get_mut(existing) else {
        return Err(InsertError::invariant(
            "[]",
            format!("constructor receiver {} is not a receiver", existing),
        ));
    };
    for text in annotations {
        if !kept.ty.annotations().contains(&text) {
            kept.ty.add_annotation(text);
        }
    }
    for id in inner {
        if !kept.inner.contains(&id) {
            kept.inner.push(id);
        }
    }
    Ok(existing)
}

/// Add `declaration` to the annotations written above constructor `ctor`.
pub fn attach_declaration(
    arena: &mut InsertionArena,
    ctor: InsertionId,
    declaration: InsertionId,
) -> Result<(), InsertError> {
    constructor_mut(arena, ctor)?.declarations.push(declaration);
    Ok(())
}

fn constructor_mut(
    arena: &mut InsertionArena,
    ctor: InsertionId,
) -> Result<&mut ConstructorInsertion, InsertError> {
    match arena.get_mut(ctor) {
        Some(Insertion::Constructor(insertion)) => Ok(insertion),
        Some(other) => Err(InsertError::invariant(
            other.criteria(),
            format!("insertion {} is not a constructor", ctor),
        )),
        None => Err(InsertError::invariant(
            "[]",
            format!("no insertion with id {}", ctor),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::Criterion;
    use crate::insertion::AnnotationInsertion;
    use crate::scene::Annotation;

    fn cast_list() -> CriteriaList {
        CriteriaList::empty()
            .add(Criterion::in_class("a.C", false))
            .add(Criterion::ast_path(
                "Block.statement 0, ExpressionStatement.expression".parse().unwrap(),
            ))
    }

    fn nested(arena: &mut InsertionArena, path: &str, text: &str) -> InsertionId {
        arena.push(Insertion::Annotation(AnnotationInsertion {
            text: text.to_string(),
            criteria: cast_list().add(Criterion::at_location(path.parse().unwrap())),
            separate_line: false,
            annotation: Annotation::new(text.trim_start_matches('@')),
        }))
    }

    #[test]
    fn cast_pair_decorates_nested_positions() {
        let mut arena = InsertionArena::new();
        let inner = nested(&mut arena, "0;", "@Elem");
        let ty = JavaType::declared("List").with_type_args(vec![JavaType::declared("String")]);

        let (cast, close) = cast_pair(&mut arena, &ty, None, &[inner], &cast_list()).unwrap();
        assert_eq!(arena.render(cast).unwrap(), "((List<@Elem String>) ");
        assert_eq!(arena.render(close).unwrap(), ")");
        assert_eq!(
            arena.get(cast).unwrap().separate_line(),
            arena.get(close).unwrap().separate_line()
        );
        // The scene's type is left untouched.
        assert_eq!(ty.to_string(), "List<String>");
    }

    #[test]
    fn cast_pair_with_outer_annotation() {
        let mut arena = InsertionArena::new();
        let ty = JavaType::array_of(JavaType::declared("int"));
        let (cast, _) = cast_pair(&mut arena, &ty, Some("@A"), &[], &cast_list()).unwrap();
        assert_eq!(arena.render(cast).unwrap(), "((int @A []) ");
    }

    #[test]
    fn unfit_type_path_is_fatal() {
        let mut arena = InsertionArena::new();
        let inner = nested(&mut arena, "[", "@X");
        let err = cast_pair(
            &mut arena,
            &JavaType::declared("String"),
            None,
            &[inner],
            &cast_list(),
        )
        .unwrap_err();
        assert!(matches!(err, InsertError::TypePathMismatch { .. }));
    }

    #[test]
    fn constructor_requires_class() {
        let mut arena = InsertionArena::new();
        let no_class = CriteriaList::empty().add(Criterion::in_method("<init>()V"));
        assert!(matches!(
            constructor(&mut arena, &no_class),
            Err(InsertError::Invariant { .. })
        ));

        let clist = CriteriaList::empty()
            .add(Criterion::in_class("a.Outer$Box", false))
            .add(Criterion::in_method("<init>()V"));
        let ctor = constructor(&mut arena, &clist).unwrap();
        let recv = receiver(&mut arena, Some("@R"), &clist, &[]);
        assert_eq!(attach_receiver(&mut arena, ctor, recv).unwrap(), recv);
        assert_eq!(
            arena.render(ctor).unwrap(),
            "public Box(@R Box this) { super(); }"
        );
    }

    #[test]
    fn second_receiver_merges_into_first() {
        let mut arena = InsertionArena::new();
        let clist = CriteriaList::empty()
            .add(Criterion::in_class("a.C", false))
            .add(Criterion::in_method("<init>()V"));
        let ctor = constructor(&mut arena, &clist).unwrap();
        let first = receiver(&mut arena, Some("@A"), &clist, &[]);
        let inner = nested(&mut arena, "0;", "@E");
        let second = receiver(&mut arena, Some("@B"), &clist, &[inner]);
        let again = receiver(&mut arena, Some("@A"), &clist, &[]);

        attach_receiver(&mut arena, ctor, first).unwrap();
        assert_eq!(attach_receiver(&mut arena, ctor, second).unwrap(), first);
        assert_eq!(attach_receiver(&mut arena, ctor, again).unwrap(), first);

        assert_eq!(
            arena.render(ctor).unwrap(),
            "public C(@A @B C this) { super(); }"
        );
        assert_eq!(arena.get(first).unwrap().inner(), &[inner]);
    }

    #[test]
    fn attaching_to_non_constructor_is_invariant_error() {
        let mut arena = InsertionArena::new();
        let clist = cast_list();
        let recv = new_object(&mut arena, Some("@N"), &clist, &[]);
        let err = attach_declaration(&mut arena, recv, recv).unwrap_err();
        assert!(matches!(err, InsertError::Invariant { .. }));
    }
}
