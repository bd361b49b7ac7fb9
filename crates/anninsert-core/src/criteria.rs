//! Location descriptors for insertions.
//!
//! The synthesizer narrows the location of every insertion one criterion at a
//! time: class, then method, then parameter, then type path. A
//! [`CriteriaList`] records that narrowing as a persistent list whose
//! prefixes are shared between siblings, and [`Criteria`] is the composed
//! matcher the source front-end queries.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::location::{
    AstEntry, AstPath, BoundLocation, LocalLocation, RelativeLocation, TreeKind,
    TypeIndexLocation, TypePath,
};

/// Name of the implicit no-argument constructor.
pub const IMPLICIT_CONSTRUCTOR: &str = "<init>()V";

// ============================================================================
// Criterion
// ============================================================================

/// One constraint on where an insertion goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// The package declaration of `package`.
    PackageDecl { package: String },
    /// Inside the named class; `exact` excludes nested classes.
    InClass { class_name: String, exact: bool },
    /// The class declaration itself.
    IsClass { class_name: String },
    /// A bound of one of the class's type parameters.
    ClassBound {
        class_name: String,
        bound: BoundLocation,
    },
    /// A position inside a compound type; the empty path is the outer type.
    AtLocation { type_path: TypePath },
    /// An `extends` or `implements` clause.
    ExtImpls {
        class_name: String,
        index: TypeIndexLocation,
    },
    /// A field; `declaration` distinguishes the declaration from its type.
    Field { name: String, declaration: bool },
    InMethod { method: String },
    Receiver { method: String },
    ReturnType { class_name: String, method: String },
    MethodBound { method: String, bound: BoundLocation },
    Param { method: String, index: u32 },
    Local { method: String, location: LocalLocation },
    Cast { method: String, location: RelativeLocation },
    New { method: String, location: RelativeLocation },
    InstanceOf { method: String, location: RelativeLocation },
    MemberReference { method: String, location: RelativeLocation },
    MethodCall { method: String, location: RelativeLocation },
    Lambda { method: String, location: RelativeLocation },
    AstPath { path: AstPath },
    InStaticInit { block: u32 },
    InInstanceInit { block: u32 },
    InFieldInit { field: String },
    /// One component of an intersection cast.
    IntersectionTypeLocation { location: RelativeLocation },
}

/// Discriminant of a [`Criterion`]; a composed [`Criteria`] holds at most
/// one criterion per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    PackageDecl,
    InClass,
    IsClass,
    ClassBound,
    AtLocation,
    ExtImpls,
    Field,
    InMethod,
    Receiver,
    ReturnType,
    MethodBound,
    Param,
    Local,
    Cast,
    New,
    InstanceOf,
    MemberReference,
    MethodCall,
    Lambda,
    AstPath,
    InStaticInit,
    InInstanceInit,
    InFieldInit,
    IntersectionTypeLocation,
}

impl Criterion {
    pub fn kind(&self) -> CriterionKind {
        match self {
            Criterion::PackageDecl { .. } => CriterionKind::PackageDecl,
            Criterion::InClass { .. } => CriterionKind::InClass,
            Criterion::IsClass { .. } => CriterionKind::IsClass,
            Criterion::ClassBound { .. } => CriterionKind::ClassBound,
            Criterion::AtLocation { .. } => CriterionKind::AtLocation,
            Criterion::ExtImpls { .. } => CriterionKind::ExtImpls,
            Criterion::Field { .. } => CriterionKind::Field,
            Criterion::InMethod { .. } => CriterionKind::InMethod,
            Criterion::Receiver { .. } => CriterionKind::Receiver,
            Criterion::ReturnType { .. } => CriterionKind::ReturnType,
            Criterion::MethodBound { .. } => CriterionKind::MethodBound,
            Criterion::Param { .. } => CriterionKind::Param,
            Criterion::Local { .. } => CriterionKind::Local,
            Criterion::Cast { .. } => CriterionKind::Cast,
            Criterion::New { .. } => CriterionKind::New,
            Criterion::InstanceOf { .. } => CriterionKind::InstanceOf,
            Criterion::MemberReference { .. } => CriterionKind::MemberReference,
            Criterion::MethodCall { .. } => CriterionKind::MethodCall,
            Criterion::Lambda { .. } => CriterionKind::Lambda,
            Criterion::AstPath { .. } => CriterionKind::AstPath,
            Criterion::InStaticInit { .. } => CriterionKind::InStaticInit,
            Criterion::InInstanceInit { .. } => CriterionKind::InInstanceInit,
            Criterion::InFieldInit { .. } => CriterionKind::InFieldInit,
            Criterion::IntersectionTypeLocation { .. } => CriterionKind::IntersectionTypeLocation,
        }
    }

    // Constructors for the criteria the synthesizer builds.

    pub fn package_decl(package: impl Into<String>) -> Self {
        Criterion::PackageDecl {
            package: package.into(),
        }
    }

    pub fn in_class(class_name: impl Into<String>, exact: bool) -> Self {
        Criterion::InClass {
            class_name: class_name.into(),
            exact,
        }
    }

    pub fn is_class(class_name: impl Into<String>) -> Self {
        Criterion::IsClass {
            class_name: class_name.into(),
        }
    }

    pub fn at_location(type_path: TypePath) -> Self {
        Criterion::AtLocation { type_path }
    }

    /// The outer type of a compound type.
    pub fn at_outer_type() -> Self {
        Criterion::AtLocation {
            type_path: TypePath::root(),
        }
    }

    pub fn field(name: impl Into<String>, declaration: bool) -> Self {
        Criterion::Field {
            name: name.into(),
            declaration,
        }
    }

    pub fn in_method(method: impl Into<String>) -> Self {
        Criterion::InMethod {
            method: method.into(),
        }
    }

    pub fn ast_path(path: AstPath) -> Self {
        Criterion::AstPath { path }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::PackageDecl { package } => write!(f, "packageDecl({})", package),
            Criterion::InClass { class_name, exact } => {
                if *exact {
                    write!(f, "inClass({}, exact)", class_name)
                } else {
                    write!(f, "inClass({})", class_name)
                }
            }
            Criterion::IsClass { class_name } => write!(f, "is(CLASS, {})", class_name),
            Criterion::ClassBound { class_name, bound } => {
                write!(f, "classBound({}, {})", class_name, bound)
            }
            Criterion::AtLocation { type_path } => write!(f, "atLocation({})", type_path),
            Criterion::ExtImpls { class_name, index } => {
                write!(f, "extImpls({}, {})", class_name, index)
            }
            Criterion::Field { name, declaration } => {
                if *declaration {
                    write!(f, "field({}, declaration)", name)
                } else {
                    write!(f, "field({})", name)
                }
            }
            Criterion::InMethod { method } => write!(f, "inMethod({})", method),
            Criterion::Receiver { method } => write!(f, "receiver({})", method),
            Criterion::ReturnType { class_name, method } => {
                write!(f, "returnType({}, {})", class_name, method)
            }
            Criterion::MethodBound { method, bound } => {
                write!(f, "methodBound({}, {})", method, bound)
            }
            Criterion::Param { method, index } => write!(f, "param({}, {})", method, index),
            Criterion::Local { method, location } => write!(f, "local({}, {})", method, location),
            Criterion::Cast { method, location } => write!(f, "cast({}, {})", method, location),
            Criterion::New { method, location } => write!(f, "new({}, {})", method, location),
            Criterion::InstanceOf { method, location } => {
                write!(f, "instanceOf({}, {})", method, location)
            }
            Criterion::MemberReference { method, location } => {
                write!(f, "memberReference({}, {})", method, location)
            }
            Criterion::MethodCall { method, location } => {
                write!(f, "methodCall({}, {})", method, location)
            }
            Criterion::Lambda { method, location } => write!(f, "lambda({}, {})", method, location),
            Criterion::AstPath { path } => write!(f, "astPath({})", path),
            Criterion::InStaticInit { block } => write!(f, "inStaticInit({})", block),
            Criterion::InInstanceInit { block } => write!(f, "inInstanceInit({})", block),
            Criterion::InFieldInit { field } => write!(f, "inFieldInit({})", field),
            Criterion::IntersectionTypeLocation { location } => {
                write!(f, "intersectionTypeLocation({})", location)
            }
        }
    }
}

// ============================================================================
// CriteriaList
// ============================================================================

#[derive(Debug)]
struct Node {
    criterion: Criterion,
    parent: Option<Arc<Node>>,
}

/// Immutable, append-only list of criteria.
///
/// `add` returns a new list and leaves `self` untouched; the two share every
/// node of the common prefix. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct CriteriaList {
    head: Option<Arc<Node>>,
    len: usize,
}

impl CriteriaList {
    /// The list with no criteria.
    pub fn empty() -> Self {
        Self::default()
    }

    /// This list plus `criterion` at the end.
    #[must_use]
    pub fn add(&self, criterion: Criterion) -> CriteriaList {
        CriteriaList {
            head: Some(Arc::new(Node {
                criterion,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Criteria in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        let mut nodes = Vec::with_capacity(self.len);
        let mut current = self.head.as_deref();
        while let Some(node) = current {
            nodes.push(&node.criterion);
            current = node.parent.as_deref();
        }
        nodes.into_iter().rev()
    }

    /// Compose into a matcher.
    pub fn criteria(&self) -> Criteria {
        let mut criteria = Criteria::default();
        for criterion in self.iter() {
            criteria.add(criterion.clone());
        }
        criteria
    }
}

impl PartialEq for CriteriaList {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for CriteriaList {}

impl fmt::Display for CriteriaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, criterion) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", criterion)?;
        }
        write!(f, "]")
    }
}

// ============================================================================
// Criteria
// ============================================================================

/// Composed criteria: one criterion per kind, the most recent one winning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    by_kind: IndexMap<CriterionKind, Criterion>,
}

impl Criteria {
    /// Add a criterion, replacing any earlier criterion of the same kind.
    /// A replaced kind keeps its original position.
    pub fn add(&mut self, criterion: Criterion) {
        self.by_kind.insert(criterion.kind(), criterion);
    }

    pub fn get(&self, kind: CriterionKind) -> Option<&Criterion> {
        self.by_kind.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.by_kind.values()
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }

    /// Name of the enclosing class, or of the class declaration itself.
    pub fn class_name(&self) -> Option<&str> {
        match self.get(CriterionKind::InClass) {
            Some(Criterion::InClass { class_name, .. }) => Some(class_name),
            _ => match self.get(CriterionKind::IsClass) {
                Some(Criterion::IsClass { class_name }) => Some(class_name),
                _ => None,
            },
        }
    }

    pub fn in_class(&self) -> bool {
        self.class_name().is_some()
    }

    /// Name of the enclosing method, if any.
    pub fn in_method(&self) -> Option<&str> {
        match self.get(CriterionKind::InMethod) {
            Some(Criterion::InMethod { method }) => Some(method),
            _ => None,
        }
    }

    pub fn is_on_method(&self, method: &str) -> bool {
        self.in_method() == Some(method)
    }

    pub fn is_on_receiver(&self) -> bool {
        self.get(CriterionKind::Receiver).is_some()
    }

    pub fn is_on_new(&self) -> bool {
        self.get(CriterionKind::New).is_some()
    }

    pub fn is_on_return_type(&self) -> bool {
        self.get(CriterionKind::ReturnType).is_some()
    }

    pub fn ast_path(&self) -> Option<&AstPath> {
        match self.get(CriterionKind::AstPath) {
            Some(Criterion::AstPath { path }) => Some(path),
            _ => None,
        }
    }

    /// The type path of an `atLocation` criterion.
    pub fn generic_array_location(&self) -> Option<&TypePath> {
        match self.get(CriterionKind::AtLocation) {
            Some(Criterion::AtLocation { type_path }) => Some(type_path),
            _ => None,
        }
    }

    pub fn cast_relative_location(&self) -> Option<RelativeLocation> {
        match self.get(CriterionKind::Cast) {
            Some(Criterion::Cast { location, .. }) => Some(*location),
            _ => None,
        }
    }

    pub fn package(&self) -> Option<&str> {
        match self.get(CriterionKind::PackageDecl) {
            Some(Criterion::PackageDecl { package }) => Some(package),
            _ => None,
        }
    }

    /// True when a non-empty type path narrows the location to a nested
    /// type position.
    pub fn has_type_path(&self) -> bool {
        self.generic_array_location()
            .is_some_and(|path| !path.is_empty())
    }

    /// True when the insertion goes on a receiver parameter.
    ///
    /// With an AST path, the path must end at a parameter with a negative
    /// (or no) index. An empty AST path never denotes a receiver.
    pub fn targets_receiver(&self) -> bool {
        match self.ast_path() {
            None => self.is_on_receiver(),
            Some(path) => match path.last() {
                None => false,
                Some(entry) => {
                    entry.selector_is(AstEntry::PARAMETER)
                        && entry.argument.is_none_or(|argument| argument < 0)
                }
            },
        }
    }

    /// True when the insertion goes on the type of a `new` expression.
    pub fn targets_new(&self) -> bool {
        match self.ast_path().and_then(AstPath::last) {
            None => self.is_on_new(),
            Some(entry) => {
                (entry.kind == TreeKind::NewArray
                    && entry.selector_is(AstEntry::TYPE)
                    && entry.argument == Some(0))
                    || (entry.kind == TreeKind::NewClass
                        && entry.selector_is(AstEntry::IDENTIFIER))
            }
        }
    }

    /// True when the criteria name the implicit no-argument constructor.
    pub fn targets_implicit_constructor(&self) -> bool {
        self.is_on_method(IMPLICIT_CONSTRUCTOR)
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, criterion) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", criterion)?;
        }
        write!(f, "]")
    }
}
