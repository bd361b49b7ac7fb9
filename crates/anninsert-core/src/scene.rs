//! The scene: annotation definitions plus every annotated program element.
//!
//! A scene is the input to synthesis. It deserializes from JSON (every map
//! keeps its insertion order, which is also the traversal order) and can be
//! built programmatically through the `*_mut` vivifying accessors, which
//! create missing elements on first access.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::jtype::JavaType;
use crate::location::{
    AstPath, BoundLocation, LocalLocation, RelativeLocation, TypeIndexLocation, TypePath,
};

/// Rightmost segment of a qualified name, split on `.` and `$`.
pub fn simple_name(name: &str) -> &str {
    match name.rfind(['.', '$']) {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Whether `name` carries a package or enclosing-class qualifier.
pub fn is_qualified(name: &str) -> bool {
    name.contains(['.', '$'])
}

// ============================================================================
// Annotation Definitions
// ============================================================================

/// Retention policy of an annotation definition. Carried through, never
/// reinterpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    Source,
    #[default]
    Class,
    Runtime,
}

/// Element kinds an annotation may target (`@Target`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ElementTarget {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
    LocalVariable,
    AnnotationType,
    Package,
    TypeParameter,
    TypeUse,
    Module,
    RecordComponent,
}

/// Error for an unrecognized field type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid annotation field type '{0}'")]
pub struct FieldTypeParseError(pub String);

/// Element type of an annotation field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Class,
    /// An enum constant of the named enum type.
    Enum { type_name: String },
    /// A nested annotation of the named definition.
    Annotation { def: String },
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Boolean => write!(f, "boolean"),
            ScalarType::Byte => write!(f, "byte"),
            ScalarType::Char => write!(f, "char"),
            ScalarType::Short => write!(f, "short"),
            ScalarType::Int => write!(f, "int"),
            ScalarType::Long => write!(f, "long"),
            ScalarType::Float => write!(f, "float"),
            ScalarType::Double => write!(f, "double"),
            ScalarType::String => write!(f, "String"),
            ScalarType::Class => write!(f, "Class"),
            ScalarType::Enum { type_name } => write!(f, "enum {}", type_name),
            ScalarType::Annotation { def } => write!(f, "annotation-field {}", def),
        }
    }
}

impl FromStr for ScalarType {
    type Err = FieldTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scalar = match s {
            "boolean" => ScalarType::Boolean,
            "byte" => ScalarType::Byte,
            "char" => ScalarType::Char,
            "short" => ScalarType::Short,
            "int" => ScalarType::Int,
            "long" => ScalarType::Long,
            "float" => ScalarType::Float,
            "double" => ScalarType::Double,
            "String" | "java.lang.String" => ScalarType::String,
            "Class" | "java.lang.Class" => ScalarType::Class,
            _ => {
                if let Some(type_name) = s.strip_prefix("enum ") {
                    ScalarType::Enum {
                        type_name: type_name.trim().to_string(),
                    }
                } else if let Some(def) = s.strip_prefix("annotation-field ") {
                    ScalarType::Annotation {
                        def: def.trim().to_string(),
                    }
                } else {
                    return Err(FieldTypeParseError(s.to_string()));
                }
            }
        };
        Ok(scalar)
    }
}

/// Declared type of an annotation field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FieldType {
    Scalar(ScalarType),
    /// Array of a scalar type; `None` for an empty array whose element type
    /// is unknown (`unknown[]`).
    Array(Option<ScalarType>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(scalar) => write!(f, "{}", scalar),
            FieldType::Array(Some(scalar)) => write!(f, "{}[]", scalar),
            FieldType::Array(None) => write!(f, "unknown[]"),
        }
    }
}

impl FromStr for FieldType {
    type Err = FieldTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.strip_suffix("[]") {
            Some("unknown") => Ok(FieldType::Array(None)),
            Some(element) => element
                .trim()
                .parse()
                .map(|scalar| FieldType::Array(Some(scalar)))
                .map_err(|_| FieldTypeParseError(s.to_string())),
            None => s.parse().map(FieldType::Scalar),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = FieldTypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// An annotation definition: its name, retention, field schema and targets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotationDef {
    /// Qualified (binary) name, e.g. `org.example.NonNull` or `a.Outer$Inner`.
    pub name: String,
    #[serde(default)]
    pub retention: RetentionPolicy,
    /// Field name to field type, in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldType>,
    /// The `@Target` element kinds, if the definition declares any.
    #[serde(default)]
    pub targets: Option<Vec<ElementTarget>>,
}

impl AnnotationDef {
    pub fn new(name: impl Into<String>) -> Self {
        AnnotationDef {
            name: name.into(),
            retention: RetentionPolicy::default(),
            fields: IndexMap::new(),
            targets: None,
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn with_targets(mut self, targets: Vec<ElementTarget>) -> Self {
        self.targets = Some(targets);
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// True iff the definition targets only type uses and type parameters.
    ///
    /// Such annotations are written inline. Every other annotation is a
    /// declaration annotation and goes on its own line.
    pub fn is_only_type_annotation(&self) -> bool {
        match &self.targets {
            Some(targets) if !targets.is_empty() => targets
                .iter()
                .all(|t| matches!(t, ElementTarget::TypeUse | ElementTarget::TypeParameter)),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DefinitionEntry {
    Declared(AnnotationDef),
    /// Simple name of exactly one qualified definition.
    Alias(String),
    /// Simple name shared by two or more qualified definitions.
    Ambiguous,
}

/// Definition lookup by qualified or simple name.
///
/// Registering `a.b.NonNull` also makes `NonNull` resolve to it. A second
/// qualified definition with the same simple name makes `NonNull` resolve to
/// nothing. A definition registered under an unqualified name always
/// resolves under that name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Vec<AnnotationDef>")]
pub struct DefinitionTable {
    entries: IndexMap<String, DefinitionEntry>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, updating the simple-name alias.
    pub fn register(&mut self, def: AnnotationDef) {
        let name = def.name.clone();
        if is_qualified(&name) {
            let simple = simple_name(&name).to_string();
            match self.entries.get(&simple) {
                None => {
                    self.entries.insert(simple, DefinitionEntry::Alias(name.clone()));
                }
                Some(DefinitionEntry::Alias(existing)) if *existing != name => {
                    self.entries.insert(simple, DefinitionEntry::Ambiguous);
                }
                _ => {}
            }
        }
        self.entries.insert(name, DefinitionEntry::Declared(def));
    }

    /// Resolve a name to its definition.
    pub fn get(&self, name: &str) -> Option<&AnnotationDef> {
        match self.entries.get(name)? {
            DefinitionEntry::Declared(def) => Some(def),
            DefinitionEntry::Alias(qualified) => match self.entries.get(qualified)? {
                DefinitionEntry::Declared(def) => Some(def),
                _ => None,
            },
            DefinitionEntry::Ambiguous => None,
        }
    }

    /// Registered definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &AnnotationDef> {
        self.entries.values().filter_map(|entry| match entry {
            DefinitionEntry::Declared(def) => Some(def),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions().count()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions().next().is_none()
    }
}

impl From<Vec<AnnotationDef>> for DefinitionTable {
    fn from(defs: Vec<AnnotationDef>) -> Self {
        let mut table = DefinitionTable::new();
        for def in defs {
            table.register(def);
        }
        table
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// Value of one annotation field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Strings, chars, class names and enum constant names.
    Text(String),
    Array(Vec<FieldValue>),
    Annotation(Box<Annotation>),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Annotation> for FieldValue {
    fn from(value: Annotation) -> Self {
        FieldValue::Annotation(Box::new(value))
    }
}

/// An annotation use: a definition name plus field values.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Annotation {
    /// Name of the definition (qualified or simple).
    pub def: String,
    #[serde(default)]
    pub values: IndexMap<String, FieldValue>,
}

impl Annotation {
    pub fn new(def: impl Into<String>) -> Self {
        Annotation {
            def: def.into(),
            values: IndexMap::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }
}

// ============================================================================
// Elements
// ============================================================================

/// The kind of element being visited, used in diagnostics and tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Package,
    Class,
    Field,
    Method,
    Block,
    StaticInit,
    InstanceInit,
    FieldInit,
    TypeUse,
    TypeUseWithConcreteType,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Package => "package",
            ElementKind::Class => "class",
            ElementKind::Field => "field",
            ElementKind::Method => "method",
            ElementKind::Block => "block",
            ElementKind::StaticInit => "static-init",
            ElementKind::InstanceInit => "instance-init",
            ElementKind::FieldInit => "field-init",
            ElementKind::TypeUse => "type-use",
            ElementKind::TypeUseWithConcreteType => "type-use-with-type",
        };
        write!(f, "{}", name)
    }
}

/// Annotations on a package declaration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackageElement {
    pub annotations: Vec<Annotation>,
}

/// A type-use position, with annotations on nested positions keyed by type
/// path relative to this one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TypeElement {
    pub annotations: Vec<Annotation>,
    pub inner_types: IndexMap<TypePath, TypeElement>,
}

impl TypeElement {
    /// Add an annotation unless an equal one is already present.
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        push_unique(&mut self.annotations, annotation);
        self
    }

    pub fn inner_mut(&mut self, path: TypePath) -> &mut TypeElement {
        self.inner_types.entry(path).or_default()
    }

    /// True if neither this position nor any nested one is annotated.
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.inner_types.values().all(TypeElement::is_empty)
    }
}

/// A type-use position where a cast of `ty` is to be inserted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypedElement {
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub inner_types: IndexMap<TypePath, TypeElement>,
    #[serde(rename = "type")]
    pub ty: JavaType,
}

impl TypedElement {
    pub fn new(ty: JavaType) -> Self {
        TypedElement {
            annotations: Vec::new(),
            inner_types: IndexMap::new(),
            ty,
        }
    }

    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        push_unique(&mut self.annotations, annotation);
        self
    }

    pub fn inner_mut(&mut self, path: TypePath) -> &mut TypeElement {
        self.inner_types.entry(path).or_default()
    }
}

/// A field, method parameter or local variable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldElement {
    /// Declaration annotations.
    pub annotations: Vec<Annotation>,
    /// Annotations on the declared type.
    #[serde(rename = "type")]
    pub ty: TypeElement,
    pub insert_annotations: IndexMap<AstPath, TypeElement>,
    pub insert_typecasts: IndexMap<AstPath, TypedElement>,
}

impl FieldElement {
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        push_unique(&mut self.annotations, annotation);
        self
    }

    pub fn insert_annotation_mut(&mut self, path: AstPath) -> &mut TypeElement {
        self.insert_annotations.entry(path).or_default()
    }

    /// The cast to insert at `path`; `ty` is used only when it is new.
    pub fn insert_typecast_mut(&mut self, path: AstPath, ty: JavaType) -> &mut TypedElement {
        self.insert_typecasts
            .entry(path)
            .or_insert_with(|| TypedElement::new(ty))
    }
}

/// Sub-expressions of a method body or initializer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExpressionElement {
    pub typecasts: IndexMap<RelativeLocation, TypeElement>,
    pub news: IndexMap<RelativeLocation, TypeElement>,
    pub instanceofs: IndexMap<RelativeLocation, TypeElement>,
    pub member_refs: IndexMap<RelativeLocation, TypeElement>,
    pub calls: IndexMap<RelativeLocation, TypeElement>,
    pub lambdas: IndexMap<RelativeLocation, MethodElement>,
}

impl ExpressionElement {
    pub fn typecast_mut(&mut self, loc: RelativeLocation) -> &mut TypeElement {
        self.typecasts.entry(loc).or_default()
    }

    pub fn new_mut(&mut self, loc: RelativeLocation) -> &mut TypeElement {
        self.news.entry(loc).or_default()
    }

    pub fn instanceof_mut(&mut self, loc: RelativeLocation) -> &mut TypeElement {
        self.instanceofs.entry(loc).or_default()
    }

    pub fn member_ref_mut(&mut self, loc: RelativeLocation) -> &mut TypeElement {
        self.member_refs.entry(loc).or_default()
    }

    pub fn call_mut(&mut self, loc: RelativeLocation) -> &mut TypeElement {
        self.calls.entry(loc).or_default()
    }

    pub fn lambda_mut(&mut self, loc: RelativeLocation) -> &mut MethodElement {
        self.lambdas.entry(loc).or_default()
    }
}

/// A method body or initializer block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BlockElement {
    pub locals: IndexMap<LocalLocation, FieldElement>,
    pub expressions: ExpressionElement,
}

impl BlockElement {
    pub fn local_mut(&mut self, loc: LocalLocation) -> &mut FieldElement {
        self.locals.entry(loc).or_default()
    }
}

/// A method, constructor or lambda.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MethodElement {
    pub annotations: Vec<Annotation>,
    pub receiver: TypeElement,
    pub return_type: TypeElement,
    pub bounds: IndexMap<BoundLocation, TypeElement>,
    pub parameters: IndexMap<u32, FieldElement>,
    pub insert_annotations: IndexMap<AstPath, TypeElement>,
    pub insert_typecasts: IndexMap<AstPath, TypedElement>,
    pub body: BlockElement,
}

impl MethodElement {
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        push_unique(&mut self.annotations, annotation);
        self
    }

    pub fn parameter_mut(&mut self, index: u32) -> &mut FieldElement {
        self.parameters.entry(index).or_default()
    }

    pub fn bound_mut(&mut self, loc: BoundLocation) -> &mut TypeElement {
        self.bounds.entry(loc).or_default()
    }

    pub fn insert_annotation_mut(&mut self, path: AstPath) -> &mut TypeElement {
        self.insert_annotations.entry(path).or_default()
    }

    pub fn insert_typecast_mut(&mut self, path: AstPath, ty: JavaType) -> &mut TypedElement {
        self.insert_typecasts
            .entry(path)
            .or_insert_with(|| TypedElement::new(ty))
    }
}

/// A class and everything declared in it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassElement {
    pub annotations: Vec<Annotation>,
    pub bounds: IndexMap<BoundLocation, TypeElement>,
    pub extends_implements: IndexMap<TypeIndexLocation, TypeElement>,
    pub insert_annotations: IndexMap<AstPath, TypeElement>,
    pub insert_typecasts: IndexMap<AstPath, TypedElement>,
    pub fields: IndexMap<String, FieldElement>,
    /// Keyed by name plus JVM descriptor, e.g. `<init>()V` or `get(I)Ljava/lang/Object;`.
    pub methods: IndexMap<String, MethodElement>,
    pub static_inits: IndexMap<u32, BlockElement>,
    pub instance_inits: IndexMap<u32, BlockElement>,
    pub field_inits: IndexMap<String, ExpressionElement>,
}

impl ClassElement {
    pub fn annotate(&mut self, annotation: Annotation) -> &mut Self {
        push_unique(&mut self.annotations, annotation);
        self
    }

    pub fn bound_mut(&mut self, loc: BoundLocation) -> &mut TypeElement {
        self.bounds.entry(loc).or_default()
    }

    pub fn extends_implements_mut(&mut self, loc: TypeIndexLocation) -> &mut TypeElement {
        self.extends_implements.entry(loc).or_default()
    }

    pub fn insert_annotation_mut(&mut self, path: AstPath) -> &mut TypeElement {
        self.insert_annotations.entry(path).or_default()
    }

    pub fn insert_typecast_mut(&mut self, path: AstPath, ty: JavaType) -> &mut TypedElement {
        self.insert_typecasts
            .entry(path)
            .or_insert_with(|| TypedElement::new(ty))
    }

    pub fn field_mut(&mut self, name: impl Into<String>) -> &mut FieldElement {
        self.fields.entry(name.into()).or_default()
    }

    pub fn method_mut(&mut self, name: impl Into<String>) -> &mut MethodElement {
        self.methods.entry(name.into()).or_default()
    }

    pub fn static_init_mut(&mut self, block: u32) -> &mut BlockElement {
        self.static_inits.entry(block).or_default()
    }

    pub fn instance_init_mut(&mut self, block: u32) -> &mut BlockElement {
        self.instance_inits.entry(block).or_default()
    }

    pub fn field_init_mut(&mut self, field: impl Into<String>) -> &mut ExpressionElement {
        self.field_inits.entry(field.into()).or_default()
    }
}

fn push_unique(annotations: &mut Vec<Annotation>, annotation: Annotation) {
    if !annotations.contains(&annotation) {
        annotations.push(annotation);
    }
}

/// Borrowed view of any element that carries annotations directly.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Package(&'a [Annotation]),
    Class(&'a ClassElement),
    Field(&'a FieldElement),
    Method(&'a MethodElement),
    TypeUse(&'a TypeElement),
    TypeUseWithType(&'a TypedElement),
}

impl<'a> ElementRef<'a> {
    /// Annotations directly on this element.
    pub fn annotations(&self) -> &'a [Annotation] {
        match *self {
            ElementRef::Package(annotations) => annotations,
            ElementRef::Class(class) => &class.annotations,
            ElementRef::Field(field) => &field.annotations,
            ElementRef::Method(method) => &method.annotations,
            ElementRef::TypeUse(element) => &element.annotations,
            ElementRef::TypeUseWithType(element) => &element.annotations,
        }
    }

    /// The type of the cast to insert, for cast-insertion elements.
    pub fn concrete_type(&self) -> Option<&'a JavaType> {
        match *self {
            ElementRef::TypeUseWithType(element) => Some(&element.ty),
            _ => None,
        }
    }

    /// Nested type positions, for type-use elements.
    pub fn inner_types(&self) -> Option<&'a IndexMap<TypePath, TypeElement>> {
        match *self {
            ElementRef::TypeUse(element) => Some(&element.inner_types),
            ElementRef::TypeUseWithType(element) => Some(&element.inner_types),
            _ => None,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Package(_) => ElementKind::Package,
            ElementRef::Class(_) => ElementKind::Class,
            ElementRef::Field(_) => ElementKind::Field,
            ElementRef::Method(_) => ElementKind::Method,
            ElementRef::TypeUse(_) => ElementKind::TypeUse,
            ElementRef::TypeUseWithType(_) => ElementKind::TypeUseWithConcreteType,
        }
    }
}

// ============================================================================
// Scene
// ============================================================================

/// Suffix of the pseudo-class that carries package annotations.
pub const PACKAGE_INFO_SUFFIX: &str = ".package-info";

/// All annotations to insert, plus the definitions they refer to.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Scene {
    #[serde(rename = "annotation_defs")]
    pub definitions: DefinitionTable,
    pub packages: IndexMap<String, PackageElement>,
    /// Keyed by binary class name (`a.b.Outer$Inner`).
    pub classes: IndexMap<String, ClassElement>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn define(&mut self, def: AnnotationDef) -> &mut Self {
        self.definitions.register(def);
        self
    }

    pub fn package_mut(&mut self, name: impl Into<String>) -> &mut PackageElement {
        self.packages.entry(name.into()).or_default()
    }

    pub fn class_mut(&mut self, name: impl Into<String>) -> &mut ClassElement {
        self.classes.entry(name.into()).or_default()
    }
}
