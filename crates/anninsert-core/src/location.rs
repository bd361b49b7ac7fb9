//! Structural location keys: type paths, AST paths, and the relative
//! locations used to name casts, news, bounds and locals.
//!
//! Each key has a canonical textual form. `Display` produces it and
//! `FromStr` parses it back, which is what lets these types serve as JSON
//! object keys in a serialized scene.
//!
//! ## Textual forms
//!
//! ```text
//! type path          [  .  *  0;          (array, inner type, wildcard, type argument 0)
//! AST path           Block.statement 1, ExpressionStatement.expression
//! relative location  #12   *0   *0,1      (offset, index, index with intersection type index)
//! bound location     0&1                  (type parameter 0, bound 1)
//! extends/implements -1   0               (extends clause, first implements clause)
//! local location     #1#0+10   name*0     (slot/scope, or name and ordinal)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use winnow::ascii::{multispace0, multispace1};
use winnow::combinator::{alt, opt, preceded, repeat};
use winnow::error::{ErrMode, ParserError};
use winnow::prelude::*;
use winnow::token::take_while;
use winnow::ModalResult;

/// Error produced when a location key cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {what} '{input}': {message}")]
pub struct LocationParseError {
    /// Which kind of location was being parsed.
    pub what: &'static str,
    /// The rejected input.
    pub input: String,
    /// Description of the failure.
    pub message: String,
}

impl LocationParseError {
    fn at(what: &'static str, input: &str, offset: usize) -> Self {
        LocationParseError {
            what,
            input: input.to_string(),
            message: format!("unexpected input at offset {}", offset),
        }
    }
}

// ============================================================================
// Type Paths
// ============================================================================

/// One step into a compound type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypePathStep {
    /// From an array type to its component type.
    Array,
    /// From a type to its nested (inner) type.
    InnerType,
    /// From a wildcard to its bound.
    Wildcard,
    /// From a parameterized type to its Nth type argument.
    TypeArgument(u8),
}

impl fmt::Display for TypePathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypePathStep::Array => write!(f, "["),
            TypePathStep::InnerType => write!(f, "."),
            TypePathStep::Wildcard => write!(f, "*"),
            TypePathStep::TypeArgument(index) => write!(f, "{};", index),
        }
    }
}

/// Path from an outer type to one of its nested type positions.
///
/// The empty path denotes the outer type itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct TypePath(Vec<TypePathStep>);

impl TypePath {
    /// The empty path (the outer type).
    pub fn root() -> Self {
        TypePath(Vec::new())
    }

    /// Create a path from steps.
    pub fn new(steps: Vec<TypePathStep>) -> Self {
        TypePath(steps)
    }

    /// The steps of this path, outermost first.
    pub fn steps(&self) -> &[TypePathStep] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// This path followed by `other`.
    pub fn join(&self, other: &TypePath) -> TypePath {
        let mut steps = self.0.clone();
        steps.extend_from_slice(&other.0);
        TypePath(steps)
    }

    /// This path extended by one step.
    pub fn child(&self, step: TypePathStep) -> TypePath {
        let mut steps = self.0.clone();
        steps.push(step);
        TypePath(steps)
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl FromStr for TypePath {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_path
            .parse(s)
            .map_err(|e| LocationParseError::at("type path", s, e.offset()))
    }
}

impl TryFrom<String> for TypePath {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// AST Paths
// ============================================================================

/// Syntax tree node kinds that can appear in an AST path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TreeKind {
    Annotation,
    AnnotatedType,
    ArrayAccess,
    ArrayType,
    Assert,
    Assignment,
    Binary,
    Block,
    Case,
    Catch,
    Class,
    CompoundAssignment,
    ConditionalExpression,
    DoWhileLoop,
    EnhancedForLoop,
    ExpressionStatement,
    ForLoop,
    Identifier,
    If,
    InstanceOf,
    IntersectionType,
    LabeledStatement,
    Lambda,
    MemberReference,
    MemberSelect,
    Method,
    MethodInvocation,
    NewArray,
    NewClass,
    ParameterizedType,
    Parenthesized,
    PrimitiveType,
    Return,
    Switch,
    Synchronized,
    Throw,
    Try,
    TypeCast,
    TypeParameter,
    Unary,
    UnionType,
    Variable,
    WhileLoop,
    Wildcard,
}

impl TreeKind {
    const ALL: [TreeKind; 44] = [
        TreeKind::Annotation,
        TreeKind::AnnotatedType,
        TreeKind::ArrayAccess,
        TreeKind::ArrayType,
        TreeKind::Assert,
        TreeKind::Assignment,
        TreeKind::Binary,
        TreeKind::Block,
        TreeKind::Case,
        TreeKind::Catch,
        TreeKind::Class,
        TreeKind::CompoundAssignment,
        TreeKind::ConditionalExpression,
        TreeKind::DoWhileLoop,
        TreeKind::EnhancedForLoop,
        TreeKind::ExpressionStatement,
        TreeKind::ForLoop,
        TreeKind::Identifier,
        TreeKind::If,
        TreeKind::InstanceOf,
        TreeKind::IntersectionType,
        TreeKind::LabeledStatement,
        TreeKind::Lambda,
        TreeKind::MemberReference,
        TreeKind::MemberSelect,
        TreeKind::Method,
        TreeKind::MethodInvocation,
        TreeKind::NewArray,
        TreeKind::NewClass,
        TreeKind::ParameterizedType,
        TreeKind::Parenthesized,
        TreeKind::PrimitiveType,
        TreeKind::Return,
        TreeKind::Switch,
        TreeKind::Synchronized,
        TreeKind::Throw,
        TreeKind::Try,
        TreeKind::TypeCast,
        TreeKind::TypeParameter,
        TreeKind::Unary,
        TreeKind::UnionType,
        TreeKind::Variable,
        TreeKind::WhileLoop,
        TreeKind::Wildcard,
    ];

    /// The name used for this kind in AST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeKind::Annotation => "Annotation",
            TreeKind::AnnotatedType => "AnnotatedType",
            TreeKind::ArrayAccess => "ArrayAccess",
            TreeKind::ArrayType => "ArrayType",
            TreeKind::Assert => "Assert",
            TreeKind::Assignment => "Assignment",
            TreeKind::Binary => "Binary",
            TreeKind::Block => "Block",
            TreeKind::Case => "Case",
            TreeKind::Catch => "Catch",
            TreeKind::Class => "Class",
            TreeKind::CompoundAssignment => "CompoundAssignment",
            TreeKind::ConditionalExpression => "ConditionalExpression",
            TreeKind::DoWhileLoop => "DoWhileLoop",
            TreeKind::EnhancedForLoop => "EnhancedForLoop",
            TreeKind::ExpressionStatement => "ExpressionStatement",
            TreeKind::ForLoop => "ForLoop",
            TreeKind::Identifier => "Identifier",
            TreeKind::If => "If",
            TreeKind::InstanceOf => "InstanceOf",
            TreeKind::IntersectionType => "IntersectionType",
            TreeKind::LabeledStatement => "LabeledStatement",
            TreeKind::Lambda => "Lambda",
            TreeKind::MemberReference => "MemberReference",
            TreeKind::MemberSelect => "MemberSelect",
            TreeKind::Method => "Method",
            TreeKind::MethodInvocation => "MethodInvocation",
            TreeKind::NewArray => "NewArray",
            TreeKind::NewClass => "NewClass",
            TreeKind::ParameterizedType => "ParameterizedType",
            TreeKind::Parenthesized => "Parenthesized",
            TreeKind::PrimitiveType => "PrimitiveType",
            TreeKind::Return => "Return",
            TreeKind::Switch => "Switch",
            TreeKind::Synchronized => "Synchronized",
            TreeKind::Throw => "Throw",
            TreeKind::Try => "Try",
            TreeKind::TypeCast => "TypeCast",
            TreeKind::TypeParameter => "TypeParameter",
            TreeKind::Unary => "Unary",
            TreeKind::UnionType => "UnionType",
            TreeKind::Variable => "Variable",
            TreeKind::WhileLoop => "WhileLoop",
            TreeKind::Wildcard => "Wildcard",
        }
    }

    /// Look up a kind by its AST-path name.
    pub fn from_name(name: &str) -> Option<TreeKind> {
        TreeKind::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One step of an AST path: a child selector of a node of some kind,
/// optionally indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AstEntry {
    pub kind: TreeKind,
    pub selector: String,
    pub argument: Option<i32>,
}

impl AstEntry {
    /// Selector for method and lambda parameters (`-1` is the receiver).
    pub const PARAMETER: &'static str = "parameter";
    /// Selector for the type of a `NewArray`.
    pub const TYPE: &'static str = "type";
    /// Selector for the class name of a `NewClass`.
    pub const IDENTIFIER: &'static str = "identifier";

    pub fn new(kind: TreeKind, selector: impl Into<String>) -> Self {
        AstEntry {
            kind,
            selector: selector.into(),
            argument: None,
        }
    }

    pub fn with_argument(kind: TreeKind, selector: impl Into<String>, argument: i32) -> Self {
        AstEntry {
            kind,
            selector: selector.into(),
            argument: Some(argument),
        }
    }

    pub fn selector_is(&self, selector: &str) -> bool {
        self.selector == selector
    }
}

impl fmt::Display for AstEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.selector)?;
        if let Some(argument) = self.argument {
            write!(f, " {}", argument)?;
        }
        Ok(())
    }
}

/// Path from an enclosing declaration down to a node of the syntax tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct AstPath(Vec<AstEntry>);

impl AstPath {
    pub fn new(entries: Vec<AstEntry>) -> Self {
        AstPath(entries)
    }

    pub fn entries(&self) -> &[AstEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&AstEntry> {
        self.0.last()
    }
}

impl fmt::Display for AstPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

impl FromStr for AstPath {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Ok(AstPath::default());
        }
        parse_ast_path
            .parse(s.trim())
            .map(AstPath)
            .map_err(|e| LocationParseError::at("AST path", s, e.offset()))
    }
}

impl TryFrom<String> for AstPath {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Relative, Bound, Extends/Implements and Local Locations
// ============================================================================

/// How an expression is located within its enclosing method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativeAnchor {
    /// Bytecode offset of the instruction.
    Offset(u32),
    /// Source index among expressions of the same kind.
    Index(u32),
}

/// Location of a cast, `new`, `instanceof`, call, member reference or lambda
/// within a method.
///
/// `type_index` selects one component of an intersection cast (`(A & B)`);
/// zero is the first (or only) component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct RelativeLocation {
    pub anchor: RelativeAnchor,
    pub type_index: u32,
}

impl RelativeLocation {
    pub fn offset(offset: u32) -> Self {
        RelativeLocation {
            anchor: RelativeAnchor::Offset(offset),
            type_index: 0,
        }
    }

    pub fn index(index: u32) -> Self {
        RelativeLocation {
            anchor: RelativeAnchor::Index(index),
            type_index: 0,
        }
    }

    pub fn with_type_index(mut self, type_index: u32) -> Self {
        self.type_index = type_index;
        self
    }
}

impl fmt::Display for RelativeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            RelativeAnchor::Offset(offset) => write!(f, "#{}", offset)?,
            RelativeAnchor::Index(index) => write!(f, "*{}", index)?,
        }
        if self.type_index > 0 {
            write!(f, ",{}", self.type_index)?;
        }
        Ok(())
    }
}

impl FromStr for RelativeLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_relative_location
            .parse(s)
            .map_err(|e| LocationParseError::at("relative location", s, e.offset()))
    }
}

impl TryFrom<String> for RelativeLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A bound of a type parameter: `param_index` selects the type parameter,
/// `bound_index` the bound (`-1` for the type parameter declaration itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct BoundLocation {
    pub param_index: u32,
    pub bound_index: i32,
}

impl BoundLocation {
    pub fn new(param_index: u32, bound_index: i32) -> Self {
        BoundLocation {
            param_index,
            bound_index,
        }
    }
}

impl fmt::Display for BoundLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}&{}", self.param_index, self.bound_index)
    }
}

impl FromStr for BoundLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (parse_u32, '&', parse_i32)
            .map(|(param_index, _, bound_index)| BoundLocation::new(param_index, bound_index))
            .parse(s)
            .map_err(|e| LocationParseError::at("bound location", s, e.offset()))
    }
}

impl TryFrom<String> for BoundLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Index into a class's supertypes: `-1` is the `extends` clause, `n >= 0`
/// the nth `implements` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct TypeIndexLocation(pub i32);

impl TypeIndexLocation {
    pub fn extends() -> Self {
        TypeIndexLocation(-1)
    }

    pub fn implements(index: u32) -> Self {
        TypeIndexLocation(index as i32)
    }

    pub fn is_extends(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for TypeIndexLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TypeIndexLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_i32
            .map(TypeIndexLocation)
            .parse(s)
            .map_err(|e| LocationParseError::at("extends/implements index", s, e.offset()))
    }
}

impl TryFrom<String> for TypeIndexLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Location of a local variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum LocalLocation {
    /// Local variable slot and the bytecode range where it is live.
    Scoped {
        index: u32,
        scope_start: u32,
        scope_length: u32,
    },
    /// Variable name and its ordinal among same-named locals.
    Named { name: String, ordinal: u32 },
}

impl LocalLocation {
    pub fn scoped(index: u32, scope_start: u32, scope_length: u32) -> Self {
        LocalLocation::Scoped {
            index,
            scope_start,
            scope_length,
        }
    }

    pub fn named(name: impl Into<String>, ordinal: u32) -> Self {
        LocalLocation::Named {
            name: name.into(),
            ordinal,
        }
    }
}

impl fmt::Display for LocalLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalLocation::Scoped {
                index,
                scope_start,
                scope_length,
            } => write!(f, "#{}#{}+{}", index, scope_start, scope_length),
            LocalLocation::Named { name, ordinal } => write!(f, "{}*{}", name, ordinal),
        }
    }
}

impl FromStr for LocalLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_local_location
            .parse(s)
            .map_err(|e| LocationParseError::at("local location", s, e.offset()))
    }
}

impl TryFrom<String> for LocalLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ============================================================================
// Parser implementation using winnow
// ============================================================================

/// Parse an unsigned decimal number.
fn parse_u32(input: &mut &str) -> ModalResult<u32> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(|digits: &str| digits.parse::<u32>())
        .parse_next(input)
}

/// Parse an optionally negative decimal number.
fn parse_i32(input: &mut &str) -> ModalResult<i32> {
    (opt('-'), take_while(1.., |c: char| c.is_ascii_digit()))
        .take()
        .try_map(|digits: &str| digits.parse::<i32>())
        .parse_next(input)
}

/// Parse a Java identifier.
fn parse_identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '$').parse_next(input)
}

/// Parse one type path step.
fn parse_type_path_step(input: &mut &str) -> ModalResult<TypePathStep> {
    alt((
        '['.map(|_| TypePathStep::Array),
        '.'.map(|_| TypePathStep::InnerType),
        '*'.map(|_| TypePathStep::Wildcard),
        (parse_u32, ';').try_map(|(index, _)| u8::try_from(index).map(TypePathStep::TypeArgument)),
    ))
    .parse_next(input)
}

/// Parse a whole type path (possibly empty).
fn parse_type_path(input: &mut &str) -> ModalResult<TypePath> {
    let steps: Vec<TypePathStep> = repeat(0.., parse_type_path_step).parse_next(input)?;
    Ok(TypePath(steps))
}

/// Parse one AST path entry: `Kind.selector [argument]`.
fn parse_ast_entry(input: &mut &str) -> ModalResult<AstEntry> {
    let kind_name: &str = take_while(1.., |c: char| c.is_ascii_alphabetic()).parse_next(input)?;
    let kind = TreeKind::from_name(kind_name).ok_or_else(|| ErrMode::from_input(input))?;

    let _ = '.'.parse_next(input)?;

    let selector: &str =
        take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)?;

    let argument = opt(preceded(multispace1, parse_i32)).parse_next(input)?;

    Ok(AstEntry {
        kind,
        selector: selector.to_string(),
        argument,
    })
}

/// Parse a non-empty, comma-separated AST path.
fn parse_ast_path(input: &mut &str) -> ModalResult<Vec<AstEntry>> {
    let first = parse_ast_entry(input)?;

    let rest: Vec<AstEntry> = repeat(
        0..,
        preceded((multispace0, ',', multispace0), parse_ast_entry),
    )
    .parse_next(input)?;

    let mut all = vec![first];
    all.extend(rest);
    Ok(all)
}

/// Parse `#offset` or `*index`, optionally followed by `,typeIndex`.
fn parse_relative_location(input: &mut &str) -> ModalResult<RelativeLocation> {
    let anchor = alt((
        preceded('#', parse_u32).map(RelativeAnchor::Offset),
        preceded('*', parse_u32).map(RelativeAnchor::Index),
    ))
    .parse_next(input)?;

    let type_index = opt(preceded(',', parse_u32)).parse_next(input)?;

    Ok(RelativeLocation {
        anchor,
        type_index: type_index.unwrap_or(0),
    })
}

/// Parse `#index#start+length` or `name*ordinal`.
fn parse_local_location(input: &mut &str) -> ModalResult<LocalLocation> {
    alt((
        ('#', parse_u32, '#', parse_u32, '+', parse_u32).map(
            |(_, index, _, scope_start, _, scope_length)| LocalLocation::Scoped {
                index,
                scope_start,
                scope_length,
            },
        ),
        (parse_identifier, '*', parse_u32).map(|(name, _, ordinal)| LocalLocation::Named {
            name: name.to_string(),
            ordinal,
        }),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod type_paths {
        use super::*;

        #[test]
        fn empty_string_is_root() {
            let path: TypePath = "".parse().unwrap();
            assert!(path.is_empty());
            assert_eq!(path, TypePath::root());
        }

        #[test]
        fn parses_every_step_kind() {
            let path: TypePath = "0;[*.".parse().unwrap();
            assert_eq!(
                path.steps(),
                &[
                    TypePathStep::TypeArgument(0),
                    TypePathStep::Array,
                    TypePathStep::Wildcard,
                    TypePathStep::InnerType,
                ]
            );
            assert_eq!(path.to_string(), "0;[*.");
        }

        #[test]
        fn join_concatenates_steps() {
            let outer: TypePath = "1;".parse().unwrap();
            let inner: TypePath = "[".parse().unwrap();
            assert_eq!(outer.join(&inner).to_string(), "1;[");
            assert_eq!(outer.child(TypePathStep::Wildcard).to_string(), "1;*");
        }

        #[test]
        fn rejects_garbage() {
            let err = "0;x".parse::<TypePath>().unwrap_err();
            assert_eq!(err.what, "type path");
            assert_eq!(err.input, "0;x");
        }

        #[test]
        fn rejects_type_argument_out_of_range() {
            assert!("300;".parse::<TypePath>().is_err());
        }
    }

    mod ast_paths {
        use super::*;

        #[test]
        fn parses_receiver_parameter() {
            let path: AstPath = "Method.parameter -1".parse().unwrap();
            let last = path.last().unwrap();
            assert_eq!(last.kind, TreeKind::Method);
            assert!(last.selector_is(AstEntry::PARAMETER));
            assert_eq!(last.argument, Some(-1));
        }

        #[test]
        fn parses_multi_entry_path() {
            let text = "Block.statement 1, ExpressionStatement.expression, NewClass.identifier";
            let path: AstPath = text.parse().unwrap();
            assert_eq!(path.entries().len(), 3);
            assert_eq!(path.entries()[0].argument, Some(1));
            assert_eq!(path.entries()[1].argument, None);
            assert_eq!(path.to_string(), text);
        }

        #[test]
        fn blank_input_is_empty_path() {
            let path: AstPath = "  ".parse().unwrap();
            assert!(path.is_empty());
        }

        #[test]
        fn rejects_unknown_tree_kind() {
            assert!("Bogus.type 0".parse::<AstPath>().is_err());
        }
    }

    mod relative_locations {
        use super::*;

        #[test]
        fn offset_and_index_forms() {
            let offset: RelativeLocation = "#12".parse().unwrap();
            assert_eq!(offset, RelativeLocation::offset(12));

            let index: RelativeLocation = "*3,1".parse().unwrap();
            assert_eq!(index, RelativeLocation::index(3).with_type_index(1));
            assert_eq!(index.to_string(), "*3,1");
        }

        #[test]
        fn zero_type_index_is_not_printed() {
            assert_eq!(RelativeLocation::index(0).to_string(), "*0");
        }

        #[test]
        fn bound_and_supertype_locations() {
            let bound: BoundLocation = "0&-1".parse().unwrap();
            assert_eq!(bound, BoundLocation::new(0, -1));

            let ext: TypeIndexLocation = "-1".parse().unwrap();
            assert!(ext.is_extends());
            assert_eq!(TypeIndexLocation::implements(2).to_string(), "2");
        }

        #[test]
        fn local_location_forms() {
            let scoped: LocalLocation = "#1#0+10".parse().unwrap();
            assert_eq!(scoped, LocalLocation::scoped(1, 0, 10));

            let named: LocalLocation = "count*0".parse().unwrap();
            assert_eq!(named, LocalLocation::named("count", 0));
            assert_eq!(named.to_string(), "count*0");
        }
    }

    #[test]
    fn keys_deserialize_from_json_object_keys() {
        let json = r#"{"0;": 1, "[": 2}"#;
        let map: indexmap::IndexMap<TypePath, u32> = serde_json::from_str(json).unwrap();
        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["0;", "["]);
    }
}
