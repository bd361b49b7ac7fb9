//! Java type objects for the insertions that write a whole type.
//!
//! Casts, receiver parameters, `new` expressions and synthesized
//! constructors carry a reconstructed type. Annotations attach to any slot
//! of that type by type path and the type renders back to Java source.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::{TypePath, TypePathStep};

/// The bound of a wildcard type argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    Extends,
    Super,
    #[default]
    Unbounded,
}

/// A Java type that can be annotated at every type-use position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JavaType {
    /// A class, interface or primitive type, optionally parameterized and
    /// optionally with a nested inner type (`Outer.Inner`).
    Declared {
        #[serde(default)]
        annotations: Vec<String>,
        name: String,
        #[serde(default)]
        type_args: Vec<JavaType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        inner: Option<Box<JavaType>>,
    },
    /// An array of `component`.
    Array {
        #[serde(default)]
        annotations: Vec<String>,
        component: Box<JavaType>,
    },
    /// A wildcard type argument.
    Wildcard {
        #[serde(default)]
        annotations: Vec<String>,
        #[serde(default)]
        bound_kind: BoundKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bound: Option<Box<JavaType>>,
    },
}

impl JavaType {
    /// A declared type with the given name and no arguments.
    pub fn declared(name: impl Into<String>) -> Self {
        JavaType::Declared {
            annotations: Vec::new(),
            name: name.into(),
            type_args: Vec::new(),
            inner: None,
        }
    }

    /// A declared type with no name. Receiver and `new` insertions use it to
    /// accumulate annotations only.
    pub fn unnamed() -> Self {
        JavaType::declared("")
    }

    pub fn array_of(component: JavaType) -> Self {
        JavaType::Array {
            annotations: Vec::new(),
            component: Box::new(component),
        }
    }

    pub fn with_type_args(mut self, args: Vec<JavaType>) -> Self {
        if let JavaType::Declared { type_args, .. } = &mut self {
            *type_args = args;
        }
        self
    }

    pub fn with_inner(mut self, nested: JavaType) -> Self {
        if let JavaType::Declared { inner, .. } = &mut self {
            *inner = Some(Box::new(nested));
        }
        self
    }

    pub fn wildcard(bound_kind: BoundKind, bound: Option<JavaType>) -> Self {
        JavaType::Wildcard {
            annotations: Vec::new(),
            bound_kind,
            bound: bound.map(Box::new),
        }
    }

    pub fn annotations(&self) -> &[String] {
        match self {
            JavaType::Declared { annotations, .. }
            | JavaType::Array { annotations, .. }
            | JavaType::Wildcard { annotations, .. } => annotations,
        }
    }

    /// Attach an annotation to this type's outermost position.
    pub fn add_annotation(&mut self, text: impl Into<String>) {
        match self {
            JavaType::Declared { annotations, .. }
            | JavaType::Array { annotations, .. }
            | JavaType::Wildcard { annotations, .. } => annotations.push(text.into()),
        }
    }

    /// Name of a declared type, `None` for arrays and wildcards.
    pub fn name(&self) -> Option<&str> {
        match self {
            JavaType::Declared { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The nested position named by `path`, or `None` if the path does not
    /// fit this type's shape.
    pub fn at_path_mut(&mut self, path: &TypePath) -> Option<&mut JavaType> {
        let mut current = self;
        for step in path.steps() {
            current = match (step, current) {
                (TypePathStep::Array, JavaType::Array { component, .. }) => component.as_mut(),
                (TypePathStep::InnerType, JavaType::Declared { inner, .. }) => inner.as_deref_mut()?,
                (TypePathStep::Wildcard, JavaType::Wildcard { bound, .. }) => bound.as_deref_mut()?,
                (TypePathStep::TypeArgument(index), JavaType::Declared { type_args, .. }) => {
                    type_args.get_mut(usize::from(*index))?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

fn write_annotations(f: &mut fmt::Formatter<'_>, annotations: &[String]) -> fmt::Result {
    for annotation in annotations {
        write!(f, "{} ", annotation)?;
    }
    Ok(())
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Declared {
                annotations,
                name,
                type_args,
                inner,
            } => {
                if name.is_empty() {
                    // Annotations only, as written on a receiver or `new`.
                    return write!(f, "{}", annotations.join(" "));
                }
                write_annotations(f, annotations)?;
                write!(f, "{}", name)?;
                if !type_args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in type_args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                if let Some(inner) = inner {
                    write!(f, ".{}", inner)?;
                }
                Ok(())
            }
            JavaType::Array { .. } => {
                // Java writes the element type first, then one `[]` per
                // dimension from the outermost array inwards.
                let mut dims: Vec<&[String]> = Vec::new();
                let mut element = self;
                while let JavaType::Array {
                    annotations,
                    component,
                } = element
                {
                    dims.push(annotations);
                    element = component;
                }
                write!(f, "{}", element)?;
                for annotations in dims {
                    for annotation in annotations {
                        write!(f, " {}", annotation)?;
                    }
                    if !annotations.is_empty() {
                        write!(f, " ")?;
                    }
                    write!(f, "[]")?;
                }
                Ok(())
            }
            JavaType::Wildcard {
                annotations,
                bound_kind,
                bound,
            } => {
                write_annotations(f, annotations)?;
                write!(f, "?")?;
                match (bound_kind, bound) {
                    (BoundKind::Extends, Some(bound)) => write!(f, " extends {}", bound),
                    (BoundKind::Super, Some(bound)) => write!(f, " super {}", bound),
                    _ => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(text: &str) -> TypePath {
        text.parse().unwrap()
    }

    #[test]
    fn renders_parameterized_type() {
        let ty = JavaType::declared("Map").with_type_args(vec![
            JavaType::declared("String"),
            JavaType::wildcard(BoundKind::Extends, Some(JavaType::declared("Number"))),
        ]);
        assert_eq!(ty.to_string(), "Map<String, ? extends Number>");
    }

    #[test]
    fn renders_array_dimensions_outer_first() {
        let mut ty = JavaType::array_of(JavaType::array_of(JavaType::declared("String")));
        ty.add_annotation("@A");
        ty.at_path_mut(&path("[")).unwrap().add_annotation("@B");
        ty.at_path_mut(&path("[[")).unwrap().add_annotation("@C");
        assert_eq!(ty.to_string(), "@C String @A [] @B []");
    }

    #[test]
    fn decorates_type_argument_and_wildcard_bound() {
        let mut ty = JavaType::declared("List").with_type_args(vec![JavaType::wildcard(
            BoundKind::Super,
            Some(JavaType::declared("Integer")),
        )]);
        ty.at_path_mut(&path("0;")).unwrap().add_annotation("@W");
        ty.at_path_mut(&path("0;*")).unwrap().add_annotation("@I");
        assert_eq!(ty.to_string(), "List<@W ? super @I Integer>");
    }

    #[test]
    fn inner_type_step() {
        let mut ty = JavaType::declared("Outer").with_inner(JavaType::declared("Inner"));
        ty.at_path_mut(&path(".")).unwrap().add_annotation("@N");
        assert_eq!(ty.to_string(), "Outer.@N Inner");
    }

    #[test]
    fn mismatched_path_is_none() {
        let mut ty = JavaType::declared("String");
        assert!(ty.at_path_mut(&path("[")).is_none());
        assert!(ty.at_path_mut(&path("0;")).is_none());
        assert!(ty.at_path_mut(&path("")).is_some());
    }

    #[test]
    fn unnamed_type_renders_annotations_only() {
        let mut ty = JavaType::unnamed();
        ty.add_annotation("@A");
        ty.add_annotation("@B");
        assert_eq!(ty.to_string(), "@A @B");
    }

    #[test]
    fn deserializes_tagged_json() {
        let json = r#"{"kind":"array","component":{"kind":"declared","name":"int"}}"#;
        let ty: JavaType = serde_json::from_str(json).unwrap();
        assert_eq!(ty.to_string(), "int[]");
    }
}
