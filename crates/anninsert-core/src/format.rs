//! Render annotations as Java source text.
//!
//! `@Name` with no values, `@Name(v)` when the only value is `value`, and
//! `@Name(k1=v1, k2=v2)` otherwise, with fields in the order the definition
//! declares them. Names are written simple unless the ambiguity policy says
//! otherwise.

use crate::ambiguity::AmbiguityPolicy;
use crate::error::InsertError;
use crate::scene::{
    is_qualified, simple_name, Annotation, AnnotationDef, DefinitionTable, FieldType, FieldValue,
    ScalarType,
};

/// The rendered text of an annotation plus the imports its simple names
/// depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAnnotation {
    pub text: String,
    /// Qualified names (with `$` written as `.`) that must be imported for
    /// `text` to resolve.
    pub imports: Vec<String>,
}

/// Formats annotations against a definition table and ambiguity policy.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationFormatter<'a> {
    definitions: &'a DefinitionTable,
    policy: &'a AmbiguityPolicy,
}

impl<'a> AnnotationFormatter<'a> {
    pub fn new(definitions: &'a DefinitionTable, policy: &'a AmbiguityPolicy) -> Self {
        AnnotationFormatter {
            definitions,
            policy,
        }
    }

    /// Resolve the definition an annotation refers to.
    pub fn definition(&self, annotation: &Annotation) -> Result<&'a AnnotationDef, InsertError> {
        self.definitions
            .get(&annotation.def)
            .ok_or_else(|| InsertError::UnknownDefinition {
                name: annotation.def.clone(),
            })
    }

    pub fn format(&self, annotation: &Annotation) -> Result<FormattedAnnotation, InsertError> {
        let mut imports = Vec::new();
        let text = self.render(annotation, &mut imports)?;
        Ok(FormattedAnnotation { text, imports })
    }

    /// How a definition's name is written: simple, or qualified with `$`
    /// replaced by `.` when the simple name is ambiguous.
    pub fn display_name(&self, qualified: &str) -> String {
        if !is_qualified(qualified) {
            return qualified.to_string();
        }
        let simple = simple_name(qualified);
        if self.policy.is_ambiguous(simple) {
            source_name(qualified)
        } else {
            simple.to_string()
        }
    }

    fn render(
        &self,
        annotation: &Annotation,
        imports: &mut Vec<String>,
    ) -> Result<String, InsertError> {
        let def = self.definition(annotation)?;

        let name = self.display_name(&def.name);
        if is_qualified(&def.name) && !self.policy.is_ambiguous(simple_name(&def.name)) {
            let import = source_name(&def.name);
            if !is_implicitly_imported(&import) && !imports.contains(&import) {
                imports.push(import);
            }
        }

        for field in annotation.values.keys() {
            if !def.fields.contains_key(field) {
                return Err(InsertError::UndeclaredField {
                    def: def.name.clone(),
                    field: field.clone(),
                });
            }
        }

        let mut text = format!("@{}", name);
        if annotation.values.len() == 1 && annotation.values.contains_key("value") {
            let value = self.render_field(def, "value", &annotation.values["value"], imports)?;
            text.push_str(&format!("({})", value));
        } else if !annotation.values.is_empty() {
            let mut parts = Vec::with_capacity(annotation.values.len());
            for field in def.fields.keys() {
                if let Some(value) = annotation.values.get(field) {
                    let rendered = self.render_field(def, field, value, imports)?;
                    parts.push(format!("{}={}", field, rendered));
                }
            }
            text.push_str(&format!("({})", parts.join(", ")));
        }
        Ok(text)
    }

    fn render_field(
        &self,
        def: &AnnotationDef,
        field: &str,
        value: &FieldValue,
        imports: &mut Vec<String>,
    ) -> Result<String, InsertError> {
        let ty = &def.fields[field];
        let mismatch = || InsertError::FieldTypeMismatch {
            def: def.name.clone(),
            field: field.to_string(),
            expected: ty.to_string(),
        };
        match (ty, value) {
            (FieldType::Scalar(scalar), value) => self
                .render_scalar(scalar, value, imports)?
                .ok_or_else(mismatch),
            (FieldType::Array(None), FieldValue::Array(items)) if items.is_empty() => {
                Ok("{}".to_string())
            }
            (FieldType::Array(Some(scalar)), FieldValue::Array(items)) => {
                let mut rendered = Vec::with_capacity(items.len());
                for item in items {
                    let item = self
                        .render_scalar(scalar, item, imports)?
                        .ok_or_else(mismatch)?;
                    rendered.push(item);
                }
                Ok(format!("{{{}}}", rendered.join(",")))
            }
            _ => Err(mismatch()),
        }
    }

    /// Render one scalar; `Ok(None)` when the value does not fit the type.
    fn render_scalar(
        &self,
        ty: &ScalarType,
        value: &FieldValue,
        imports: &mut Vec<String>,
    ) -> Result<Option<String>, InsertError> {
        let rendered = match (ty, value) {
            (ScalarType::Boolean, FieldValue::Bool(b)) => Some(b.to_string()),
            (ScalarType::Byte, FieldValue::Int(i)) => i8::try_from(*i).ok().map(|v| v.to_string()),
            (ScalarType::Short, FieldValue::Int(i)) => {
                i16::try_from(*i).ok().map(|v| v.to_string())
            }
            (ScalarType::Int, FieldValue::Int(i)) => i32::try_from(*i).ok().map(|v| v.to_string()),
            (ScalarType::Long, FieldValue::Int(i)) => Some(format!("{}L", i)),
            (ScalarType::Float, FieldValue::Float(x)) => Some(float_literal(*x, "Float", "f")),
            (ScalarType::Float, FieldValue::Int(i)) => Some(format!("{}f", i)),
            (ScalarType::Double, FieldValue::Float(x)) => Some(float_literal(*x, "Double", "")),
            (ScalarType::Double, FieldValue::Int(i)) => Some(format!("{}.0", i)),
            (ScalarType::Char, FieldValue::Text(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(format!("'{}'", escape_java(&c.to_string(), '\''))),
                    _ => None,
                }
            }
            (ScalarType::String, FieldValue::Text(s)) => {
                Some(format!("\"{}\"", escape_java(s, '"')))
            }
            (ScalarType::Class, FieldValue::Text(name)) => {
                Some(format!("{}.class", source_name(name)))
            }
            (ScalarType::Enum { type_name }, FieldValue::Text(constant)) => {
                Some(format!("{}.{}", source_name(type_name), constant))
            }
            (ScalarType::Annotation { def }, FieldValue::Annotation(nested)) => {
                let declared = self.definitions.get(def).map(|d| d.name.as_str());
                let actual = self.definition(nested)?;
                if declared.is_some_and(|name| name != actual.name) {
                    None
                } else {
                    Some(self.render(nested, imports)?)
                }
            }
            _ => None,
        };
        Ok(rendered)
    }
}

/// A binary name written the way Java source refers to it.
fn source_name(binary: &str) -> String {
    binary.replace('$', ".")
}

fn is_implicitly_imported(qualified: &str) -> bool {
    match qualified.strip_prefix("java.lang.") {
        Some(rest) => !rest.contains('.'),
        None => false,
    }
}

fn float_literal(x: f64, boxed: &str, suffix: &str) -> String {
    if x.is_nan() {
        format!("{}.NaN", boxed)
    } else if x.is_infinite() {
        let sign = if x > 0.0 { "POSITIVE" } else { "NEGATIVE" };
        format!("{}.{}_INFINITY", boxed, sign)
    } else {
        format!("{:?}{}", x, suffix)
    }
}

/// Escape `s` for use inside a Java literal delimited by `quote`.
fn escape_java(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
