//! JSON response types for synthesis results.
//!
//! ## Design Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** the same scene yields byte-identical output
//! 3. **Self-contained:** insertions only reachable through a receiver, `new`
//!    or constructor are nested inside it
//! 4. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{InsertError, OutputErrorCode};
use crate::insertion::{Insertion, InsertionId, InsertionKind};
use crate::synth::{Diagnostic, SynthesisResult};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Insertion Records
// ============================================================================

/// One insertion as written to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionRecord {
    pub id: InsertionId,
    pub kind: InsertionKind,
    /// Source text the insertion writes.
    pub text: String,
    /// Criteria in the order they were added.
    pub criteria: Vec<String>,
    pub separate_line: bool,
    /// Definition names of the annotations this insertion came from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Insertions on nested positions of a receiver or `new` type.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inner: Vec<InsertionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constructor: Option<ConstructorRecord>,
}

/// What a synthesized constructor absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorRecord {
    pub receiver: Option<Box<InsertionRecord>>,
    pub declarations: Vec<InsertionRecord>,
}

impl InsertionRecord {
    /// Build the record for `id`, including everything nested in it.
    pub fn build(result: &SynthesisResult, id: InsertionId) -> Result<Self, InsertError> {
        let insertion = result
            .get(id)
            .ok_or_else(|| InsertError::invariant("[]", format!("no insertion with id {}", id)))?;

        let inner = insertion
            .inner()
            .iter()
            .map(|nested| InsertionRecord::build(result, *nested))
            .collect::<Result<Vec<_>, _>>()?;

        let constructor = match insertion {
            Insertion::Constructor(ctor) => Some(ConstructorRecord {
                receiver: ctor
                    .receiver
                    .map(|receiver| InsertionRecord::build(result, receiver).map(Box::new))
                    .transpose()?,
                declarations: ctor
                    .declarations
                    .iter()
                    .map(|declaration| InsertionRecord::build(result, *declaration))
                    .collect::<Result<Vec<_>, _>>()?,
            }),
            _ => None,
        };

        Ok(InsertionRecord {
            id,
            kind: insertion.kind(),
            text: result.render(id)?,
            criteria: insertion.criteria().iter().map(ToString::to_string).collect(),
            separate_line: insertion.separate_line(),
            sources: result
                .sources()
                .get(id)
                .iter()
                .map(|annotation| annotation.def.clone())
                .collect(),
            inner,
            constructor,
        })
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// A non-fatal problem reported alongside the insertions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Stable warning code.
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

impl Warning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Warning {
            code: code.into(),
            message: message.into(),
            class_name: None,
        }
    }
}

impl From<&Diagnostic> for Warning {
    fn from(diagnostic: &Diagnostic) -> Self {
        Warning {
            code: diagnostic.kind.to_string(),
            message: diagnostic.message.clone(),
            class_name: Some(diagnostic.class_name.clone()),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Successful synthesis response.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// SHA-256 of the serialized insertion records, hex encoded.
    pub fingerprint: String,
    pub insertions: Vec<InsertionRecord>,
    /// Simple names that are rendered fully qualified.
    pub always_qualify: Vec<String>,
    pub imports: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl SynthesisResponse {
    pub fn from_result(result: &SynthesisResult) -> Result<Self, InsertError> {
        let insertions = result
            .order()
            .iter()
            .map(|id| InsertionRecord::build(result, *id))
            .collect::<Result<Vec<_>, _>>()?;
        let fingerprint = fingerprint(&insertions)?;

        Ok(SynthesisResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            fingerprint,
            insertions,
            always_qualify: result.policy().names().map(String::from).collect(),
            imports: result.imports().map(String::from).collect(),
            warnings: result.diagnostics().iter().map(Warning::from).collect(),
        })
    }
}

/// SHA-256 over the compact JSON of `records`.
pub fn fingerprint(records: &[InsertionRecord]) -> Result<String, InsertError> {
    let json = serde_json::to_vec(records)
        .map_err(|e| InsertError::invariant("[]", format!("cannot serialize insertions: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(&json);
    Ok(hex::encode(hasher.finalize()))
}

/// Error details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorInfo {
            code: code.code(),
            message: message.into(),
        }
    }

    pub fn from_error(err: &InsertError) -> Self {
        ErrorInfo::new(OutputErrorCode::from(err), err.to_string())
    }
}

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(error: ErrorInfo) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error,
        }
    }

    pub fn from_error(err: &InsertError) -> Self {
        ErrorResponse::new(ErrorInfo::from_error(err))
    }
}

// ============================================================================
// Response Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;
    use crate::oracle::{ConstructorTable, NoBytecode};
    use crate::scene::{Annotation, AnnotationDef, ElementTarget, Scene};
    use crate::synth::synthesize;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.define(AnnotationDef::new("a.Inject"));
        scene.define(AnnotationDef::new("a.R").with_targets(vec![ElementTarget::TypeUse]));
        let ctor = scene.class_mut("a.C").method_mut("<init>()V");
        ctor.annotate(Annotation::new("a.Inject"));
        ctor.receiver.annotate(Annotation::new("a.R"));
        scene
    }

    mod records {
        use super::*;

        #[test]
        fn constructor_record_nests_what_it_absorbed() {
            let oracle = ConstructorTable::new().with("a.C", false);
            let result = synthesize(&scene(), &oracle, &SynthesisConfig::default()).unwrap();
            let response = SynthesisResponse::from_result(&result).unwrap();

            assert_eq!(response.insertions.len(), 1);
            let ctor = &response.insertions[0];
            assert_eq!(ctor.kind, InsertionKind::Constructor);
            let payload = ctor.constructor.as_ref().unwrap();
            assert_eq!(payload.declarations[0].sources, vec!["a.Inject"]);
            assert_eq!(payload.receiver.as_ref().unwrap().text, "@R C this");
        }

        #[test]
        fn empty_fields_are_omitted() {
            let result = synthesize(&scene(), &NoBytecode, &SynthesisConfig::default()).unwrap();
            let response = SynthesisResponse::from_result(&result).unwrap();
            let json = serde_json::to_value(&response).unwrap();

            let first = &json["insertions"][0];
            assert_eq!(first["kind"], "annotation");
            assert!(first.get("inner").is_none());
            assert!(first.get("constructor").is_none());
            assert_eq!(first["criteria"][0], "inClass(a.C, exact)");
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn fingerprint_is_stable_and_hex() {
            let result = synthesize(&scene(), &NoBytecode, &SynthesisConfig::default()).unwrap();
            let a = SynthesisResponse::from_result(&result).unwrap();
            let b = SynthesisResponse::from_result(&result).unwrap();
            assert_eq!(a.fingerprint, b.fingerprint);
            assert_eq!(a.fingerprint.len(), 64);
            assert_eq!(fingerprint(&[]).unwrap(), fingerprint(&[]).unwrap());
            assert_ne!(a.fingerprint, fingerprint(&[]).unwrap());
        }

        #[test]
        fn status_comes_first() {
            let result = synthesize(&scene(), &NoBytecode, &SynthesisConfig::default()).unwrap();
            let response = SynthesisResponse::from_result(&result).unwrap();
            let mut out = Vec::new();
            emit_response_compact(&response, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert!(text.starts_with(r#"{"status":"ok","schema_version":"1""#));
        }

        #[test]
        fn error_response_carries_code() {
            let err = InsertError::UnknownDefinition {
                name: "a.Missing".to_string(),
            };
            let response = ErrorResponse::from_error(&err);
            assert_eq!(response.status, "error");
            assert_eq!(response.error.code, 3);

            let mut out = Vec::new();
            emit_response(&response, &mut out).unwrap();
            assert!(String::from_utf8(out).unwrap().contains("a.Missing"));
        }

        #[test]
        fn diagnostics_become_warnings() {
            let mut scene = scene();
            scene.class_mut("a.D").annotate(Annotation::new("a.Inject"));
            let oracle = ConstructorTable::new().with("a.C", true);
            let result = synthesize(&scene, &oracle, &SynthesisConfig::default()).unwrap();
            let response = SynthesisResponse::from_result(&result).unwrap();
            assert_eq!(response.warnings.len(), 1);
            assert_eq!(response.warnings[0].code, "bytecode-unavailable");
            assert_eq!(response.warnings[0].class_name.as_deref(), Some("a.D"));
        }
    }
}
