//! What the compiled class says about constructors.
//!
//! Only one question is asked of bytecode: does a class declare an explicit
//! constructor? If it does not, the compiler generated `<init>()V` and
//! annotations aimed at it need a constructor written into the source.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Answer to "does this class declare a constructor in source?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKnowledge {
    /// The class declares at least one constructor.
    Explicit,
    /// The class only has the compiler-generated default constructor.
    ImplicitOnly,
    /// Nothing is known about the class.
    Unknown,
}

impl ConstructorKnowledge {
    pub fn from_has_explicit(has_explicit: bool) -> Self {
        if has_explicit {
            ConstructorKnowledge::Explicit
        } else {
            ConstructorKnowledge::ImplicitOnly
        }
    }
}

/// Failure to read class information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("class file not found for {class_name}")]
    ClassNotFound { class_name: String },

    #[error("cannot read class {class_name}: {reason}")]
    Unreadable { class_name: String, reason: String },
}

/// Source of constructor information, consulted once per class.
pub trait ConstructorOracle {
    fn constructors(&self, class_name: &str) -> Result<ConstructorKnowledge, OracleError>;
}

/// Oracle used when bytecode reading is disabled: knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBytecode;

impl ConstructorOracle for NoBytecode {
    fn constructors(&self, _class_name: &str) -> Result<ConstructorKnowledge, OracleError> {
        Ok(ConstructorKnowledge::Unknown)
    }
}

/// Oracle backed by a precomputed table of class name to "has an explicit
/// constructor". Loads from a JSON object such as `{"a.C": false}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ConstructorTable {
    has_explicit: IndexMap<String, bool>,
}

impl ConstructorTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class_name: impl Into<String>, has_explicit: bool) {
        self.has_explicit.insert(class_name.into(), has_explicit);
    }

    pub fn with(mut self, class_name: impl Into<String>, has_explicit: bool) -> Self {
        self.insert(class_name, has_explicit);
        self
    }

    pub fn len(&self) -> usize {
        self.has_explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.has_explicit.is_empty()
    }
}

impl ConstructorOracle for ConstructorTable {
    fn constructors(&self, class_name: &str) -> Result<ConstructorKnowledge, OracleError> {
        self.has_explicit
            .get(class_name)
            .copied()
            .map(ConstructorKnowledge::from_has_explicit)
            .ok_or_else(|| OracleError::ClassNotFound {
                class_name: class_name.to_string(),
            })
    }
}

impl<T: ConstructorOracle + ?Sized> ConstructorOracle for &T {
    fn constructors(&self, class_name: &str) -> Result<ConstructorKnowledge, OracleError> {
        (**self).constructors(class_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bytecode_knows_nothing() {
        assert_eq!(
            NoBytecode.constructors("a.C").unwrap(),
            ConstructorKnowledge::Unknown
        );
    }

    #[test]
    fn table_answers_known_classes() {
        let table = ConstructorTable::new().with("a.C", false).with("a.D", true);
        assert_eq!(
            table.constructors("a.C").unwrap(),
            ConstructorKnowledge::ImplicitOnly
        );
        assert_eq!(
            table.constructors("a.D").unwrap(),
            ConstructorKnowledge::Explicit
        );
    }

    #[test]
    fn table_reports_missing_class() {
        let table = ConstructorTable::new();
        let err = table.constructors("a.Missing").unwrap_err();
        assert_eq!(err.to_string(), "class file not found for a.Missing");
    }

    #[test]
    fn table_loads_from_json() {
        let table: ConstructorTable = serde_json::from_str(r#"{"a.C": false}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.constructors("a.C").unwrap(),
            ConstructorKnowledge::ImplicitOnly
        );
    }

    #[test]
    fn references_are_oracles() {
        fn ask<O: ConstructorOracle>(oracle: O) -> ConstructorKnowledge {
            oracle.constructors("a.C").unwrap()
        }
        let table = ConstructorTable::new().with("a.C", true);
        let dynamic: &dyn ConstructorOracle = &table;
        assert_eq!(ask(&table), ConstructorKnowledge::Explicit);
        assert_eq!(ask(dynamic), ConstructorKnowledge::Explicit);
    }
}
