//! Simple names that must always be written fully qualified.

use indexmap::IndexSet;

use crate::scene::{is_qualified, simple_name, DefinitionTable};

/// The set of simple names shared by more than one definition.
///
/// Computed once from the definition table before any annotation is
/// formatted, then read-only for the rest of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbiguityPolicy {
    always_qualify: IndexSet<String>,
}

impl AmbiguityPolicy {
    /// A simple name is ambiguous when some qualified definition has it but
    /// the table does not resolve it to any definition.
    pub fn resolve(definitions: &DefinitionTable) -> Self {
        let mut always_qualify = IndexSet::new();
        for def in definitions.definitions() {
            if !is_qualified(&def.name) {
                continue;
            }
            let simple = simple_name(&def.name);
            if definitions.get(simple).is_none() {
                always_qualify.insert(simple.to_string());
            }
        }
        AmbiguityPolicy { always_qualify }
    }

    pub fn is_ambiguous(&self, simple: &str) -> bool {
        self.always_qualify.contains(simple)
    }

    /// Ambiguous simple names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.always_qualify.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.always_qualify.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::AnnotationDef;

    fn table(names: &[&str]) -> DefinitionTable {
        let mut table = DefinitionTable::new();
        for name in names {
            table.register(AnnotationDef::new(*name));
        }
        table
    }

    #[test]
    fn distinct_simple_names_are_not_ambiguous() {
        let policy = AmbiguityPolicy::resolve(&table(&["a.NonNull", "b.Nullable"]));
        assert!(policy.is_empty());
    }

    #[test]
    fn shared_simple_name_is_ambiguous_once() {
        let policy = AmbiguityPolicy::resolve(&table(&["pkg1.NonNull", "pkg2.NonNull", "x.Other"]));
        assert!(policy.is_ambiguous("NonNull"));
        assert!(!policy.is_ambiguous("Other"));
        assert_eq!(policy.names().collect::<Vec<_>>(), vec!["NonNull"]);
    }

    #[test]
    fn nested_class_names_use_dollar_segment() {
        let policy = AmbiguityPolicy::resolve(&table(&["a.Outer$Key", "b.Key"]));
        assert!(policy.is_ambiguous("Key"));
    }

    #[test]
    fn unqualified_definition_shadows_conflict() {
        let policy = AmbiguityPolicy::resolve(&table(&["NonNull", "pkg1.NonNull", "pkg2.NonNull"]));
        assert!(!policy.is_ambiguous("NonNull"));
    }
}
