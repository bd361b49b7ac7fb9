//! Core engine for anninsert.
//!
//! This crate turns a scene of annotated program elements into ordered
//! insertion directives:
//! - Scene model and JSON loading
//! - Location keys (type paths, AST paths, relative and local locations)
//! - Criteria describing where an insertion goes
//! - Annotation formatting and simple-name ambiguity resolution
//! - Merging of casts, receivers, `new` types and implicit constructors
//! - The synthesizer itself
//! - Configuration layering and JSON output types

pub mod ambiguity;
pub mod config;
pub mod criteria;
pub mod error;
pub mod format;
pub mod insertion;
pub mod jtype;
pub mod location;
pub mod merge;
pub mod oracle;
pub mod output;
pub mod scene;
pub mod synth;

pub use error::{InsertError, OutputErrorCode};
pub use oracle::{ConstructorKnowledge, ConstructorOracle, ConstructorTable, NoBytecode};
pub use scene::Scene;
pub use synth::{synthesize, synthesize_with_policy, SynthesisResult};
