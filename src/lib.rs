//! anninsert: synthesize annotation insertions from a scene.
//!
//! Turns a description of annotated program elements into ordered,
//! location-anchored insertion directives that a source rewriter splices in.

// Core engine - re-exported from anninsert-core
pub use anninsert_core::ambiguity;
pub use anninsert_core::config;
pub use anninsert_core::criteria;
pub use anninsert_core::format;
pub use anninsert_core::insertion;
pub use anninsert_core::jtype;
pub use anninsert_core::location;
pub use anninsert_core::merge;
pub use anninsert_core::oracle;
pub use anninsert_core::output;
pub use anninsert_core::scene;
pub use anninsert_core::synth;

// Front door
pub mod cli;
pub mod error;
