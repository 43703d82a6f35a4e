//! Layout resource compiler
//!
//! Scans a directory of XML layout definitions, assigns numeric view ids to
//! symbolic `@+id/<name>` declarations, rewrites `@id/<name>` references to
//! the resolved numeric literals, and emits the transformed XML plus lookup
//! tables for a runtime view instantiator.
//!
//! This crate provides:
//! - Change detection against a persisted history of input timestamps
//! - The two-pass id resolver with forward-reference support
//! - The binary history store used for incremental builds
//! - Output emission (rewritten XML, layout-id map, refreshed history)

pub mod detect;
pub mod error;
pub mod history;
pub mod output;
pub mod resolve;

mod compile;

// Re-exports
pub use compile::{LayoutCompiler, Outcome};
pub use error::{CompileError, ResolveError};

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
