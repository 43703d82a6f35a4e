//! Error types for the layout compiler
//!
//! Semantic and I/O failures abort the whole run; only the history cache is
//! allowed to fail soft (handled in [`crate::history`], not represented here).

use layoutc_core::XmlError;
use std::path::PathBuf;
use thiserror::Error;

/// A semantic failure while resolving ids inside one layout file
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// An id declaration or reference with an empty name
    #[error("empty id name in attribute '{attr}' of element '{element}'")]
    EmptyId { element: String, attr: String },

    /// The same name declared twice via `@+id/` within one file
    #[error("id '{id}' of element '{element}' is already declared in this file")]
    DuplicateInFile { id: String, element: String },

    /// A name declared via `@+id/` in this file and also in an earlier file
    #[error("id '{id}' of element '{element}' is already declared in another file")]
    DuplicateAcrossFiles { id: String, element: String },

    /// A `@id/` reference with no matching declaration in the same file
    #[error("cannot find id '{id}' referenced by attribute '{attr}' of element '{element}'")]
    Unresolved {
        id: String,
        element: String,
        attr: String,
    },

    /// An `@`-prefixed token other than `@id/` inside a reference value
    #[error("unsupported '@' operation in value '{value}' of element '{element}'")]
    Unsupported { value: String, element: String },
}

/// A fatal failure of a compilation run
#[derive(Debug, Error)]
pub enum CompileError {
    /// The input directory could not be enumerated
    #[error("failed to scan input directory {}: {source}", dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A layout file could not be read
    #[error("cannot read layout file {}: {source}", file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A layout file is not well-formed XML
    #[error("failed to parse {}: {source}", file.display())]
    Parse {
        file: PathBuf,
        #[source]
        source: XmlError,
    },

    /// Id resolution failed inside a layout file
    #[error("failed to resolve ids in {}: {source}", file.display())]
    Resolve {
        file: PathBuf,
        #[source]
        source: ResolveError,
    },

    /// A resolved tree could not be serialized back to XML
    #[error("failed to serialize {}: {source}", file.display())]
    Serialize {
        file: PathBuf,
        #[source]
        source: XmlError,
    },

    /// An output file could not be written
    #[error("failed to write output file {}: {source}", file.display())]
    Write {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output directory could not be prepared
    #[error("failed to prepare output directory {}: {source}", dir.display())]
    OutDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
