//! Core data model and XML front-end for the layout compiler
//!
//! This crate provides:
//! - The owned element tree that layout documents are parsed into
//! - XML parse/serialize built on quick-xml
//! - Structured parse errors carrying line/column positions

pub mod element;
pub mod xml;

// Re-exports
pub use element::{Attribute, Content, Element};
pub use xml::XmlError;
