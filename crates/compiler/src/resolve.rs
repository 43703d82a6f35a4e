//! Two-pass id resolution over one layout file
//!
//! Declarations (`@+id/<name>`) allocate the next view id and are rewritten
//! to the numeric literal in place. References (`@id/<name>`) substitute the
//! id allocated for the name earlier in document order. A reference to a
//! name declared *later* in the same file is a forward reference: the first
//! pass skips it and requests a second pass, which runs over the same tree
//! with tolerance disabled so anything still unresolved is fatal.
//!
//! The "second pass needed" signal is returned from the traversal and scoped
//! to the file being resolved. Cross-file references are not resolved by
//! design; lookups only ever consult the current file's symbol table.

use crate::error::ResolveError;
use layoutc_core::{Content, Element};
use std::collections::BTreeMap;

/// First view id handed out in a run
pub const VIEW_ID_BASE: u32 = 10000;

const DECL_PREFIX: &str = "@+id/";
const REF_PREFIX: &str = "@id/";

/// Symbolic id name -> allocated numeric id
pub type SymbolTable = BTreeMap<String, u32>;

/// Shared allocation state threaded through one compilation run
///
/// Owns the monotonic view-id counter and the project-wide symbol table.
/// Both live for exactly one run; the counter never resets mid-run.
#[derive(Debug)]
pub struct ResolveCtx {
    next_view_id: u32,
    project_ids: SymbolTable,
}

impl ResolveCtx {
    /// Create a fresh context with an empty project table
    pub fn new() -> Self {
        Self {
            next_view_id: VIEW_ID_BASE,
            project_ids: SymbolTable::new(),
        }
    }

    /// The accumulated project-wide symbol table
    pub fn project_ids(&self) -> &SymbolTable {
        &self.project_ids
    }

    /// Consume the context, yielding the project table
    pub fn into_project_ids(self) -> SymbolTable {
        self.project_ids
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_view_id;
        self.next_view_id += 1;
        id
    }
}

impl Default for ResolveCtx {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve all id declarations and references in one file's tree
///
/// Runs the tolerant first pass, the strict second pass if any reference was
/// deferred, and merges the file's symbols into the project table. The tree
/// is rewritten in place. Any error aborts the file unresolved.
pub fn resolve_file(root: &mut Element, ctx: &mut ResolveCtx) -> Result<(), ResolveError> {
    let mut symbols = SymbolTable::new();
    let needs_second = resolve_tree(root, true, ctx, &mut symbols)?;
    if needs_second {
        resolve_tree(root, false, ctx, &mut symbols)?;
    }
    // Duplicates against the project table were rejected at declaration
    // time, so the merge cannot collide.
    ctx.project_ids.extend(symbols);
    Ok(())
}

/// Depth-first pre-order traversal; returns whether a second pass is needed
fn resolve_tree(
    element: &mut Element,
    allow_forward: bool,
    ctx: &mut ResolveCtx,
    symbols: &mut SymbolTable,
) -> Result<bool, ResolveError> {
    let mut needs_second = false;
    let Element {
        tag,
        attrs,
        contents,
    } = element;

    for attr in attrs.iter_mut() {
        if let Some(name) = attr.value.strip_prefix(DECL_PREFIX) {
            if name.is_empty() {
                return Err(ResolveError::EmptyId {
                    element: tag.clone(),
                    attr: attr.name.clone(),
                });
            }
            if symbols.contains_key(name) {
                return Err(ResolveError::DuplicateInFile {
                    id: name.to_string(),
                    element: tag.clone(),
                });
            }
            if ctx.project_ids.contains_key(name) {
                return Err(ResolveError::DuplicateAcrossFiles {
                    id: name.to_string(),
                    element: tag.clone(),
                });
            }
            let id = ctx.allocate();
            symbols.insert(name.to_string(), id);
            attr.value = id.to_string();
        } else if resolve_references(tag, attr, allow_forward, symbols)? {
            needs_second = true;
        }
    }

    for content in contents.iter_mut() {
        if let Content::Element(child) = content {
            if resolve_tree(child, allow_forward, ctx, symbols)? {
                needs_second = true;
            }
        }
    }

    Ok(needs_second)
}

/// Substitute every `@id/<name>` occurrence inside one attribute value
///
/// A value may hold several references separated by commas. Returns whether
/// any occurrence had to be deferred to the second pass.
fn resolve_references(
    tag: &str,
    attr: &mut layoutc_core::Attribute,
    allow_forward: bool,
    symbols: &SymbolTable,
) -> Result<bool, ResolveError> {
    let mut value = attr.value.clone();
    let mut deferred = false;
    let mut modified = false;
    let mut cur = 0usize;

    while let Some(at) = value[cur..].find('@').map(|i| cur + i) {
        if !value[at..].starts_with(REF_PREFIX) {
            return Err(ResolveError::Unsupported {
                value: attr.value.clone(),
                element: tag.to_string(),
            });
        }

        let end = value[at..].find(',').map(|i| at + i).unwrap_or(value.len());
        let name = value[at + REF_PREFIX.len()..end].trim();
        if name.is_empty() {
            return Err(ResolveError::EmptyId {
                element: tag.to_string(),
                attr: attr.name.clone(),
            });
        }

        match symbols.get(name) {
            Some(id) => {
                value.replace_range(at..end, &id.to_string());
                // Rescan from the substitution point; the inserted digits
                // cannot contain another '@'.
                cur = at;
                modified = true;
            }
            None if allow_forward => {
                deferred = true;
                cur = end;
            }
            None => {
                return Err(ResolveError::Unresolved {
                    id: name.to_string(),
                    element: tag.to_string(),
                    attr: attr.name.clone(),
                });
            }
        }
    }

    if modified {
        attr.value = value;
    }
    Ok(deferred)
}
