//! Catalog management.
//!
//! The admin edits a flattened copy of the built-in catalog. Edits are not
//! written back and do not reach the storefront.

pub mod editor;

pub use editor::{CatalogDraft, CatalogEditor, CatalogQuery, CatalogRecord, EditorError};
