//! File persistence for folio.
//!
//! [`FileStore`] is the byte-level collaborator (`read` / `write`);
//! [`FsStore`] implements it on the local filesystem with atomic
//! temp-then-rename writes. On top of it sit the JSON helpers that load the
//! content document and manifest at startup and persist them on save.

mod documents;
mod store;

pub use documents::{Loaded, load_document, load_manifest, persist_json, to_pretty_json};
pub use store::{FileStore, FsStore, MemoryStore, is_not_found};
