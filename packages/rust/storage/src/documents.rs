//! Loading and persisting the content document and manifest.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use folio_document::{Document, Manifest};
use folio_shared::{FolioError, Result};

use crate::store::{FileStore, is_not_found};

/// A loaded value plus the warning raised if it had to be replaced by an
/// empty default.
#[derive(Debug)]
pub struct Loaded<T> {
    pub value: T,
    pub warning: Option<FolioError>,
    /// The file exists but could not be read or parsed. Writing `value` back
    /// would replace its contents with the empty default.
    pub unreadable: bool,
}

impl<T> Loaded<T> {
    fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
            unreadable: false,
        }
    }

    fn fallback(value: T, warning: FolioError, unreadable: bool) -> Self {
        Self {
            value,
            warning: Some(warning),
            unreadable,
        }
    }
}

/// Load the primary content document.
///
/// Any read or parse failure yields the empty default document (languages
/// `en`, `ar`) with a `Load` warning; the process keeps running.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_document(store: &dyn FileStore, path: &Path) -> Loaded<Document> {
    match read_json::<Document>(store, path) {
        Ok(mut doc) => {
            doc.normalize();
            info!(
                posts = doc.blog.posts.len(),
                languages = ?doc.site.languages,
                "content document loaded"
            );
            Loaded::ok(doc)
        }
        Err(e) => {
            let unreadable = !is_not_found(&e);
            let warning = FolioError::load("content document", e.to_string());
            warn!(error = %warning, unreadable, "using an empty document");
            Loaded::fallback(Document::default(), warning, unreadable)
        }
    }
}

/// Load the PWA manifest.
///
/// A missing manifest is normal and yields an empty one silently; a corrupt
/// or unreadable one yields an empty one with a `Load` warning.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_manifest(store: &dyn FileStore, path: &Path) -> Loaded<Manifest> {
    match read_json::<Manifest>(store, path) {
        Ok(manifest) => Loaded::ok(manifest),
        Err(e) if is_not_found(&e) => {
            debug!("no manifest on disk");
            Loaded::ok(Manifest::default())
        }
        Err(e) => {
            let warning = FolioError::load("manifest", e.to_string());
            warn!(error = %warning, "using an empty manifest");
            Loaded::fallback(Manifest::default(), warning, true)
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn FileStore, path: &Path) -> Result<T> {
    let bytes = store.read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FolioError::Serialization(format!("{}: {e}", path.display())))
}

/// Pretty JSON with 2-space indent; non-ASCII characters are written as-is.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(value)
        .map_err(|e| FolioError::Serialization(format!("JSON serialization failed: {e}")))
}

/// Serialize `value` and write it to `path`.
pub fn persist_json<T: Serialize>(store: &dyn FileStore, path: &Path, value: &T) -> Result<()> {
    let bytes = to_pretty_json(value)?;
    store.write(path, &bytes)?;
    debug!(path = %path.display(), "wrote JSON file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FsStore, MemoryStore};

    #[test]
    fn missing_document_falls_back_with_warning() {
        let store = MemoryStore::new();
        let loaded = load_document(&store, Path::new("template.json"));
        assert_eq!(loaded.value.languages(), ["en", "ar"]);
        assert!(matches!(loaded.warning, Some(FolioError::Load { .. })));
        assert!(!loaded.unreadable);
    }

    #[test]
    fn corrupt_document_falls_back_with_warning() {
        let store = MemoryStore::new().with_file("template.json", "{ not json");
        let loaded = load_document(&store, Path::new("template.json"));
        assert!(loaded.value.blog.posts.is_empty());
        assert!(loaded.unreadable);
        let warning = loaded.warning.unwrap().to_string();
        assert!(warning.starts_with("failed to load content document"));
    }

    #[test]
    fn document_with_no_languages_is_normalized() {
        let store = MemoryStore::new().with_file("t.json", r#"{"site":{"languages":[]}}"#);
        let loaded = load_document(&store, Path::new("t.json"));
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.value.languages(), ["en", "ar"]);
    }

    #[test]
    fn hand_edited_scalars_load_without_warning() {
        let raw = r#"{"blog":{"posts":[{"id":"keep-me","pin":1,"tags":null},{"id":"second","date":null}]}}"#;
        let store = MemoryStore::new().with_file("t.json", raw);
        let loaded = load_document(&store, Path::new("t.json"));
        assert!(loaded.warning.is_none());
        assert!(!loaded.unreadable);
        assert_eq!(loaded.value.blog.posts.len(), 2);
        assert!(loaded.value.blog.posts[0].pin);
    }

    #[test]
    fn missing_manifest_is_silent_but_corrupt_warns() {
        let store = MemoryStore::new().with_file("bad.json", "[1, 2");
        let missing = load_manifest(&store, Path::new("manifest.json"));
        assert!(missing.value.is_empty());
        assert!(missing.warning.is_none());

        let corrupt = load_manifest(&store, Path::new("bad.json"));
        assert!(corrupt.value.is_empty());
        assert!(corrupt.warning.is_some());
        assert!(corrupt.unreadable);
    }

    #[test]
    fn persisted_json_is_pretty_and_keeps_non_ascii() {
        let raw = r#"{"site":{"title":{"en":"Home","ar":"الرئيسية"},"languages":["en","ar"]},"owner":{"social":{"x":"@me"}}}"#;
        let store = MemoryStore::new().with_file("in.json", raw);
        let doc = load_document(&store, Path::new("in.json")).value;

        persist_json(&store, Path::new("out.json"), &doc).unwrap();
        let written = store.contents_str(Path::new("out.json")).unwrap();

        assert!(written.contains("\"ar\": \"الرئيسية\""));
        assert!(written.contains("\n  \"site\": {"));
        assert!(!written.contains("\\u"));
        assert!(written.contains("\"social\""));
    }

    #[test]
    fn persist_and_reload_through_filesystem() {
        let tmp = std::env::temp_dir().join(format!("folio-docs-test-{}", uuid::Uuid::now_v7()));
        let path = tmp.join("client/src/data/template.json");

        let mut doc = Document::default();
        doc.site.url = "https://example.com".into();
        persist_json(&FsStore, &path, &doc).unwrap();

        let loaded = load_document(&FsStore, &path);
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.value, doc);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn write_failure_is_reported() {
        let store = MemoryStore::new();
        store.deny_writes("locked.json");
        let err = persist_json(&store, Path::new("locked.json"), &Manifest::default()).unwrap_err();
        assert!(matches!(err, FolioError::Io { .. }));
    }
}
