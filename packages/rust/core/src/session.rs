//! Editor session: the single owned document plus the post being edited.
//!
//! Opening a post classifies its stored body, corrects a stale `encoding`
//! flag, and loads the display text into an edit buffer. The buffer is
//! written back (encoded or plain, per the toggle) on [`EditSession::flush`],
//! which happens before navigating to another post and at the start of
//! every save. An untouched buffer is never written back, so a body that
//! failed to decode keeps its stored bytes.
//!
//! The open post is remembered by index and id. `doc` is public, so the post
//! list may shift under the buffer; a flush re-locates the post by id and
//! fails, keeping the buffer, when the post is gone.

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use folio_content::{EncodeToggle, classify, store};
use folio_document::{Document, LanguageChange, LanguageManager, Manifest};
use folio_shared::{FolioError, Result, SitePaths};
use folio_storage::{FileStore, load_document, load_manifest};

#[derive(Debug)]
struct ActivePost {
    index: usize,
    id: String,
    buffer: String,
    toggle: EncodeToggle,
    dirty: bool,
}

/// Documents that exist on disk but failed to load. Saving over them would
/// replace their contents with the empty defaults held in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unreadable {
    pub content: bool,
    pub manifest: bool,
}

/// Owns the document and manifest for the process lifetime.
pub struct EditSession {
    pub doc: Document,
    pub manifest: Manifest,
    languages: LanguageManager,
    active: Option<ActivePost>,
    unreadable: Unreadable,
}

impl EditSession {
    pub fn new(doc: Document, manifest: Manifest) -> Self {
        Self {
            doc,
            manifest,
            languages: LanguageManager::new(),
            active: None,
            unreadable: Unreadable::default(),
        }
    }

    /// Load both documents, substituting empty ones on failure.
    ///
    /// Returns the session and any `Load` warnings raised along the way.
    pub fn load(store: &dyn FileStore, paths: &SitePaths) -> (Self, Vec<FolioError>) {
        let doc = load_document(store, &paths.content);
        let manifest = load_manifest(store, &paths.manifest);
        let unreadable = Unreadable {
            content: doc.unreadable,
            manifest: manifest.unreadable,
        };
        let warnings = [doc.warning, manifest.warning]
            .into_iter()
            .flatten()
            .collect();
        let mut session = Self::new(doc.value, manifest.value);
        session.unreadable = unreadable;
        (session, warnings)
    }

    /// Which loaded documents stand in for a file that failed to load.
    pub fn unreadable(&self) -> Unreadable {
        self.unreadable
    }

    /// Record that the in-memory documents now back their files.
    pub(crate) fn mark_persisted(&mut self, content: bool, manifest: bool) {
        self.unreadable.content &= !content;
        self.unreadable.manifest &= !manifest;
    }

    /// Language manager, for registering observers.
    pub fn language_manager(&mut self) -> &mut LanguageManager {
        &mut self.languages
    }

    pub fn add_language(&mut self, code: &str) -> LanguageChange {
        self.languages.add_language(&mut self.doc, code)
    }

    pub fn remove_language(&mut self, code: &str) -> Result<LanguageChange> {
        self.languages.remove_language(&mut self.doc, code)
    }

    // -----------------------------------------------------------------------
    // Active post
    // -----------------------------------------------------------------------

    /// Index of the post open for editing.
    pub fn active_post(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.index)
    }

    /// Current edit buffer of the open post.
    pub fn buffer(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.buffer.as_str())
    }

    pub fn encode_toggle(&self) -> Option<EncodeToggle> {
        self.active.as_ref().map(|a| a.toggle)
    }

    /// Open post `index` for editing and return its display text.
    ///
    /// Pending edits of the previously open post are flushed first.
    pub fn open_post(&mut self, index: usize) -> Result<&str> {
        self.flush()?;
        let post = self.doc.post_mut(index)?;

        let classification = classify(&post.content, post.encoding);
        if classification.corrects(post.encoding) {
            info!(id = %post.id, "post body is base64, correcting its encoding flag");
            post.encoding = classification.encoded;
        }

        let active = self.active.insert(ActivePost {
            index,
            id: post.id.clone(),
            buffer: classification.display.text(),
            toggle: EncodeToggle::from(classification.encoded),
            dirty: false,
        });
        Ok(&active.buffer)
    }

    /// Replace the open post's body text.
    pub fn edit_body(&mut self, text: impl Into<String>) -> Result<()> {
        let active = self.active_mut()?;
        active.buffer = text.into();
        active.dirty = true;
        Ok(())
    }

    /// Set the open post's encode toggle.
    pub fn set_encode(&mut self, encode: bool) -> Result<()> {
        let active = self.active_mut()?;
        let toggle = EncodeToggle::from(encode);
        if active.toggle != toggle {
            active.toggle = toggle;
            active.dirty = true;
        }
        Ok(())
    }

    /// Write the edit buffer back to the open post. Returns whether anything
    /// was written.
    ///
    /// Fails, keeping the buffer, when the open post is no longer in the
    /// document.
    pub fn flush(&mut self) -> Result<bool> {
        let Some(active) = self.active.as_mut() else {
            return Ok(false);
        };
        if !active.dirty {
            return Ok(false);
        }

        let posts = &mut self.doc.blog.posts;
        let at_index = posts.get(active.index).is_some_and(|p| p.id == active.id);
        let index = if at_index {
            active.index
        } else {
            match posts.iter().position(|p| p.id == active.id) {
                Some(moved) => {
                    debug!(id = %active.id, from = active.index, to = moved, "open post moved");
                    moved
                }
                None => {
                    warn!(id = %active.id, "open post was removed, keeping its unsaved edit");
                    return Err(FolioError::validation(format!(
                        "post '{}' is no longer in the document; its unsaved edit was not written",
                        active.id
                    )));
                }
            }
        };
        active.index = index;
        let post = &mut posts[index];

        let (content, encoding) = store(&active.buffer, active.toggle);
        post.content = content;
        post.encoding = encoding;
        active.dirty = false;
        debug!(id = %post.id, encoding, "flushed post body");
        Ok(true)
    }

    /// Flush and stop editing.
    pub fn close_post(&mut self) -> Result<()> {
        self.flush()?;
        self.active = None;
        Ok(())
    }

    /// Stop editing without writing the buffer back.
    pub fn discard_post(&mut self) {
        self.active = None;
    }

    fn active_mut(&mut self) -> Result<&mut ActivePost> {
        self.active
            .as_mut()
            .ok_or_else(|| FolioError::validation("no post is open for editing"))
    }

    // -----------------------------------------------------------------------
    // Post list edits that shift indexes
    // -----------------------------------------------------------------------

    /// Insert a new draft post at the top. Returns its index.
    pub fn add_post(&mut self, now: NaiveDateTime) -> usize {
        let index = self.doc.add_post(now);
        if let Some(active) = self.active.as_mut() {
            active.index += 1;
        }
        index
    }

    /// Remove a post, discarding its edit buffer if it was open.
    pub fn remove_post(&mut self, index: usize) -> Result<()> {
        let removed = self.doc.remove_post(index)?;
        debug!(id = %removed.id, "removed post");
        match self.active_post() {
            Some(open) if open == index => self.active = None,
            Some(open) if open > index => {
                if let Some(active) = self.active.as_mut() {
                    active.index -= 1;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use folio_document::Post;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    fn session_with(posts: Vec<Post>) -> EditSession {
        let mut doc = Document::default();
        doc.blog.posts = posts;
        EditSession::new(doc, Manifest::default())
    }

    fn body(content: &str, encoding: bool) -> Post {
        Post {
            id: "p".into(),
            content: content.into(),
            encoding,
            ..Post::default()
        }
    }

    #[test]
    fn opening_stale_plain_post_heals_flag() {
        let mut session = session_with(vec![body("SGVsbG8=", false)]);
        assert_eq!(session.open_post(0).unwrap(), "Hello");
        assert!(session.doc.blog.posts[0].encoding);
        assert_eq!(session.encode_toggle(), Some(EncodeToggle::Encode));
    }

    #[test]
    fn untouched_buffer_is_not_written_back() {
        let mut session = session_with(vec![body("@@@", true)]);
        let shown = session.open_post(0).unwrap().to_string();
        assert!(shown.starts_with("Error decoding:"));

        assert!(!session.flush().unwrap());
        session.close_post().unwrap();
        assert_eq!(session.doc.blog.posts[0].content, "@@@");
    }

    #[test]
    fn edits_flush_with_toggle() {
        let mut session = session_with(vec![body("# Plain", false)]);
        session.open_post(0).unwrap();

        session.edit_body("# Edited").unwrap();
        assert!(session.flush().unwrap());
        assert_eq!(session.doc.blog.posts[0].content, "# Edited");
        assert!(!session.doc.blog.posts[0].encoding);

        session.set_encode(true).unwrap();
        assert!(session.flush().unwrap());
        assert_eq!(session.doc.blog.posts[0].content, "IyBFZGl0ZWQ=");
        assert!(session.doc.blog.posts[0].encoding);
    }

    #[test]
    fn navigating_flushes_previous_post() {
        let mut session = session_with(vec![body("one", false), body("two", false)]);
        session.open_post(0).unwrap();
        session.edit_body("first edited").unwrap();
        session.open_post(1).unwrap();

        assert_eq!(session.doc.blog.posts[0].content, "first edited");
        assert_eq!(session.active_post(), Some(1));
    }

    #[test]
    fn editing_without_open_post_fails() {
        let mut session = session_with(vec![]);
        assert!(session.edit_body("x").is_err());
        assert!(session.set_encode(true).is_err());
        assert!(session.open_post(3).is_err());
    }

    #[test]
    fn add_and_remove_keep_active_index_pointing_at_same_post() {
        let mut session = session_with(vec![body("a", false), body("b", false)]);
        session.open_post(1).unwrap();
        session.edit_body("b edited").unwrap();

        assert_eq!(session.add_post(now()), 0);
        assert_eq!(session.active_post(), Some(2));
        assert_eq!(session.doc.blog.posts[0].id, "new-post-20240105103000");

        session.remove_post(0).unwrap();
        assert_eq!(session.active_post(), Some(1));
        session.edit_body("b again").unwrap();
        session.flush().unwrap();
        assert_eq!(session.doc.blog.posts[1].content, "b again");

        session.remove_post(1).unwrap();
        assert_eq!(session.active_post(), None);
    }

    #[test]
    fn flush_follows_the_post_when_the_list_shifts_underneath() {
        let mut a = body("old a", false);
        a.id = "a".into();
        let mut session = session_with(vec![a]);
        session.open_post(0).unwrap();
        session.edit_body("edited a").unwrap();

        session.doc.add_post(now());
        assert!(session.flush().unwrap());

        let posts = &session.doc.blog.posts;
        assert_eq!(posts[0].id, "new-post-20240105103000");
        assert_eq!(posts[0].content, "# Content");
        assert_eq!(posts[1].content, "edited a");
        assert_eq!(session.active_post(), Some(1));
    }

    #[test]
    fn edit_of_a_removed_post_is_kept_and_reported() {
        let mut session = session_with(vec![body("one", false)]);
        session.open_post(0).unwrap();
        session.doc.remove_post(0).unwrap();
        session.edit_body("unsaved").unwrap();

        assert!(matches!(session.flush(), Err(FolioError::Validation { .. })));
        assert_eq!(session.buffer(), Some("unsaved"));
        assert!(session.close_post().is_err());

        session.discard_post();
        assert_eq!(session.active_post(), None);
        assert!(!session.flush().unwrap());
    }

    #[test]
    fn load_flags_files_that_exist_but_fail_to_parse() {
        let store = folio_storage::MemoryStore::new()
            .with_file("/site/client/src/data/template.json", "{ truncated");
        let paths = SitePaths::resolve(&folio_shared::AppConfig::default(), "/site");
        let (mut session, warnings) = EditSession::load(&store, &paths);

        assert_eq!(warnings.len(), 1);
        assert!(session.unreadable().content);
        assert!(!session.unreadable().manifest);

        session.mark_persisted(true, false);
        assert_eq!(session.unreadable(), Unreadable::default());
    }

    #[test]
    fn language_edits_go_through_the_manager() {
        let mut session = session_with(vec![]);
        assert_eq!(session.add_language("FR"), LanguageChange::Added);
        assert_eq!(session.doc.languages(), ["en", "ar", "fr"]);
        session.remove_language("en").unwrap();
        session.remove_language("ar").unwrap();
        assert!(session.remove_language("fr").is_err());
    }
}
