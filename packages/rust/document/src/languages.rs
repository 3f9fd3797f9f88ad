//! Active language set management.
//!
//! Adding or removing a language only edits `site.languages`. Stored
//! per-language text is never touched, so removing a language hides its
//! values and adding it back shows them again.

use tracing::{debug, info};

use folio_shared::{FolioError, Result};

use crate::model::Document;

/// Notified after the active language set actually changed.
pub trait LanguageObserver {
    fn languages_changed(&self, languages: &[String]);
}

/// What an add/remove call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageChange {
    Added,
    Removed,
    Unchanged,
}

/// Applies language-set edits to a document and fans out notifications.
#[derive(Default)]
pub struct LanguageManager {
    observers: Vec<Box<dyn LanguageObserver>>,
}

impl LanguageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dependent (translation rows, multilingual widgets, ...).
    pub fn subscribe(&mut self, observer: Box<dyn LanguageObserver>) {
        self.observers.push(observer);
    }

    /// Append `code` (trimmed, lowercased) to the active set.
    ///
    /// Empty or already-present codes are a no-op.
    pub fn add_language(&self, doc: &mut Document, code: &str) -> LanguageChange {
        let code = normalize_code(code);
        if code.is_empty() || doc.site.languages.contains(&code) {
            debug!(code = %code, "language add is a no-op");
            return LanguageChange::Unchanged;
        }

        doc.site.languages.push(code.clone());
        info!(code = %code, languages = ?doc.site.languages, "language added");
        self.notify(&doc.site.languages);
        LanguageChange::Added
    }

    /// Remove `code` from the active set, keeping its stored values.
    ///
    /// Fails with `InvariantViolation` if it is the only active language.
    pub fn remove_language(&self, doc: &mut Document, code: &str) -> Result<LanguageChange> {
        let code = normalize_code(code);
        let Some(position) = doc.site.languages.iter().position(|l| *l == code) else {
            debug!(code = %code, "language remove is a no-op");
            return Ok(LanguageChange::Unchanged);
        };

        if doc.site.languages.len() == 1 {
            return Err(FolioError::invariant(format!(
                "cannot remove '{code}': it is the last remaining language"
            )));
        }

        doc.site.languages.remove(position);
        info!(code = %code, languages = ?doc.site.languages, "language removed");
        self.notify(&doc.site.languages);
        Ok(LanguageChange::Removed)
    }

    fn notify(&self, languages: &[String]) {
        for observer in &self.observers {
            observer.languages_changed(languages);
        }
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::model::{Achievement, Post};
    use crate::multilingual::Multilingual;

    struct Recorder(Rc<RefCell<Vec<Vec<String>>>>);

    impl LanguageObserver for Recorder {
        fn languages_changed(&self, languages: &[String]) {
            self.0.borrow_mut().push(languages.to_vec());
        }
    }

    fn bilingual() -> Document {
        let mut doc = Document::default();
        doc.site.languages = vec!["en".into(), "ar".into()];
        doc.site.title = [("en", "Home"), ("ar", "الرئيسية")].into_iter().collect();
        doc.blog.posts.push(Post {
            id: "launch".into(),
            title: [("en", "Launch"), ("ar", "إطلاق")].into_iter().collect(),
            ..Post::default()
        });
        doc.achievements.push(Achievement {
            title: [("ar", "جائزة")].into_iter().collect(),
            ..Achievement::default()
        });
        doc.translations.insert(
            "nav.home".into(),
            [("en", "Home"), ("ar", "الرئيسية")].into_iter().collect(),
        );
        doc
    }

    fn snapshot(doc: &Document, lang: &str) -> Vec<(String, String)> {
        doc.multilingual_fields()
            .into_iter()
            .map(|(path, value)| (path, value.get(lang).to_string()))
            .collect()
    }

    #[test]
    fn add_language_normalizes_and_appends() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();

        assert_eq!(manager.add_language(&mut doc, "  FR "), LanguageChange::Added);
        assert_eq!(doc.languages(), ["en", "ar", "fr"]);

        for (path, value) in doc.multilingual_fields() {
            assert_eq!(value.get("fr"), "", "{path} should read empty for fr");
            assert!(!value.contains("fr"), "{path} should not store an fr entry");
        }
        assert!(!doc.site.title.contains("fr"));
    }

    #[test]
    fn add_language_is_idempotent() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();
        manager.add_language(&mut doc, "fr");
        assert_eq!(manager.add_language(&mut doc, "fr"), LanguageChange::Unchanged);
        assert_eq!(manager.add_language(&mut doc, "  "), LanguageChange::Unchanged);
        assert_eq!(doc.languages(), ["en", "ar", "fr"]);
    }

    #[test]
    fn remove_then_add_restores_hidden_values() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();
        let before = snapshot(&doc, "ar");

        manager.remove_language(&mut doc, "ar").unwrap();
        assert_eq!(doc.languages(), ["en"]);
        assert!(doc.site.title.contains("ar"));

        manager.add_language(&mut doc, "ar");
        assert_eq!(snapshot(&doc, "ar"), before);
        assert_eq!(doc.languages(), ["en", "ar"]);
    }

    #[test]
    fn last_language_cannot_be_removed() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();
        doc.site.languages.push("fr".into());

        manager.remove_language(&mut doc, "fr").unwrap();
        manager.remove_language(&mut doc, "ar").unwrap();
        let err = manager.remove_language(&mut doc, "en").unwrap_err();

        assert!(matches!(err, FolioError::InvariantViolation { .. }));
        assert_eq!(doc.languages(), ["en"]);
    }

    #[test]
    fn removing_absent_language_is_noop() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();
        assert_eq!(
            manager.remove_language(&mut doc, "de").unwrap(),
            LanguageChange::Unchanged
        );
        assert_eq!(
            manager.remove_language(&mut doc, "ar").unwrap(),
            LanguageChange::Removed
        );
        assert_eq!(
            manager.remove_language(&mut doc, "ar").unwrap(),
            LanguageChange::Unchanged
        );
    }

    #[test]
    fn observers_hear_only_effective_changes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = LanguageManager::new();
        manager.subscribe(Box::new(Recorder(Rc::clone(&log))));

        let mut doc = bilingual();
        manager.add_language(&mut doc, "fr");
        manager.add_language(&mut doc, "fr");
        manager.remove_language(&mut doc, "en").unwrap();

        let calls = log.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec!["en", "ar", "fr"]);
        assert_eq!(calls[1], vec!["ar", "fr"]);
    }

    #[test]
    fn new_items_after_add_include_the_language() {
        let manager = LanguageManager::new();
        let mut doc = bilingual();
        manager.add_language(&mut doc, "fr");
        let idx = doc.add_achievement();
        assert_eq!(doc.achievements[idx].title.get("fr"), "New");
        let empty = Multilingual::new();
        assert_eq!(empty.get("fr"), "");
    }
}
