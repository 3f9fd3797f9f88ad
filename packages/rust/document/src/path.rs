//! Dotted-path access to any field of a [`Document`].
//!
//! Paths are dot-separated keys; numeric segments index into arrays
//! (`blog.posts.0.title.en`). Reads never fail on missing intermediate
//! containers: modeled sections materialize with their defaults and
//! anything else reads as absent. Writes create missing objects along the
//! way and are validated against the typed schema before they take effect.

use serde_json::{Map, Value};

use folio_shared::{FolioError, Result};

use crate::model::Document;
use crate::multilingual::Multilingual;

impl Document {
    /// Value at `path`, or `None` when nothing is stored there.
    pub fn get(&self, path: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        let mut current = &root;
        for segment in segments(path) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current.clone())
    }

    /// Replace the value at `path`.
    ///
    /// Fails with `Validation` if the path cannot be created or the result no
    /// longer fits the schema, and with `InvariantViolation` if it would leave
    /// the language set empty. On failure the document is unchanged.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let mut root =
            serde_json::to_value(&*self).map_err(|e| FolioError::Serialization(e.to_string()))?;

        *slot_mut(&mut root, path)? = value;

        let updated: Document = serde_json::from_value(root)
            .map_err(|e| FolioError::validation(format!("cannot set '{path}': {e}")))?;
        if updated.site.languages.is_empty() {
            return Err(FolioError::invariant(
                "site.languages must contain at least one language",
            ));
        }

        *self = updated;
        Ok(())
    }

    /// Text of the multilingual field at `field` for `lang`; `""` when absent.
    pub fn value_for(&self, field: &str, lang: &str) -> String {
        match self.get(field) {
            Some(value @ (Value::Object(_) | Value::String(_))) => {
                serde_json::from_value::<Multilingual>(value)
                    .map(|m| m.get(lang).to_string())
                    .unwrap_or_default()
            }
            _ => String::new(),
        }
    }

    /// Every multilingual field in the document, with its dotted path.
    pub fn multilingual_fields(&self) -> Vec<(String, &Multilingual)> {
        let mut fields: Vec<(String, &Multilingual)> = vec![
            ("owner.name".into(), &self.owner.name),
            ("owner.bio".into(), &self.owner.bio),
            ("site.title".into(), &self.site.title),
            ("site.subtitle".into(), &self.site.subtitle),
            ("site.description".into(), &self.site.description),
            ("about.aboutTitle".into(), &self.about.about_title),
            ("about.aboutText".into(), &self.about.about_text),
            ("about.bio".into(), &self.about.bio),
        ];
        for (i, link) in self.site.external.iter().enumerate() {
            fields.push((format!("site.external.{i}.name"), &link.name));
        }
        for (i, post) in self.blog.posts.iter().enumerate() {
            fields.push((format!("blog.posts.{i}.title"), &post.title));
            fields.push((format!("blog.posts.{i}.excerpt"), &post.excerpt));
        }
        for (i, achievement) in self.achievements.iter().enumerate() {
            fields.push((format!("achievements.{i}.title"), &achievement.title));
            fields.push((format!("achievements.{i}.subtitle"), &achievement.subtitle));
        }
        for (key, value) in &self.translations {
            fields.push((format!("translations.{key}"), value));
        }
        fields
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|s| !s.is_empty())
}

/// Walk to the slot named by `path`, creating objects for missing keys.
fn slot_mut<'a>(root: &'a mut Value, path: &str) -> Result<&'a mut Value> {
    let mut current = root;
    let mut walked = 0;
    for segment in segments(path) {
        walked += 1;
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| {
                    FolioError::validation(format!("'{segment}' is not an index in '{path}'"))
                })?;
                if index == items.len() {
                    items.push(Value::Null);
                }
                items.get_mut(index).ok_or_else(|| {
                    FolioError::validation(format!("index {index} out of range in '{path}'"))
                })?
            }
            _ => {
                return Err(FolioError::validation(format!(
                    "'{segment}' is below a scalar in '{path}'"
                )));
            }
        };
    }
    if walked == 0 {
        return Err(FolioError::validation("empty path"));
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        serde_json::from_value(json!({
            "site": {"title": {"en": "Home", "ar": "الرئيسية"}, "languages": ["en", "ar"]},
            "blog": {"posts": [{"id": "launch", "title": {"en": "Launch"}}]}
        }))
        .unwrap()
    }

    #[test]
    fn get_materializes_default_comments() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        let comments = doc.get("site.comments").unwrap();
        assert_eq!(comments["provider"], "giscus");
        assert!(comments["giscus"].as_object().unwrap().is_empty());
    }

    #[test]
    fn get_walks_arrays_and_misses_quietly() {
        let doc = sample();
        assert_eq!(doc.get("blog.posts.0.id").unwrap(), "launch");
        assert!(doc.get("blog.posts.7.id").is_none());
        assert!(doc.get("owner.social.github").is_none());
        assert!(doc.get("site.url.deeper").is_none());
    }

    #[test]
    fn set_creates_missing_containers() {
        let mut doc = sample();
        doc.set("owner.social.github", json!("octocat")).unwrap();
        assert_eq!(doc.owner.extra["social"]["github"], "octocat");

        doc.set("site.comments.giscus.repo", json!("me/site")).unwrap();
        assert_eq!(doc.site.comments.giscus.repo.as_deref(), Some("me/site"));
    }

    #[test]
    fn set_appends_at_array_end() {
        let mut doc = sample();
        doc.set("blog.externalSources.0", json!("https://github.com/me/notes"))
            .unwrap();
        assert_eq!(doc.blog.external_sources, vec!["https://github.com/me/notes"]);
        assert!(doc.set("blog.externalSources.5", json!("x")).is_err());
    }

    #[test]
    fn set_rejects_schema_mismatch_without_change() {
        let mut doc = sample();
        let before = doc.clone();
        assert!(doc.set("site.title", json!(42)).is_err());
        assert!(doc.set("site.url.inner", json!("x")).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn set_refuses_empty_language_set() {
        let mut doc = sample();
        let err = doc.set("site.languages", json!([])).unwrap_err();
        assert!(matches!(err, FolioError::InvariantViolation { .. }));
        assert_eq!(doc.languages(), ["en", "ar"]);
    }

    #[test]
    fn value_for_defaults_to_empty() {
        let doc = sample();
        assert_eq!(doc.value_for("site.title", "ar"), "الرئيسية");
        assert_eq!(doc.value_for("site.title", "fr"), "");
        assert_eq!(doc.value_for("blog.posts.0.title", "en"), "Launch");
        assert_eq!(doc.value_for("no.such.field", "en"), "");
    }

    #[test]
    fn multilingual_fields_cover_repeated_sections() {
        let mut doc = sample();
        doc.add_translation_key("nav.home").unwrap();
        let paths: Vec<String> = doc.multilingual_fields().into_iter().map(|(p, _)| p).collect();
        assert!(paths.contains(&"blog.posts.0.excerpt".to_string()));
        assert!(paths.contains(&"translations.nav.home".to_string()));
        assert!(paths.contains(&"about.aboutText".to_string()));
    }
}
