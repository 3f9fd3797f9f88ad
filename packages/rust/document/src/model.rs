//! Typed schema of the site content document.
//!
//! Every struct tolerates missing fields (they take their defaults) and keeps
//! fields it does not model in an `extra` map, so a load/save cycle never
//! drops data the editor does not know about.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;
use crate::multilingual::Multilingual;

/// Languages assumed when a document does not declare any.
pub const DEFAULT_LANGUAGES: [&str; 2] = ["en", "ar"];

/// Posts per page shown when the document does not set one.
pub const DEFAULT_PAGINATION: u32 = 5;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Root aggregate holding all site content and configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    #[serde(deserialize_with = "lenient::or_default")]
    pub owner: Owner,
    #[serde(deserialize_with = "lenient::or_default")]
    pub site: Site,
    #[serde(deserialize_with = "lenient::or_default")]
    pub about: About,
    #[serde(deserialize_with = "lenient::or_default")]
    pub blog: Blog,
    #[serde(deserialize_with = "lenient::or_default")]
    pub achievements: Vec<Achievement>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub translations: BTreeMap<String, Multilingual>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Active language set, in editing order.
    pub fn languages(&self) -> &[String] {
        &self.site.languages
    }

    /// Restore invariants a hand-edited file may have broken.
    ///
    /// Returns `true` when anything changed.
    pub fn normalize(&mut self) -> bool {
        if self.site.languages.is_empty() {
            tracing::warn!("document declares no languages, falling back to defaults");
            self.site.languages = default_languages();
            return true;
        }
        false
    }
}

/// `owner` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub name: Multilingual,
    pub bio: Multilingual,
    #[serde(deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// `site` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub title: Multilingual,
    pub subtitle: Multilingual,
    pub description: Multilingual,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub languages: Vec<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_count"
    )]
    pub pagination_per_page: Option<u32>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub comments: Comments,
    #[serde(deserialize_with = "lenient::or_default")]
    pub external: Vec<ExternalLink>,
    #[serde(rename = "swipeableRoutes", deserialize_with = "lenient::string_list")]
    pub swipeable_routes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            title: Multilingual::default(),
            subtitle: Multilingual::default(),
            description: Multilingual::default(),
            url: String::new(),
            languages: default_languages(),
            pagination_per_page: None,
            comments: Comments::default(),
            external: Vec::new(),
            swipeable_routes: vec!["/".to_string()],
            extra: Map::new(),
        }
    }
}

impl Site {
    /// Posts per page, falling back to [`DEFAULT_PAGINATION`].
    pub fn pagination(&self) -> u32 {
        self.pagination_per_page.unwrap_or(DEFAULT_PAGINATION)
    }
}

fn default_languages() -> Vec<String> {
    DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect()
}

/// `site.comments` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comments {
    #[serde(deserialize_with = "lenient::string")]
    pub provider: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub giscus: Giscus,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Comments {
    fn default() -> Self {
        Self {
            provider: "giscus".to_string(),
            giscus: Giscus::default(),
            extra: Map::new(),
        }
    }
}

/// Giscus widget settings. Values are strings because they are emitted as
/// HTML data attributes verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Giscus {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub repo: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub repo_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub category: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub category_id: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub mapping: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub strict: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub reactions_enabled: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub emit_metadata: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub input_position: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub theme: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub loading: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub lang: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Giscus {
    /// Fill every unset widget option with its fixed default.
    pub fn fill_defaults(&mut self) {
        let defaults: [(&mut Option<String>, &str); 8] = [
            (&mut self.mapping, "pathname"),
            (&mut self.strict, "0"),
            (&mut self.reactions_enabled, "1"),
            (&mut self.emit_metadata, "0"),
            (&mut self.input_position, "top"),
            (&mut self.theme, "preferred_color_scheme"),
            (&mut self.loading, "lazy"),
            (&mut self.lang, "en"),
        ];
        for (slot, value) in defaults {
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }
    }
}

/// A navigation link to an external or standalone page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLink {
    pub name: Multilingual,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// About
// ---------------------------------------------------------------------------

/// `about` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct About {
    #[serde(rename = "aboutTitle")]
    pub about_title: Multilingual,
    #[serde(rename = "aboutText")]
    pub about_text: Multilingual,
    pub bio: Multilingual,
    #[serde(deserialize_with = "lenient::or_default")]
    pub skills: Skills,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `about.skills`: the item list is free-form JSON edited as a text blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub items: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            items: Value::Array(Vec::new()),
            extra: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

/// `blog` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Blog {
    #[serde(deserialize_with = "lenient::or_default")]
    pub posts: Vec<Post>,
    /// Repository identifiers for a future import step. Stored, never read.
    #[serde(rename = "externalSources", deserialize_with = "lenient::string_list")]
    pub external_sources: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One blog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    /// Free-form; `Month D, YYYY` or `YYYY-MM-DD` are understood downstream.
    #[serde(deserialize_with = "lenient::string")]
    pub date: String,
    pub title: Multilingual,
    pub excerpt: Multilingual,
    #[serde(deserialize_with = "lenient::string_list")]
    pub tags: Vec<String>,
    /// Raw text, or Base64 of UTF-8 text when `encoding` is set.
    #[serde(deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(deserialize_with = "lenient::flag")]
    pub encoding: bool,
    #[serde(deserialize_with = "lenient::flag")]
    pub pin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Achievement {
    pub title: Multilingual,
    pub subtitle: Multilingual,
    #[serde(deserialize_with = "lenient::string")]
    pub fallback: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Achievement {
    fn default() -> Self {
        Self {
            title: Multilingual::default(),
            subtitle: Multilingual::default(),
            fallback: "#".to_string(),
            extra: Map::new(),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_takes_defaults() {
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.site.languages, vec!["en", "ar"]);
        assert_eq!(doc.site.comments.provider, "giscus");
        assert_eq!(doc.site.swipeable_routes, vec!["/"]);
        assert_eq!(doc.site.pagination(), DEFAULT_PAGINATION);
        assert!(doc.about.skills.items.is_array());
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let json = r#"{
            "owner": {"name": {"en": "Sam"}, "email": "s@x.io", "social": {"github": "sam"}},
            "blog": {"posts": [{"id": "a", "banner": {"url": "/b.png", "type": "image"}}]},
            "theme": "dark"
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert_eq!(doc.owner.extra["social"]["github"], "sam");

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["owner"]["social"]["github"], "sam");
        assert_eq!(value["blog"]["posts"][0]["banner"]["type"], "image");
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn giscus_uses_camel_case_keys() {
        let json = r#"{"repo": "me/site", "repoId": "R_1", "categoryId": "C_1"}"#;
        let giscus: Giscus = serde_json::from_str(json).unwrap();
        assert_eq!(giscus.repo_id.as_deref(), Some("R_1"));
        assert_eq!(giscus.category_id.as_deref(), Some("C_1"));

        let value = serde_json::to_value(&giscus).unwrap();
        assert_eq!(value["repoId"], "R_1");
        assert!(value.get("mapping").is_none());
    }

    #[test]
    fn fill_defaults_keeps_existing_values() {
        let mut giscus = Giscus {
            theme: Some("dark".into()),
            ..Giscus::default()
        };
        giscus.fill_defaults();
        assert_eq!(giscus.theme.as_deref(), Some("dark"));
        assert_eq!(giscus.mapping.as_deref(), Some("pathname"));
        assert_eq!(giscus.reactions_enabled.as_deref(), Some("1"));
        assert_eq!(giscus.loading.as_deref(), Some("lazy"));
    }

    #[test]
    fn split_list_trims_and_drops_empty() {
        assert_eq!(split_list(" rust, cli ,, web ,"), vec!["rust", "cli", "web"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn off_type_scalars_are_read_not_rejected() {
        let json = r#"{
            "site": {"url": "https://example.com", "pagination_per_page": -2,
                     "comments": {"giscus": {"strict": 0, "repoId": null}}},
            "blog": {"posts": [
                {"id": "keep-me", "date": null, "pin": 1, "encoding": "false", "tags": null},
                {"id": 42, "tags": "rust, cli"}
            ], "externalSources": null},
            "achievements": null
        }"#;
        let doc: Document = serde_json::from_str(json).unwrap();

        let posts = &doc.blog.posts;
        assert_eq!(posts[0].id, "keep-me");
        assert!(posts[0].pin);
        assert!(!posts[0].encoding);
        assert_eq!(posts[0].date, "");
        assert!(posts[0].tags.is_empty());
        assert_eq!(posts[1].id, "42");
        assert_eq!(posts[1].tags, ["rust", "cli"]);

        assert_eq!(doc.site.pagination_per_page, None);
        assert_eq!(doc.site.comments.giscus.strict.as_deref(), Some("0"));
        assert_eq!(doc.site.comments.giscus.repo_id, None);
        assert!(doc.achievements.is_empty());
    }

    #[test]
    fn unknown_keys_keep_file_order() {
        let json = r#"{"owner": {"zeta": 1, "alpha": 2, "mid": 3}}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = doc.owner.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn normalize_restores_language_set() {
        let mut doc: Document = serde_json::from_str(r#"{"site": {"languages": []}}"#).unwrap();
        assert!(doc.normalize());
        assert_eq!(doc.languages(), ["en", "ar"]);
        assert!(!doc.normalize());
    }
}
