//! PWA web app manifest (`manifest.json`).
//!
//! Fields are optional on disk; accessors supply the values the site falls
//! back to when a field is unset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use folio_shared::{FolioError, Result};

use crate::model::split_list;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<Icon>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<Screenshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcuts: Option<Vec<Shortcut>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Icon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub purpose: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Screenshot {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub form_factor: String,
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shortcut {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub url: String,
    pub icons: Vec<ShortcutIcon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutIcon {
    pub src: String,
    pub sizes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// True when nothing at all is set; such a manifest is not written out.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn background_color(&self) -> &str {
        self.background_color.as_deref().unwrap_or("#ffffff")
    }

    pub fn theme_color(&self) -> &str {
        self.theme_color.as_deref().unwrap_or("#ffffff")
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or("en")
    }

    pub fn dir(&self) -> &str {
        self.dir.as_deref().unwrap_or("ltr")
    }

    pub fn start_url(&self) -> &str {
        self.start_url.as_deref().unwrap_or("/")
    }

    pub fn display(&self) -> &str {
        self.display.as_deref().unwrap_or("standalone")
    }

    pub fn orientation(&self) -> &str {
        self.orientation.as_deref().unwrap_or("any")
    }

    pub fn scope(&self) -> &str {
        self.scope.as_deref().unwrap_or("/")
    }

    pub fn app_id(&self) -> &str {
        self.id.as_deref().unwrap_or("/")
    }

    /// Replace categories from a comma-separated string.
    pub fn set_categories(&mut self, csv: &str) {
        self.categories = Some(split_list(csv));
    }

    pub fn add_icon(&mut self) -> usize {
        let icons = self.icons.get_or_insert_with(Vec::new);
        icons.push(Icon {
            src: String::new(),
            sizes: "512x512".into(),
            mime_type: "image/png".into(),
            purpose: "any".into(),
            extra: Map::new(),
        });
        icons.len() - 1
    }

    pub fn remove_icon(&mut self, index: usize) -> Result<Icon> {
        take_at(self.icons.as_mut(), index, "icon")
    }

    pub fn add_screenshot(&mut self) -> usize {
        let screenshots = self.screenshots.get_or_insert_with(Vec::new);
        screenshots.push(Screenshot {
            src: String::new(),
            sizes: "1920x1080".into(),
            mime_type: "image/png".into(),
            form_factor: "wide".into(),
            label: String::new(),
            extra: Map::new(),
        });
        screenshots.len() - 1
    }

    pub fn remove_screenshot(&mut self, index: usize) -> Result<Screenshot> {
        take_at(self.screenshots.as_mut(), index, "screenshot")
    }

    pub fn add_shortcut(&mut self) -> usize {
        let shortcuts = self.shortcuts.get_or_insert_with(Vec::new);
        shortcuts.push(Shortcut {
            name: "New Shortcut".into(),
            short_name: "New".into(),
            description: String::new(),
            url: "/".into(),
            icons: vec![ShortcutIcon {
                src: "/favicon.png".into(),
                sizes: "192x192".into(),
                extra: Map::new(),
            }],
            extra: Map::new(),
        });
        shortcuts.len() - 1
    }

    pub fn remove_shortcut(&mut self, index: usize) -> Result<Shortcut> {
        take_at(self.shortcuts.as_mut(), index, "shortcut")
    }
}

fn take_at<T>(items: Option<&mut Vec<T>>, index: usize, what: &str) -> Result<T> {
    match items {
        Some(items) if index < items.len() => Ok(items.remove(index)),
        _ => Err(FolioError::validation(format!("no {what} at index {index}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_manifest_reads_defaults() {
        let manifest = Manifest::default();
        assert!(manifest.is_empty());
        assert_eq!(manifest.background_color(), "#ffffff");
        assert_eq!(manifest.dir(), "ltr");
        assert_eq!(manifest.display(), "standalone");
        assert_eq!(manifest.orientation(), "any");
        assert_eq!(manifest.app_id(), "/");
    }

    #[test]
    fn empty_manifest_serializes_to_empty_object() {
        let json = serde_json::to_string(&Manifest::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn icon_type_key_roundtrips() {
        let json = r#"{"icons":[{"src":"/i.png","sizes":"192x192","type":"image/png"}]}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        let icons = manifest.icons.as_ref().unwrap();
        assert_eq!(icons[0].mime_type, "image/png");

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["icons"][0]["type"], "image/png");
        assert!(value["icons"][0].get("purpose").is_none());
    }

    #[test]
    fn add_and_remove_media_entries() {
        let mut manifest = Manifest::default();
        let i = manifest.add_icon();
        let s = manifest.add_screenshot();
        let c = manifest.add_shortcut();
        assert!(!manifest.is_empty());

        assert_eq!(manifest.icons.as_ref().unwrap()[i].purpose, "any");
        assert_eq!(manifest.screenshots.as_ref().unwrap()[s].form_factor, "wide");
        assert_eq!(
            manifest.shortcuts.as_ref().unwrap()[c].icons[0].src,
            "/favicon.png"
        );

        manifest.remove_icon(i).unwrap();
        assert!(manifest.remove_icon(0).is_err());
        assert!(manifest.remove_screenshot(4).is_err());
    }

    #[test]
    fn categories_from_csv() {
        let mut manifest = Manifest::default();
        manifest.set_categories("portfolio, security,,blog ");
        assert_eq!(
            manifest.categories.unwrap(),
            vec!["portfolio", "security", "blog"]
        );
    }
}
