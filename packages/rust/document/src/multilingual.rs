//! Per-language text values.
//!
//! A [`Multilingual`] keeps its entries in insertion order so that a document
//! survives a load/save cycle without reshuffling language keys. Lookups for a
//! language with no entry read as `""`; entries are never dropped when a
//! language leaves the active set.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Language code used as a fallback key when a bare string is stored where a
/// per-language map is expected.
const FALLBACK_LANGUAGE: &str = "en";

/// A mapping from language code to text, unique by key, insertion ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multilingual {
    entries: Vec<(String, String)>,
}

impl Multilingual {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a value with one entry per language, computed by `text`.
    pub fn from_fn(languages: &[String], text: impl Fn(&str) -> String) -> Self {
        languages
            .iter()
            .map(|lang| (lang.clone(), text(lang)))
            .collect()
    }

    /// Text for `lang`, or `""` when no entry exists.
    pub fn get(&self, lang: &str) -> &str {
        self.entries
            .iter()
            .find(|(k, _)| k == lang)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Insert or replace the entry for `lang`. New languages append.
    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        let lang = lang.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(k, _)| *k == lang) {
            Some((_, v)) => *v = text,
            None => self.entries.push((lang, text)),
        }
    }

    /// Whether an entry (possibly hidden) is stored for `lang`.
    pub fn contains(&self, lang: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == lang)
    }

    /// Every stored language, including ones no longer active.
    pub fn stored_languages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(language, text)` for each active language, in active-set order.
    pub fn active<'a>(
        &'a self,
        languages: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        languages.iter().map(|lang| (lang.as_str(), self.get(lang)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Multilingual {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut value = Self::new();
        for (k, v) in iter {
            value.set(k, v);
        }
        value
    }
}

impl Serialize for Multilingual {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, text) in &self.entries {
            map.serialize_entry(lang, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Multilingual {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MultilingualVisitor)
    }
}

struct MultilingualVisitor;

impl<'de> Visitor<'de> for MultilingualVisitor {
    type Value = Multilingual;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of language code to text, or a plain string")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut value = Multilingual::new();
        while let Some((lang, text)) = access.next_entry::<String, Option<String>>()? {
            value.set(lang, text.unwrap_or_default());
        }
        Ok(value)
    }

    // Older documents stored some fields as a single string.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let mut value = Multilingual::new();
        value.set(FALLBACK_LANGUAGE, v);
        Ok(value)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Multilingual::new())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Multilingual::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_language_reads_empty() {
        let value: Multilingual = [("en", "Hello"), ("ar", "مرحبا")].into_iter().collect();
        assert_eq!(value.get("en"), "Hello");
        assert_eq!(value.get("fr"), "");
        assert!(!value.contains("fr"));
    }

    #[test]
    fn set_replaces_in_place_and_appends_new() {
        let mut value: Multilingual = [("en", "a"), ("ar", "b")].into_iter().collect();
        value.set("en", "c");
        value.set("fr", "d");
        let langs: Vec<_> = value.stored_languages().collect();
        assert_eq!(langs, vec!["en", "ar", "fr"]);
        assert_eq!(value.get("en"), "c");
    }

    #[test]
    fn serializes_in_insertion_order_without_escaping() {
        let value: Multilingual = [("en", "Title"), ("ar", "عنوان")].into_iter().collect();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"en":"Title","ar":"عنوان"}"#);
    }

    #[test]
    fn deserialize_keeps_file_order() {
        let value: Multilingual = serde_json::from_str(r#"{"ar":"x","en":"y","de":""}"#).unwrap();
        let langs: Vec<_> = value.stored_languages().collect();
        assert_eq!(langs, vec!["ar", "en", "de"]);
    }

    #[test]
    fn bare_string_becomes_english_entry() {
        let value: Multilingual = serde_json::from_str(r#""About me""#).unwrap();
        assert_eq!(value.get("en"), "About me");
        assert_eq!(value.len(), 1);
    }

    #[test]
    fn null_entries_read_as_empty() {
        let value: Multilingual = serde_json::from_str(r#"{"en":null}"#).unwrap();
        assert!(value.contains("en"));
        assert_eq!(value.get("en"), "");
    }

    #[test]
    fn rejects_non_text_values() {
        assert!(serde_json::from_str::<Multilingual>("42").is_err());
        assert!(serde_json::from_str::<Multilingual>(r#"{"en":3}"#).is_err());
    }

    #[test]
    fn active_view_follows_language_order() {
        let value: Multilingual = [("ar", "b"), ("en", "a")].into_iter().collect();
        let langs = vec!["en".to_string(), "fr".to_string()];
        let active: Vec<_> = value.active(&langs).collect();
        assert_eq!(active, vec![("en", "a"), ("fr", "")]);
    }
}
