//! Mutation helpers for the repeated sections of a [`Document`].
//!
//! New items are created with one entry per active language. Removal is by
//! index and is a hard delete.

use chrono::NaiveDateTime;
use tracing::debug;

use folio_shared::{FolioError, Result};

use crate::model::{Achievement, Document, ExternalLink, Post, split_list};
use crate::multilingual::Multilingual;

impl Document {
    // -----------------------------------------------------------------------
    // Posts
    // -----------------------------------------------------------------------

    /// Insert a new draft post at the top of the list. Returns its index (0).
    pub fn add_post(&mut self, now: NaiveDateTime) -> usize {
        let langs = self.languages();
        let post = Post {
            id: format!("new-post-{}", now.format("%Y%m%d%H%M%S")),
            date: now.format("%B %d, %Y").to_string(),
            title: Multilingual::from_fn(langs, |l| {
                if l == "en" {
                    format!("New Post ({})", l.to_uppercase())
                } else {
                    format!("New Post ({l})")
                }
            }),
            excerpt: Multilingual::from_fn(langs, |_| "Summary...".to_string()),
            content: "# Content".to_string(),
            ..Post::default()
        };
        debug!(id = %post.id, "adding post");
        self.blog.posts.insert(0, post);
        0
    }

    pub fn post(&self, index: usize) -> Result<&Post> {
        self.blog.posts.get(index).ok_or_else(|| out_of_range("post", index))
    }

    pub fn post_mut(&mut self, index: usize) -> Result<&mut Post> {
        self.blog
            .posts
            .get_mut(index)
            .ok_or_else(|| out_of_range("post", index))
    }

    /// Index of the first post with `id` (ids are not enforced unique).
    pub fn find_post(&self, id: &str) -> Option<usize> {
        self.blog.posts.iter().position(|p| p.id == id)
    }

    pub fn remove_post(&mut self, index: usize) -> Result<Post> {
        self.post(index)?;
        Ok(self.blog.posts.remove(index))
    }

    /// Replace a post's tags from a comma-separated string.
    pub fn set_post_tags(&mut self, index: usize, csv: &str) -> Result<()> {
        self.post_mut(index)?.tags = split_list(csv);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Achievements
    // -----------------------------------------------------------------------

    pub fn add_achievement(&mut self) -> usize {
        let langs = self.languages();
        let achievement = Achievement {
            title: Multilingual::from_fn(langs, |_| "New".to_string()),
            subtitle: Multilingual::from_fn(langs, |_| "Desc".to_string()),
            ..Achievement::default()
        };
        self.achievements.push(achievement);
        self.achievements.len() - 1
    }

    pub fn remove_achievement(&mut self, index: usize) -> Result<Achievement> {
        if index >= self.achievements.len() {
            return Err(out_of_range("achievement", index));
        }
        Ok(self.achievements.remove(index))
    }

    // -----------------------------------------------------------------------
    // External links
    // -----------------------------------------------------------------------

    pub fn add_external_link(&mut self) -> usize {
        let name = Multilingual::from_fn(self.languages(), |l| {
            if l == "en" {
                "New Link".to_string()
            } else {
                format!("New Link ({l})")
            }
        });
        self.site.external.push(ExternalLink {
            name,
            url: "#".to_string(),
            ..ExternalLink::default()
        });
        self.site.external.len() - 1
    }

    /// Link a standalone markdown page (already copied into place) by its file stem.
    pub fn add_external_page(&mut self, stem: &str) -> usize {
        let name = Multilingual::from_fn(self.languages(), |_| stem.to_string());
        self.site.external.push(ExternalLink {
            name,
            url: format!("/page/{stem}"),
            ..ExternalLink::default()
        });
        self.site.external.len() - 1
    }

    pub fn remove_external_link(&mut self, index: usize) -> Result<ExternalLink> {
        if index >= self.site.external.len() {
            return Err(out_of_range("external link", index));
        }
        Ok(self.site.external.remove(index))
    }

    // -----------------------------------------------------------------------
    // Translations
    // -----------------------------------------------------------------------

    pub fn add_translation_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(FolioError::validation("translation key must not be empty"));
        }
        if self.translations.contains_key(key) {
            return Err(FolioError::validation(format!(
                "translation key '{key}' already exists"
            )));
        }
        let value = Multilingual::from_fn(self.languages(), |_| String::new());
        self.translations.insert(key.to_string(), value);
        Ok(())
    }

    pub fn set_translation(&mut self, key: &str, lang: &str, text: &str) -> Result<()> {
        let entry = self
            .translations
            .get_mut(key)
            .ok_or_else(|| FolioError::validation(format!("unknown translation key '{key}'")))?;
        entry.set(lang, text);
        Ok(())
    }

    pub fn remove_translation_key(&mut self, key: &str) -> Result<Multilingual> {
        self.translations
            .remove(key)
            .ok_or_else(|| FolioError::validation(format!("unknown translation key '{key}'")))
    }

    // -----------------------------------------------------------------------
    // External sources (stored only)
    // -----------------------------------------------------------------------

    pub fn add_external_source(&mut self) -> usize {
        self.blog.external_sources.push(String::new());
        self.blog.external_sources.len() - 1
    }

    pub fn set_external_source(&mut self, index: usize, value: &str) -> Result<()> {
        let slot = self
            .blog
            .external_sources
            .get_mut(index)
            .ok_or_else(|| out_of_range("external source", index))?;
        *slot = value.to_string();
        Ok(())
    }

    pub fn remove_external_source(&mut self, index: usize) -> Result<String> {
        if index >= self.blog.external_sources.len() {
            return Err(out_of_range("external source", index));
        }
        Ok(self.blog.external_sources.remove(index))
    }

    // -----------------------------------------------------------------------
    // Swipeable routes
    // -----------------------------------------------------------------------

    pub fn all_routes_swipeable(&self) -> bool {
        self.site.swipeable_routes.iter().any(|r| r == "*")
    }

    pub fn set_all_routes_swipeable(&mut self, all: bool) {
        let route = if all { "*" } else { "/" };
        self.site.swipeable_routes = vec![route.to_string()];
    }

    pub fn add_swipe_route(&mut self) -> usize {
        self.site.swipeable_routes.push(String::new());
        self.site.swipeable_routes.len() - 1
    }

    pub fn set_swipe_route(&mut self, index: usize, route: &str) -> Result<()> {
        let slot = self
            .site
            .swipeable_routes
            .get_mut(index)
            .ok_or_else(|| out_of_range("swipeable route", index))?;
        *slot = route.to_string();
        Ok(())
    }

    pub fn remove_swipe_route(&mut self, index: usize) -> Result<String> {
        if index >= self.site.swipeable_routes.len() {
            return Err(out_of_range("swipeable route", index));
        }
        Ok(self.site.swipeable_routes.remove(index))
    }
}

fn out_of_range(what: &str, index: usize) -> FolioError {
    FolioError::validation(format!("no {what} at index {index}"))
}
