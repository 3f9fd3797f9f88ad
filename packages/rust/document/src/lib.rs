//! In-memory model of the site content document.
//!
//! - [`Document`]: typed schema with defaults and mutation helpers
//! - [`Multilingual`]: per-language text that reads `""` for missing languages
//! - [`LanguageManager`]: add/remove active languages without losing text
//! - [`Manifest`]: the PWA manifest, a separate document
//!
//! A single `Document` is owned by the editor session for the whole process
//! lifetime; every component borrows it rather than holding a copy.

mod edit;
mod languages;
mod lenient;
mod manifest;
mod model;
mod multilingual;
mod path;

pub use languages::{LanguageChange, LanguageManager, LanguageObserver};
pub use manifest::{Icon, Manifest, Screenshot, Shortcut, ShortcutIcon};
pub use model::{
    About, Achievement, Blog, Comments, DEFAULT_LANGUAGES, DEFAULT_PAGINATION, Document,
    ExternalLink, Giscus, Owner, Post, Site, Skills, split_list,
};
pub use multilingual::Multilingual;
