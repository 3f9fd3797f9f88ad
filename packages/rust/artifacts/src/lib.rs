//! Derived artifacts: `sitemap.xml` and `robots.txt`.
//!
//! Both are pure functions of the document (plus "today" for non-post
//! `lastmod` values) and are regenerated wholesale on every save.

mod sitemap;

use std::path::Path;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use folio_document::Document;
use folio_shared::{FolioError, Result};
use folio_storage::FileStore;

pub use sitemap::{
    ChangeFreq, SitemapEntry, base_url, generate_sitemap, parse_post_date, render_sitemap,
    sitemap_entries,
};

pub const SITEMAP_FILE: &str = "sitemap.xml";
pub const ROBOTS_FILE: &str = "robots.txt";

/// Generated artifact contents, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub sitemap: String,
    pub robots: String,
}

/// Metadata for a single written artifact file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArtifactMeta {
    pub filename: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// Build the allow-all `robots.txt` pointing at the site map.
pub fn generate_robots(doc: &Document) -> Result<String> {
    let base = base_url(doc)?;
    Ok(format!("User-agent: *\nAllow: /\n\nSitemap: {base}/{SITEMAP_FILE}"))
}

/// Generate both artifacts.
pub fn generate(doc: &Document, today: NaiveDate) -> Result<Artifacts> {
    Ok(Artifacts {
        sitemap: generate_sitemap(doc, today)?,
        robots: generate_robots(doc)?,
    })
}

/// Write artifacts into `public_dir`.
///
/// Write failures are reported as `ArtifactGeneration` errors.
#[instrument(skip_all, fields(public_dir = %public_dir.display()))]
pub fn write_artifacts(
    store: &dyn FileStore,
    public_dir: &Path,
    artifacts: &Artifacts,
) -> Result<Vec<ArtifactMeta>> {
    let files = [
        (SITEMAP_FILE, artifacts.sitemap.as_str()),
        (ROBOTS_FILE, artifacts.robots.as_str()),
    ];

    let mut metas = Vec::with_capacity(files.len());
    for (filename, content) in files {
        let target = public_dir.join(filename);
        store
            .write(&target, content.as_bytes())
            .map_err(|e| FolioError::ArtifactGeneration(format!("writing {filename}: {e}")))?;

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        debug!(file = %filename, size = content.len(), "wrote artifact");
        metas.push(ArtifactMeta {
            filename: filename.to_string(),
            sha256: hash,
            size_bytes: content.len(),
        });
    }

    info!(count = metas.len(), "artifacts written");
    Ok(metas)
}

/// Generate and write both artifacts.
pub fn generate_and_write(
    store: &dyn FileStore,
    public_dir: &Path,
    doc: &Document,
    today: NaiveDate,
) -> Result<Vec<ArtifactMeta>> {
    let artifacts = generate(doc, today)?;
    write_artifacts(store, public_dir, &artifacts)
}
