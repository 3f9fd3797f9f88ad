//! `save`: persist the document locally and regenerate derived artifacts.
//!
//! Steps, in order:
//! 1. flush the open post's edit buffer
//! 2. merge the skills JSON blob (non-fatal: a parse error skips only skills)
//! 3. merge settings: pagination, comment widget options (non-fatal)
//! 4. persist the content document (fatal)
//! 5. persist the manifest, when it holds anything (fatal)
//! 6. regenerate `sitemap.xml` and `robots.txt` (non-fatal)

use std::path::Path;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use folio_artifacts::{ArtifactMeta, generate_and_write};
use folio_shared::{FolioError, Result, SitePaths};
use folio_storage::{FileStore, persist_json};

use crate::pipeline::{PipelineReport, ProgressReporter, Step, StepOutcome, run_steps};
use crate::session::EditSession;

/// Giscus repository settings entered by the user. `None` keeps the stored
/// value.
#[derive(Debug, Clone, Default)]
pub struct GiscusSettings {
    pub repo: Option<String>,
    pub repo_id: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<String>,
}

/// Values edited outside the typed document and merged at save time.
#[derive(Debug, Clone, Default)]
pub struct SaveInput {
    /// Skills list as raw JSON text.
    pub skills_json: Option<String>,
    /// Posts per page as typed; non-integers are ignored.
    pub pagination: Option<String>,
    pub giscus: GiscusSettings,
    /// Write documents even when their file on disk failed to load.
    pub force: bool,
}

#[derive(Debug)]
pub struct SaveReport {
    pub report: PipelineReport,
    /// Artifacts written by this save (empty if generation failed).
    pub artifacts: Vec<ArtifactMeta>,
}

struct SaveContext<'a> {
    session: &'a mut EditSession,
    store: &'a dyn FileStore,
    paths: &'a SitePaths,
    input: &'a SaveInput,
    today: NaiveDate,
    artifacts: Vec<ArtifactMeta>,
}

/// Run the save pipeline.
#[instrument(skip_all, fields(content = %paths.content.display()))]
pub fn save(
    session: &mut EditSession,
    store: &dyn FileStore,
    paths: &SitePaths,
    input: &SaveInput,
    today: NaiveDate,
    progress: &dyn ProgressReporter,
) -> SaveReport {
    let steps = [
        Step::fatal("flush edits", flush_edits),
        Step::non_fatal("merge skills", merge_skills),
        Step::non_fatal("merge settings", merge_settings),
        Step::fatal("persist document", persist_document),
        Step::fatal("persist manifest", persist_manifest),
        Step::non_fatal("generate artifacts", generate_artifacts),
    ];

    let mut ctx = SaveContext {
        session,
        store,
        paths,
        input,
        today,
        artifacts: Vec::new(),
    };
    let report = run_steps("save", &mut ctx, &steps, progress);
    SaveReport {
        report,
        artifacts: ctx.artifacts,
    }
}

fn flush_edits(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    if ctx.session.flush()? {
        Ok(StepOutcome::Done("post body written back".into()))
    } else {
        Ok(StepOutcome::Skipped("no pending edits".into()))
    }
}

fn merge_skills(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    let Some(raw) = ctx.input.skills_json.as_deref() else {
        return Ok(StepOutcome::Skipped("skills not edited".into()));
    };

    let items: Value = serde_json::from_str(raw)
        .map_err(|e| FolioError::structured_field("skills", e.to_string()))?;
    let Some(count) = items.as_array().map(Vec::len) else {
        return Err(FolioError::structured_field("skills", "expected a JSON array"));
    };

    ctx.session.doc.about.skills.items = items;
    Ok(StepOutcome::Done(format!("{count} skill entries")))
}

fn merge_settings(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    let site = &mut ctx.session.doc.site;

    if let Some(raw) = ctx.input.pagination.as_deref() {
        match raw.trim().parse::<u32>() {
            Ok(per_page) => site.pagination_per_page = Some(per_page),
            Err(_) => debug!(value = %raw, "ignoring non-integer pagination"),
        }
    }

    let comments = &mut site.comments;
    if comments.provider.is_empty() {
        comments.provider = "giscus".into();
    }

    let input = &ctx.input.giscus;
    let giscus = &mut comments.giscus;
    for (slot, value) in [
        (&mut giscus.repo, &input.repo),
        (&mut giscus.repo_id, &input.repo_id),
        (&mut giscus.category, &input.category),
        (&mut giscus.category_id, &input.category_id),
    ] {
        if let Some(value) = value {
            *slot = Some(value.clone());
        }
    }
    giscus.fill_defaults();

    Ok(StepOutcome::Done(format!("{} posts per page", site.pagination())))
}

fn persist_document(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    guard_overwrite(ctx, ctx.session.unreadable().content, &ctx.paths.content)?;
    persist_json(ctx.store, &ctx.paths.content, &ctx.session.doc)?;
    ctx.session.mark_persisted(true, false);
    Ok(StepOutcome::Done(ctx.paths.content.display().to_string()))
}

fn persist_manifest(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    if ctx.session.manifest.is_empty() {
        return Ok(StepOutcome::Skipped("manifest is empty".into()));
    }
    guard_overwrite(ctx, ctx.session.unreadable().manifest, &ctx.paths.manifest)?;
    persist_json(ctx.store, &ctx.paths.manifest, &ctx.session.manifest)?;
    ctx.session.mark_persisted(false, true);
    Ok(StepOutcome::Done(ctx.paths.manifest.display().to_string()))
}

fn guard_overwrite(ctx: &SaveContext<'_>, unreadable: bool, path: &Path) -> Result<()> {
    if !unreadable {
        return Ok(());
    }
    if ctx.input.force {
        warn!(path = %path.display(), "replacing a file that failed to load");
        return Ok(());
    }
    Err(FolioError::UnsafeOverwrite {
        path: path.to_path_buf(),
    })
}

fn generate_artifacts(ctx: &mut SaveContext<'_>) -> Result<StepOutcome> {
    ctx.artifacts = generate_and_write(
        ctx.store,
        &ctx.paths.public_dir,
        &ctx.session.doc,
        ctx.today,
    )?;
    let names: Vec<&str> = ctx.artifacts.iter().map(|m| m.filename.as_str()).collect();
    Ok(StepOutcome::Done(names.join(", ")))
}
