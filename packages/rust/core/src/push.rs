//! `push`: commit the working tree and publish it upstream.
//!
//! Every step is fatal. A failure stops the sequence but leaves earlier
//! effects in place (a failed push keeps the local commit).

use chrono::NaiveDateTime;
use tracing::{info, instrument};

use folio_shared::{FolioError, PublishConfig, Result};
use folio_vcs::VersionControl;

use crate::pipeline::{PipelineReport, ProgressReporter, Step, StepOutcome, run_steps};

/// Asked whether to configure the default committer identity when none is set.
pub trait IdentityPrompt {
    /// `true` sets `name <email>` as the repository's committer identity.
    fn offer_default_identity(&self, name: &str, email: &str) -> bool;
}

/// Always accepts the default identity.
pub struct AcceptDefaultIdentity;

impl IdentityPrompt for AcceptDefaultIdentity {
    fn offer_default_identity(&self, _name: &str, _email: &str) -> bool {
        true
    }
}

/// `<prefix> YYYY-MM-DD HH:MM`.
pub fn commit_message(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix} {}", now.format("%Y-%m-%d %H:%M"))
}

struct PushContext<'a> {
    vcs: &'a dyn VersionControl,
    prompt: &'a dyn IdentityPrompt,
    publish: &'a PublishConfig,
    now: NaiveDateTime,
}

/// Run the push pipeline.
#[instrument(skip_all)]
pub fn push(
    vcs: &dyn VersionControl,
    prompt: &dyn IdentityPrompt,
    publish: &PublishConfig,
    now: NaiveDateTime,
    progress: &dyn ProgressReporter,
) -> PipelineReport {
    let steps = [
        Step::fatal("check tooling", check_tooling),
        Step::fatal("check identity", check_identity),
        Step::fatal("check remote", check_remote),
        Step::fatal("stage", stage),
        Step::fatal("commit", commit),
        Step::fatal("push", push_upstream),
    ];
    let mut ctx = PushContext {
        vcs,
        prompt,
        publish,
        now,
    };
    run_steps("push", &mut ctx, &steps, progress)
}

fn check_tooling(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    let version = ctx.vcs.query_version()?;
    Ok(StepOutcome::Done(version))
}

fn check_identity(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    let name = ctx.vcs.get_config("user.name")?;
    let email = ctx.vcs.get_config("user.email")?;
    if let (Some(name), Some(email)) = (&name, &email) {
        return Ok(StepOutcome::Done(format!("{name} <{email}>")));
    }

    let default_name = &ctx.publish.default_identity_name;
    let default_email = &ctx.publish.default_identity_email;
    if !ctx.prompt.offer_default_identity(default_name, default_email) {
        let missing: Vec<&str> = [("user.name", &name), ("user.email", &email)]
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key)
            .collect();
        return Err(FolioError::IdentityNotConfigured(format!(
            "{} not set and the default identity was declined",
            missing.join(", ")
        )));
    }

    ctx.vcs.set_config("user.name", default_name)?;
    ctx.vcs.set_config("user.email", default_email)?;
    info!(name = %default_name, email = %default_email, "configured default committer identity");
    Ok(StepOutcome::Done(format!("{default_name} <{default_email}>")))
}

fn check_remote(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    let remotes = ctx.vcs.list_remotes()?;
    match remotes.first() {
        Some(first) => Ok(StepOutcome::Done(first.clone())),
        None => Err(FolioError::NoRemoteConfigured),
    }
}

fn stage(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    ctx.vcs.stage_all()?;
    Ok(StepOutcome::Done(String::new()))
}

fn commit(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    let status = ctx.vcs.status_porcelain()?;
    if !has_staged_changes(&status) {
        return Ok(StepOutcome::Skipped("nothing to commit".into()));
    }
    let message = commit_message(&ctx.publish.commit_message_prefix, ctx.now);
    ctx.vcs.commit(&message)?;
    Ok(StepOutcome::Done(message))
}

/// Whether short-format status lists an entry with a change in the index
/// column. Untracked (`??`), ignored (`!!`) and unstaged-only (` M`) lines
/// do not count.
fn has_staged_changes(status: &str) -> bool {
    status
        .lines()
        .filter_map(|line| line.chars().next())
        .any(|index| !matches!(index, ' ' | '?' | '!'))
}

fn push_upstream(ctx: &mut PushContext<'_>) -> Result<StepOutcome> {
    let output = ctx.vcs.push()?;
    Ok(StepOutcome::Done(output))
}
