//! Ordered step driver shared by `save` and `push`.
//!
//! A pipeline is a list of named steps run in order against one context.
//! A failing non-fatal step is recorded and the driver moves on; a failing
//! fatal step halts the run and every later step is marked `NotRun`. Effects
//! of steps that already ran are never rolled back.

use std::time::Instant;

use tracing::{debug, info, warn};

use folio_shared::{FolioError, Result};

/// Whether a failure stops the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Fatal,
    NonFatal,
}

/// What a step that did not fail did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Ran; carries a short human-readable detail (may be empty).
    Done(String),
    /// Had nothing to do.
    Skipped(String),
}

/// Final state of a step in a report.
#[derive(Debug)]
pub enum StepStatus {
    Ok(String),
    Skipped(String),
    Failed(FolioError),
    NotRun,
}

/// One named step.
pub struct Step<C> {
    pub name: &'static str,
    pub severity: Severity,
    pub run: fn(&mut C) -> Result<StepOutcome>,
}

impl<C> Step<C> {
    pub const fn fatal(name: &'static str, run: fn(&mut C) -> Result<StepOutcome>) -> Self {
        Self {
            name,
            severity: Severity::Fatal,
            run,
        }
    }

    pub const fn non_fatal(name: &'static str, run: fn(&mut C) -> Result<StepOutcome>) -> Self {
        Self {
            name,
            severity: Severity::NonFatal,
            run,
        }
    }
}

#[derive(Debug)]
pub struct StepRecord {
    pub name: &'static str,
    pub severity: Severity,
    pub status: StepStatus,
}

/// Aggregate result of one pipeline run.
#[derive(Debug)]
pub struct PipelineReport {
    pub pipeline: &'static str,
    pub steps: Vec<StepRecord>,
    pub elapsed: std::time::Duration,
}

impl PipelineReport {
    /// True unless a fatal step failed.
    pub fn succeeded(&self) -> bool {
        self.fatal_error().is_none()
    }

    pub fn fatal_error(&self) -> Option<&FolioError> {
        self.steps.iter().find_map(|s| match (&s.status, s.severity) {
            (StepStatus::Failed(e), Severity::Fatal) => Some(e),
            _ => None,
        })
    }

    /// Non-fatal failures, in step order.
    pub fn warnings(&self) -> impl Iterator<Item = (&'static str, &FolioError)> {
        self.steps.iter().filter_map(|s| match (&s.status, s.severity) {
            (StepStatus::Failed(e), Severity::NonFatal) => Some((s.name, e)),
            _ => None,
        })
    }

    pub fn status(&self, step: &str) -> Option<&StepStatus> {
        self.steps.iter().find(|s| s.name == step).map(|s| &s.status)
    }

    /// `Err` with the fatal error if the pipeline halted.
    pub fn into_result(mut self) -> Result<Self> {
        match self.take_fatal() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    fn take_fatal(&mut self) -> Option<FolioError> {
        let step = self.steps.iter_mut().find(|s| {
            s.severity == Severity::Fatal && matches!(s.status, StepStatus::Failed(_))
        })?;
        match std::mem::replace(&mut step.status, StepStatus::NotRun) {
            StepStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called before a step runs.
    fn step_started(&self, pipeline: &str, step: &str);
    /// Called after a step ran (not for steps that never ran).
    fn step_finished(&self, pipeline: &str, record: &StepRecord);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step_started(&self, _pipeline: &str, _step: &str) {}
    fn step_finished(&self, _pipeline: &str, _record: &StepRecord) {}
}

/// Run `steps` in order against `ctx`.
pub fn run_steps<C>(
    pipeline: &'static str,
    ctx: &mut C,
    steps: &[Step<C>],
    progress: &dyn ProgressReporter,
) -> PipelineReport {
    let start = Instant::now();
    let mut records = Vec::with_capacity(steps.len());
    let mut halted = false;

    for step in steps {
        if halted {
            records.push(StepRecord {
                name: step.name,
                severity: step.severity,
                status: StepStatus::NotRun,
            });
            continue;
        }

        progress.step_started(pipeline, step.name);
        let status = match (step.run)(ctx) {
            Ok(StepOutcome::Done(detail)) => {
                info!(pipeline, step = step.name, %detail, "step complete");
                StepStatus::Ok(detail)
            }
            Ok(StepOutcome::Skipped(reason)) => {
                info!(pipeline, step = step.name, %reason, "step skipped");
                StepStatus::Skipped(reason)
            }
            Err(e) => {
                match step.severity {
                    Severity::Fatal => {
                        warn!(pipeline, step = step.name, error = %e, "fatal step failed, halting");
                        halted = true;
                    }
                    Severity::NonFatal => {
                        warn!(pipeline, step = step.name, error = %e, "step failed, continuing");
                    }
                }
                StepStatus::Failed(e)
            }
        };

        let record = StepRecord {
            name: step.name,
            severity: step.severity,
            status,
        };
        progress.step_finished(pipeline, &record);
        records.push(record);
    }

    let report = PipelineReport {
        pipeline,
        steps: records,
        elapsed: start.elapsed(),
    };
    debug!(
        pipeline,
        succeeded = report.succeeded(),
        elapsed_ms = report.elapsed.as_millis() as u64,
        "pipeline finished"
    );
    report
}
