//! Version-control client used by the publish pipeline.
//!
//! [`VersionControl`] is the narrow surface the pipeline needs; [`GitCli`]
//! implements it by running the `git` executable in the site repository.
//! Every call blocks until the child process exits.

use std::path::PathBuf;
use std::process::{Command, Output};

use tracing::debug;

use folio_shared::{FolioError, Result};

/// Blocking version-control operations, each fallible.
pub trait VersionControl {
    /// Client version string. Fails with `ToolingUnavailable`.
    fn query_version(&self) -> Result<String>;

    /// Config value, `None` when unset.
    fn get_config(&self, key: &str) -> Result<Option<String>>;

    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Configured remotes, one line each. Fails with
    /// `NotAVersionControlledDirectory` outside a working tree.
    fn list_remotes(&self) -> Result<Vec<String>>;

    fn stage_all(&self) -> Result<()>;

    /// Short-format status, untrimmed: the first column of each line is the
    /// index state. Empty when nothing is staged, modified or untracked.
    fn status_porcelain(&self) -> Result<String>;

    fn commit(&self, message: &str) -> Result<()>;

    /// Push to the configured upstream. Fails with `PushRejected`.
    fn push(&self) -> Result<String>;
}

/// [`VersionControl`] backed by the `git` command-line client.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    repo_root: PathBuf,
}

impl GitCli {
    pub fn new(binary: impl Into<String>, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            repo_root: repo_root.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(binary = %self.binary, ?args, cwd = %self.repo_root.display(), "running");
        Command::new(&self.binary)
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| {
                FolioError::ToolingUnavailable(format!(
                    "failed to run `{}`: {e}. Is it installed?",
                    self.binary
                ))
            })
    }

    /// Run and require success, mapping failure to a `Vcs` error.
    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(stdout(&output))
        } else {
            Err(FolioError::vcs(self.describe(args), diagnostic(&output)))
        }
    }

    fn describe(&self, args: &[&str]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }
}

impl VersionControl for GitCli {
    fn query_version(&self) -> Result<String> {
        let output = self.run(&["--version"])?;
        if !output.status.success() {
            return Err(FolioError::ToolingUnavailable(diagnostic(&output)));
        }
        Ok(stdout(&output).trim().to_string())
    }

    fn get_config(&self, key: &str) -> Result<Option<String>> {
        let output = self.run(&["config", key])?;
        let value = stdout(&output).trim().to_string();
        match output.status.code() {
            Some(0) => Ok(Some(value).filter(|v| !v.is_empty())),
            // Exit status 1 means the key is not set.
            Some(1) if value.is_empty() => Ok(None),
            _ => Err(FolioError::vcs(
                self.describe(&["config", key]),
                diagnostic(&output),
            )),
        }
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.run_checked(&["config", key, value]).map(drop)
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        let output = self.run(&["remote", "-v"])?;
        if !output.status.success() {
            return Err(FolioError::NotAVersionControlledDirectory(format!(
                "{}: {}",
                self.repo_root.display(),
                diagnostic(&output)
            )));
        }
        Ok(stdout(&output)
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn stage_all(&self) -> Result<()> {
        self.run_checked(&["add", "."]).map(drop)
    }

    fn status_porcelain(&self) -> Result<String> {
        self.run_checked(&["status", "--porcelain"])
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message]).map(drop)
    }

    fn push(&self) -> Result<String> {
        let output = self.run(&["push"])?;
        if !output.status.success() {
            return Err(FolioError::PushRejected(diagnostic(&output)));
        }
        // git reports push progress on stderr.
        Ok(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// The tool's own diagnostic text, stderr first.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = [stderr.trim(), stdout.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        format!("exited with {}", output.status)
    } else {
        text
    }
}
