//! CLI command definitions, routing, and tracing setup.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use folio_core::{
    AcceptDefaultIdentity, EditSession, GiscusSettings, IdentityPrompt, PipelineReport,
    ProgressReporter, SaveInput, StepRecord, StepStatus,
};
use folio_document::LanguageChange;
use folio_shared::{
    AppConfig, SitePaths, init_config, init_config_at, load_config, load_config_from,
};
use folio_storage::FsStore;
use folio_vcs::GitCli;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// folio: edit and publish a multilingual static-site content document.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Edit a multilingual site content document, regenerate its SEO files, and publish it with git.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Site repository root.
    #[arg(long, default_value = ".", global = true)]
    pub root: PathBuf,

    /// Config file (defaults to ~/.folio/folio.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Save even over a content file that failed to load, replacing it.
    #[arg(long, global = true)]
    pub force: bool,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Persist the document and manifest, then regenerate sitemap.xml and robots.txt.
    Save(SaveArgs),

    /// Stage, commit and push the site repository.
    Push {
        /// Accept the default committer identity without prompting.
        #[arg(long)]
        yes: bool,
    },

    /// `save` followed by `push`.
    Publish {
        #[command(flatten)]
        save: SaveArgs,

        /// Accept the default committer identity without prompting.
        #[arg(long)]
        yes: bool,
    },

    /// Manage the active language set.
    Lang {
        #[command(subcommand)]
        action: LangAction,
    },

    /// Inspect and edit blog posts.
    Post {
        #[command(subcommand)]
        action: PostAction,
    },

    /// Print the generated sitemap.xml and robots.txt without writing them.
    Sitemap,

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Values merged into the document at save time.
#[derive(Args, Default)]
pub(crate) struct SaveArgs {
    /// JSON file holding the skills list.
    #[arg(long)]
    pub skills: Option<PathBuf>,

    /// Posts per page (ignored unless an integer).
    #[arg(long)]
    pub pagination: Option<String>,

    /// Giscus repository (`owner/name`).
    #[arg(long)]
    pub giscus_repo: Option<String>,

    /// Giscus repository id.
    #[arg(long)]
    pub giscus_repo_id: Option<String>,

    /// Giscus discussion category.
    #[arg(long)]
    pub giscus_category: Option<String>,

    /// Giscus discussion category id.
    #[arg(long)]
    pub giscus_category_id: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum LangAction {
    /// List active languages.
    List,
    /// Add a language code and save.
    Add { code: String },
    /// Remove a language code (its text is kept) and save.
    Remove { code: String },
}

#[derive(Subcommand)]
pub(crate) enum PostAction {
    /// List posts.
    List,
    /// Add a draft post at the top and save.
    New,
    /// Show a post with its decoded body.
    Show { id: String },
    /// Replace a post's body from a file and save.
    Body {
        id: String,
        /// File holding the new body text.
        #[arg(long)]
        file: PathBuf,
        /// Store the body as plain text instead of Base64.
        #[arg(long)]
        plain: bool,
    },
    /// Replace a post's tags from a comma-separated list and save.
    Tags { id: String, tags: String },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const CRATES: [&str; 8] = [
    "folio_cli",
    "folio_core",
    "folio_shared",
    "folio_document",
    "folio_content",
    "folio_artifacts",
    "folio_storage",
    "folio_vcs",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = CRATES
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(cli.config.as_deref()),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        };
    }

    let site = Site::open(&cli)?;
    match cli.command {
        Command::Save(args) => {
            let mut session = site.load_session();
            site.save(&mut session, &args)
        }
        Command::Push { yes } => site.push(yes),
        Command::Publish { save, yes } => {
            let mut session = site.load_session();
            site.save(&mut session, &save)?;
            site.push(yes)
        }
        Command::Lang { action } => cmd_lang(&site, action),
        Command::Post { action } => cmd_post(&site, action),
        Command::Sitemap => cmd_sitemap(&site),
        Command::Config { .. } => Ok(()),
    }
}

/// Resolved config and paths for one site repository.
struct Site {
    config: AppConfig,
    paths: SitePaths,
    force: bool,
}

impl Site {
    fn open(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => load_config_from(path)?,
            None => load_config()?,
        };
        let paths = SitePaths::resolve(&config, &cli.root);
        info!(root = %paths.root.display(), "site repository");
        Ok(Self {
            config,
            paths,
            force: cli.force,
        })
    }

    fn load_session(&self) -> EditSession {
        let (session, warnings) = EditSession::load(&FsStore, &self.paths);
        for warning in warnings {
            warn!(error = %warning, "load warning");
            eprintln!("  warning: {warning}");
        }
        if session.unreadable().content && !self.force {
            eprintln!(
                "  {} will not be overwritten; fix it by hand or pass --force to replace it",
                self.paths.content.display()
            );
        }
        session
    }

    fn save(&self, session: &mut EditSession, args: &SaveArgs) -> Result<()> {
        let input = save_input(args, self.force)?;
        let progress = CliProgress::new();
        let saved = folio_core::save(
            session,
            &FsStore,
            &self.paths,
            &input,
            Local::now().date_naive(),
            &progress,
        );
        progress.finish();

        print_report(&saved.report);
        for meta in &saved.artifacts {
            println!(
                "  {:<12} {:>7} bytes  sha256:{}",
                meta.filename,
                meta.size_bytes,
                meta.sha256.get(..12).unwrap_or(&meta.sha256)
            );
        }
        saved.report.into_result()?;
        println!("  Saved {}", self.paths.content.display());
        Ok(())
    }

    fn push(&self, yes: bool) -> Result<()> {
        let vcs = GitCli::new(&self.config.publish.git_binary, &self.paths.root);
        let progress = CliProgress::new();
        let prompt: Box<dyn IdentityPrompt> = if yes {
            Box::new(AcceptDefaultIdentity)
        } else {
            Box::new(StdinPrompt {
                spinner: progress.spinner.clone(),
            })
        };

        let report = folio_core::push(
            &vcs,
            prompt.as_ref(),
            &self.config.publish,
            Local::now().naive_local(),
            &progress,
        );
        progress.finish();

        print_report(&report);
        if report.fatal_error().is_some_and(|e| e.is_publish_error()) {
            eprintln!("  Earlier steps were kept; resolve the error above and run `folio push` again.");
        }
        report.into_result()?;
        println!("  Published.");
        Ok(())
    }
}

fn save_input(args: &SaveArgs, force: bool) -> Result<SaveInput> {
    let skills_json = match &args.skills {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| eyre!("cannot read skills file '{}': {e}", path.display()))?,
        ),
        None => None,
    };
    Ok(SaveInput {
        skills_json,
        pagination: args.pagination.clone(),
        giscus: GiscusSettings {
            repo: args.giscus_repo.clone(),
            repo_id: args.giscus_repo_id.clone(),
            category: args.giscus_category.clone(),
            category_id: args.giscus_category_id.clone(),
        },
        force,
    })
}

fn print_report(report: &PipelineReport) {
    println!();
    for step in &report.steps {
        let line = match &step.status {
            StepStatus::Ok(detail) if detail.is_empty() => format!("ok       {}", step.name),
            StepStatus::Ok(detail) => format!("ok       {}  ({detail})", step.name),
            StepStatus::Skipped(reason) => format!("skipped  {}  ({reason})", step.name),
            StepStatus::Failed(e) => format!("FAILED   {}  {e}", step.name),
            StepStatus::NotRun => format!("-        {}", step.name),
        };
        println!("  {line}");
    }
    println!(
        "  {} finished in {:.1}s",
        report.pipeline,
        report.elapsed.as_secs_f64()
    );
}

// ---------------------------------------------------------------------------
// Languages and posts
// ---------------------------------------------------------------------------

fn cmd_lang(site: &Site, action: LangAction) -> Result<()> {
    let mut session = site.load_session();
    let change = match action {
        LangAction::List => {
            for code in session.doc.languages() {
                println!("{code}");
            }
            return Ok(());
        }
        LangAction::Add { code } => session.add_language(&code),
        LangAction::Remove { code } => session.remove_language(&code)?,
    };

    if change == LanguageChange::Unchanged {
        println!("  Languages unchanged: {}", session.doc.languages().join(", "));
        return Ok(());
    }
    site.save(&mut session, &SaveArgs::default())?;
    println!("  Languages: {}", session.doc.languages().join(", "));
    Ok(())
}

fn cmd_post(site: &Site, action: PostAction) -> Result<()> {
    let mut session = site.load_session();
    match action {
        PostAction::List => {
            let lang = session.doc.languages().first().cloned().unwrap_or_default();
            for (i, post) in session.doc.blog.posts.iter().enumerate() {
                let flags = match (post.pin, post.encoding) {
                    (true, true) => " [pinned, base64]",
                    (true, false) => " [pinned]",
                    (false, true) => " [base64]",
                    (false, false) => "",
                };
                println!(
                    "{i:>3}  {:<32} {:<20} {}{flags}",
                    post.id,
                    post.date,
                    post.title.get(&lang)
                );
            }
            Ok(())
        }
        PostAction::New => {
            let index = session.add_post(Local::now().naive_local());
            let id = session.doc.post(index)?.id.clone();
            site.save(&mut session, &SaveArgs::default())?;
            println!("  Created post {id}");
            Ok(())
        }
        PostAction::Show { id } => {
            let index = find_post(&session, &id)?;
            let body = session.open_post(index)?.to_string();
            let post = session.doc.post(index)?;
            println!("id:       {}", post.id);
            println!("date:     {}", post.date);
            println!("tags:     {}", post.tags.join(", "));
            println!("pinned:   {}", post.pin);
            println!("encoding: {}", if post.encoding { "base64" } else { "plain" });
            for lang in session.doc.languages() {
                println!("title[{lang}]:   {}", post.title.get(lang));
                println!("excerpt[{lang}]: {}", post.excerpt.get(lang));
            }
            println!();
            println!("{body}");
            Ok(())
        }
        PostAction::Body { id, file, plain } => {
            let index = find_post(&session, &id)?;
            let text = read_text(&file)?;
            session.open_post(index)?;
            session.edit_body(text)?;
            session.set_encode(!plain)?;
            site.save(&mut session, &SaveArgs::default())
        }
        PostAction::Tags { id, tags } => {
            let index = find_post(&session, &id)?;
            session.doc.set_post_tags(index, &tags)?;
            site.save(&mut session, &SaveArgs::default())
        }
    }
}

fn find_post(session: &EditSession, id: &str) -> Result<usize> {
    session
        .doc
        .find_post(id)
        .ok_or_else(|| eyre!("no post with id '{id}'"))
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| eyre!("cannot read '{}': {e}", path.display()))
}

fn cmd_sitemap(site: &Site) -> Result<()> {
    let session = site.load_session();
    let artifacts = folio_artifacts::generate(&session.doc, Local::now().date_naive())?;
    println!("{}", artifacts.sitemap);
    println!();
    println!("{}", artifacts.robots);
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config_init(path: Option<&Path>) -> Result<()> {
    let path = match path {
        Some(path) => {
            init_config_at(path)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config: AppConfig = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter and identity prompt
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .map(|s| s.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]))
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn step_started(&self, pipeline: &str, step: &str) {
        self.spinner.set_message(format!("{pipeline}: {step}"));
    }

    fn step_finished(&self, pipeline: &str, record: &StepRecord) {
        if let StepStatus::Failed(e) = &record.status {
            self.spinner
                .println(format!("  {pipeline}: {} failed: {e}", record.name));
        }
    }
}

/// Asks on the terminal whether to use the default committer identity.
struct StdinPrompt {
    spinner: ProgressBar,
}

impl IdentityPrompt for StdinPrompt {
    fn offer_default_identity(&self, name: &str, email: &str) -> bool {
        self.spinner.suspend(|| {
            eprint!("Git user identity is not configured. Use \"{name} <{email}>\"? [y/N] ");
            let _ = std::io::stderr().flush();
            let mut answer = String::new();
            match std::io::stdin().lock().read_line(&mut answer) {
                Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
                Err(_) => false,
            }
        })
    }
}
