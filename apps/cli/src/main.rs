//! folio CLI: edit a multilingual static-site content document and publish it.
//!
//! Saves the content document locally (regenerating `sitemap.xml` and
//! `robots.txt`) and pushes the site repository upstream.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
