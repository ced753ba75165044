//! # docsync
//!
//! **docsync** pulls documentation pages out of external git repositories
//! and drops them into a static-site source tree.
//!
//! For every entry of `external.toml` (or the legacy `external.json`):
//! - clone or pull the referenced repository under `repositories/`
//! - read the configured markdown file from it
//! - rewrite the first fenced code block opener to the inline marker
//! - prepend the page front matter and write `<target>/<key>.html.markdown`
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, ValueEnum};
use docsync::{BackendKind, Options, cmd_sync};
use std::path::PathBuf;

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "docsync",
    version,
    about = "docsync - sync external documentation into a site tree",
    arg_required_else_help = true
)]
struct Cli {
    /// Output directory (must already exist)
    target: PathBuf,

    /// Configuration file [default: ./external.toml, or ./external.json]
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory holding the working copies
    #[arg(long, value_name = "DIR")]
    repos_dir: Option<PathBuf>,

    /// Git implementation used for clone/pull
    #[arg(long, value_enum, value_name = "KIND")]
    backend: Option<BackendArg>,

    /// Do not show progress spinners
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BackendArg {
    Git2,
    Cli,
}

impl From<BackendArg> for BackendKind {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Git2 => BackendKind::Git2,
            BackendArg::Cli => BackendKind::Cli,
        }
    }
}

/// CLI entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    cmd_sync(Options {
        target: cli.target,
        config: cli.config,
        repos_dir: cli.repos_dir,
        backend: cli.backend.map(Into::into),
        quiet: cli.quiet,
    })
}
