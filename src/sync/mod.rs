mod progress;
mod syncer;

use anyhow::{Context, Result};
use colored::Colorize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::config::{BackendKind, Config, load_config};
use crate::git::{Backend, Git2Backend, GitCli};
use crate::output::write_page;
use crate::paths::{Paths, default_config_path, resolve_repos_dir, resolve_target};
use crate::render::{read_source, render_page};

use progress::Step;
pub use syncer::{SourceSyncer, SyncOutcome, remote_url};

/// Command-line options after parsing.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub target: PathBuf,
    pub config: Option<PathBuf>,
    pub repos_dir: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub quiet: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub pages: usize,
    pub cloned: usize,
    pub updated: usize,
}

/// Generate every configured page.
///
/// High-level flow:
/// 1. Load the configuration (`external.toml` / `external.json`).
/// 2. Resolve the target directory; it must exist.
/// 3. Ensure the working-copy root exists.
/// 4. Run the pipeline with the selected git backend (see [`run`]).
///
/// Any failure aborts the run; pages already written stay on disk.
pub fn cmd_sync(opts: Options) -> Result<()> {
    let cwd = env::current_dir().context("cannot determine current directory")?;
    let config = opts
        .config
        .map(|c| cwd.join(c))
        .unwrap_or_else(|| default_config_path(&cwd));

    let cfg = load_config(&config)?;
    let target = resolve_target(&cwd, &opts.target)?;
    let repos = resolve_repos_dir(&config, cfg.repos_dir.as_deref(), opts.repos_dir.as_deref())?;

    if cfg.pages.is_empty() {
        eprintln!("no pages in {}", config.display());
        return Ok(());
    }

    fs::create_dir_all(&repos)
        .with_context(|| format!("cannot create {}", repos.display()))?;

    let p = Paths {
        config,
        repos,
        target,
    };

    let summary = match opts.backend.unwrap_or(cfg.backend) {
        BackendKind::Git2 => run(&cfg, &p, Git2Backend, opts.quiet)?,
        BackendKind::Cli => run(&cfg, &p, GitCli::default(), opts.quiet)?,
    };

    if !opts.quiet {
        let line = format!(
            "{} pages written, {} repositories synced ({} cloned, {} updated)",
            summary.pages,
            summary.cloned + summary.updated,
            summary.cloned,
            summary.updated
        );
        eprintln!("{}", line.green());
    }
    Ok(())
}

/// Run the pipeline for every page of `cfg`, in key order.
///
/// For each page: sync its repository (at most once per run), read the
/// source file, rewrite it and write `<target>/<key>.html.markdown`.
/// Stops at the first error.
pub fn run<B: Backend>(cfg: &Config, p: &Paths, backend: B, quiet: bool) -> Result<Summary> {
    let fence = cfg.fence.compile()?;
    let mut syncer = SourceSyncer::new(backend, cfg.remote_base.as_str(), p.repos.as_path());
    let mut summary = Summary::default();

    for (key, page) in &cfg.pages {
        let step = Step::start(quiet, format!("syncing {}", page.repository));
        match syncer.sync(&page.repository) {
            Ok(SyncOutcome::Cloned) => {
                summary.cloned += 1;
                step.ok(format!("cloned {}", page.repository));
            }
            Ok(SyncOutcome::Updated) => {
                summary.updated += 1;
                step.ok(format!("updated {}", page.repository));
            }
            Ok(SyncOutcome::Skipped) => step.clear(),
            Err(e) => {
                step.fail(&e);
                return Err(e);
            }
        }

        let step = Step::start(quiet, format!("writing {}", key));
        let res = read_source(&syncer.working_copy(&page.repository), &page.path)
            .map(|markdown| render_page(&markdown, &fence))
            .and_then(|contents| write_page(&p.target, key, &contents))
            .with_context(|| format!("page {}", key));
        match res {
            Ok(dst) => {
                summary.pages += 1;
                step.ok(format!("wrote {}", dst.display()));
            }
            Err(e) => {
                step.fail(&e);
                return Err(e);
            }
        }
    }

    Ok(summary)
}
