//! Crate entry point for **docsync**.
//!
//! This library provides the implementation behind the `docsync` CLI.
//! Each submodule encapsulates one step of the pipeline (config parsing,
//! git operations, repository sync, page rendering, output).
//! The `pub use` re-exports make the pieces accessible from the crate root
//! so the binary and tests can drive them directly.

mod config;
mod git;
mod output;
mod paths;
mod render;
mod sync;

pub use config::{BackendKind, Config, Page, load_config};
pub use git::{Backend, Git2Backend, GitCli};
pub use output::{output_path, write_page};
pub use paths::{Paths, default_config_path, resolve_target};
pub use render::{FRONT_MATTER, Fence, FenceRule, read_source, render_page};
pub use sync::{Options, Summary, SourceSyncer, SyncOutcome, cmd_sync, remote_url, run};
