//! Git integration layer.
//!
//! The rest of the crate only sees the [`Backend`] trait: clone a remote
//! into a fresh directory, or bring an existing working copy up to date.
//! Two implementations exist, one on top of the `git2` crate and one that
//! shells out to the `git` binary, so sync logic can also be driven by a
//! fake in tests.

use anyhow::Result;
use std::path::Path;

mod cli_backend;
#[cfg(test)]
pub(crate) mod fake;
mod git2_backend;

pub use cli_backend::GitCli;
pub use git2_backend::Git2Backend;

/// The two version-control operations docsync needs.
pub trait Backend {
    /// Clone `url` into `dest`, which must not exist yet.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Pull the latest upstream state into the working copy at `dest`.
    fn update(&self, dest: &Path) -> Result<()>;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        (**self).clone_repo(url, dest)
    }

    fn update(&self, dest: &Path) -> Result<()> {
        (**self).update(dest)
    }
}
