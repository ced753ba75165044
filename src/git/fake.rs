use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Backend;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Clone { url: String, dest: PathBuf },
    Update { dest: PathBuf },
}

/// Records every call; `clone_repo` materializes the files registered
/// for that URL instead of touching the network.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: RefCell<Vec<Call>>,
    files: HashMap<String, Vec<(String, String)>>,
    failing: Option<String>,
}

impl FakeBackend {
    pub fn with_file(mut self, url: &str, path: &str, contents: &str) -> Self {
        self.files
            .entry(url.to_string())
            .or_default()
            .push((path.to_string(), contents.to_string()));
        self
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing = Some(url.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Backend for FakeBackend {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.borrow_mut().push(Call::Clone {
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.failing.as_deref() == Some(url) {
            bail!("fatal: could not read from remote repository {}", url);
        }
        fs::create_dir_all(dest)?;
        for (path, contents) in self.files.get(url).into_iter().flatten() {
            let p = dest.join(path);
            if let Some(parent) = p.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(p, contents)?;
        }
        Ok(())
    }

    fn update(&self, dest: &Path) -> Result<()> {
        self.calls.borrow_mut().push(Call::Update {
            dest: dest.to_path_buf(),
        });
        if !dest.is_dir() {
            bail!("no working copy at {}", dest.display());
        }
        Ok(())
    }
}
