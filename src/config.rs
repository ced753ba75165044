use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::render::FenceRule;

/// Base URL every repository identifier is appended to.
pub const DEFAULT_REMOTE_BASE: &str = "https://github.com/phpixie";

/// Top-level configuration loaded from `external.toml`.
///
/// Example TOML:
/// ```toml
/// remote_base = "https://github.com/phpixie"
///
/// [fence]
/// language = "php"
/// marker   = "php?start_inline"
///
/// [pages."components/http"]
/// repository = "http"
/// path       = "README.md"
/// ```
///
/// The legacy `external.json` format is just the `pages` table on its own.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_remote_base")]
    pub remote_base: String,
    /// Relative paths are resolved against the config file's directory.
    #[serde(default)]
    pub repos_dir: Option<PathBuf>,
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default)]
    pub fence: FenceRule,
    #[serde(default)]
    pub pages: BTreeMap<String, Page>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote_base: default_remote_base(),
            repos_dir: None,
            backend: BackendKind::default(),
            fence: FenceRule::default(),
            pages: BTreeMap::new(),
        }
    }
}

fn default_remote_base() -> String {
    DEFAULT_REMOTE_BASE.to_string()
}

/// One page to generate: which repository to pull and which file to read.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Page {
    pub repository: String,
    pub path: String,
}

/// Which git implementation performs clone/pull.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Git2,
    Cli,
}

/// Load and validate the configuration at `path`.
///
/// `.json` files are read as the legacy flat page mapping; everything
/// else is parsed as TOML.
///
/// # Errors
/// - The file cannot be read (the error includes the path).
/// - Parsing fails.
/// - A page key is empty or a repository identifier is not a plain name.
/// - A page key or source path is absolute or climbs out with `..`.
pub fn load_config(path: &Path) -> Result<Config> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("config not found: {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let cfg = if is_json {
        let pages: BTreeMap<String, Page> = serde_json::from_str(&txt)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Config {
            pages,
            ..Config::default()
        }
    } else {
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))?
    };

    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<()> {
    for (key, page) in &cfg.pages {
        if key.trim().is_empty() {
            bail!("page key must not be empty");
        }
        check_repository(&page.repository)
            .with_context(|| format!("invalid repository for page {}", key))?;
        if page.path.trim().is_empty() {
            bail!("page {} has an empty path", key);
        }
        check_relative(key).with_context(|| format!("invalid page key {:?}", key))?;
        check_relative(&page.path).with_context(|| format!("invalid path for page {}", key))?;
    }
    if cfg.fence.language.is_empty() {
        bail!("fence.language must not be empty");
    }
    Ok(())
}

/// A repository identifier becomes a single directory under the repos
/// root, so it must be exactly one normal path component.
pub fn check_repository(repository: &str) -> Result<()> {
    let mut comps = Path::new(repository).components();
    match (comps.next(), comps.next()) {
        (Some(Component::Normal(_)), None) if !repository.contains(['/', '\\']) => Ok(()),
        _ => bail!("repository must be a plain name, got {:?}", repository),
    }
}

/// Page keys are joined under the target directory and source paths under
/// the working copy; neither may leave its root.
pub fn check_relative(rel: &str) -> Result<()> {
    for comp in Path::new(rel).components() {
        match comp {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("path must stay inside its root, got {:?}", rel)
            }
        }
    }
    Ok(())
}
