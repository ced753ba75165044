use anyhow::{Context, Result, bail};
use std::{env, fs, path::Path, path::PathBuf};

/// Directory under which working copies live when nothing else is set.
pub const DEFAULT_REPOS_DIR: &str = "repositories";

/// Resolved locations for one run.
#[derive(Clone, Debug)]
pub struct Paths {
    pub config: PathBuf,
    pub repos: PathBuf,
    pub target: PathBuf,
}

/// Pick the config file when none was given on the command line.
///
/// `external.toml` in the current directory wins; `external.json` is used
/// only when it exists and the TOML file does not.
pub fn default_config_path(cwd: &Path) -> PathBuf {
    let toml = cwd.join("external.toml");
    let json = cwd.join("external.json");
    if !toml.exists() && json.exists() {
        json
    } else {
        toml
    }
}

/// Resolve the output directory against `cwd` and canonicalize it.
///
/// # Errors
/// The target must already exist and be a directory.
pub fn resolve_target(cwd: &Path, target: &Path) -> Result<PathBuf> {
    let abs = cwd.join(target);
    let resolved = fs::canonicalize(&abs)
        .with_context(|| format!("target directory not found: {}", abs.display()))?;
    if !resolved.is_dir() {
        bail!("target is not a directory: {}", resolved.display());
    }
    Ok(resolved)
}

/// Working-copy root: the explicit override, or `repos_dir` from the
/// config resolved next to the config file, or `<config dir>/repositories`.
pub fn resolve_repos_dir(
    config: &Path,
    from_config: Option<&Path>,
    override_dir: Option<&Path>,
) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(env::current_dir()?.join(dir));
    }
    let base = config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or(env::current_dir()?);
    Ok(base.join(from_config.unwrap_or(Path::new(DEFAULT_REPOS_DIR))))
}
