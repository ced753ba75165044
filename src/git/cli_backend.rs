use anyhow::{Context, Result, bail};
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::Backend;

/// [`Backend`] that runs the `git` executable.
///
/// Useful where the user's git configuration (credential helpers, proxies,
/// `insteadOf` rewrites) must apply exactly as on the command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn clone_args(url: &str, dest: &Path) -> Vec<OsString> {
        vec!["clone".into(), url.into(), dest.as_os_str().to_owned()]
    }

    fn pull_args(dest: &Path) -> Vec<OsString> {
        let mut git_dir = OsString::from("--git-dir=");
        git_dir.push(dest.join(".git").as_os_str());
        let mut work_tree = OsString::from("--work-tree=");
        work_tree.push(dest.as_os_str());
        vec![git_dir, work_tree, "pull".into()]
    }

    fn run(&self, args: Vec<OsString>) -> Result<()> {
        let shown = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .with_context(|| format!("failed to run {}", self.program.to_string_lossy()))?;

        if !output.status.success() {
            bail!(
                "{} {} exited with {}: {}",
                self.program.to_string_lossy(),
                shown,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl Backend for GitCli {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.run(Self::clone_args(url, dest))
    }

    fn update(&self, dest: &Path) -> Result<()> {
        self.run(Self::pull_args(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_args_layout() {
        let args = GitCli::clone_args("https://github.com/phpixie/http", Path::new("/r/http"));
        assert_eq!(
            args,
            vec![
                OsString::from("clone"),
                OsString::from("https://github.com/phpixie/http"),
                OsString::from("/r/http"),
            ]
        );
    }

    #[test]
    fn pull_args_pin_git_dir_and_work_tree() {
        let args = GitCli::pull_args(Path::new("/r/http"));
        assert_eq!(
            args,
            vec![
                OsString::from("--git-dir=/r/http/.git"),
                OsString::from("--work-tree=/r/http"),
                OsString::from("pull"),
            ]
        );
    }

    #[test]
    fn missing_program_is_an_error() {
        let git = GitCli::new("docsync-no-such-git-binary");
        let err = git.update(Path::new("/nonexistent")).unwrap_err();
        assert!(format!("{err}").contains("docsync-no-such-git-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_an_error() {
        let git = GitCli::new("false");
        let err = git
            .clone_repo("https://example.invalid/x", Path::new("/nonexistent"))
            .unwrap_err();
        assert!(format!("{err}").contains("exited with"));
    }
}
