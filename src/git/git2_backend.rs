use anyhow::{Context, Result, anyhow};
use git2::{
    Cred, FetchOptions, RemoteCallbacks, Repository, SubmoduleUpdateOptions,
    build::{CheckoutBuilder, RepoBuilder},
};
use std::path::Path;

use super::Backend;

/// [`Backend`] built on libgit2 through the `git2` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Backend;

impl Backend for Git2Backend {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts_with_creds());

        let repo = builder
            .clone(url, dest)
            .with_context(|| format!("git clone {}", url))?;
        update_submodules(&repo)?;
        Ok(())
    }

    /// Equivalent of `git pull --ff-only`: fetch origin, then move the
    /// current branch to its remote counterpart if that is a fast-forward.
    /// Uncommitted edits to files the update changes make it fail.
    fn update(&self, dest: &Path) -> Result<()> {
        let repo = Repository::open(dest)
            .with_context(|| format!("not a git repository: {}", dest.display()))?;
        fetch_origin(&repo)?;
        fast_forward(&repo)?;
        update_submodules(&repo)?;
        Ok(())
    }
}

/// Build a `FetchOptions` with SSH-agent credentials enabled.
///
/// If no SSH key is found, it falls back to default credentials.
fn fetch_opts_with_creds() -> FetchOptions<'static> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(|_url, username_from_url, _allowed| {
        Cred::ssh_key_from_agent(username_from_url.unwrap_or("git")).or_else(|_| Cred::default())
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo
}

fn update_submodules(repo: &Repository) -> Result<()> {
    let mut subs = repo.submodules().unwrap_or_default();
    for sm in subs.iter_mut() {
        sm.init(true)?;
        let mut opt = SubmoduleUpdateOptions::new();
        sm.update(true, Some(&mut opt))?;
    }
    Ok(())
}

/// Perform `git fetch origin` to update remote refs.
fn fetch_origin(repo: &Repository) -> Result<()> {
    let mut fo = fetch_opts_with_creds();

    let mut remote = repo.find_remote("origin")?;
    remote
        .fetch(
            &[
                "refs/heads/*:refs/remotes/origin/*",
                "refs/tags/*:refs/tags/*",
            ],
            Some(&mut fo),
            None,
        )
        .context("git fetch origin")?;
    Ok(())
}

/// Local branch name and the remote ref it should follow.
///
/// An attached HEAD follows `origin/<branch>`. A detached HEAD, or a branch
/// without a remote counterpart, follows the remote default branch
/// (`origin/HEAD`, then `origin/main`, then `origin/master`).
fn tracking_target(repo: &Repository) -> Result<(String, String)> {
    if let Ok(head) = repo.head()
        && head.is_branch()
        && let Some(name) = head.shorthand()
    {
        let remote_ref = format!("refs/remotes/origin/{}", name);
        if repo.find_reference(&remote_ref).is_ok() {
            return Ok((name.to_string(), remote_ref));
        }
    }

    let remote_ref = default_remote_branch(repo)?;
    let branch = remote_ref
        .strip_prefix("refs/remotes/origin/")
        .ok_or_else(|| anyhow!("unexpected remote ref: {}", remote_ref))?
        .to_string();
    Ok((branch, remote_ref))
}

fn default_remote_branch(repo: &Repository) -> Result<String> {
    if let Ok(origin_head) = repo.find_reference("refs/remotes/origin/HEAD") {
        return origin_head
            .symbolic_target()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("origin/HEAD has no symbolic target"));
    }
    for candidate in ["refs/remotes/origin/main", "refs/remotes/origin/master"] {
        if repo.find_reference(candidate).is_ok() {
            return Ok(candidate.to_string());
        }
    }
    Err(anyhow!(
        "could not determine default branch (missing origin/HEAD, origin/main, origin/master)"
    ))
}

fn fast_forward(repo: &Repository) -> Result<()> {
    let (branch, remote_ref) = tracking_target(repo)?;
    let remote = repo.find_reference(&remote_ref)?;
    let incoming = repo.reference_to_annotated_commit(&remote)?;

    let (analysis, _) = repo.merge_analysis(&[&incoming])?;
    if analysis.is_up_to_date() {
        return Ok(());
    }
    if !(analysis.is_fast_forward() || analysis.is_unborn()) {
        return Err(anyhow!(
            "cannot fast-forward {} to {}: histories have diverged",
            branch,
            remote_ref
        ));
    }

    // Safe checkout against the current HEAD tree: local edits to files the
    // update touches are a conflict, as with `git pull`.
    let target = repo.find_commit(incoming.id())?;
    repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))
        .with_context(|| {
            format!(
                "local changes in {} would be overwritten",
                repo.workdir().unwrap_or(repo.path()).display()
            )
        })?;

    let local_ref = format!("refs/heads/{}", branch);
    let msg = format!("docsync: fast-forward to {}", remote_ref);
    match repo.find_reference(&local_ref) {
        Ok(mut r) => {
            r.set_target(incoming.id(), &msg)?;
        }
        Err(_) => {
            repo.reference(&local_ref, incoming.id(), true, &msg)?;
        }
    }
    repo.set_head(&local_ref)?;
    Ok(())
}
