use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::git::Backend;

/// `<base>/<repository>`, with exactly one slash in between.
pub fn remote_url(base: &str, repository: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), repository)
}

/// What [`SourceSyncer::sync`] did for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Cloned,
    Updated,
    /// Already synced earlier in this run.
    Skipped,
}

/// Keeps one working copy per repository under `repos_dir` up to date.
///
/// The syncer remembers which repositories it has handled, so each one is
/// cloned or pulled at most once for as long as the syncer lives. Create a
/// new syncer per run.
pub struct SourceSyncer<B> {
    backend: B,
    remote_base: String,
    repos_dir: PathBuf,
    synced: HashSet<String>,
}

impl<B: Backend> SourceSyncer<B> {
    pub fn new(backend: B, remote_base: impl Into<String>, repos_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            remote_base: remote_base.into(),
            repos_dir: repos_dir.into(),
            synced: HashSet::new(),
        }
    }

    /// Local directory for `repository`.
    pub fn working_copy(&self, repository: &str) -> PathBuf {
        self.repos_dir.join(repository)
    }

    /// Clone `repository` if its working copy is missing, pull it otherwise.
    ///
    /// # Errors
    /// Any backend failure, unchanged apart from added context. The
    /// repository is not marked as synced in that case.
    pub fn sync(&mut self, repository: &str) -> Result<SyncOutcome> {
        if self.synced.contains(repository) {
            return Ok(SyncOutcome::Skipped);
        }

        let dir = self.working_copy(repository);
        let outcome = if dir.exists() {
            self.backend
                .update(&dir)
                .with_context(|| format!("failed to update {}", dir.display()))?;
            SyncOutcome::Updated
        } else {
            let url = remote_url(&self.remote_base, repository);
            self.backend
                .clone_repo(&url, &dir)
                .with_context(|| format!("failed to clone {}", url))?;
            SyncOutcome::Cloned
        };

        self.synced.insert(repository.to_string());
        Ok(outcome)
    }

    #[cfg(test)]
    fn synced_count(&self) -> usize {
        self.synced.len()
    }

    #[cfg(test)]
    fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::fake::{Call, FakeBackend};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn remote_url_joins_with_single_slash() {
        assert_eq!(
            remote_url("https://github.com/phpixie", "demo"),
            "https://github.com/phpixie/demo"
        );
        assert_eq!(
            remote_url("https://github.com/phpixie/", "demo"),
            "https://github.com/phpixie/demo"
        );
    }

    #[test]
    fn clones_missing_working_copy() {
        let td = tempdir().unwrap();
        let repos = td.path().join("repos");
        let mut s = SourceSyncer::new(FakeBackend::default(), "https://h/org", &repos);

        assert_eq!(s.sync("demo").unwrap(), SyncOutcome::Cloned);
        assert_eq!(
            s.backend().calls(),
            vec![Call::Clone {
                url: "https://h/org/demo".into(),
                dest: repos.join("demo"),
            }]
        );
    }

    #[test]
    fn updates_existing_working_copy() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("demo")).unwrap();
        let mut s = SourceSyncer::new(FakeBackend::default(), "https://h/org", td.path());

        assert_eq!(s.sync("demo").unwrap(), SyncOutcome::Updated);
        assert_eq!(
            s.backend().calls(),
            vec![Call::Update {
                dest: td.path().join("demo")
            }]
        );
    }

    #[test]
    fn each_repository_synced_once() {
        let td = tempdir().unwrap();
        let mut s = SourceSyncer::new(FakeBackend::default(), "https://h/org", td.path());

        assert_eq!(s.sync("demo").unwrap(), SyncOutcome::Cloned);
        assert_eq!(s.sync("demo").unwrap(), SyncOutcome::Skipped);
        assert_eq!(s.sync("other").unwrap(), SyncOutcome::Cloned);
        assert_eq!(s.sync("demo").unwrap(), SyncOutcome::Skipped);

        assert_eq!(s.backend().calls().len(), 2);
        assert_eq!(s.synced_count(), 2);
    }

    #[test]
    fn new_syncer_starts_with_empty_set() {
        let td = tempdir().unwrap();
        let backend = FakeBackend::default();

        let mut first = SourceSyncer::new(&backend, "https://h/org", td.path());
        assert_eq!(first.sync("demo").unwrap(), SyncOutcome::Cloned);
        drop(first);

        let mut second = SourceSyncer::new(&backend, "https://h/org", td.path());
        assert_eq!(second.sync("demo").unwrap(), SyncOutcome::Updated);
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn failure_propagates_and_is_not_recorded() {
        let td = tempdir().unwrap();
        let backend = FakeBackend::default().failing_on("https://h/org/demo");
        let mut s = SourceSyncer::new(backend, "https://h/org", td.path());

        let err = s.sync("demo").unwrap_err();
        assert!(format!("{err:#}").contains("failed to clone https://h/org/demo"));
        assert_eq!(s.synced_count(), 0);
    }
}
