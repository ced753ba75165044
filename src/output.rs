use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension appended to every page key.
pub const PAGE_SUFFIX: &str = ".html.markdown";

/// `<target>/<key>.html.markdown`
pub fn output_path(target: &Path, key: &str) -> PathBuf {
    target.join(format!("{}{}", key, PAGE_SUFFIX))
}

/// Write `contents` for page `key`, replacing any previous file.
///
/// Directories are never created: both the target root and any directory
/// named by the key must already exist.
///
/// # Errors
/// Missing parent directory or a failed write; the error names the path.
pub fn write_page(target: &Path, key: &str, contents: &str) -> Result<PathBuf> {
    let dst = output_path(target, key);
    if let Some(parent) = dst.parent()
        && !parent.is_dir()
    {
        bail!("output directory does not exist: {}", parent.display());
    }
    fs::write(&dst, contents).with_context(|| format!("cannot write {}", dst.display()))?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn path_appends_suffix_to_key() {
        let p = output_path(Path::new("/site"), "components/http");
        assert_eq!(p, Path::new("/site/components/http.html.markdown"));
    }

    #[test]
    fn writes_and_overwrites() {
        let td = tempdir().unwrap();
        fs::create_dir_all(td.path().join("a")).unwrap();

        let p = write_page(td.path(), "a/b", "one").unwrap();
        assert_eq!(p, td.path().join("a/b.html.markdown"));
        assert_eq!(fs::read_to_string(&p).unwrap(), "one");

        write_page(td.path(), "a/b", "two").unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "two");
    }

    #[test]
    fn does_not_create_directories() {
        let td = tempdir().unwrap();
        let err = write_page(td.path(), "missing/page", "x").unwrap_err();
        assert!(format!("{err}").contains("output directory does not exist"));
        assert!(!td.path().join("missing").exists());
    }

    #[test]
    fn missing_target_root_is_fatal() {
        let td = tempdir().unwrap();
        let gone = td.path().join("gone");
        assert!(write_page(&gone, "page", "x").is_err());
    }
}
