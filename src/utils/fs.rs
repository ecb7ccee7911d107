//! File system utilities.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Temporary sibling used while writing `path`: the full file name plus `.tmp`.
pub fn tmp_path(path: &Path) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}

/// Write bytes atomically (write to temp, then rename).
///
/// Parent directories are created as needed. The temporary file is removed
/// if any step after its creation fails.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = tmp_path(path)?;
    let written = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
            if cleanup.kind() != io::ErrorKind::NotFound {
                log::warn!("Could not remove {}: {}", tmp.display(), cleanup);
            }
        }
        return Err(e.into());
    }
    Ok(())
}

/// Read a file, returning None if it doesn't exist.
pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/test.txt");

        write_atomic(&path, b"hello").await.unwrap();
        let data = read_optional(&path).await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
        assert!(!tmp_path(&path).unwrap().exists());
    }

    #[test]
    fn test_tmp_path_keeps_extension() {
        let dir = Path::new("data");
        let json = tmp_path(&dir.join("out.json")).unwrap();
        let xml = tmp_path(&dir.join("out.xml")).unwrap();

        assert_eq!(json, dir.join("out.json.tmp"));
        assert_eq!(xml, dir.join("out.xml.tmp"));
        assert_ne!(json, xml);
    }

    #[tokio::test]
    async fn test_failed_rename_removes_tmp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let target = tmp.path().join("out.json");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let result = write_atomic(&target, b"data").await;

        assert!(result.is_err());
        assert!(!tmp_path(&target).unwrap().exists());
        assert!(target.join("keep").exists());
    }

    #[tokio::test]
    async fn test_sibling_files_do_not_share_tmp() {
        let tmp = TempDir::new().unwrap();
        let json = tmp.path().join("out.json");
        let xml = tmp.path().join("out.xml");

        let (a, b) = tokio::join!(write_atomic(&json, b"{}"), write_atomic(&xml, b"<rss/>"));
        a.unwrap();
        b.unwrap();

        assert_eq!(std::fs::read(&json).unwrap(), b"{}");
        assert_eq!(std::fs::read(&xml).unwrap(), b"<rss/>");
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let data = read_optional(&tmp.path().join("nope.txt")).await.unwrap();
        assert!(data.is_none());
    }
}
