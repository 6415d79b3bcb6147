//! Output persistence
//!
//! Every file is staged next to its destination as `<name>.tmp` and only
//! renamed into place once all of them were written, so a failed run never
//! leaves one playlist updated and the other stale.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};

/// One file to be persisted
#[derive(Debug, Clone)]
pub struct OutputFile<'a> {
    pub path: &'a Path,
    pub content: &'a str,
}

impl<'a> OutputFile<'a> {
    pub fn new(path: &'a Path, content: &'a str) -> Self {
        Self { path, content }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

async fn remove_staged(staged: &[(PathBuf, &Path)]) {
    for (temp, _) in staged {
        if let Err(e) = tokio::fs::remove_file(temp).await {
            warn!("Failed to remove temporary file {}: {}", temp.display(), e);
        }
    }
}

/// Write all files, replacing the previous versions only when every one of
/// them could be staged.
pub async fn write_outputs(files: &[OutputFile<'_>]) -> AppResult<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for file in files {
        if let Some(parent) = file.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                remove_staged(&staged).await;
                return Err(AppError::output_write(parent, e));
            }
        }

        let temp = temp_path(file.path);
        if let Err(e) = tokio::fs::write(&temp, file.content).await {
            remove_staged(&staged).await;
            return Err(AppError::output_write(&temp, e));
        }
        debug!("Staged {} bytes at {}", file.content.len(), temp.display());
        staged.push((temp, file.path));
    }

    for (index, (temp, path)) in staged.iter().enumerate() {
        if let Err(e) = tokio::fs::rename(temp, path).await {
            remove_staged(&staged[index..]).await;
            return Err(AppError::output_write(*path, e));
        }
        info!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_keeps_extension() {
        assert_eq!(
            temp_path(Path::new("lib/iptv.m3u")),
            PathBuf::from("lib/iptv.m3u.tmp")
        );
    }

    #[tokio::test]
    async fn test_writes_and_replaces() {
        let dir = TempDir::new().unwrap();
        let m3u = dir.path().join("out/iptv.m3u");
        let txt = dir.path().join("out/iptv.txt");
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(&m3u, "old").unwrap();

        write_outputs(&[OutputFile::new(&m3u, "#EXTM3U\n"), OutputFile::new(&txt, "News,#genre#\n")])
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&m3u).unwrap(), "#EXTM3U\n");
        assert_eq!(std::fs::read_to_string(&txt).unwrap(), "News,#genre#\n");
        assert!(!temp_path(&m3u).exists());
        assert!(!temp_path(&txt).exists());
    }

    #[tokio::test]
    async fn test_failure_leaves_previous_outputs() {
        let dir = TempDir::new().unwrap();
        let m3u = dir.path().join("iptv.m3u");
        std::fs::write(&m3u, "previous").unwrap();

        // A regular file where a parent directory is needed
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let txt = blocker.join("iptv.txt");

        let err = write_outputs(&[OutputFile::new(&m3u, "new"), OutputFile::new(&txt, "new")])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OutputWrite { .. }));
        assert_eq!(std::fs::read_to_string(&m3u).unwrap(), "previous");
        assert!(!temp_path(&m3u).exists());
    }
}
