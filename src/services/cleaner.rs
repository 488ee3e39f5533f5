use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("failed to remove {}: {source}", .path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Best-effort deletion of request-scoped files.
///
/// Missing files are fine; any other failure is logged and swallowed, since
/// by the time cleanup runs the response has already been committed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCleaner;

impl FileCleaner {
    pub fn cleanup<P: AsRef<Path>>(&self, paths: &[P]) {
        for path in paths {
            if let Err(e) = Self::remove(path.as_ref()) {
                tracing::warn!("🧹 {}", e);
            }
        }
    }

    /// Removes a scratch directory and everything in it.
    pub fn cleanup_dir(&self, dir: &Path) {
        match std::fs::remove_dir_all(dir) {
            Ok(()) => tracing::debug!("Removed scratch dir {}", dir.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "🧹 {}",
                CleanupError {
                    path: dir.to_path_buf(),
                    source: e,
                }
            ),
        }
    }

    fn remove(path: &Path) -> Result<(), CleanupError> {
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::debug!("Removed temporary file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CleanupError {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

/// Owns every file a request creates and releases them exactly once on drop.
///
/// Whoever holds the guard decides when cleanup happens: the pipeline while
/// stages run, then the response body stream until it is closed.
#[derive(Debug, Default)]
pub struct TempFiles {
    paths: Vec<PathBuf>,
    cleaner: FileCleaner,
}

impl TempFiles {
    pub fn new(cleaner: FileCleaner) -> Self {
        Self {
            paths: Vec::new(),
            cleaner,
        }
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Stops tracking without deleting anything and hands the paths back.
    pub fn disarm(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        let paths = std::mem::take(&mut self.paths);
        if paths.is_empty() {
            return;
        }
        self.cleaner.cleanup(&paths);
        tracing::debug!("🧹 Released {} temporary file(s)", paths.len());
    }
}

/// Per-call working directory, removed with its contents on drop.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
    cleaner: FileCleaner,
}

impl ScratchDir {
    pub async fn create(path: PathBuf, cleaner: FileCleaner) -> std::io::Result<Self> {
        tokio::fs::create_dir(&path).await?;
        Ok(Self { path, cleaner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        self.cleaner.cleanup_dir(&self.path);
    }
}
