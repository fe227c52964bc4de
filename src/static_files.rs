use crate::error::{ServerError, ServerResult};
use log::warn;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs::{self, File};

/// Filesystem access for the /files/ routes.
///
/// Every name is resolved under a single serving directory. Names with any
/// path component other than a plain name or `.` (a root, a drive prefix or
/// `..`) are refused with [`ServerError::Forbidden`]. Separators follow the
/// host platform, so a backslash is an ordinary character on Unix.
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    root: Option<PathBuf>,
}

impl FileStore {
    /// Create a store rooted at `root`; `None` leaves every lookup failing
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    /// Map a request name to a path inside the serving directory
    fn resolve(&self, name: &str) -> ServerResult<Option<PathBuf>> {
        let confined = Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            return Err(ServerError::Forbidden(name.to_string()));
        }
        Ok(self.root.as_ref().map(|root| root.join(name)))
    }

    /// Open a regular file for reading, returning the handle and its size
    pub async fn open(&self, name: &str) -> ServerResult<(File, u64)> {
        let path = self
            .resolve(name)?
            .ok_or_else(|| ServerError::FileNotFound(name.to_string()))?;

        let file = File::open(&path)
            .await
            .map_err(|_| ServerError::FileNotFound(name.to_string()))?;

        let metadata = file.metadata().await.map_err(|source| ServerError::FileStat {
            name: name.to_string(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(ServerError::FileNotFound(name.to_string()));
        }

        Ok((file, metadata.len()))
    }

    /// Create or truncate a file for writing
    pub async fn create(&self, name: &str) -> ServerResult<File> {
        let path = self.resolve(name)?.ok_or_else(|| ServerError::FileCreate {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no serving directory configured"),
        })?;

        File::create(&path).await.map_err(|source| ServerError::FileCreate {
            name: name.to_string(),
            source,
        })
    }

    /// Remove a file left behind by a failed upload
    pub async fn discard(&self, name: &str) {
        if let Ok(Some(path)) = self.resolve(name) {
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Could not remove partial upload {}: {}", path.display(), e);
            }
        }
    }
}
