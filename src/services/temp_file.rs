//! Scoped temp-file guard for staged uploads
//!
//! An inbound image is staged to local disk before being forwarded to the
//! media store. `TempUpload` owns that staging file and guarantees its
//! removal on every exit path: the pipeline calls `remove()` right after the
//! upload attempt, and `Drop` covers early returns (validation failures,
//! missing records). Removal failures are logged, never surfaced.

use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    removed: bool,
}

impl TempUpload {
    /// Stage upload bytes into `dir` under a fresh UUID filename, keeping
    /// the original extension so the media client sees a sensible name.
    pub async fn stage(
        dir: &Path,
        original_name: &str,
        data: &[u8],
    ) -> std::io::Result<TempUpload> {
        tokio::fs::create_dir_all(dir).await?;

        let extension = Path::new(original_name)
            .extension()
            .map(|e| e.to_string_lossy().into_owned());
        let file_name = match extension {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = dir.join(file_name);
        tokio::fs::write(&path, data).await?;

        Ok(TempUpload {
            path,
            removed: false,
        })
    }

    /// Adopt an existing file; used by tests.
    pub fn from_path(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the staging file now. Best-effort: failures are logged and
    /// swallowed so cleanup never fails the surrounding request.
    pub async fn remove(mut self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "Failed to remove temp upload");
        }
        self.removed = true;
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if !self.removed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "Failed to remove temp upload");
                }
            }
        }
    }
}
