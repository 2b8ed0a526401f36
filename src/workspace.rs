//! Request-scoped temporary storage.
//!
//! Every file a request creates (the upload and each compression output)
//! lives inside one [`RequestWorkspace`] directory. Dropping the workspace
//! removes the directory, so cleanup happens on every exit path.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

/// Prefix for workspace directory names.
const WORKSPACE_PREFIX: &str = "pdf-shrink-";

/// File name of the stored upload inside a workspace.
pub const UPLOAD_FILE_NAME: &str = "upload.pdf";

/// A temporary directory owned by a single request.
#[derive(Debug)]
pub struct RequestWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl RequestWorkspace {
    /// Create a workspace under `root`, or under the system temp dir when
    /// `root` is `None`.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);

        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "Created request workspace");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    /// Root directory of this workspace.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path for a file named `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Path where the uploaded document is stored.
    pub fn upload_path(&self) -> PathBuf {
        self.file(UPLOAD_FILE_NAME)
    }

    /// Remove the workspace on the blocking pool.
    ///
    /// Dropping removes the directory on the current thread; inside the
    /// runtime prefer this once the workspace may hold full-size outputs.
    pub async fn remove(self) {
        let path = self.path.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || drop(self)).await {
            warn!(path = %path.display(), "Workspace removal task failed: {}", e);
        }
    }
}

impl Drop for RequestWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(path = %self.path.display(), "Removed request workspace"),
                Err(e) => warn!(
                    path = %self.path.display(),
                    "Failed to remove request workspace: {}",
                    e
                ),
            }
        }
    }
}
