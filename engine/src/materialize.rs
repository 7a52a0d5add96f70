//! Container-runtime file access.
//!
//! ADD/COPY materialize files out of the subject image's filesystem.
//! The trait seam keeps the translator testable; the production
//! implementation shells out to the local docker CLI.

use std::collections::HashSet;
use std::process::Command;

use async_trait::async_trait;
use parking_lot::Mutex;

use monodef_core::error::{MonodefError, Result};

use crate::reference::ImageReference;

/// Read access to files inside a container image.
#[async_trait]
pub trait ImageFileSource: Send + Sync {
    /// Fetch the bytes of the single file at `path` inside `image`.
    ///
    /// Fails with `PathIsDirectory` when the path names a directory,
    /// `NotFound` when it names nothing, and `Transport` otherwise.
    async fn fetch_file(&self, image: &ImageReference, path: &str) -> Result<Vec<u8>>;
}

/// File access backed by the local docker CLI.
///
/// Reads a file by running `cat` as the container entrypoint. Images
/// are pulled at most once per process.
pub struct DockerCli {
    /// Images already pulled by this instance
    pulled: Mutex<HashSet<String>>,
}

impl DockerCli {
    pub fn new() -> Self {
        Self {
            pulled: Mutex::new(HashSet::new()),
        }
    }

    /// Make sure the image is present locally before reading from it.
    fn ensure_pulled(&self, image: &ImageReference) -> Result<()> {
        let name = image.full_reference();
        if self.pulled.lock().contains(&name) {
            return Ok(());
        }
        tracing::info!(image = %name, "pulling image for file access");
        let status = Command::new("docker")
            .args(["pull", &name])
            .status()
            .map_err(|e| MonodefError::Transport {
                endpoint: name.clone(),
                message: format!("failed to run docker pull: {}", e),
            })?;
        if !status.success() {
            return Err(MonodefError::Transport {
                endpoint: name,
                message: format!("docker pull exited with {}", status),
            });
        }
        self.pulled.lock().insert(name);
        Ok(())
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFileSource for DockerCli {
    async fn fetch_file(&self, image: &ImageReference, path: &str) -> Result<Vec<u8>> {
        self.ensure_pulled(image)?;
        let name = image.full_reference();
        tracing::debug!(image = %name, path = %path, "reading file from image");

        let output = Command::new("docker")
            .args(["run", "--rm", "--entrypoint", "cat", &name, path])
            .output()
            .map_err(|e| MonodefError::Transport {
                endpoint: name.clone(),
                message: format!("failed to run docker: {}", e),
            })?;

        if output.status.success() {
            return Ok(output.stdout);
        }
        Err(classify_failure(
            &name,
            path,
            &String::from_utf8_lossy(&output.stderr),
        ))
    }
}

/// Map a failed `cat` invocation to an error kind.
///
/// cat's diagnostics are the only signal available, so this
/// classification is a heuristic over error text, not a guarantee.
fn classify_failure(image: &str, path: &str, stderr: &str) -> MonodefError {
    let stderr_lower = stderr.to_lowercase();
    if stderr_lower.contains("is a directory") {
        MonodefError::PathIsDirectory(path.to_string())
    } else if stderr_lower.contains("no such file") {
        MonodefError::NotFound(format!("{}:{}", image, path))
    } else {
        MonodefError::Transport {
            endpoint: image.to_string(),
            message: stderr.trim().to_string(),
        }
    }
}
