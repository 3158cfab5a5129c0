use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};

use crate::errors::{SacmError, SacmResult};
use crate::models::artifact::ArtifactFile;
use crate::traits::vault::ArtifactVault;

/// Vault that stores passed artifacts under `<root>/<task_id>/`.
///
/// A commit writes into a staging directory and renames it into place,
/// so a partially written commit is never observable. File names must
/// stay inside the task directory; traversal attempts are refused.
pub struct FilesystemVault {
    root: PathBuf,
}

impl FilesystemVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn contained(name: &str) -> bool {
        let path = Path::new(name);
        !path.is_absolute()
            && path
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
    }
}

#[async_trait]
impl ArtifactVault for FilesystemVault {
    async fn commit(&self, task_id: &str, files: &[ArtifactFile]) -> SacmResult<bool> {
        if !Self::contained(task_id) {
            warn!("Vault refused task id escaping the vault root: {}", task_id);
            return Ok(false);
        }
        for file in files {
            if !Self::contained(&file.name) {
                warn!(
                    "Vault refused artifact file escaping the task directory: {}",
                    file.name
                );
                return Ok(false);
            }
        }

        let staging = self.root.join(format!(".staging-{}", task_id));
        let destination = self.root.join(task_id);

        let write = || -> std::io::Result<()> {
            if staging.exists() {
                fs::remove_dir_all(&staging)?;
            }
            fs::create_dir_all(&staging)?;

            for file in files {
                let path = staging.join(&file.name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &file.content)?;
            }

            if destination.exists() {
                fs::remove_dir_all(&destination)?;
            }
            fs::rename(&staging, &destination)
        };

        match write() {
            Ok(()) => {
                info!(
                    "Committed {} file(s) for task {} to {}",
                    files.len(),
                    task_id,
                    destination.display()
                );
                Ok(true)
            }
            Err(e) => {
                // Leave nothing half-committed behind.
                let _ = fs::remove_dir_all(&staging);
                Err(SacmError::Vault {
                    task_id: task_id.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
