use async_trait::async_trait;

use crate::errors::SacmResult;
use crate::models::artifact::ArtifactFile;

/// Durable storage boundary for passed artifacts. A commit is
/// all-or-nothing from the coordinator's perspective: either every file
/// lands or none do.
#[async_trait]
pub trait ArtifactVault: Send + Sync {
    /// Atomically commit the given artifact files for a task.
    /// Returns false when the vault declines the commit.
    async fn commit(&self, task_id: &str, files: &[ArtifactFile]) -> SacmResult<bool>;
}
