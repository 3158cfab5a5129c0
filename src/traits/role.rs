use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SacmResult;
use crate::models::common::Stage;
use crate::models::validation::FieldError;

/// Everything a role needs to produce its stage output. When the prior
/// attempt was rejected, the field errors are carried back so the role
/// can self-correct.
#[derive(Debug, Clone)]
pub struct StageInput {
    pub task_id: String,
    pub stage: Stage,
    /// The high-level task description given at submission.
    pub brief: String,
    /// The previous stage's validated artifact, as JSON.
    pub prior_artifact: Option<Value>,
    /// Retrieval context for prompt enrichment; empty when unavailable.
    pub context: String,
    /// Field errors from the last rejection of this stage, if any.
    pub rejection_errors: Vec<FieldError>,
}

/// An opaque producer for one pipeline stage. The coordinator never
/// inspects how a role produces output; it only validates the result.
/// Roles are selected by configuration, not by type hierarchy.
#[async_trait]
pub trait RoleAgent: Send + Sync {
    /// Produce the raw stage output to be validated by the registry.
    async fn produce(&self, input: &StageInput) -> SacmResult<Value>;
}
