use thiserror::Error;

use crate::models::common::Stage;

/// Custom error types for the SACM pipeline core.
///
/// Schema non-conformance is not represented here: validation failures
/// are data (a `ValidationResult`) routed back to the producing role,
/// never raised as errors.
#[derive(Debug, Error)]
pub enum SacmError {
    /// Pipeline wiring defect: unknown stage schema, missing role,
    /// unusable configuration. Fatal to the pipeline, not to a task.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Stage {0} has no artifact schema")]
    NoSchemaForStage(Stage),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task {0} already exists")]
    DuplicateTask(String),

    #[error("Task {task_id}: {message}")]
    TaskState { task_id: String, message: String },

    #[error("Vault refused commit for task {task_id}: {message}")]
    Vault { task_id: String, message: String },

    #[error("Role {role} failed to produce output: {message}")]
    RoleFailure { role: String, message: String },

    #[error("System error: {0}")]
    System(String),
}

/// Result type specific to SACM operations
pub type SacmResult<T> = Result<T, SacmError>;
