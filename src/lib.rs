pub mod cli;
pub mod config;
pub mod errors;
pub mod implementations;
pub mod models;
pub mod traits;
#[cfg(test)]
pub mod tests;

// Re-export core components
pub use config::{IndexConfig, RetryPolicy, SacmConfig};
pub use errors::{SacmError, SacmResult};
pub use implementations::audit::SecurityAuditor;
pub use implementations::coordinator::{AdvanceOutcome, PipelineCoordinator, RoleSet};
pub use implementations::retrieval::{HttpIndexClient, RetrievalService};
pub use implementations::schema_registry::SchemaRegistry;
pub use implementations::vault::FilesystemVault;
pub use models::{
    artifact::{Artifact, ArtifactFile, ComponentImplementation, Documentation, SourceFile},
    blueprint::{
        ArchitectureBlueprint,
        ComponentCategory,
        ComponentInterface,
        MethodSignature,
        ModelDefinition,
    },
    common::{ArtifactKind, RoleKind, Stage, TaskStatus},
    report::{ComplianceReport, ComplianceStatus, Finding, FindingCategory, Severity},
    retrieval::RetrievalChunk,
    task::{StageEvent, StageEventKind, Task},
    validation::{FieldError, ValidationResult},
};
pub use traits::{ArtifactVault, IndexClient, RetrievalError, RoleAgent, StageInput};
