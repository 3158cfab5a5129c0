pub mod artifact;
pub mod blueprint;
pub mod common;
pub mod report;
pub mod retrieval;
pub mod task;
pub mod validation;

// Re-export common model types
pub use artifact::{Artifact, ArtifactFile, ComponentImplementation, Documentation, SourceFile};
pub use blueprint::{
    ArchitectureBlueprint, ComponentCategory, ComponentInterface, MethodSignature, ModelDefinition,
};
pub use common::{ArtifactKind, RoleKind, Stage, TaskStatus};
pub use report::{ComplianceReport, ComplianceStatus, Finding, FindingCategory, Severity};
pub use retrieval::RetrievalChunk;
pub use task::{StageEvent, StageEventKind, Task};
pub use validation::{FieldError, ValidationResult};
