pub mod audit;
pub mod coordinator;
pub mod retrieval;
pub mod schema_registry;
pub mod vault;

pub use audit::SecurityAuditor;
pub use coordinator::{AdvanceOutcome, PipelineCoordinator, RoleSet};
pub use retrieval::{HttpIndexClient, RetrievalService};
pub use schema_registry::SchemaRegistry;
pub use vault::FilesystemVault;
