pub mod index;
pub mod role;
pub mod vault;

// Re-export traits
pub use index::{IndexClient, RetrievalError};
pub use role::{RoleAgent, StageInput};
pub use vault::ArtifactVault;
