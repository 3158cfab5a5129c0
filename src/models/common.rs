use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stages, in their fixed execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Intake,
    Architecture,
    Implementation,
    SecurityAudit,
    Documentation,
    Complete,
}

impl Stage {
    /// The stage that follows this one in the fixed sequence.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Intake => Some(Stage::Architecture),
            Stage::Architecture => Some(Stage::Implementation),
            Stage::Implementation => Some(Stage::SecurityAudit),
            Stage::SecurityAudit => Some(Stage::Documentation),
            Stage::Documentation => Some(Stage::Complete),
            Stage::Complete => None,
        }
    }

    /// The artifact variant a stage must produce to advance.
    /// Intake and Complete carry no artifact schema.
    pub fn expected_artifact(&self) -> Option<ArtifactKind> {
        match self {
            Stage::Intake | Stage::Complete => None,
            Stage::Architecture => Some(ArtifactKind::Blueprint),
            Stage::Implementation => Some(ArtifactKind::Implementation),
            Stage::SecurityAudit => Some(ArtifactKind::ComplianceReport),
            Stage::Documentation => Some(ArtifactKind::Documentation),
        }
    }

    /// The role responsible for producing this stage's output.
    pub fn responsible_role(&self) -> RoleKind {
        match self {
            Stage::Intake => RoleKind::Ceo,
            Stage::Architecture => RoleKind::Architect,
            Stage::Implementation => RoleKind::Developer,
            Stage::SecurityAudit => RoleKind::SecurityOfficer,
            Stage::Documentation => RoleKind::DocumentationWriter,
            Stage::Complete => RoleKind::DocumentVault,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Intake => "Intake",
            Stage::Architecture => "Architecture",
            Stage::Implementation => "Implementation",
            Stage::SecurityAudit => "SecurityAudit",
            Stage::Documentation => "Documentation",
            Stage::Complete => "Complete",
        };
        write!(f, "{}", name)
    }
}

/// The roles the coordinator can dispatch a stage to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleKind {
    Ceo,
    Architect,
    Developer,
    SecurityOfficer,
    DocumentationWriter,
    DocumentVault,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoleKind::Ceo => "CEO",
            RoleKind::Architect => "Architect",
            RoleKind::Developer => "Developer",
            RoleKind::SecurityOfficer => "SecurityOfficer",
            RoleKind::DocumentationWriter => "DocumentationWriter",
            RoleKind::DocumentVault => "DocumentVault",
        };
        write!(f, "{}", name)
    }
}

/// Artifact variants known to the schema registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    Blueprint,
    Implementation,
    ComplianceReport,
    Documentation,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Blueprint => "Blueprint",
            ArtifactKind::Implementation => "Implementation",
            ArtifactKind::ComplianceReport => "ComplianceReport",
            ArtifactKind::Documentation => "Documentation",
        };
        write!(f, "{}", name)
    }
}

/// Task lifecycle status. Rejected is non-terminal; Passed and Failed
/// are terminal and archive the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Rejected,
    Passed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Passed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Rejected => "Rejected",
            TaskStatus::Passed => "Passed",
            TaskStatus::Failed => "Failed",
        };
        write!(f, "{}", name)
    }
}
