use serde::{Deserialize, Serialize};

use crate::models::blueprint::ArchitectureBlueprint;
use crate::models::common::ArtifactKind;
use crate::models::report::ComplianceReport;

/// One source file produced by the developer role. Paths are relative
/// to the component root; the vault refuses anything that escapes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

/// The implementation-stage artifact: the files realizing a blueprint's
/// interfaces, plus the developer's notes for the reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentImplementation {
    pub component_name: String,
    pub files: Vec<SourceFile>,
    #[serde(default)]
    pub notes: String,
}

/// The documentation-stage artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Documentation {
    pub component_name: String,
    pub design_summary: String,
    pub api_reference: String,
    #[serde(default)]
    pub usage_examples: Vec<String>,
}

/// A named file rendered from an artifact for the vault commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub name: String,
    pub content: String,
}

/// A stage's validated output. An Artifact is only ever constructed
/// from a payload that passed schema validation for its stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Artifact {
    Blueprint(ArchitectureBlueprint),
    Implementation(ComponentImplementation),
    ComplianceReport(ComplianceReport),
    Documentation(Documentation),
}

impl Artifact {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Artifact::Blueprint(_) => ArtifactKind::Blueprint,
            Artifact::Implementation(_) => ArtifactKind::Implementation,
            Artifact::ComplianceReport(_) => ArtifactKind::ComplianceReport,
            Artifact::Documentation(_) => ArtifactKind::Documentation,
        }
    }

    /// Render this artifact into the files a vault commit stores.
    /// Implementations contribute their source files alongside the
    /// artifact record itself.
    pub fn files(&self) -> Vec<ArtifactFile> {
        let record_name = match self {
            Artifact::Blueprint(_) => "blueprint.json",
            Artifact::Implementation(_) => "implementation.json",
            Artifact::ComplianceReport(_) => "compliance_report.json",
            Artifact::Documentation(_) => "documentation.json",
        };

        let mut files = Vec::new();
        if let Ok(content) = serde_json::to_string_pretty(self) {
            files.push(ArtifactFile {
                name: record_name.to_string(),
                content,
            });
        }

        if let Artifact::Implementation(imp) = self {
            for source in &imp.files {
                files.push(ArtifactFile {
                    name: source.path.clone(),
                    content: source.content.clone(),
                });
            }
        }

        files
    }
}
