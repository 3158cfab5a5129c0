use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single method or function signature within a component interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name (e.g. "authenticate_user").
    pub name: String,
    /// Argument names mapped to their type hints, in declaration order.
    pub arguments: BTreeMap<String, String>,
    /// Return type hint (e.g. "bool" or "UserSchema").
    pub return_type: String,
    /// Single-paragraph description of the method's purpose.
    pub description: String,
}

/// High-level category of a component interface. Closed set; the
/// registry rejects anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentCategory {
    Service,
    Utility,
    AgentTool,
}

impl ComponentCategory {
    /// Interfaces that do not say otherwise are services.
    pub fn default_category() -> Self {
        ComponentCategory::Service
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Service" => Some(ComponentCategory::Service),
            "Utility" => Some(ComponentCategory::Utility),
            "AgentTool" => Some(ComponentCategory::AgentTool),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentCategory::Service => "Service",
            ComponentCategory::Utility => "Utility",
            ComponentCategory::AgentTool => "AgentTool",
        };
        write!(f, "{}", name)
    }
}

/// The contract for one functional class or service component the
/// developer role must implement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInterface {
    #[serde(default = "ComponentCategory::default_category")]
    pub component_type: ComponentCategory,
    /// Exact class name to be implemented (e.g. "AuthService").
    pub class_name: String,
    /// Classes this component must inherit from or compose over.
    #[serde(default)]
    pub base_classes: Vec<String>,
    pub methods: Vec<MethodSignature>,
    pub description: String,
}

/// A single data model definition within a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Exact model name (e.g. "UserSchema").
    pub model_name: String,
    /// Field names mapped to their type hints.
    pub fields: BTreeMap<String, String>,
    pub description: String,
}

/// The architecture-stage artifact: all specifications for a single
/// development task, handed from the architect to the developer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureBlueprint {
    /// Unique identifier for the development task (e.g. "AUTH-V1-01").
    pub task_id: String,
    /// Name of the module or feature being built.
    pub component_name: String,
    #[serde(default)]
    pub models: Vec<ModelDefinition>,
    #[serde(default)]
    pub interfaces: Vec<ComponentInterface>,
}
