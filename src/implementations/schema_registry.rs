use log::debug;
use serde_json::Value;

use crate::errors::{SacmError, SacmResult};
use crate::models::artifact::Artifact;
use crate::models::blueprint::ComponentCategory;
use crate::models::common::{ArtifactKind, Stage};
use crate::models::report::{ComplianceReport, ComplianceStatus};
use crate::models::validation::{FieldError, ValidationResult};

/// Typed contracts for every inter-role handoff. One validator per
/// artifact variant; each collects every violation in a single pass so
/// the producing role sees the full list, not just the first failure.
#[derive(Debug, Default)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw stage payload against the stage's artifact schema.
    ///
    /// Bad data never produces an `Err`, only a failing
    /// `ValidationResult`. An `Err` here means the pipeline itself is
    /// miswired: the stage has no artifact schema at all.
    pub fn validate(&self, stage: Stage, payload: &Value) -> SacmResult<ValidationResult> {
        let kind = stage
            .expected_artifact()
            .ok_or(SacmError::NoSchemaForStage(stage))?;

        debug!("Validating {} payload for stage {}", kind, stage);

        let errors = match kind {
            ArtifactKind::Blueprint => validate_blueprint(payload),
            ArtifactKind::Implementation => validate_implementation(payload),
            ArtifactKind::ComplianceReport => validate_compliance_report(payload),
            ArtifactKind::Documentation => validate_documentation(payload),
        };

        if errors.is_empty() {
            Ok(ValidationResult::pass())
        } else {
            Ok(ValidationResult::fail(errors))
        }
    }

    /// Deserialize a payload into its typed artifact. Call only after a
    /// passing `validate`; a failure here is an internal inconsistency,
    /// not a data problem.
    pub fn parse_artifact(&self, stage: Stage, payload: Value) -> SacmResult<Artifact> {
        let kind = stage
            .expected_artifact()
            .ok_or(SacmError::NoSchemaForStage(stage))?;

        let artifact = match kind {
            ArtifactKind::Blueprint => serde_json::from_value(payload).map(Artifact::Blueprint),
            ArtifactKind::Implementation => {
                serde_json::from_value(payload).map(Artifact::Implementation)
            }
            ArtifactKind::ComplianceReport => {
                serde_json::from_value::<ComplianceReport>(payload).map(Artifact::ComplianceReport)
            }
            ArtifactKind::Documentation => {
                serde_json::from_value(payload).map(Artifact::Documentation)
            }
        };

        artifact.map_err(|e| {
            SacmError::System(format!(
                "validated {} payload failed to deserialize: {}",
                kind, e
            ))
        })
    }
}

/// Short type name for a JSON value, used in error messages.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering of a received value, truncated so error lists stay
/// readable (and never echo a whole payload back).
fn render(value: &Value) -> String {
    let s = value.to_string();
    match s.char_indices().nth(45) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s,
    }
}

fn require_string<'a>(
    obj: &'a serde_json::Map<String, Value>,
    path: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    let full = join_path(path, field);
    match obj.get(field) {
        None => {
            errors.push(FieldError::new(full, "string", "missing"));
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(other) => {
            errors.push(FieldError::new(full, "string", type_name(other)));
            None
        }
    }
}

fn require_array<'a>(
    obj: &'a serde_json::Map<String, Value>,
    path: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a [Value]> {
    let full = join_path(path, field);
    match obj.get(field) {
        None => {
            errors.push(FieldError::new(full, "array", "missing"));
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            errors.push(FieldError::new(full, "array", type_name(other)));
            None
        }
    }
}

/// Optional array: absent is fine, present-but-not-array is not.
fn optional_array<'a>(
    obj: &'a serde_json::Map<String, Value>,
    path: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a [Value]> {
    match obj.get(field) {
        None => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            errors.push(FieldError::new(
                join_path(path, field),
                "array",
                type_name(other),
            ));
            None
        }
    }
}

/// A mapping of names to type-hint strings, e.g. blueprint fields and
/// method arguments.
fn require_string_map(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) {
    let full = join_path(path, field);
    match obj.get(field) {
        None => errors.push(FieldError::new(full, "mapping of string to string", "missing")),
        Some(Value::Object(map)) => {
            for (key, value) in map {
                if !value.is_string() {
                    errors.push(FieldError::new(
                        format!("{}.{}", full, key),
                        "string",
                        type_name(value),
                    ));
                }
            }
        }
        Some(other) => errors.push(FieldError::new(
            full,
            "mapping of string to string",
            type_name(other),
        )),
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            errors.push(FieldError::new(path, "object", type_name(other)));
            None
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Architecture blueprint: task identity plus model definitions and
/// component interfaces, as handed to the developer role.
fn validate_blueprint(payload: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let Some(root) = expect_object(payload, "", &mut errors) else {
        return errors;
    };

    require_string(root, "", "task_id", &mut errors);
    require_string(root, "", "component_name", &mut errors);

    if let Some(models) = optional_array(root, "", "models", &mut errors) {
        for (i, model) in models.iter().enumerate() {
            let path = format!("models[{}]", i);
            let Some(obj) = expect_object(model, &path, &mut errors) else {
                continue;
            };
            require_string(obj, &path, "model_name", &mut errors);
            require_string_map(obj, &path, "fields", &mut errors);
            require_string(obj, &path, "description", &mut errors);
        }
    }

    if let Some(interfaces) = optional_array(root, "", "interfaces", &mut errors) {
        for (i, interface) in interfaces.iter().enumerate() {
            let path = format!("interfaces[{}]", i);
            let Some(obj) = expect_object(interface, &path, &mut errors) else {
                continue;
            };

            // component_type defaults to Service when absent; when
            // present it must be a member of the category set.
            if let Some(value) = obj.get("component_type") {
                match value.as_str() {
                    Some(s) if ComponentCategory::parse(s).is_some() => {}
                    Some(s) => errors.push(FieldError::new(
                        join_path(&path, "component_type"),
                        "one of Service, Utility, AgentTool",
                        s,
                    )),
                    None => errors.push(FieldError::new(
                        join_path(&path, "component_type"),
                        "one of Service, Utility, AgentTool",
                        type_name(value),
                    )),
                }
            }

            require_string(obj, &path, "class_name", &mut errors);
            require_string(obj, &path, "description", &mut errors);

            if let Some(methods) = require_array(obj, &path, "methods", &mut errors) {
                for (j, method) in methods.iter().enumerate() {
                    let method_path = format!("{}.methods[{}]", path, j);
                    let Some(m) = expect_object(method, &method_path, &mut errors) else {
                        continue;
                    };
                    require_string(m, &method_path, "name", &mut errors);
                    require_string_map(m, &method_path, "arguments", &mut errors);
                    require_string(m, &method_path, "return_type", &mut errors);
                    require_string(m, &method_path, "description", &mut errors);
                }
            }
        }
    }

    errors
}

/// Component implementation: the source files realizing a blueprint.
fn validate_implementation(payload: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let Some(root) = expect_object(payload, "", &mut errors) else {
        return errors;
    };

    require_string(root, "", "component_name", &mut errors);

    if let Some(files) = require_array(root, "", "files", &mut errors) {
        for (i, file) in files.iter().enumerate() {
            let path = format!("files[{}]", i);
            let Some(obj) = expect_object(file, &path, &mut errors) else {
                continue;
            };
            require_string(obj, &path, "path", &mut errors);
            require_string(obj, &path, "content", &mut errors);
        }
    }

    if let Some(notes) = root.get("notes") {
        if !notes.is_string() {
            errors.push(FieldError::new("notes", "string", type_name(notes)));
        }
    }

    errors
}

const FINDING_CATEGORIES: [&str; 2] = ["TrackedSecretFile", "HardcodedKey"];
const SEVERITIES: [&str; 3] = ["High", "Medium", "Low"];

/// Security compliance report: overall status plus itemized findings.
fn validate_compliance_report(payload: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let Some(root) = expect_object(payload, "", &mut errors) else {
        return errors;
    };

    match root.get("status") {
        None => errors.push(FieldError::new("status", "one of pass, fail", "missing")),
        Some(Value::String(s)) if ComplianceStatus::parse(s).is_some() => {}
        Some(other) => errors.push(FieldError::new(
            "status",
            "one of pass, fail",
            render(other),
        )),
    }

    require_string(root, "", "scanned_root", &mut errors);
    require_string(root, "", "generated_at", &mut errors);

    if let Some(findings) = require_array(root, "", "findings", &mut errors) {
        for (i, finding) in findings.iter().enumerate() {
            let path = format!("findings[{}]", i);
            let Some(obj) = expect_object(finding, &path, &mut errors) else {
                continue;
            };

            validate_membership(obj, &path, "category", &FINDING_CATEGORIES, &mut errors);
            validate_membership(obj, &path, "severity", &SEVERITIES, &mut errors);
            require_string(obj, &path, "location", &mut errors);
            require_string(obj, &path, "message", &mut errors);

            if let Some(ct) = obj.get("credential_type") {
                if !ct.is_string() && !ct.is_null() {
                    errors.push(FieldError::new(
                        join_path(&path, "credential_type"),
                        "string or null",
                        type_name(ct),
                    ));
                }
            }
        }
    }

    errors
}

fn validate_membership(
    obj: &serde_json::Map<String, Value>,
    path: &str,
    field: &str,
    allowed: &[&str],
    errors: &mut Vec<FieldError>,
) {
    let expected = format!("one of {}", allowed.join(", "));
    let full = join_path(path, field);
    match obj.get(field) {
        None => errors.push(FieldError::new(full, expected, "missing")),
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
        Some(other) => errors.push(FieldError::new(full, expected, render(other))),
    }
}

/// Documentation artifact for a completed component.
fn validate_documentation(payload: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let Some(root) = expect_object(payload, "", &mut errors) else {
        return errors;
    };

    require_string(root, "", "component_name", &mut errors);
    require_string(root, "", "design_summary", &mut errors);
    require_string(root, "", "api_reference", &mut errors);

    if let Some(examples) = optional_array(root, "", "usage_examples", &mut errors) {
        for (i, example) in examples.iter().enumerate() {
            if !example.is_string() {
                errors.push(FieldError::new(
                    format!("usage_examples[{}]", i),
                    "string",
                    type_name(example),
                ));
            }
        }
    }

    errors
}
