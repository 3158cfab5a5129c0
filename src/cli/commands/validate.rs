use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

use crate::cli::ui;
use crate::implementations::schema_registry::SchemaRegistry;
use crate::models::common::Stage;

/// Stage-payload validation command
pub fn execute(stage_str: Option<&str>, payload_path: &Path) -> Result<()> {
    ui::print_header("Validating Stage Payload");

    let stage = match stage_str {
        Some(s) => parse_stage(s)?,
        None => ui::select_stage()?,
    };

    ui::print_info(&format!("Stage: {}", stage));
    ui::print_info(&format!("Payload: {}", payload_path.display()));

    let content = fs::read_to_string(payload_path)
        .map_err(|e| anyhow!("Failed to read payload file: {}", e))?;
    let payload: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| anyhow!("Payload is not valid JSON: {}", e))?;

    let registry = SchemaRegistry::new();
    let result = registry.validate(stage, &payload)?;

    if result.is_pass() {
        ui::print_success("Payload conforms to the stage's artifact schema.");
    } else {
        ui::print_error(&format!(
            "Payload failed validation with {} error(s):",
            result.errors.len()
        ));
        ui::print_field_errors(&result.errors);
        std::process::exit(1);
    }

    Ok(())
}

fn parse_stage(s: &str) -> Result<Stage> {
    match s.to_lowercase().as_str() {
        "architecture" => Ok(Stage::Architecture),
        "implementation" => Ok(Stage::Implementation),
        "security-audit" | "securityaudit" | "security" => Ok(Stage::SecurityAudit),
        "documentation" | "docs" => Ok(Stage::Documentation),
        other => Err(anyhow!(
            "Unknown stage '{}'. Stages with artifact schemas: architecture, implementation, security-audit, documentation",
            other
        )),
    }
}
