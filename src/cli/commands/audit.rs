use anyhow::{anyhow, Result};
use std::fs;
use std::path::Path;

use crate::cli::ui;
use crate::config::SacmConfig;
use crate::implementations::audit::SecurityAuditor;
use crate::models::report::ComplianceStatus;

/// Security audit command
pub fn execute(config: &SacmConfig, root: Option<&Path>, output: Option<&Path>) -> Result<()> {
    ui::print_header("Security Audit");

    let scan_root = root.unwrap_or(&config.scan_root);
    if !scan_root.exists() {
        return Err(anyhow!("Scan root {} does not exist", scan_root.display()));
    }

    let spinner = ui::create_spinner(&format!("Scanning {}...", scan_root.display()));
    let auditor = SecurityAuditor::new();
    let report = auditor.audit(scan_root);
    spinner.finish_and_clear();

    ui::print_compliance_report(&report);

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(output_path, json)
            .map_err(|e| anyhow!("Failed to write report to {}: {}", output_path.display(), e))?;
        ui::print_info(&format!("Report written to {}", output_path.display()));
    }

    if report.status == ComplianceStatus::Fail {
        std::process::exit(1);
    }

    Ok(())
}
