use colored::*;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use textwrap::wrap;

use crate::models::common::Stage;
use crate::models::report::{ComplianceReport, ComplianceStatus};
use crate::models::validation::FieldError;

/// UI theme for consistent appearance
pub fn get_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

/// Print a section header
pub fn print_header(title: &str) {
    let title = format!(" {} ", title);
    println!("\n{}\n", title.bold().white().on_blue());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "ERROR:".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "WARNING:".yellow().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "SUCCESS:".green().bold(), message);
}

/// Print information
pub fn print_info(message: &str) {
    println!("{} {}", "INFO:".blue().bold(), message);
}

/// Print a formatted result
pub fn print_result(label: &str, value: &str) {
    println!("{}: {}", label.bold(), value);
}

/// Spinner for long-running scans and queries
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print itemized validation errors, one line per field
pub fn print_field_errors(errors: &[FieldError]) {
    for error in errors {
        println!(
            "  {} {} (expected {}, received {})",
            "✗".red().bold(),
            error.path.bold(),
            error.expected,
            error.received
        );
    }
}

/// Print a compliance report with colored status and wrapped messages
pub fn print_compliance_report(report: &ComplianceReport) {
    let status_line = match report.status {
        ComplianceStatus::Pass => "✓ PASS".green().bold(),
        ComplianceStatus::Fail => "✗ FAIL".red().bold(),
    };
    println!("Status: {}", status_line);
    println!("Scanned: {}", report.scanned_root.display());

    if report.findings.is_empty() {
        println!("{}", "No security issues detected.".green());
        return;
    }

    let width = Term::stdout().size().1 as usize;
    println!("Findings ({}):", report.findings.len());
    for finding in &report.findings {
        println!(
            "  [{}] {} at {}",
            finding.severity.to_string().yellow(),
            finding.category,
            finding.location.bold()
        );
        for line in wrap(&finding.message, width.saturating_sub(10)) {
            println!("      {}", line);
        }
    }
}

/// Interactive selection of a pipeline stage with an artifact schema
pub fn select_stage() -> dialoguer::Result<Stage> {
    let stages = [
        Stage::Architecture,
        Stage::Implementation,
        Stage::SecurityAudit,
        Stage::Documentation,
    ];
    let labels: Vec<String> = stages.iter().map(|stage| stage.to_string()).collect();

    let selection = Select::with_theme(&get_theme())
        .with_prompt("Select the stage to validate against")
        .items(&labels)
        .default(0)
        .interact_on(&Term::stdout())?;

    Ok(stages[selection])
}
