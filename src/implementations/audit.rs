use std::fs;
use std::path::Path;

use log::{debug, info};
use regex::Regex;

use crate::models::report::{ComplianceReport, Finding, FindingCategory, Severity};

/// Markers whose presence anywhere in a file marks its pattern matches
/// as placeholders rather than live credentials.
const PLACEHOLDER_MARKERS: [&str; 4] = ["example", "placeholder", "your_", "change"];

/// Environment-file name suffixes that are templates, not secrets.
const TEMPLATE_SUFFIXES: [&str; 3] = [".example", ".sample", ".template"];

/// Longest match preview included in a finding. The full secret is
/// never reported.
const PREVIEW_LEN: usize = 20;

/// Credential-shape patterns, checked in order. Vendor prefixes first,
/// then the generic high-entropy fallback.
fn credential_patterns() -> Vec<(Regex, &'static str, Severity)> {
    let raw: [(&str, &str, Severity); 6] = [
        (r"sk_live_[a-zA-Z0-9]{24,}", "Stripe Live Key", Severity::High),
        (r"sk_test_[a-zA-Z0-9]{24,}", "Stripe Test Key", Severity::Medium),
        (r"pk_live_[a-zA-Z0-9]{24,}", "Stripe Publishable Key", Severity::Medium),
        (
            r"SG\.[a-zA-Z0-9_-]{22}\.[a-zA-Z0-9_-]{43}",
            "SendGrid API Key",
            Severity::High,
        ),
        (r"AC[a-z0-9]{32}", "Twilio Account SID", Severity::Medium),
        (
            r"\b[a-zA-Z0-9]{32}\b",
            "Generic 32-char key (potential)",
            Severity::Low,
        ),
    ];

    raw.iter()
        .map(|(pattern, label, severity)| {
            // The pattern set is fixed and known-valid.
            (Regex::new(pattern).unwrap(), *label, *severity)
        })
        .collect()
}

/// True when the file's content contains an obvious placeholder marker.
///
/// The check is deliberately whole-file, matching the established
/// behaviour: a file explaining what a key looks like should not fail
/// the audit because of its illustration.
pub fn has_placeholder_marker(content: &str) -> bool {
    let lowered = content.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

/// Scans a source tree for policy violations: tracked secret files and
/// hardcoded credentials. Advisory and local to its scan root; it never
/// walks outside the root it was given.
pub struct SecurityAuditor {
    patterns: Vec<(Regex, &'static str, Severity)>,
}

impl Default for SecurityAuditor {
    fn default() -> Self {
        Self::new()
    }
}

impl SecurityAuditor {
    pub fn new() -> Self {
        Self {
            patterns: credential_patterns(),
        }
    }

    /// Run both checks over the scan root and aggregate the findings.
    /// Individual unreadable files are skipped; they never abort the
    /// scan and are not findings themselves.
    pub fn audit(&self, scan_root: &Path) -> ComplianceReport {
        info!("Running security audit over {}", scan_root.display());

        let mut findings = Vec::new();
        findings.extend(self.find_tracked_env_files(scan_root));
        findings.extend(self.scan_for_hardcoded_keys(scan_root));

        let report = ComplianceReport::from_findings(scan_root.to_path_buf(), findings);
        info!(
            "Security audit complete: {} ({} finding(s))",
            report.status,
            report.findings.len()
        );
        report
    }

    /// Check 1: environment-definition files at the project root that
    /// are not template variants.
    fn find_tracked_env_files(&self, scan_root: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();

        for entry in sorted_entries(scan_root) {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(".env") {
                continue;
            }
            if TEMPLATE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
                continue;
            }
            if !entry.path().is_file() {
                continue;
            }

            findings.push(Finding {
                category: FindingCategory::TrackedSecretFile,
                severity: Severity::High,
                location: name.clone(),
                message: format!(
                    "Environment file {} present at project root; it should not be tracked",
                    name
                ),
                credential_type: None,
            });
        }

        findings
    }

    /// Check 2: recursive scan of text files for credential-shaped
    /// literals, with whole-file placeholder suppression.
    fn scan_for_hardcoded_keys(&self, scan_root: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.scan_dir(scan_root, scan_root, &mut findings);
        findings
    }

    fn scan_dir(&self, scan_root: &Path, dir: &Path, findings: &mut Vec<Finding>) {
        for entry in sorted_entries(dir) {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(t) => t,
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            // Symlinks are not followed; the scan stays inside its root.
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                self.scan_dir(scan_root, &path, findings);
                continue;
            }
            if file_type.is_file() {
                self.scan_file(scan_root, &path, findings);
            }
        }
    }

    fn scan_file(&self, scan_root: &Path, path: &Path, findings: &mut Vec<Finding>) {
        // Non-UTF-8 and unreadable files are skipped, not reported.
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", path.display(), e);
                return;
            }
        };

        if has_placeholder_marker(&content) {
            debug!(
                "Placeholder marker present in {}; suppressing matches",
                path.display()
            );
            return;
        }

        let location = path
            .strip_prefix(scan_root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        for (pattern, label, severity) in &self.patterns {
            for matched in pattern.find_iter(&content) {
                findings.push(Finding {
                    category: FindingCategory::HardcodedKey,
                    severity: *severity,
                    location: location.clone(),
                    message: format!(
                        "{}: {}...",
                        label,
                        truncate(matched.as_str(), PREVIEW_LEN)
                    ),
                    credential_type: Some((*label).to_string()),
                });
            }
        }
    }
}

/// Directory entries in name order, so repeated audits of an unchanged
/// tree produce identical reports. An unreadable directory contributes
/// nothing rather than aborting the scan.
fn sorted_entries(dir: &Path) -> Vec<fs::DirEntry> {
    let mut entries: Vec<fs::DirEntry> = match fs::read_dir(dir) {
        Ok(read) => read.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            debug!("Cannot read directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    entries.sort_by_key(|entry| entry.file_name());
    entries
}

fn truncate(s: &str, len: usize) -> &str {
    match s.char_indices().nth(len) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
