use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of policy violation a finding describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingCategory {
    /// An environment-definition file that should never be tracked.
    TrackedSecretFile,
    /// A credential-shaped literal embedded in source text.
    HardcodedKey,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingCategory::TrackedSecretFile => "tracked-secret-file",
            FindingCategory::HardcodedKey => "hardcoded-key",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        };
        write!(f, "{}", name)
    }
}

/// One discrete audit-detected exposure issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: FindingCategory,
    pub severity: Severity,
    /// Where the issue was found, relative to the scan root.
    pub location: String,
    pub message: String,
    /// Pattern label for hardcoded keys (e.g. "Stripe Live Key").
    pub credential_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Pass,
    Fail,
}

impl ComplianceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(ComplianceStatus::Pass),
            "fail" => Some(ComplianceStatus::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Pass => write!(f, "pass"),
            ComplianceStatus::Fail => write!(f, "fail"),
        }
    }
}

/// The security-stage artifact: the ordered findings of one audit
/// invocation plus an overall status. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub status: ComplianceStatus,
    pub findings: Vec<Finding>,
    pub scanned_root: PathBuf,
    pub generated_at: DateTime<Utc>,
}

// Two audits of an unchanged tree must compare equal; the generation
// timestamp is deliberately excluded.
impl PartialEq for ComplianceReport {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.findings == other.findings
            && self.scanned_root == other.scanned_root
    }
}

impl ComplianceReport {
    /// Status is Fail iff any finding exists.
    pub fn from_findings(scanned_root: PathBuf, findings: Vec<Finding>) -> Self {
        let status = if findings.is_empty() {
            ComplianceStatus::Pass
        } else {
            ComplianceStatus::Fail
        };
        Self {
            status,
            findings,
            scanned_root,
            generated_at: Utc::now(),
        }
    }
}
