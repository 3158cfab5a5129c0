use std::fmt;

use serde::{Deserialize, Serialize};

/// One field-level schema violation: where it is, what was expected,
/// and what actually arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted/indexed path into the payload (e.g. "interfaces[0].methods").
    pub path: String,
    pub expected: String,
    pub received: String,
}

impl FieldError {
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            received: received.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, received {}",
            self.path, self.expected, self.received
        )
    }
}

/// Outcome of validating one stage payload. Every violation is collected
/// in a single pass so the producing role can fix them all at once.
/// Ephemeral: produced and consumed within one transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn pass() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn fail(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn is_pass(&self) -> bool {
        self.errors.is_empty()
    }
}
