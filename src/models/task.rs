use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::artifact::Artifact;
use crate::models::common::{Stage, TaskStatus};
use crate::models::validation::FieldError;

/// What happened at a point in a task's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageEventKind {
    /// The task entered the stage.
    Entered,
    /// The stage's output was rejected with these field errors.
    Rejected(Vec<FieldError>),
}

/// One entry in a task's ordered transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEvent {
    pub stage: Stage,
    pub kind: StageEventKind,
    pub at: DateTime<Utc>,
}

impl StageEvent {
    pub fn entered(stage: Stage) -> Self {
        Self {
            stage,
            kind: StageEventKind::Entered,
            at: Utc::now(),
        }
    }

    pub fn rejected(stage: Stage, errors: Vec<FieldError>) -> Self {
        Self {
            stage,
            kind: StageEventKind::Rejected(errors),
            at: Utc::now(),
        }
    }
}

/// A unit of work moving through the pipeline. Owned by the coordinator
/// for its whole lifetime: created on submission, archived on terminal
/// status. The full history survives terminal failure for diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub brief: String,
    pub stage: Stage,
    pub status: TaskStatus,
    pub history: Vec<StageEvent>,
    /// Validated artifacts, one per completed stage, in stage order.
    pub artifacts: Vec<Artifact>,
    /// Rejections at the current stage; reset on every advance.
    pub stage_rejections: u32,
}

impl Task {
    pub fn new(id: impl Into<String>, brief: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            brief: brief.into(),
            stage: Stage::Intake,
            status: TaskStatus::Pending,
            history: vec![StageEvent::entered(Stage::Intake)],
            artifacts: Vec::new(),
            stage_rejections: 0,
        }
    }

    /// The most recently attached artifact, if any.
    pub fn current_artifact(&self) -> Option<&Artifact> {
        self.artifacts.last()
    }

    /// Field errors from the latest rejection at the current stage.
    pub fn last_rejection_errors(&self) -> Option<&[FieldError]> {
        self.history.iter().rev().find_map(|event| match &event.kind {
            StageEventKind::Rejected(errors) if event.stage == self.stage => {
                Some(errors.as_slice())
            }
            _ => None,
        })
    }
}
