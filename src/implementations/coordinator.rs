use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::{SacmError, SacmResult};
use crate::implementations::retrieval::RetrievalService;
use crate::implementations::schema_registry::SchemaRegistry;
use crate::models::artifact::Artifact;
use crate::models::common::{RoleKind, Stage, TaskStatus};
use crate::models::report::ComplianceStatus;
use crate::models::task::{StageEvent, Task};
use crate::models::validation::FieldError;
use crate::traits::role::{RoleAgent, StageInput};
use crate::traits::vault::ArtifactVault;

/// The roles available to `drive`, selected by kind.
pub type RoleSet = HashMap<RoleKind, Box<dyn RoleAgent>>;

/// What one `advance` call did to the task.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// The payload validated; the task moved to the next stage.
    Advanced { to: Stage, next_role: RoleKind },
    /// The payload was rejected back to the producing role.
    Rejected {
        errors: Vec<FieldError>,
        attempts_remaining: u32,
    },
    /// The stage's retry budget is exhausted; the task is terminal.
    Failed { errors: Vec<FieldError> },
}

/// Drives tasks through the fixed stage sequence, validating every
/// handoff against the schema registry.
///
/// Tasks are independent: each lives behind its own mutex, so any
/// number of tasks can progress concurrently while stage transitions
/// within one task stay strictly serialized (one in-flight `advance`
/// per task; artifacts cannot double-attach and retry counters cannot
/// race).
pub struct PipelineCoordinator {
    registry: SchemaRegistry,
    vault: Arc<dyn ArtifactVault>,
    max_stage_retries: u32,
    tasks: RwLock<HashMap<String, Arc<Mutex<Task>>>>,
}

impl PipelineCoordinator {
    pub fn new(registry: SchemaRegistry, vault: Arc<dyn ArtifactVault>, max_stage_retries: u32) -> Self {
        Self {
            registry,
            vault,
            max_stage_retries,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Create a task in Intake.
    pub fn submit(&self, task_id: &str, brief: &str) -> SacmResult<()> {
        let mut tasks = self
            .tasks
            .write()
            .map_err(|_| SacmError::System("task table lock poisoned".into()))?;

        if tasks.contains_key(task_id) {
            return Err(SacmError::DuplicateTask(task_id.to_string()));
        }

        info!("Task {} submitted", task_id);
        tasks.insert(
            task_id.to_string(),
            Arc::new(Mutex::new(Task::new(task_id, brief))),
        );
        Ok(())
    }

    fn task_handle(&self, task_id: &str) -> SacmResult<Arc<Mutex<Task>>> {
        let tasks = self
            .tasks
            .read()
            .map_err(|_| SacmError::System("task table lock poisoned".into()))?;
        tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| SacmError::UnknownTask(task_id.to_string()))
    }

    /// Validate a stage's raw output and transition the task.
    ///
    /// On a pass the artifact is attached and the stage advances; on a
    /// failure the task is rejected back to the producing role with the
    /// itemized field errors, up to the per-stage retry budget.
    pub async fn advance(&self, task_id: &str, raw_output: Value) -> SacmResult<AdvanceOutcome> {
        let handle = self.task_handle(task_id)?;
        let mut task = handle.lock().await;

        if task.status.is_terminal() {
            return Err(SacmError::TaskState {
                task_id: task_id.to_string(),
                message: format!("cannot advance a task with terminal status {}", task.status),
            });
        }

        match task.stage {
            Stage::Complete => Err(SacmError::TaskState {
                task_id: task_id.to_string(),
                message: "all stages are done; call complete() to commit".to_string(),
            }),
            // Intake has no artifact schema: the intake role's
            // acceptance is untyped and moves straight to Architecture.
            Stage::Intake => {
                let next = Stage::Architecture;
                task.stage = next;
                task.status = TaskStatus::Pending;
                task.stage_rejections = 0;
                task.history.push(StageEvent::entered(next));
                info!("Task {} accepted at intake, now at {}", task_id, next);
                Ok(AdvanceOutcome::Advanced {
                    to: next,
                    next_role: next.responsible_role(),
                })
            }
            stage => {
                let result = self.registry.validate(stage, &raw_output)?;

                if result.is_pass() {
                    let artifact = self.registry.parse_artifact(stage, raw_output)?;

                    // A schema-valid compliance report that reports
                    // failure still rejects the stage: security does
                    // not pass on format alone.
                    if let Artifact::ComplianceReport(report) = &artifact {
                        if report.status == ComplianceStatus::Fail {
                            let errors = vec![FieldError::new(
                                "status",
                                "pass",
                                report.status.to_string(),
                            )];
                            return Ok(self.reject(&mut task, stage, errors));
                        }
                    }

                    self.attach_and_advance(&mut task, stage, artifact)
                } else {
                    Ok(self.reject(&mut task, stage, result.errors))
                }
            }
        }
    }

    fn attach_and_advance(
        &self,
        task: &mut Task,
        stage: Stage,
        artifact: Artifact,
    ) -> SacmResult<AdvanceOutcome> {
        // Every stage before Complete has a successor.
        let next = stage.next().ok_or_else(|| {
            SacmError::System(format!("stage {} has no successor", stage))
        })?;

        task.artifacts.push(artifact);
        task.stage = next;
        task.status = TaskStatus::Pending;
        task.stage_rejections = 0;
        task.history.push(StageEvent::entered(next));

        info!("Task {} advanced from {} to {}", task.id, stage, next);
        Ok(AdvanceOutcome::Advanced {
            to: next,
            next_role: next.responsible_role(),
        })
    }

    fn reject(&self, task: &mut Task, stage: Stage, errors: Vec<FieldError>) -> AdvanceOutcome {
        task.stage_rejections += 1;
        task.history
            .push(StageEvent::rejected(stage, errors.clone()));

        if task.stage_rejections > self.max_stage_retries {
            task.status = TaskStatus::Failed;
            warn!(
                "Task {} failed at {}: retry budget of {} exceeded",
                task.id, stage, self.max_stage_retries
            );
            AdvanceOutcome::Failed { errors }
        } else {
            task.status = TaskStatus::Rejected;
            debug!(
                "Task {} rejected at {} ({}/{} rejections)",
                task.id, stage, task.stage_rejections, self.max_stage_retries
            );
            AdvanceOutcome::Rejected {
                attempts_remaining: self.max_stage_retries - task.stage_rejections + 1,
                errors,
            }
        }
    }

    /// Commit a fully documented task's artifacts to the vault and mark
    /// it passed. Only reachable once every stage, Documentation
    /// included, has validated.
    pub async fn complete(&self, task_id: &str) -> SacmResult<()> {
        let handle = self.task_handle(task_id)?;
        let mut task = handle.lock().await;

        if task.status.is_terminal() {
            return Err(SacmError::TaskState {
                task_id: task_id.to_string(),
                message: format!("task already has terminal status {}", task.status),
            });
        }
        if task.stage != Stage::Complete {
            return Err(SacmError::TaskState {
                task_id: task_id.to_string(),
                message: format!(
                    "complete() is only reachable from a validated Documentation stage (currently at {})",
                    task.stage
                ),
            });
        }

        let files: Vec<_> = task
            .artifacts
            .iter()
            .flat_map(|artifact| artifact.files())
            .collect();

        let committed = self.vault.commit(task_id, &files).await?;
        if !committed {
            return Err(SacmError::Vault {
                task_id: task_id.to_string(),
                message: "vault declined the commit".to_string(),
            });
        }

        task.status = TaskStatus::Passed;
        info!("Task {} passed and committed to the vault", task_id);
        Ok(())
    }

    /// Route a task through every remaining stage using the given
    /// roles, re-presenting rejection errors so a role can correct its
    /// own output. Returns the terminal status.
    pub async fn drive(
        &self,
        task_id: &str,
        roles: &RoleSet,
        retrieval: Option<&RetrievalService>,
    ) -> SacmResult<TaskStatus> {
        loop {
            let (stage, status, input) = {
                let handle = self.task_handle(task_id)?;
                let task = handle.lock().await;
                let input = StageInput {
                    task_id: task.id.clone(),
                    stage: task.stage,
                    brief: task.brief.clone(),
                    prior_artifact: task
                        .current_artifact()
                        .and_then(|artifact| serde_json::to_value(artifact).ok()),
                    context: String::new(),
                    rejection_errors: task
                        .last_rejection_errors()
                        .map(|errors| errors.to_vec())
                        .unwrap_or_default(),
                };
                (task.stage, task.status, input)
            };

            if status.is_terminal() {
                return Ok(status);
            }
            if stage == Stage::Complete {
                self.complete(task_id).await?;
                return Ok(TaskStatus::Passed);
            }

            let role_kind = stage.responsible_role();
            let role = roles.get(&role_kind).ok_or_else(|| {
                SacmError::Configuration(format!(
                    "no role registered for {} (stage {})",
                    role_kind, stage
                ))
            })?;

            let mut input = input;
            if let Some(service) = retrieval {
                input.context = service.context_for(&input.brief, service.default_k()).await;
            }

            debug!("Dispatching task {} stage {} to {}", task_id, stage, role_kind);
            let payload = role.produce(&input).await?;

            if let AdvanceOutcome::Failed { .. } = self.advance(task_id, payload).await? {
                return Ok(TaskStatus::Failed);
            }
        }
    }

    /// A point-in-time copy of the task, including its full transition
    /// and error history.
    pub async fn task_snapshot(&self, task_id: &str) -> SacmResult<Task> {
        let handle = self.task_handle(task_id)?;
        let task = handle.lock().await;
        Ok(task.clone())
    }

    /// Remove a terminally finished task from the coordinator, returning
    /// it with its preserved history.
    pub async fn archive(&self, task_id: &str) -> SacmResult<Task> {
        let handle = self.task_handle(task_id)?;
        {
            let task = handle.lock().await;
            if !task.status.is_terminal() {
                return Err(SacmError::TaskState {
                    task_id: task_id.to_string(),
                    message: format!("cannot archive a task with status {}", task.status),
                });
            }
        }

        let handle = {
            let mut tasks = self
                .tasks
                .write()
                .map_err(|_| SacmError::System("task table lock poisoned".into()))?;
            tasks
                .remove(task_id)
                .ok_or_else(|| SacmError::UnknownTask(task_id.to_string()))?
        };

        let task = handle.lock().await;
        Ok(task.clone())
    }
}
