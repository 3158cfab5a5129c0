#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::errors::{SacmError, SacmResult};
    use crate::implementations::audit::SecurityAuditor;
    use crate::implementations::coordinator::{AdvanceOutcome, PipelineCoordinator, RoleSet};
    use crate::implementations::schema_registry::SchemaRegistry;
    use crate::models::artifact::ArtifactFile;
    use crate::models::common::{RoleKind, Stage, TaskStatus};
    use crate::models::task::StageEventKind;
    use crate::traits::role::{RoleAgent, StageInput};
    use crate::traits::vault::ArtifactVault;

    // Initialize logging once so failing runs show the coordinator's
    // transition log.
    fn setup() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Vault double that records every commit and accepts them all.
    #[derive(Default)]
    struct RecordingVault {
        commits: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl RecordingVault {
        fn committed_files(&self, task_id: &str) -> Vec<String> {
            self.commits
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == task_id)
                .flat_map(|(_, names)| names.clone())
                .collect()
        }

        fn commit_count(&self) -> usize {
            self.commits.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ArtifactVault for RecordingVault {
        async fn commit(&self, task_id: &str, files: &[ArtifactFile]) -> SacmResult<bool> {
            let names = files.iter().map(|f| f.name.clone()).collect();
            self.commits
                .lock()
                .unwrap()
                .push((task_id.to_string(), names));
            Ok(true)
        }
    }

    /// Vault double that declines every commit.
    struct DecliningVault;

    #[async_trait]
    impl ArtifactVault for DecliningVault {
        async fn commit(&self, _task_id: &str, _files: &[ArtifactFile]) -> SacmResult<bool> {
            Ok(false)
        }
    }

    fn coordinator_with(vault: Arc<dyn ArtifactVault>, retries: u32) -> PipelineCoordinator {
        PipelineCoordinator::new(SchemaRegistry::new(), vault, retries)
    }

    fn blueprint_payload() -> Value {
        json!({
            "task_id": "SACM-001-A",
            "component_name": "UserAuthentication",
            "models": [
                {
                    "model_name": "UserSchema",
                    "fields": { "id": "str", "email": "EmailStr" },
                    "description": "Account record."
                }
            ],
            "interfaces": [
                {
                    "component_type": "Service",
                    "class_name": "AuthService",
                    "methods": [
                        {
                            "name": "authenticate_user",
                            "arguments": { "user_id": "str", "password": "str" },
                            "return_type": "bool",
                            "description": "Verifies credentials against the user store."
                        }
                    ],
                    "description": "Session authentication service."
                }
            ]
        })
    }

    fn implementation_payload() -> Value {
        json!({
            "component_name": "UserAuthentication",
            "files": [
                { "path": "auth_service.py", "content": "class AuthService:\n    ..." }
            ],
            "notes": "Implements AuthService per the blueprint."
        })
    }

    fn passing_report_payload() -> Value {
        json!({
            "status": "pass",
            "findings": [],
            "scanned_root": "mvp_v1",
            "generated_at": "2026-01-10T12:00:00Z"
        })
    }

    fn failing_report_payload() -> Value {
        json!({
            "status": "fail",
            "findings": [
                {
                    "category": "HardcodedKey",
                    "severity": "High",
                    "location": "payment.py",
                    "message": "Stripe Live Key: sk_live_REDACTEDREDACTED...",
                    "credential_type": "Stripe Live Key"
                }
            ],
            "scanned_root": "mvp_v1",
            "generated_at": "2026-01-10T12:00:00Z"
        })
    }

    fn documentation_payload() -> Value {
        json!({
            "component_name": "UserAuthentication",
            "design_summary": "AuthService fronts the user store.",
            "api_reference": "authenticate_user(user_id, password) -> bool",
            "usage_examples": ["auth.authenticate_user('u1', 'pw')"]
        })
    }

    /// The canonical stage order, used to check history monotonicity.
    const STAGE_ORDER: [Stage; 6] = [
        Stage::Intake,
        Stage::Architecture,
        Stage::Implementation,
        Stage::SecurityAudit,
        Stage::Documentation,
        Stage::Complete,
    ];

    fn assert_history_monotonic(history: &[crate::models::task::StageEvent]) {
        let entered: Vec<Stage> = history
            .iter()
            .filter(|e| matches!(e.kind, StageEventKind::Entered))
            .map(|e| e.stage)
            .collect();
        assert!(
            entered.len() <= STAGE_ORDER.len() && entered == STAGE_ORDER[..entered.len()],
            "entered stages {:?} are not a prefix of the canonical order",
            entered
        );

        // Rejections only ever apply to the stage the task was at.
        for (i, event) in history.iter().enumerate() {
            if let StageEventKind::Rejected(_) = event.kind {
                let last_entered = history[..i]
                    .iter()
                    .rev()
                    .find(|e| matches!(e.kind, StageEventKind::Entered))
                    .map(|e| e.stage);
                assert_eq!(last_entered, Some(event.stage));
            }
        }
    }

    #[tokio::test]
    async fn happy_path_reaches_passed_and_commits_once() {
        setup();
        let vault = Arc::new(RecordingVault::default());
        let coordinator = coordinator_with(vault.clone(), 3);

        coordinator.submit("T-1", "Build user authentication").unwrap();

        let steps = [
            Value::Null,
            blueprint_payload(),
            implementation_payload(),
            passing_report_payload(),
            documentation_payload(),
        ];
        for payload in steps {
            let outcome = coordinator.advance("T-1", payload).await.unwrap();
            assert!(matches!(outcome, AdvanceOutcome::Advanced { .. }));
        }

        coordinator.complete("T-1").await.unwrap();

        let task = coordinator.task_snapshot("T-1").await.unwrap();
        assert_eq!(task.status, TaskStatus::Passed);
        assert_eq!(task.stage, Stage::Complete);
        assert_eq!(task.artifacts.len(), 4);
        assert_history_monotonic(&task.history);

        assert_eq!(vault.commit_count(), 1);
        let files = vault.committed_files("T-1");
        assert!(files.contains(&"blueprint.json".to_string()));
        assert!(files.contains(&"implementation.json".to_string()));
        assert!(files.contains(&"compliance_report.json".to_string()));
        assert!(files.contains(&"documentation.json".to_string()));
        assert!(files.contains(&"auth_service.py".to_string()));
    }

    #[tokio::test]
    async fn advance_reports_the_next_responsible_role() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-roles", "brief").unwrap();

        let outcome = coordinator.advance("T-roles", Value::Null).await.unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                to: Stage::Architecture,
                next_role: RoleKind::Architect
            }
        );

        let outcome = coordinator
            .advance("T-roles", blueprint_payload())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                to: Stage::Implementation,
                next_role: RoleKind::Developer
            }
        );
    }

    #[tokio::test]
    async fn rejection_routes_back_with_field_errors() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-2", "brief").unwrap();
        coordinator.advance("T-2", Value::Null).await.unwrap();

        let mut bad = blueprint_payload();
        bad["interfaces"][0].as_object_mut().unwrap().remove("methods");

        let outcome = coordinator.advance("T-2", bad).await.unwrap();
        match outcome {
            AdvanceOutcome::Rejected { errors, .. } => {
                assert!(errors.iter().any(|e| e.path == "interfaces[0].methods"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }

        let task = coordinator.task_snapshot("T-2").await.unwrap();
        assert_eq!(task.status, TaskStatus::Rejected);
        assert_eq!(task.stage, Stage::Architecture);
        assert_eq!(
            task.last_rejection_errors().map(|e| e.len()),
            Some(1),
            "rejected tasks must expose the exact validation errors"
        );

        // The same stage is retried with corrected output.
        let outcome = coordinator
            .advance("T-2", blueprint_payload())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            AdvanceOutcome::Advanced {
                to: Stage::Implementation,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn retry_budget_exhaustion_is_terminal_with_history() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 2);
        coordinator.submit("T-3", "brief").unwrap();
        coordinator.advance("T-3", Value::Null).await.unwrap();

        let bad = json!({ "component_name": "X" });

        for _ in 0..2 {
            let outcome = coordinator.advance("T-3", bad.clone()).await.unwrap();
            assert!(matches!(outcome, AdvanceOutcome::Rejected { .. }));
        }
        let outcome = coordinator.advance("T-3", bad.clone()).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Failed { .. }));

        let task = coordinator.task_snapshot("T-3").await.unwrap();
        assert_eq!(task.status, TaskStatus::Failed);
        assert_history_monotonic(&task.history);

        let rejections = task
            .history
            .iter()
            .filter(|e| matches!(e.kind, StageEventKind::Rejected(_)))
            .count();
        assert_eq!(rejections, 3, "every rejection must survive in the history");

        // Terminal tasks cannot advance further.
        let err = coordinator.advance("T-3", bad).await.unwrap_err();
        assert!(matches!(err, SacmError::TaskState { .. }));
    }

    #[tokio::test]
    async fn schema_valid_failing_report_still_rejects_security_stage() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-4", "brief").unwrap();
        for payload in [Value::Null, blueprint_payload(), implementation_payload()] {
            coordinator.advance("T-4", payload).await.unwrap();
        }

        let outcome = coordinator
            .advance("T-4", failing_report_payload())
            .await
            .unwrap();
        match outcome {
            AdvanceOutcome::Rejected { errors, .. } => {
                assert_eq!(errors[0].path, "status");
                assert_eq!(errors[0].expected, "pass");
                assert_eq!(errors[0].received, "fail");
            }
            other => panic!("failing compliance report must reject, got {:?}", other),
        }

        let task = coordinator.task_snapshot("T-4").await.unwrap();
        assert_eq!(task.stage, Stage::SecurityAudit);
        assert!(
            task.artifacts.len() == 2,
            "a failing report must not be attached"
        );
    }

    #[tokio::test]
    async fn complete_is_unreachable_before_documentation() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-5", "brief").unwrap();
        coordinator.advance("T-5", Value::Null).await.unwrap();

        let err = coordinator.complete("T-5").await.unwrap_err();
        assert!(matches!(err, SacmError::TaskState { .. }));

        let task = coordinator.task_snapshot("T-5").await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn vault_decline_leaves_task_unchanged() {
        let coordinator = coordinator_with(Arc::new(DecliningVault), 3);
        coordinator.submit("T-6", "brief").unwrap();
        for payload in [
            Value::Null,
            blueprint_payload(),
            implementation_payload(),
            passing_report_payload(),
            documentation_payload(),
        ] {
            coordinator.advance("T-6", payload).await.unwrap();
        }

        let err = coordinator.complete("T-6").await.unwrap_err();
        assert!(matches!(err, SacmError::Vault { .. }));

        let task = coordinator.task_snapshot("T-6").await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending, "decline must not pass the task");
    }

    #[tokio::test]
    async fn duplicate_and_unknown_tasks_are_errors() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-7", "brief").unwrap();

        assert!(matches!(
            coordinator.submit("T-7", "again"),
            Err(SacmError::DuplicateTask(_))
        ));
        assert!(matches!(
            coordinator.advance("T-missing", Value::Null).await,
            Err(SacmError::UnknownTask(_))
        ));
    }

    #[tokio::test]
    async fn archive_removes_terminal_task_but_keeps_history() {
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 0);
        coordinator.submit("T-8", "brief").unwrap();
        coordinator.advance("T-8", Value::Null).await.unwrap();

        let outcome = coordinator.advance("T-8", json!({})).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Failed { .. }));

        let archived = coordinator.archive("T-8").await.unwrap();
        assert_eq!(archived.status, TaskStatus::Failed);
        assert!(archived
            .history
            .iter()
            .any(|e| matches!(e.kind, StageEventKind::Rejected(_))));

        assert!(matches!(
            coordinator.task_snapshot("T-8").await,
            Err(SacmError::UnknownTask(_))
        ));
    }

    // ---- drive() with scripted roles ----

    /// Role that always emits the same payload.
    struct FixedRole {
        payload: Value,
    }

    #[async_trait]
    impl RoleAgent for FixedRole {
        async fn produce(&self, _input: &StageInput) -> SacmResult<Value> {
            Ok(self.payload.clone())
        }
    }

    /// Role that emits a broken payload until it sees rejection errors,
    /// then corrects itself.
    struct SelfCorrectingRole {
        broken: Value,
        corrected: Value,
        saw_errors: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl RoleAgent for SelfCorrectingRole {
        async fn produce(&self, input: &StageInput) -> SacmResult<Value> {
            if input.rejection_errors.is_empty() {
                Ok(self.broken.clone())
            } else {
                let mut seen = self.saw_errors.lock().unwrap();
                seen.extend(input.rejection_errors.iter().map(|e| e.path.clone()));
                Ok(self.corrected.clone())
            }
        }
    }

    /// Security role that audits a real (clean) tree as its side-query.
    struct AuditingSecurityRole {
        scan_root: std::path::PathBuf,
    }

    #[async_trait]
    impl RoleAgent for AuditingSecurityRole {
        async fn produce(&self, _input: &StageInput) -> SacmResult<Value> {
            let report = SecurityAuditor::new().audit(&self.scan_root);
            serde_json::to_value(report).map_err(|e| SacmError::RoleFailure {
                role: "SecurityOfficer".to_string(),
                message: e.to_string(),
            })
        }
    }

    fn scripted_roles(scan_root: std::path::PathBuf) -> RoleSet {
        let mut roles: RoleSet = HashMap::new();
        roles.insert(
            RoleKind::Ceo,
            Box::new(FixedRole {
                payload: json!({ "accepted": true }),
            }),
        );
        roles.insert(
            RoleKind::Architect,
            Box::new(FixedRole {
                payload: blueprint_payload(),
            }),
        );
        roles.insert(
            RoleKind::Developer,
            Box::new(FixedRole {
                payload: implementation_payload(),
            }),
        );
        roles.insert(
            RoleKind::SecurityOfficer,
            Box::new(AuditingSecurityRole { scan_root }),
        );
        roles.insert(
            RoleKind::DocumentationWriter,
            Box::new(FixedRole {
                payload: documentation_payload(),
            }),
        );
        roles
    }

    #[tokio::test]
    async fn drive_routes_a_task_to_passed() {
        setup();
        let clean_tree = tempfile::tempdir().unwrap();
        let vault = Arc::new(RecordingVault::default());
        let coordinator = coordinator_with(vault.clone(), 3);
        coordinator.submit("T-9", "Build user authentication").unwrap();

        let roles = scripted_roles(clean_tree.path().to_path_buf());
        let status = coordinator.drive("T-9", &roles, None).await.unwrap();

        assert_eq!(status, TaskStatus::Passed);
        assert_eq!(vault.commit_count(), 1);

        let task = coordinator.task_snapshot("T-9").await.unwrap();
        assert_history_monotonic(&task.history);
    }

    #[tokio::test]
    async fn drive_re_presents_errors_for_self_correction() {
        let clean_tree = tempfile::tempdir().unwrap();
        let vault = Arc::new(RecordingVault::default());
        let coordinator = coordinator_with(vault.clone(), 3);
        coordinator.submit("T-10", "brief").unwrap();

        let saw_errors = Arc::new(Mutex::new(Vec::new()));
        let mut broken = blueprint_payload();
        broken.as_object_mut().unwrap().remove("task_id");

        let mut roles = scripted_roles(clean_tree.path().to_path_buf());
        roles.insert(
            RoleKind::Architect,
            Box::new(SelfCorrectingRole {
                broken,
                corrected: blueprint_payload(),
                saw_errors: saw_errors.clone(),
            }),
        );

        let status = coordinator.drive("T-10", &roles, None).await.unwrap();
        assert_eq!(status, TaskStatus::Passed);

        let seen = saw_errors.lock().unwrap();
        assert!(
            seen.contains(&"task_id".to_string()),
            "the correcting role must see the exact field errors"
        );
    }

    #[tokio::test]
    async fn drive_without_a_required_role_is_a_configuration_error() {
        let clean_tree = tempfile::tempdir().unwrap();
        let coordinator = coordinator_with(Arc::new(RecordingVault::default()), 3);
        coordinator.submit("T-11", "brief").unwrap();

        let mut roles = scripted_roles(clean_tree.path().to_path_buf());
        roles.remove(&RoleKind::Developer);

        let err = coordinator.drive("T-11", &roles, None).await.unwrap_err();
        assert!(matches!(err, SacmError::Configuration(_)));
    }

    #[tokio::test]
    async fn independent_tasks_progress_concurrently() {
        let clean_tree = tempfile::tempdir().unwrap();
        let vault = Arc::new(RecordingVault::default());
        let coordinator = Arc::new(coordinator_with(vault.clone(), 3));
        coordinator.submit("T-a", "first").unwrap();
        coordinator.submit("T-b", "second").unwrap();

        let roles_a = scripted_roles(clean_tree.path().to_path_buf());
        let roles_b = scripted_roles(clean_tree.path().to_path_buf());

        let (a, b) = tokio::join!(
            coordinator.drive("T-a", &roles_a, None),
            coordinator.drive("T-b", &roles_b, None)
        );
        assert_eq!(a.unwrap(), TaskStatus::Passed);
        assert_eq!(b.unwrap(), TaskStatus::Passed);
        assert_eq!(vault.commit_count(), 2);
    }
}
