#[cfg(test)]
mod tests {
    use std::fs;

    use crate::implementations::vault::FilesystemVault;
    use crate::models::artifact::ArtifactFile;
    use crate::traits::vault::ArtifactVault;

    fn file(name: &str, content: &str) -> ArtifactFile {
        ArtifactFile {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn commit_lands_every_file_under_the_task_directory() {
        let root = tempfile::tempdir().unwrap();
        let vault = FilesystemVault::new(root.path());

        let files = vec![
            file("blueprint.json", "{}"),
            file("sources/auth_service.py", "class AuthService: ..."),
        ];
        let committed = vault.commit("SACM-001-A", &files).await.unwrap();
        assert!(committed);

        let task_dir = root.path().join("SACM-001-A");
        assert!(task_dir.join("blueprint.json").is_file());
        assert_eq!(
            fs::read_to_string(task_dir.join("sources/auth_service.py")).unwrap(),
            "class AuthService: ..."
        );

        // No staging debris may survive a successful commit.
        assert!(!root.path().join(".staging-SACM-001-A").exists());
    }

    #[tokio::test]
    async fn recommit_replaces_the_previous_artifact_set() {
        let root = tempfile::tempdir().unwrap();
        let vault = FilesystemVault::new(root.path());

        vault
            .commit("T-1", &[file("old.json", "{}")])
            .await
            .unwrap();
        vault
            .commit("T-1", &[file("new.json", "{}")])
            .await
            .unwrap();

        let task_dir = root.path().join("T-1");
        assert!(task_dir.join("new.json").is_file());
        assert!(
            !task_dir.join("old.json").exists(),
            "a commit is all-or-nothing, not additive"
        );
    }

    #[tokio::test]
    async fn traversal_outside_the_task_directory_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let vault = FilesystemVault::new(root.path());

        let escaping = vec![file("../escape.json", "{}")];
        let committed = vault.commit("T-2", &escaping).await.unwrap();
        assert!(!committed);
        assert!(!root.path().join("escape.json").exists());

        let absolute = vec![file("/tmp/escape.json", "{}")];
        assert!(!vault.commit("T-2", &absolute).await.unwrap());

        let escaping_id = vault.commit("../T-3", &[file("a.json", "{}")]).await.unwrap();
        assert!(!escaping_id);
    }
}
