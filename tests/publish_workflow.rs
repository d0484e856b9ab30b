//! Workflow tests against the in-memory host.
//!
//! These tests verify:
//! - A multi-file publish produces exactly one commit with one parent
//! - The resulting tree is the base tree overlaid with the published files
//! - Failures at any step leave the branch where it was
//! - Racing writers produce a conflict, never a lost update
//! - The legacy path reports partial success

use std::collections::BTreeMap;

use ghpublish::forge::mock::{FailOn, MockHost};
use ghpublish::forge::{ForgeError, HostingApi};
use ghpublish::publish::{
    commit_changes, push_files, BatchPushOptions, CommitOptions, CommitRequest, FileChange,
};
use proptest::prelude::*;

fn files(pairs: &[(&str, &str)]) -> Vec<FileChange> {
    pairs
        .iter()
        .map(|(path, content)| FileChange::text(*path, *content))
        .collect()
}

mod atomic {
    use super::*;

    #[tokio::test]
    async fn two_files_one_commit() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[("README.md", "# demo\n")]);
        let before = host.branch_head(&repo, "main").unwrap();

        let request = CommitRequest::new(
            repo.clone(),
            "main",
            "Add files",
            files(&[("a.txt", "A"), ("b.txt", "B")]),
        );
        let outcome = commit_changes(&host, &request, &CommitOptions::default())
            .await
            .unwrap();

        assert_eq!(host.branch_head(&repo, "main"), Some(outcome.commit.clone()));
        assert_eq!(host.commit_parents(&repo, &outcome.commit), vec![before.clone()]);
        assert_eq!(outcome.parent, before);
        assert_eq!(host.history(&repo, "main").len(), 2);
        assert_eq!(
            host.commit_message(&repo, &outcome.commit).as_deref(),
            Some("Add files")
        );

        let expected: BTreeMap<String, String> = [
            ("README.md", "# demo\n"),
            ("a.txt", "A"),
            ("b.txt", "B"),
        ]
        .into_iter()
        .map(|(p, c)| (p.to_string(), c.to_string()))
        .collect();
        assert_eq!(host.files_at(&repo, "main"), expected);
    }

    #[tokio::test]
    async fn steps_run_in_order() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[]);

        let request = CommitRequest::new(
            repo.clone(),
            "main",
            "Add files",
            files(&[("a.txt", "A"), ("b.txt", "B")]),
        );
        commit_changes(&host, &request, &CommitOptions::default())
            .await
            .unwrap();

        assert_eq!(
            host.operation_names(),
            vec![
                "get_branch_tip",
                "create_blob",
                "create_blob",
                "create_tree",
                "create_commit",
                "update_ref",
            ]
        );
    }

    #[tokio::test]
    async fn failure_at_any_step_leaves_branch() {
        let failures = [
            FailOn::CreateBlob(ForgeError::Network("reset".into())),
            FailOn::CreateTree(ForgeError::Api {
                status: 500,
                body: "boom".into(),
            }),
            FailOn::CreateCommit(ForgeError::Api {
                status: 500,
                body: "boom".into(),
            }),
            FailOn::UpdateRef(ForgeError::Network("timeout".into())),
        ];

        for failure in failures {
            let host = MockHost::new();
            let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);
            let before = host.branch_head(&repo, "main");
            host.set_fail_on(failure.clone());

            let request = CommitRequest::new(
                repo.clone(),
                "main",
                "Update",
                files(&[("a.txt", "new")]),
            );
            let result = commit_changes(&host, &request, &CommitOptions::default()).await;

            assert!(result.is_err(), "{:?}", failure);
            assert_eq!(host.branch_head(&repo, "main"), before, "{:?}", failure);
            assert_eq!(host.read_file(&repo, "main", "a.txt").as_deref(), Some("old"));
        }
    }

    #[tokio::test]
    async fn concurrent_writers_one_wins() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[]);
        let options = CommitOptions::default();

        let first = CommitRequest::new(repo.clone(), "main", "First", files(&[("a.txt", "1")]));
        let second = CommitRequest::new(repo.clone(), "main", "Second", files(&[("b.txt", "2")]));

        let (a, b) = tokio::join!(
            commit_changes(&host, &first, &options),
            commit_changes(&host, &second, &options)
        );

        let (winner, loser) = match (a, b) {
            (Ok(winner), Err(loser)) | (Err(loser), Ok(winner)) => (winner, loser),
            other => panic!("expected exactly one success, got {:?}", other),
        };
        assert!(matches!(loser, ForgeError::Conflict(_)));
        assert!(loser.is_retryable());
        assert_eq!(host.branch_head(&repo, "main"), Some(winner.commit));
        assert_eq!(host.history(&repo, "main").len(), 2);
    }

    #[tokio::test]
    async fn branch_moved_mid_workflow_is_conflict() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[]);
        let request = CommitRequest::new(repo.clone(), "main", "Mine", files(&[("a.txt", "A")]));
        let options = CommitOptions::default();

        let (result, theirs) = tokio::join!(commit_changes(&host, &request, &options), async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            host.commit_directly(&repo, "main", "other.txt", "theirs")
        });

        assert!(matches!(result, Err(ForgeError::Conflict(_))));
        assert_eq!(host.branch_head(&repo, "main"), Some(theirs));
    }

    #[tokio::test]
    async fn forced_update_replaces_moved_branch() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[]);
        let request = CommitRequest {
            force: true,
            ..CommitRequest::new(repo.clone(), "main", "Mine", files(&[("a.txt", "A")]))
        };
        let options = CommitOptions::default();

        let (result, _) = tokio::join!(commit_changes(&host, &request, &options), async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            host.commit_directly(&repo, "main", "other.txt", "theirs")
        });

        let outcome = result.unwrap();
        assert_eq!(host.branch_head(&repo, "main"), Some(outcome.commit));
        assert!(host.read_file(&repo, "main", "other.txt").is_none());
    }

    #[tokio::test]
    async fn missing_branch_sends_no_writes() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[]);
        let request = CommitRequest::new(repo.clone(), "nope", "m", files(&[("a.txt", "A")]));

        let err = commit_changes(&host, &request, &CommitOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(host.operation_names(), vec!["get_branch_tip"]);
        assert_eq!(host.blob_count(&repo), 0);
    }

    #[tokio::test]
    async fn works_on_auto_initialized_repository() {
        let host = MockHost::with_login("octocat");
        let created = host
            .create_repository(ghpublish::forge::CreateRepoRequest::new("fresh"))
            .await
            .unwrap();
        let repo = ghpublish::forge::RepoRef::parse(&created.full_name).unwrap();

        let request = CommitRequest::new(
            repo.clone(),
            &created.default_branch,
            "Publish",
            files(&[("backend/app.py", "print('hi')\n")]),
        );
        commit_changes(&host, &request, &CommitOptions::default())
            .await
            .unwrap();

        let tree = host.files_at(&repo, "main");
        assert!(tree.contains_key("README.md"));
        assert_eq!(tree.get("backend/app.py").map(String::as_str), Some("print('hi')\n"));
    }
}

mod overlay {
    use super::*;

    fn path_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a.txt", "b.txt", "src/lib.rs", "src/main.rs", "docs/x.md"])
            .prop_map(str::to_string)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn result_is_base_overlaid_with_changes(
            base in prop::collection::btree_map(path_strategy(), "[a-z]{0,8}", 0..4),
            changes in prop::collection::vec((path_strategy(), "[a-z]{0,8}"), 1..6),
        ) {
            let host = MockHost::new();
            let seed: Vec<(&str, &str)> =
                base.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
            let repo = host.seed_repository("octocat/demo", &seed);

            let request = CommitRequest::new(
                repo.clone(),
                "main",
                "Overlay",
                changes
                    .iter()
                    .map(|(p, c)| FileChange::text(p.clone(), c.clone()))
                    .collect(),
            );
            let outcome = tokio_test::block_on(commit_changes(
                &host,
                &request,
                &CommitOptions::default(),
            ))
            .unwrap();

            let mut expected = base.clone();
            for (path, content) in &changes {
                expected.insert(path.clone(), content.clone());
            }
            prop_assert_eq!(host.files_at(&repo, "main"), expected);
            prop_assert_eq!(host.commit_parents(&repo, &outcome.commit).len(), 1);

            let mut distinct: Vec<&String> = Vec::new();
            for (path, _) in &changes {
                if !distinct.contains(&path) {
                    distinct.push(path);
                }
            }
            prop_assert_eq!(outcome.files.iter().collect::<Vec<_>>(), distinct);
        }
    }
}

mod legacy {
    use super::*;

    #[tokio::test]
    async fn partial_success_is_reported() {
        let host = MockHost::new().fail_on(FailOn::PushFile {
            path: "b.txt".into(),
            error: ForgeError::Api {
                status: 409,
                body: "conflict".into(),
            },
        });
        let repo = host.seed_repository("octocat/demo", &[]);

        let report = push_files(
            &host,
            &repo,
            &files(&[("a.txt", "A"), ("b.txt", "B"), ("c.txt", "C")]),
            &BatchPushOptions::new("main"),
        )
        .await;

        assert!(!report.is_complete());
        assert_eq!(report.pushed.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(
            report.failed[0].error,
            ForgeError::Api { status: 409, .. }
        ));
        // One commit per pushed file on top of the seed commit.
        assert_eq!(host.history(&repo, "main").len(), 3);
        assert_eq!(
            host.branch_head(&repo, "main").as_ref(),
            report.last_commit().map(|c| &c.sha)
        );
    }

    #[tokio::test]
    async fn updates_existing_files() {
        let host = MockHost::new();
        let repo = host.seed_repository("octocat/demo", &[("a.txt", "old")]);

        let report = push_files(
            &host,
            &repo,
            &files(&[("a.txt", "new")]),
            &BatchPushOptions::new("main"),
        )
        .await;

        assert!(report.is_complete());
        assert_eq!(host.read_file(&repo, "main", "a.txt").as_deref(), Some("new"));
        assert_eq!(
            host.operation_names(),
            vec!["get_file_sha", "push_single_file"]
        );
    }
}
