//! Sweep engine - reconciles owned repositories against the whitelist and
//! deletes the rest
//!
//! Deletions run strictly one at a time in partition order. A failed delete is
//! recorded and the loop moves on; only precondition and listing errors stop a
//! run.

use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::{RunMode, RunOptions};
use crate::error::Result;
use crate::events::{EventSink, SweepEvent};
use crate::github::{list_owned_resources, RemoteDirectory, Repository};
use crate::reconcile::{partition, Partition};
use crate::whitelist::Whitelist;

/// Result of a single delete attempt
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(Repository),
    Failed { repository: Repository, reason: String },
}

impl DeleteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

/// Results from the execution phase
#[derive(Debug, Clone, PartialEq)]
pub struct CleanupReport {
    pub mode: RunMode,
    /// Repositories selected for deletion, in order
    pub planned: Vec<Repository>,
    /// One entry per delete attempt; empty for dry runs
    pub outcomes: Vec<DeleteOutcome>,
    pub duration: Duration,
}

impl CleanupReport {
    /// Nothing was selected for deletion
    pub fn is_noop(&self) -> bool {
        self.planned.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    /// Failed repositories with their reasons, in attempt order
    pub fn failures(&self) -> impl Iterator<Item = (&Repository, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            DeleteOutcome::Failed { repository, reason } => Some((repository, reason.as_str())),
            DeleteOutcome::Deleted(_) => None,
        })
    }
}

/// Drives the delete partition against a remote directory
pub struct Executor<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C> Executor<'a, C>
where
    C: RemoteDirectory + ?Sized,
{
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Delete (or, in dry-run mode, only plan) every repository in `to_delete`
    pub async fn run(
        &self,
        partition: &Partition,
        mode: RunMode,
        sink: &mut dyn EventSink,
    ) -> CleanupReport {
        let start_time = Instant::now();
        let planned = partition.to_delete.clone();
        let mut outcomes = Vec::new();

        if planned.is_empty() {
            info!("No repositories to delete");
        } else if mode.is_dry_run() {
            info!("Dry run: {} repositories would be deleted", planned.len());
        } else {
            info!("Deleting {} repositories", planned.len());

            for repo in &planned {
                let outcome = self.delete_one(repo).await;
                sink.emit(match &outcome {
                    DeleteOutcome::Deleted(repository) => SweepEvent::Deleted(repository.clone()),
                    DeleteOutcome::Failed { repository, reason } => SweepEvent::DeleteFailed {
                        repository: repository.clone(),
                        reason: reason.clone(),
                    },
                });
                outcomes.push(outcome);
            }
        }

        let report = CleanupReport {
            mode,
            planned,
            outcomes,
            duration: start_time.elapsed(),
        };

        info!(
            "Cleanup finished in {:.2}s: {} attempted, {} deleted, {} failed",
            report.duration.as_secs_f64(),
            report.attempted(),
            report.succeeded(),
            report.failed()
        );

        sink.emit(SweepEvent::Finished(report.clone()));
        report
    }

    async fn delete_one(&self, repo: &Repository) -> DeleteOutcome {
        match self
            .client
            .delete_repository(repo.owner_login(), &repo.name)
            .await
        {
            Ok(()) => {
                info!("Deleted {}", repo.full_name);
                DeleteOutcome::Deleted(repo.clone())
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", repo.full_name, e);
                DeleteOutcome::Failed {
                    repository: repo.clone(),
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Everything a completed sweep produced
#[derive(Debug, Clone)]
pub struct SweepSummary {
    pub username: String,
    pub whitelist_entries: usize,
    pub partition: Partition,
    pub report: CleanupReport,
}

/// Full sweep: whitelist, identity, listing, partition, execution
pub struct Sweeper<C> {
    client: C,
    options: RunOptions,
}

impl<C: RemoteDirectory> Sweeper<C> {
    pub fn new(client: C, options: RunOptions) -> Self {
        Self { client, options }
    }

    /// Run a complete sweep.
    ///
    /// The whitelist is read before any remote call, so a missing file never
    /// costs a request. Errors up to and including the listing abort the run.
    pub async fn run(&self, sink: &mut dyn EventSink) -> Result<SweepSummary> {
        let mode = self.options.mode;
        info!("Starting repository sweep ({})", mode.label());
        sink.emit(SweepEvent::Started(mode));

        let whitelist = Whitelist::load(&self.options.whitelist_path)?;
        sink.emit(SweepEvent::WhitelistLoaded {
            entries: whitelist.len(),
        });

        let username = self.client.whoami().await?;
        info!("Authenticated as GitHub user: {}", username);
        sink.emit(SweepEvent::Authenticated {
            username: username.clone(),
        });

        let repositories = list_owned_resources(&self.client, &username).await?;
        sink.emit(SweepEvent::RepositoriesFetched {
            total: repositories.len(),
        });

        let partition = partition(repositories, &whitelist);
        info!(
            "Keeping {} repositories, deleting {}",
            partition.to_keep.len(),
            partition.to_delete.len()
        );
        sink.emit(SweepEvent::Partitioned(partition.clone()));

        let report = Executor::new(&self.client)
            .run(&partition, mode, sink)
            .await;

        Ok(SweepSummary {
            username,
            whitelist_entries: whitelist.len(),
            partition,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweepError;
    use crate::events::NullSink;
    use crate::github::MockRemoteDirectory;
    use assert_fs::prelude::*;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory account with scripted delete failures
    #[derive(Default)]
    struct FakeAccount {
        login: String,
        repositories: Vec<Repository>,
        delete_failures: HashMap<String, u16>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeAccount {
        fn new(login: &str, names: &[&str]) -> Self {
            Self {
                login: login.to_string(),
                repositories: names
                    .iter()
                    .map(|n| Repository::new(login, n, false))
                    .collect(),
                ..Default::default()
            }
        }

        fn failing_delete(mut self, name: &str, status: u16) -> Self {
            self.delete_failures.insert(name.to_string(), status);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn delete_calls(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter(|c| c.starts_with("delete "))
                .collect()
        }
    }

    #[async_trait]
    impl RemoteDirectory for FakeAccount {
        async fn whoami(&self) -> Result<String> {
            self.calls.lock().unwrap().push("whoami".to_string());
            Ok(self.login.clone())
        }

        async fn list_owned_page(
            &self,
            _username: &str,
            page: u32,
            per_page: u32,
        ) -> Result<Vec<Repository>> {
            self.calls.lock().unwrap().push(format!("list {}", page));
            let start = ((page - 1) * per_page) as usize;
            Ok(self
                .repositories
                .iter()
                .skip(start)
                .take(per_page as usize)
                .cloned()
                .collect())
        }

        async fn delete_repository(&self, owner: &str, name: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("delete {}/{}", owner, name));
            match self.delete_failures.get(name) {
                Some(status) => Err(SweepError::fetch(*status, "Must have admin rights")),
                None => Ok(()),
            }
        }
    }

    fn repos(names: &[&str]) -> Vec<Repository> {
        names
            .iter()
            .map(|n| Repository::new("octo", n, false))
            .collect()
    }

    fn delete_partition(names: &[&str]) -> Partition {
        Partition {
            to_keep: Vec::new(),
            to_delete: repos(names),
        }
    }

    #[tokio::test]
    async fn test_dry_run_makes_no_delete_calls() {
        let mut mock = MockRemoteDirectory::new();
        mock.expect_delete_repository().times(0);

        let partition = delete_partition(&["a", "b", "c"]);
        let report = Executor::new(&mock)
            .run(&partition, RunMode::DryRun, &mut NullSink)
            .await;

        assert_eq!(report.planned.len(), 3);
        assert_eq!(report.attempted(), 0);
        assert!(!report.is_noop());
    }

    #[tokio::test]
    async fn test_empty_delete_list_is_noop_in_both_modes() {
        for mode in [RunMode::DryRun, RunMode::Execute] {
            let mut mock = MockRemoteDirectory::new();
            mock.expect_delete_repository().times(0);

            let report = Executor::new(&mock)
                .run(&Partition::default(), mode, &mut NullSink)
                .await;

            assert!(report.is_noop());
            assert_eq!(report.attempted(), 0);
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_remaining_deletes() {
        let account = FakeAccount::new("octo", &[]).failing_delete("two", 403);
        let partition = delete_partition(&["one", "two", "three"]);
        let mut events = Vec::new();

        let report = Executor::new(&account)
            .run(&partition, RunMode::Execute, &mut events)
            .await;

        assert_eq!(
            account.delete_calls(),
            vec!["delete octo/one", "delete octo/two", "delete octo/three"]
        );
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.outcomes[0].is_success());
        assert!(!report.outcomes[1].is_success());
        assert!(report.outcomes[2].is_success());

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0.full_name, "octo/two");
        assert!(failures[0].1.contains("403"));

        assert_matches!(&events[0], SweepEvent::Deleted(r) if r.name == "one");
        assert_matches!(&events[1], SweepEvent::DeleteFailed { repository, .. } if repository.name == "two");
        assert_matches!(&events[2], SweepEvent::Deleted(r) if r.name == "three");
        assert_matches!(&events[3], SweepEvent::Finished(_));
    }

    fn whitelist_file(content: &str) -> (assert_fs::TempDir, PathBuf) {
        let temp = assert_fs::TempDir::new().expect("temp dir");
        let file = temp.child("repo-whitelist.yml");
        file.write_str(content).expect("write whitelist");
        let path = file.path().to_path_buf();
        (temp, path)
    }

    #[tokio::test]
    async fn test_sweep_deletes_everything_not_whitelisted() {
        let (_temp, path) = whitelist_file("repositories:\n  - Octo/Keep\n");
        let account = FakeAccount::new("octo", &["keep", "drop-1", "drop-2"]);
        let sweeper = Sweeper::new(
            account,
            RunOptions {
                mode: RunMode::Execute,
                whitelist_path: path,
            },
        );

        let mut events = Vec::new();
        let summary = sweeper.run(&mut events).await.expect("sweep");

        assert_eq!(summary.username, "octo");
        assert_eq!(summary.whitelist_entries, 1);
        assert_eq!(summary.partition.to_keep.len(), 1);
        assert_eq!(summary.report.succeeded(), 2);
        assert_eq!(
            sweeper.client.calls(),
            vec!["whoami", "list 1", "delete octo/drop-1", "delete octo/drop-2"]
        );
        assert_eq!(events[0], SweepEvent::Started(RunMode::Execute));
        assert_eq!(events[1], SweepEvent::WhitelistLoaded { entries: 1 });
    }

    #[tokio::test]
    async fn test_sweep_dry_run_lists_but_never_deletes() {
        let (_temp, path) = whitelist_file("- octo/keep\n");
        let account = FakeAccount::new("octo", &["keep", "drop"]);
        let sweeper = Sweeper::new(
            account,
            RunOptions {
                mode: RunMode::DryRun,
                whitelist_path: path,
            },
        );

        let summary = sweeper.run(&mut NullSink).await.expect("sweep");

        assert_eq!(summary.report.planned, repos(&["drop"]));
        assert!(sweeper.client.delete_calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_whitelist_aborts_before_remote_calls() {
        let temp = assert_fs::TempDir::new().expect("temp dir");
        let mut mock = MockRemoteDirectory::new();
        mock.expect_whoami().times(0);
        mock.expect_list_owned_page().times(0);
        mock.expect_delete_repository().times(0);

        let sweeper = Sweeper::new(
            mock,
            RunOptions {
                mode: RunMode::Execute,
                whitelist_path: temp.path().join("missing.yml"),
            },
        );

        let result = sweeper.run(&mut NullSink).await;
        assert_matches!(result, Err(SweepError::Config { .. }));
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_before_deletes() {
        let (_temp, path) = whitelist_file("- octo/keep\n");
        let mut mock = MockRemoteDirectory::new();
        mock.expect_whoami().returning(|| Ok("octo".to_string()));
        mock.expect_list_owned_page()
            .returning(|_, _, _| Err(SweepError::fetch(500, "server error")));
        mock.expect_delete_repository().times(0);

        let sweeper = Sweeper::new(
            mock,
            RunOptions {
                mode: RunMode::Execute,
                whitelist_path: path,
            },
        );

        let result = sweeper.run(&mut NullSink).await;
        assert_matches!(result, Err(SweepError::Fetch { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_rejected_credential_aborts_before_listing() {
        let (_temp, path) = whitelist_file("- octo/keep\n");
        let mut mock = MockRemoteDirectory::new();
        mock.expect_whoami()
            .returning(|| Err(SweepError::auth("credential rejected with status 401")));
        mock.expect_list_owned_page().times(0);

        let sweeper = Sweeper::new(
            mock,
            RunOptions {
                mode: RunMode::Execute,
                whitelist_path: path,
            },
        );

        let err = sweeper.run(&mut NullSink).await.unwrap_err();
        assert!(err.is_precondition());
    }
}
