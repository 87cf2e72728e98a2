//! reposweep - Whitelist-driven GitHub repository cleanup
//!
//! reposweep fetches every repository owned by the authenticated account,
//! keeps the ones named in a whitelist file and deletes the rest.
//!
//! ## Core Features
//!
//! - **Complete Listing**: Pages through every owned repository before deciding anything
//! - **Case-insensitive Matching**: `Owner/Repo` in GitHub matches `owner/repo` in the whitelist
//! - **Dry Run**: Report the keep/delete split without deleting
//! - **Partial-failure Tolerance**: One failed delete never stops the rest
//!
//! ## Modules
//!
//! - [`config`]: Configuration, run mode and credential handling
//! - [`github`]: GitHub API client and pagination
//! - [`whitelist`]: Whitelist parsing
//! - [`reconcile`]: Keep/delete partitioning
//! - [`cleanup`]: Deletion executor and sweep orchestration
//! - [`report`]: Console rendering of sweep events

pub mod cleanup;
pub mod config;
pub mod error;
pub mod events;
pub mod github;
pub mod reconcile;
pub mod report;
pub mod whitelist;

pub use cleanup::{CleanupReport, DeleteOutcome, Executor, SweepSummary, Sweeper};
pub use config::{Config, Credential, RunMode, RunOptions};
pub use error::SweepError;
pub use events::{EventSink, SweepEvent};
pub use github::{GitHubClient, RemoteDirectory, Repository};
pub use reconcile::{partition, Partition};
pub use whitelist::Whitelist;
