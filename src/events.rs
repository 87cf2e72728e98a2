//! Structured progress events emitted during a sweep
//!
//! The core never prints. It reports what happens through an [`EventSink`]
//! and the binary decides how to render it.

use crate::cleanup::CleanupReport;
use crate::config::RunMode;
use crate::github::Repository;
use crate::reconcile::Partition;

/// Events that can occur during a sweep, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum SweepEvent {
    /// Run is starting in the given mode
    Started(RunMode),
    /// Whitelist parsed
    WhitelistLoaded { entries: usize },
    /// Credential accepted
    Authenticated { username: String },
    /// Listing finished
    RepositoriesFetched { total: usize },
    /// Keep/delete split computed
    Partitioned(Partition),
    /// A repository was deleted
    Deleted(Repository),
    /// A delete attempt failed; the run continues
    DeleteFailed { repository: Repository, reason: String },
    /// Execution phase finished
    Finished(CleanupReport),
}

/// Receiver for [`SweepEvent`]s
pub trait EventSink {
    fn emit(&mut self, event: SweepEvent);
}

/// Collects events in memory
impl EventSink for Vec<SweepEvent> {
    fn emit(&mut self, event: SweepEvent) {
        self.push(event);
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SweepEvent) {}
}
