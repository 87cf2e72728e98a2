//! Console rendering of sweep events

use std::io::{self, Write};

use crate::cleanup::CleanupReport;
use crate::config::RunMode;
use crate::events::{EventSink, SweepEvent};
use crate::reconcile::Partition;

/// Renders sweep events as a human-readable report
pub struct ConsoleReporter<W: Write> {
    out: W,
    mode: RunMode,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            mode: RunMode::DryRun,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &SweepEvent) -> io::Result<()> {
        match event {
            SweepEvent::Started(mode) => {
                self.mode = *mode;
                writeln!(self.out, "=== GitHub Repository Cleanup ===")?;
                writeln!(self.out, "Mode: {}", mode.label())?;
                writeln!(self.out)?;
            }
            SweepEvent::WhitelistLoaded { entries } => {
                writeln!(self.out, "Whitelist contains {} repositories", entries)?;
            }
            SweepEvent::Authenticated { username } => {
                writeln!(self.out, "Authenticated as: {}", username)?;
            }
            SweepEvent::RepositoriesFetched { total } => {
                writeln!(self.out, "Found {} total repositories", total)?;
                writeln!(self.out)?;
            }
            SweepEvent::Partitioned(partition) => self.write_partition(partition)?,
            SweepEvent::Deleted(repository) => {
                writeln!(self.out, "  ✓ Deleted: {}", repository.full_name)?;
            }
            SweepEvent::DeleteFailed { repository, reason } => {
                writeln!(
                    self.out,
                    "  ✗ Failed to delete {}: {}",
                    repository.full_name, reason
                )?;
            }
            SweepEvent::Finished(report) => self.write_report(report)?,
        }
        Ok(())
    }

    fn write_partition(&mut self, partition: &Partition) -> io::Result<()> {
        writeln!(self.out, "=== Summary ===")?;
        writeln!(self.out, "Repositories to keep: {}", partition.to_keep.len())?;
        writeln!(
            self.out,
            "Repositories to delete: {}",
            partition.to_delete.len()
        )?;
        writeln!(self.out)?;

        if !partition.to_keep.is_empty() {
            writeln!(self.out, "Keeping:")?;
            for repo in &partition.to_keep {
                writeln!(self.out, "  ✓ {}", repo)?;
            }
            writeln!(self.out)?;
        }

        if partition.to_delete.is_empty() {
            return Ok(());
        }

        writeln!(self.out, "Will delete:")?;
        for repo in &partition.to_delete {
            writeln!(self.out, "  ✗ {}", repo)?;
        }
        writeln!(self.out)?;

        if self.mode == RunMode::Execute {
            writeln!(self.out, "⚠️  DELETING REPOSITORIES...")?;
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn write_report(&mut self, report: &CleanupReport) -> io::Result<()> {
        if report.is_noop() {
            writeln!(self.out, "No repositories to delete.")?;
            return Ok(());
        }

        if report.mode.is_dry_run() {
            writeln!(self.out, "DRY RUN: No repositories were deleted.")?;
            writeln!(
                self.out,
                "Use 'reposweep run' without --dry-run or DRY_RUN=true to delete these {} repositories.",
                report.planned.len()
            )?;
            return Ok(());
        }

        writeln!(self.out)?;
        writeln!(self.out, "Cleanup complete.")?;
        writeln!(self.out, "   Attempted: {}", report.attempted())?;
        writeln!(self.out, "   Deleted: {}", report.succeeded())?;
        writeln!(self.out, "   Failed: {}", report.failed())?;

        if report.failed() > 0 {
            writeln!(self.out)?;
            writeln!(self.out, "Failed deletions:")?;
            for (repository, reason) in report.failures() {
                writeln!(self.out, "   ✗ {}: {}", repository.full_name, reason)?;
            }
        }
        Ok(())
    }
}

impl<W: Write> EventSink for ConsoleReporter<W> {
    fn emit(&mut self, event: SweepEvent) {
        // A closed stdout must not interrupt deletions already underway.
        if let Err(e) = self.write_event(&event) {
            tracing::debug!("Failed to write report line: {}", e);
        }
    }
}
