//! Repository whitelist
//!
//! The whitelist file is a YAML-looking list, but only list items matter:
//! every line that trims to `- owner/name` contributes one entry. Headers,
//! comments, blank lines and anything else are ignored without complaint.

use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SweepError};

const LIST_MARKER: &str = "- ";
const COMMENT_MARKER: char = '#';

/// Owner segment used by the template's example entry
pub const PLACEHOLDER_OWNER: &str = "username/";

const TEMPLATE: &str = "\
# Repository whitelist
#
# Every repository owned by the authenticated account that is NOT listed
# here will be deleted. Entries are `owner/name` and match case-insensitively.
#
# Replace the example entry below with your own repositories.

repositories:
  - username/repo-name
";

/// Immutable set of lowercased `owner/name` entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: HashSet<String>,
}

impl Whitelist {
    /// Parse whitelist text
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(parse_entry)
            .map(|entry| entry.to_lowercase())
            .collect();

        Self { entries }
    }

    /// Read and parse the whitelist file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SweepError::config(format!(
                "Whitelist file not found at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SweepError::config(format!(
                "Failed to read whitelist file {}: {}",
                path.display(),
                e
            ))
        })?;

        let whitelist = Self::parse(&content);
        debug!(
            "Loaded {} whitelist entries from {}",
            whitelist.len(),
            path.display()
        );
        Ok(whitelist)
    }

    /// Membership test; `qualified_name` must already be lowercased
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.entries.contains(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starter file written by `reposweep init`
    pub fn template() -> &'static str {
        TEMPLATE
    }
}

/// Extract the entry from one line, if the line is a usable list item
fn parse_entry(line: &str) -> Option<&str> {
    let item = line.trim().strip_prefix(LIST_MARKER)?;

    // An untouched template entry must never protect anything.
    if item.starts_with(PLACEHOLDER_OWNER) {
        return None;
    }

    let entry = item.trim();
    if entry.is_empty() || entry.starts_with(COMMENT_MARKER) {
        return None;
    }

    Some(entry)
}

impl FromIterator<String> for Whitelist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|entry| entry.to_lowercase()).collect(),
        }
    }
}
