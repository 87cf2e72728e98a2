//! Keep/delete partitioning of the fetched repository list

use crate::github::Repository;
use crate::whitelist::Whitelist;

/// Lossless split of the fetched repositories
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub to_keep: Vec<Repository>,
    pub to_delete: Vec<Repository>,
}

impl Partition {
    /// Number of repositories across both sides
    pub fn total(&self) -> usize {
        self.to_keep.len() + self.to_delete.len()
    }
}

/// Stable partition of `repositories` by whitelist membership (case-insensitive)
pub fn partition(repositories: Vec<Repository>, whitelist: &Whitelist) -> Partition {
    let (to_keep, to_delete): (Vec<_>, Vec<_>) = repositories
        .into_iter()
        .partition(|repo| whitelist.contains(&repo.match_key()));

    Partition { to_keep, to_delete }
}
