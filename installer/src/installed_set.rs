//! Ordered accumulation of installed dependencies.

use crate::descriptor::Dependency;
use std::collections::BTreeMap;

/// Dependencies installed during a run, keyed by `group.fileName`.
///
/// Keying by group and file name makes the aggregate dependency list
/// independent of manifest order; inserting the same key twice keeps one
/// entry holding the most recent dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledSet {
    entries: BTreeMap<String, Dependency>,
}

impl InstalledSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dependency`, returning the entry it replaced, if any.
    pub fn insert(
        &mut self,
        group_id: &str,
        file_name: &str,
        dependency: Dependency,
    ) -> Option<Dependency> {
        self.entries
            .insert(format!("{group_id}.{file_name}"), dependency)
    }

    /// Number of distinct keys recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Consume the set, yielding dependencies in key order.
    #[must_use]
    pub fn into_dependencies(self) -> Vec<Dependency> {
        self.entries.into_values().collect()
    }
}
