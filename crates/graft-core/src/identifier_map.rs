//! Run-scoped correlation between source and target folder ids.

use std::collections::HashMap;

use crate::error::{GraftError, Result};
use crate::model::FolderId;

/// Maps source folder ids to the ids the target assigned to the same folders.
///
/// Entries are written during the folder phase and only read afterwards. The
/// map lives for one run and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMap {
    entries: HashMap<FolderId, FolderId>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the mapping for `source`.
    ///
    /// Returns the target id previously recorded for `source`, if any.
    pub fn record(&mut self, source: FolderId, target: FolderId) -> Option<FolderId> {
        self.entries.insert(source, target)
    }

    /// Looks up the target id for `source`.
    pub fn resolve(&self, source: FolderId) -> Result<FolderId> {
        self.entries
            .get(&source)
            .copied()
            .ok_or(GraftError::UnmappedFolder(source))
    }

    pub fn contains(&self, source: FolderId) -> bool {
        self.entries.contains_key(&source)
    }

    /// Source ids with a recorded mapping, in no particular order.
    pub fn source_ids(&self) -> impl Iterator<Item = FolderId> + '_ {
        self.entries.keys().copied()
    }

    /// All `(source, target)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (FolderId, FolderId)> + '_ {
        self.entries.iter().map(|(source, target)| (*source, *target))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
