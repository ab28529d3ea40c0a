use thiserror::Error;
use uuid::Uuid;

use crate::models::HistoryEntry;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("history already contains an entry with id {0}")]
pub struct DuplicateEntry(pub Uuid);

/// Append-only log of completed analyses, newest last.
///
/// Entries never change once stored; they can be looked up or removed by
/// their id. An empty store is a valid state, not an error.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Ids must be unique across the whole store.
    pub fn insert(&mut self, entry: HistoryEntry) -> Result<(), DuplicateEntry> {
        if self.entries.iter().any(|e| e.id == entry.id) {
            return Err(DuplicateEntry(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Look up an entry by id. Selecting the same id twice yields the same
    /// entry; selection never consumes or mutates.
    pub fn select(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Remove the entry with `id`, returning it when present.
    pub fn remove(&mut self, id: Uuid) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
