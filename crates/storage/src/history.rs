//! Bounded, newest-first log of scored recipes.
//!
//! The whole log lives in one keyed record as a JSON array, so a reader only
//! ever sees a complete list.

use std::{collections::VecDeque, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shared::{
    domain::EntryId,
    protocol::{BrewRequest, HistoryEntry, ScoreResult, HISTORY_CAPACITY, HISTORY_KEY},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::Storage;

#[derive(Clone)]
pub struct HistoryStore {
    storage: Storage,
    key: String,
    capacity: usize,
    // serializes read-modify-write cycles on the record
    write_lock: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(storage: Storage) -> Self {
        Self::with_key(storage, HISTORY_KEY)
    }

    pub fn with_key(storage: Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            capacity: HISTORY_CAPACITY,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn append(&self, recipe: BrewRequest, result: ScoreResult) -> Result<HistoryEntry> {
        self.append_at(recipe, result, Utc::now()).await
    }

    /// Same as [`append`](Self::append) with an explicit creation time.
    pub async fn append_at(
        &self,
        recipe: BrewRequest,
        result: ScoreResult,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;

        let id = next_entry_id(entries.front().map(|entry| entry.id), now);
        let entry = HistoryEntry {
            id,
            recipe,
            result,
            date: now,
        };

        entries.push_front(entry.clone());
        let dropped = entries.len().saturating_sub(self.capacity);
        entries.truncate(self.capacity);

        self.store(&entries).await?;
        info!(
            entry_id = %entry.id,
            method = %entry.recipe.method,
            total_score = entry.result.total_score,
            len = entries.len(),
            dropped,
            "history entry appended"
        );
        Ok(entry)
    }

    /// Entries newest-first. Every call reads the persisted record afresh.
    pub async fn list(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.load().await?.into())
    }

    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let removed = self.storage.remove_value(&self.key).await?;
        info!(key = %self.key, removed, "history cleared");
        Ok(())
    }

    async fn load(&self) -> Result<VecDeque<HistoryEntry>> {
        let Some(raw) = self.storage.get_value(&self.key).await? else {
            return Ok(VecDeque::new());
        };

        let entries: VecDeque<HistoryEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("history record '{}' is not a valid entry list", self.key))?;
        debug!(key = %self.key, len = entries.len(), "history loaded");
        Ok(entries)
    }

    async fn store(&self, entries: &VecDeque<HistoryEntry>) -> Result<()> {
        let raw = serde_json::to_string(entries).context("failed to encode history entries")?;
        self.storage.put_value(&self.key, &raw).await
    }
}

/// Millisecond timestamp of `now`, moved past `newest` when the clock has not
/// advanced beyond it.
fn next_entry_id(newest: Option<EntryId>, now: DateTime<Utc>) -> EntryId {
    let candidate = now.timestamp_millis();
    match newest {
        Some(EntryId(newest)) if candidate <= newest => EntryId(newest + 1),
        _ => EntryId(candidate),
    }
}
