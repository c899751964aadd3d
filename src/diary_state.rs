use crate::clock::{Clock, RandomSource, SystemClock, ThreadRandom};
use crate::diary_entry::{make_entry_id, DiaryEntry};
use crate::error::{DiaryError, Result};
use crate::storage::{DiaryStorage, KeyValueStore};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

const MAX_ID_ATTEMPTS: usize = 16;

/// Query and mutation API over the persisted diary collection.
///
/// Holds no entries of its own: every call loads the full collection from
/// storage and, for mutations, writes the full collection back.
pub struct DiaryState<S, C = SystemClock, R = ThreadRandom> {
    storage: DiaryStorage<S>,
    clock: C,
    random: R,
}

impl<S: KeyValueStore> DiaryState<S> {
    pub fn new(store: S) -> Self {
        DiaryState::with_sources(store, SystemClock, ThreadRandom)
    }
}

impl<S, C, R> DiaryState<S, C, R>
where
    S: KeyValueStore,
    C: Clock,
    R: RandomSource,
{
    pub fn with_sources(store: S, clock: C, random: R) -> Self {
        DiaryState {
            storage: DiaryStorage::new(store),
            clock,
            random,
        }
    }

    pub fn storage(&self) -> &DiaryStorage<S> {
        &self.storage
    }

    /// All entries, newest first. Equal timestamps order by id.
    pub fn list_all(&self) -> Result<Vec<DiaryEntry>> {
        let mut entries = self.storage.load()?;
        entries.sort_by(newest_first);
        Ok(entries)
    }

    pub fn add_entry(&mut self, title: &str, content: &str) -> Result<DiaryEntry> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DiaryError::EmptyContent);
        }

        let mut entries = self.storage.load()?;
        let timestamp = self.clock.now_ms();
        let id = self.unused_id(&entries, timestamp)?;

        let entry = DiaryEntry::new(id, title.trim().to_string(), content.to_string(), timestamp);
        entries.push(entry.clone());
        self.storage.save(&entries)?;
        info!(id = %entry.id, total = entries.len(), "saved diary entry");
        Ok(entry)
    }

    /// Removes the entry with `id`. Returns `false` when no such entry exists.
    pub fn delete_entry(&mut self, id: &str) -> Result<bool> {
        let mut entries = self.storage.load()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            debug!(%id, "delete requested for unknown entry");
            return Ok(false);
        }
        self.storage.save(&entries)?;
        info!(%id, remaining = entries.len(), "deleted diary entry");
        Ok(true)
    }

    fn unused_id(&self, entries: &[DiaryEntry], timestamp: i64) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = make_entry_id(timestamp, self.random.next_u64());
            if !entries.iter().any(|e| e.id == id) {
                return Ok(id);
            }
            debug!(%id, "generated id already taken, drawing again");
        }
        warn!(attempts = MAX_ID_ATTEMPTS, "gave up generating an entry id");
        Err(DiaryError::IdExhausted(MAX_ID_ATTEMPTS))
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.clear()?;
        info!("cleared all diary entries");
        Ok(())
    }
}

fn newest_first(a: &DiaryEntry, b: &DiaryEntry) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.id.cmp(&b.id))
}
