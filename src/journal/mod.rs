//! The entry collection and its persisted mirror.
//!
//! The whole collection is stored as one JSON array under [`ENTRIES_KEY`].
//! Every append rewrites that blob; storage order is creation order.

use time::OffsetDateTime;

use crate::storage::KeyValueStore;

mod entry;

pub use entry::{now_millis, validate, Entry, InvalidFields};

pub const ENTRIES_KEY: &str = "logs";
/// Where an unreadable blob is parked before the store starts over.
pub const CORRUPT_KEY: &str = "logs.corrupt";

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("cannot create entry: {}", .0.describe())]
    Invalid(InvalidFields),
    #[error("stored entries are not a valid collection")]
    Corrupt(#[source] serde_json::Error),
    #[error("serializing entries")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub fn decode_entries(raw: &str) -> Result<Vec<Entry>, JournalError> {
    // `null` is what an explicitly cleared blob looks like; treat it as empty.
    let entries: Option<Vec<Entry>> = serde_json::from_str(raw).map_err(JournalError::Corrupt)?;
    Ok(entries.unwrap_or_default())
}

pub fn encode_entries(entries: &[Entry]) -> Result<String, JournalError> {
    serde_json::to_string(entries).map_err(JournalError::Encode)
}

#[derive(Debug)]
pub struct EntryStore<S> {
    store: S,
    entries: Vec<Entry>,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Strict load: a blob that does not decode is an error.
    pub fn load(store: S) -> Result<Self, JournalError> {
        let entries = match store.get(ENTRIES_KEY)? {
            Some(raw) => decode_entries(&raw)?,
            None => Vec::new(),
        };
        Ok(Self { store, entries })
    }

    /// Startup load. An undecodable blob is copied to [`CORRUPT_KEY`] and the
    /// store starts empty. A failed backup write is logged, not returned;
    /// storage read failures still propagate.
    pub fn open(store: S) -> Result<Self, JournalError> {
        let Some(raw) = store.get(ENTRIES_KEY)? else {
            return Ok(Self {
                store,
                entries: Vec::new(),
            });
        };
        let entries = match decode_entries(&raw) {
            Ok(entries) => entries,
            Err(JournalError::Corrupt(err)) => {
                tracing::warn!(
                    %err,
                    bytes = raw.len(),
                    backup_key = CORRUPT_KEY,
                    "stored entries unreadable, starting with an empty journal"
                );
                if let Err(err) = store.set(CORRUPT_KEY, &raw) {
                    tracing::warn!(
                        ?err,
                        backup_key = CORRUPT_KEY,
                        "could not back up unreadable entries"
                    );
                }
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        tracing::debug!(count = entries.len(), "entries loaded");
        Ok(Self { store, entries })
    }

    pub fn append(&mut self, title: &str, body: &str) -> Result<&Entry, JournalError> {
        self.append_at(title, body, now_millis())
    }

    /// Appends and persists. On a failed write the in-memory collection is
    /// left as it was before the call.
    pub fn append_at(
        &mut self,
        title: &str,
        body: &str,
        created_at: OffsetDateTime,
    ) -> Result<&Entry, JournalError> {
        validate(title, body).map_err(JournalError::Invalid)?;
        self.entries.push(Entry::new(title, body, created_at));
        if let Err(err) = self.persist() {
            self.entries.pop();
            return Err(err);
        }
        tracing::info!(count = self.entries.len(), "entry created and saved");
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self) -> Result<(), JournalError> {
        let blob = encode_entries(&self.entries)?;
        self.store.set(ENTRIES_KEY, &blob)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use anyhow::bail;
    use assert_matches::assert_matches;
    use time::macros::datetime;

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            bail!("disk full")
        }
    }

    #[test]
    fn missing_blob_loads_empty() -> anyhow::Result<()> {
        let journal = EntryStore::load(MemoryStore::new())?;
        assert!(journal.is_empty());
        Ok(())
    }

    #[test]
    fn null_blob_loads_empty() -> anyhow::Result<()> {
        let journal = EntryStore::load(MemoryStore::with_value(ENTRIES_KEY, "null"))?;
        assert!(journal.is_empty());
        Ok(())
    }

    #[test]
    fn append_keeps_creation_order_in_storage() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut journal = EntryStore::load(&store)?;
        journal.append_at("Day 1", "Went well", datetime!(2024-01-01 09:00 UTC))?;
        journal.append_at("Day 2", "Also well", datetime!(2024-01-02 09:00 UTC))?;

        let raw = store.get(ENTRIES_KEY)?.unwrap_or_default();
        let stored = decode_entries(&raw)?;
        let titles: Vec<_> = stored.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Day 1", "Day 2"]);
        assert_eq!(journal.all().last().map(|e| e.title.as_str()), Some("Day 2"));
        Ok(())
    }

    #[test]
    fn reload_reconstructs_the_in_memory_sequence() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut journal = EntryStore::load(&store)?;
        for i in 0..5 {
            journal.append(&format!("title {i}"), &format!("<em>body</em> {i}"))?;
        }
        let expected = journal.all().to_vec();

        let reloaded = EntryStore::load(&store)?;
        assert_eq!(reloaded.all(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn append_rejects_empty_fields_without_writing() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut journal = EntryStore::load(&store)?;
        let err = journal.append("", "body").unwrap_err();
        assert_matches!(err, JournalError::Invalid(fields) if fields == InvalidFields::TITLE);
        assert!(journal.is_empty());
        assert_eq!(store.get(ENTRIES_KEY)?, None);
        Ok(())
    }

    #[test]
    fn strict_load_reports_corrupt_blob() {
        let result = EntryStore::load(MemoryStore::with_value(ENTRIES_KEY, "{not json"));
        assert_matches!(result, Err(JournalError::Corrupt(_)));
    }

    #[test]
    fn open_parks_corrupt_blob_and_starts_empty() -> anyhow::Result<()> {
        let store = MemoryStore::with_value(ENTRIES_KEY, r#"[{"title":"x"}]"#);
        let mut journal = EntryStore::open(&store)?;
        assert!(journal.is_empty());
        assert_eq!(
            store.get(CORRUPT_KEY)?.as_deref(),
            Some(r#"[{"title":"x"}]"#)
        );

        journal.append("fresh", "start")?;
        assert_eq!(EntryStore::load(&store)?.len(), 1);
        Ok(())
    }

    #[test]
    fn open_survives_a_failed_backup_write() -> anyhow::Result<()> {
        let store = ReadOnlyStore(MemoryStore::with_value(ENTRIES_KEY, "{not json"));
        let journal = EntryStore::open(&store)?;
        assert!(journal.is_empty());
        assert_eq!(store.get(CORRUPT_KEY)?, None);
        Ok(())
    }

    #[test]
    fn failed_write_rolls_back_the_append() -> anyhow::Result<()> {
        let mut journal = EntryStore::load(ReadOnlyStore(MemoryStore::new()))?;
        let err = journal.append("Day 1", "Went well").unwrap_err();
        assert_matches!(err, JournalError::Storage(_));
        assert!(journal.is_empty());
        Ok(())
    }
}
