//! History view refresh: fetch everything, then aggregate.
//!
//! The caller owns the refresh cycle. Each call re-fetches the full entry
//! set and rebuilds the day groups from scratch; a failed fetch returns
//! before any grouping work starts.

use crate::aggregate::{aggregate, filter_by_range, AggregateOptions, DayRange};
use crate::store::EntryStore;
use crate::{DayGroup, Result};

/// Fetch all entries and build the (optionally range-limited) day summary
pub fn load_history<S: EntryStore + ?Sized>(
    store: &S,
    options: &AggregateOptions,
    range: &DayRange,
) -> Result<Vec<DayGroup>> {
    let entries = store.fetch_all()?;
    let groups = filter_by_range(aggregate(&entries, options), range);

    tracing::info!(
        "Loaded history: {} entries across {} days",
        entries.len(),
        groups.len()
    );

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonlStore;
    use crate::{EntryPatch, Error, LogEntry, NewEntry, SelectionPolicy};
    use chrono::{FixedOffset, TimeZone, Utc};
    use uuid::Uuid;

    /// Store whose fetch always fails, standing in for a network/storage outage
    struct FailingStore;

    impl EntryStore for FailingStore {
        fn fetch_all(&self) -> Result<Vec<LogEntry>> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "store offline",
            )))
        }
        fn insert(&mut self, _entry: NewEntry) -> Result<LogEntry> {
            unreachable!()
        }
        fn update(&mut self, _id: Uuid, _patch: &EntryPatch) -> Result<LogEntry> {
            unreachable!()
        }
        fn delete(&mut self, _id: Uuid) -> Result<()> {
            unreachable!()
        }
    }

    fn options() -> AggregateOptions {
        AggregateOptions {
            policy: SelectionPolicy::TopN(3),
            normalize_names: false,
            utc_offset: FixedOffset::east_opt(0),
        }
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let result = load_history(&FailingStore, &options(), &DayRange::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_refresh_after_mutation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(temp_dir.path().join("entries.jsonl"));
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 18, 0, 0).unwrap();

        let heavy = store
            .insert(NewEntry::new("bench", 100.0, 10).at(at))
            .unwrap();
        store
            .insert(NewEntry::new("bench", 100.0, 5).at(at))
            .unwrap();

        let groups = load_history(&store, &options(), &DayRange::default()).unwrap();
        assert_eq!(groups[0].bench[0].strength_index, 133.0);

        store.delete(heavy.id).unwrap();

        let groups = load_history(&store, &options(), &DayRange::default()).unwrap();
        assert_eq!(groups[0].bench.len(), 1);
        assert_eq!(groups[0].bench[0].strength_index, 117.0);
    }

    #[test]
    fn test_range_applied() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::new(temp_dir.path().join("entries.jsonl"));
        for day in [1, 15] {
            let at = Utc.with_ymd_and_hms(2024, 2, day, 9, 0, 0).unwrap();
            store.insert(NewEntry::new("Lunge", 20.0, 10).at(at)).unwrap();
        }

        let range = DayRange::parse(Some("2024-02-10"), None).unwrap();
        let groups = load_history(&store, &options(), &range).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date.to_string(), "2024/02/15");
    }
}
