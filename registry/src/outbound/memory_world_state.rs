//! Ordered in-memory world state.
//!
//! Keys are kept in a `BTreeMap`, so range scans come back in lexicographic
//! byte order as they would from the ledger. Each scan copies the matching
//! entries when it opens, giving the cursor a consistent snapshot that later
//! writes cannot disturb.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::domain::ports::{StateCursor, StateEntry, WorldState, WorldStateError};

/// Leading character reserved for composite keys; plain range scans skip it.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

/// World state held in process memory.
///
/// # Examples
/// ```
/// use house_registry::WorldState;
/// use house_registry::outbound::MemoryWorldState;
///
/// let state = MemoryWorldState::new();
/// state.put_state("b", b"2").expect("write");
/// state.put_state("a", b"1").expect("write");
///
/// let keys: Vec<String> = state
///     .get_state_by_range("", "")
///     .expect("scan")
///     .map(|entry| entry.expect("entry").key)
///     .collect();
/// assert_eq!(keys, ["a", "b"]);
/// assert_eq!(state.open_cursors(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemoryWorldState {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    open_cursors: Arc<AtomicUsize>,
}

impl MemoryWorldState {
    /// Create an empty world state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world state pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(entries: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            entries: Mutex::new(entries),
            open_cursors: Arc::default(),
        }
    }

    /// Copy every stored entry, composite keys included.
    ///
    /// # Errors
    ///
    /// Returns [`WorldStateError::Unavailable`] if the store lock is poisoned.
    pub fn entries(&self) -> Result<BTreeMap<String, Vec<u8>>, WorldStateError> {
        Ok(self.lock()?.clone())
    }

    /// Number of range cursors that have been opened and not yet dropped.
    #[must_use]
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, Vec<u8>>>, WorldStateError> {
        self.entries
            .lock()
            .map_err(|_| WorldStateError::unavailable("world state lock poisoned"))
    }

    fn copy_range(
        &self,
        bounds: (Bound<&str>, Bound<&str>),
    ) -> Result<Vec<StateEntry>, WorldStateError> {
        let entries = self.lock()?;
        Ok(entries
            .range::<str, _>(bounds)
            .filter(|(key, _)| !key.starts_with(COMPOSITE_KEY_NAMESPACE))
            .map(|(key, value)| StateEntry::new(key.as_str(), value.as_slice()))
            .collect())
    }
}

impl WorldState for MemoryWorldState {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, WorldStateError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> Result<(), WorldStateError> {
        if key.is_empty() {
            return Err(WorldStateError::write(key, "key must not be an empty string"));
        }
        self.lock()?.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn get_state_by_range(
        &self,
        start_key: &str,
        end_key: &str,
    ) -> Result<StateCursor, WorldStateError> {
        let snapshot = scan_bounds(start_key, end_key)
            .map(|bounds| self.copy_range(bounds))
            .transpose()?
            .unwrap_or_default();
        debug!(start_key, end_key, matched = snapshot.len(), "opened range cursor");

        Ok(Box::new(SnapshotCursor::open(
            snapshot,
            Arc::clone(&self.open_cursors),
        )))
    }
}

/// Translate ledger-style range arguments into map bounds.
///
/// Returns `None` for ranges that cannot contain any key.
fn scan_bounds<'a>(
    start_key: &'a str,
    end_key: &'a str,
) -> Option<(Bound<&'a str>, Bound<&'a str>)> {
    if !start_key.is_empty() && !end_key.is_empty() && start_key >= end_key {
        return None;
    }
    let lower = if start_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Included(start_key)
    };
    let upper = if end_key.is_empty() {
        Bound::Unbounded
    } else {
        Bound::Excluded(end_key)
    };
    Some((lower, upper))
}

/// Cursor over a copied slice of the store; decrements the open count on drop.
struct SnapshotCursor {
    entries: std::vec::IntoIter<StateEntry>,
    open_cursors: Arc<AtomicUsize>,
}

impl SnapshotCursor {
    fn open(entries: Vec<StateEntry>, open_cursors: Arc<AtomicUsize>) -> Self {
        open_cursors.fetch_add(1, Ordering::SeqCst);
        Self {
            entries: entries.into_iter(),
            open_cursors,
        }
    }
}

impl Iterator for SnapshotCursor {
    type Item = Result<StateEntry, WorldStateError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(Ok)
    }
}

impl Drop for SnapshotCursor {
    fn drop(&mut self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    //! Range scan and cursor lifecycle coverage.

    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn populated() -> MemoryWorldState {
        let state = MemoryWorldState::new();
        for key in ["H2", "H10", "H1", "A7"] {
            state.put_state(key, key.as_bytes()).expect("seed write");
        }
        state
    }

    fn scan_keys(state: &MemoryWorldState, start: &str, end: &str) -> Vec<String> {
        state
            .get_state_by_range(start, end)
            .expect("scan opens")
            .map(|entry| entry.expect("entry").key)
            .collect()
    }

    #[rstest]
    fn get_returns_written_value(populated: MemoryWorldState) {
        assert_eq!(
            populated.get_state("H1").expect("read"),
            Some(b"H1".to_vec())
        );
        assert_eq!(populated.get_state("H3").expect("read"), None);
    }

    #[rstest]
    fn put_overwrites_existing_value(populated: MemoryWorldState) {
        populated.put_state("H1", b"replaced").expect("write");
        assert_eq!(
            populated.get_state("H1").expect("read"),
            Some(b"replaced".to_vec())
        );
    }

    #[rstest]
    fn put_rejects_empty_key() {
        let state = MemoryWorldState::new();
        let error = state.put_state("", b"{}").expect_err("empty key");
        assert!(matches!(error, WorldStateError::Write { .. }));
    }

    #[rstest]
    #[case::whole_namespace("", "", &["A7", "H1", "H10", "H2"])]
    #[case::from_start("H1", "", &["H1", "H10", "H2"])]
    #[case::up_to_end("", "H10", &["A7", "H1"])]
    #[case::bounded("H1", "H2", &["H1", "H10"])]
    #[case::inverted("H2", "H1", &[])]
    #[case::equal_bounds("H1", "H1", &[])]
    fn range_scan_honours_bounds(
        populated: MemoryWorldState,
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: &[&str],
    ) {
        assert_eq!(scan_keys(&populated, start, end), expected);
    }

    #[rstest]
    fn range_scan_skips_composite_keys(populated: MemoryWorldState) {
        populated
            .put_state("\u{0}owner\u{0}OrgA\u{0}", b"index")
            .expect("write");

        assert_eq!(scan_keys(&populated, "", ""), ["A7", "H1", "H10", "H2"]);
        assert_eq!(populated.entries().expect("entries").len(), 5);
    }

    #[rstest]
    fn cursor_sees_snapshot_taken_at_open(populated: MemoryWorldState) {
        let cursor = populated.get_state_by_range("", "").expect("scan opens");
        populated.put_state("Z9", b"late").expect("write");

        assert_eq!(cursor.count(), 4);
    }

    #[rstest]
    fn dropping_cursor_early_releases_it(populated: MemoryWorldState) {
        let mut cursor = populated.get_state_by_range("", "").expect("scan opens");
        assert!(cursor.next().is_some());
        assert_eq!(populated.open_cursors(), 1);

        drop(cursor);
        assert_eq!(populated.open_cursors(), 0);
    }
}
