//! World-state snapshot files.
//!
//! A snapshot persists a [`MemoryWorldState`] between command-line
//! invocations as versioned JSON with hex-encoded values:
//!
//! ```json
//! { "version": 1, "entries": { "H1": "7b224e61..." } }
//! ```
//!
//! Writes go to a hidden temporary file beside the target which is synced
//! and then renamed over it, so readers never observe a half-written
//! snapshot.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::MemoryWorldState;

/// Snapshot format version written and accepted by this crate.
pub const SNAPSHOT_VERSION: u32 = 1;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Errors raised while loading or writing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot file or its directory could not be read.
    #[error("failed to read snapshot at '{path}': {message}")]
    Io {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The snapshot is not valid JSON of the expected shape.
    #[error("invalid snapshot JSON: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
    },

    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Version this crate understands.
        expected: u32,
        /// Version recorded in the file.
        actual: u32,
    },

    /// A stored value is not valid hex.
    #[error("invalid hex value for key '{key}': {message}")]
    InvalidValue {
        /// Key whose value failed to decode.
        key: String,
        /// Description of the decode error.
        message: String,
    },

    /// The entries could not be serialised.
    #[error("failed to encode snapshot: {message}")]
    Encode {
        /// Description of the serialisation error.
        message: String,
    },

    /// The snapshot could not be written.
    #[error("failed to write snapshot at '{path}': {message}")]
    Write {
        /// Path that failed.
        path: Utf8PathBuf,
        /// Description of the failure.
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct RawSnapshot {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Decode snapshot JSON into raw key/value entries.
///
/// # Errors
///
/// Returns [`SnapshotError::Parse`] for malformed JSON,
/// [`SnapshotError::UnsupportedVersion`] for a foreign version and
/// [`SnapshotError::InvalidValue`] when a value is not hex.
///
/// # Examples
/// ```
/// use house_registry::outbound::decode_snapshot;
///
/// let entries = decode_snapshot(r#"{"version":1,"entries":{"H1":"7b7d"}}"#)
///     .expect("valid snapshot");
/// assert_eq!(entries.get("H1").map(Vec::as_slice), Some(&b"{}"[..]));
/// ```
pub fn decode_snapshot(json: &str) -> Result<BTreeMap<String, Vec<u8>>, SnapshotError> {
    let raw: RawSnapshot = serde_json::from_str(json).map_err(|err| SnapshotError::Parse {
        message: err.to_string(),
    })?;
    if raw.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            expected: SNAPSHOT_VERSION,
            actual: raw.version,
        });
    }

    raw.entries
        .into_iter()
        .map(|(key, value)| match hex::decode(&value) {
            Ok(bytes) => Ok((key, bytes)),
            Err(err) => Err(SnapshotError::InvalidValue {
                key,
                message: err.to_string(),
            }),
        })
        .collect()
}

/// Encode key/value entries as pretty-printed snapshot JSON.
///
/// # Errors
///
/// Returns [`SnapshotError::Encode`] if serialisation fails.
pub fn encode_snapshot(entries: &BTreeMap<String, Vec<u8>>) -> Result<String, SnapshotError> {
    let raw = RawSnapshot {
        version: SNAPSHOT_VERSION,
        entries: entries
            .iter()
            .map(|(key, value)| (key.clone(), hex::encode(value)))
            .collect(),
    };
    serde_json::to_string_pretty(&raw).map_err(|err| SnapshotError::Encode {
        message: err.to_string(),
    })
}

/// Snapshot file bound to a directory handle.
#[derive(Debug)]
pub struct SnapshotStore {
    dir: Dir,
    file_name: Utf8PathBuf,
    path: Utf8PathBuf,
}

impl SnapshotStore {
    /// Open the directory holding `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] if `path` does not name a file or its
    /// parent directory cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, SnapshotError> {
        let Some(file_name) = path.file_name() else {
            return Err(SnapshotError::Io {
                path: path.to_path_buf(),
                message: "snapshot path must name a file".to_owned(),
            });
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| {
            SnapshotError::Io {
                path: parent.to_path_buf(),
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            dir,
            file_name: Utf8PathBuf::from(file_name),
            path: path.to_path_buf(),
        })
    }

    /// Full path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Load the snapshot into a fresh world state.
    ///
    /// A missing file yields an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] when the file exists but cannot be read,
    /// or any error from [`decode_snapshot`].
    pub fn load(&self) -> Result<MemoryWorldState, SnapshotError> {
        let contents = match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path, "no snapshot found, starting empty");
                return Ok(MemoryWorldState::new());
            }
            Err(err) => {
                return Err(SnapshotError::Io {
                    path: self.path.clone(),
                    message: err.to_string(),
                });
            }
        };

        let entries = decode_snapshot(&contents)?;
        debug!(path = %self.path, entries = entries.len(), "loaded snapshot");
        Ok(MemoryWorldState::with_entries(entries))
    }

    /// Atomically replace the snapshot with the contents of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Write`] if the state cannot be read or the
    /// file cannot be written, and [`SnapshotError::Encode`] if the entries
    /// cannot be serialised.
    pub fn save(&self, state: &MemoryWorldState) -> Result<(), SnapshotError> {
        let entries = state.entries().map_err(|err| SnapshotError::Write {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        let contents = encode_snapshot(&entries)?;
        write_atomic(&self.dir, &self.file_name, &contents).map_err(
            |message| SnapshotError::Write {
                path: self.path.clone(),
                message,
            },
        )?;
        debug!(path = %self.path, entries = entries.len(), "wrote snapshot");
        Ok(())
    }
}

/// Write `contents` to `file_name` in `dir` via a synced temporary file.
fn write_atomic(dir: &Dir, file_name: &Utf8Path, contents: &str) -> Result<(), String> {
    let mut components = file_name.components();
    let (Some(Utf8Component::Normal(target)), None) = (components.next(), components.next())
    else {
        return Err("snapshot path must be a file".to_owned());
    };
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{target}.tmp.{}.{nanos}.{counter}", std::process::id());

    let staged = write_temp_file(dir, &tmp_name, contents)
        .and_then(|()| replace_target(dir, &tmp_name, target));
    if let Err(err) = staged {
        drop(dir.remove_file(&tmp_name));
        return Err(err.to_string());
    }

    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target)
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    use super::*;
    use crate::domain::ports::WorldState;

    struct SnapshotFixture {
        _root: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn snapshot_file() -> SnapshotFixture {
        let root = TempDir::new().expect("tempdir");
        let path = Utf8PathBuf::from_path_buf(root.path().join("world-state.json"))
            .expect("utf-8 temp path");
        SnapshotFixture { _root: root, path }
    }

    #[rstest]
    fn missing_file_loads_empty_state(snapshot_file: SnapshotFixture) {
        let store = SnapshotStore::open(&snapshot_file.path).expect("open store");
        let state = store.load().expect("load");

        assert!(state.entries().expect("entries").is_empty());
    }

    #[rstest]
    fn saved_state_reloads(snapshot_file: SnapshotFixture) {
        let store = SnapshotStore::open(&snapshot_file.path).expect("open store");
        let state = MemoryWorldState::new();
        state.put_state("H1", br#"{"Owner":"OrgA"}"#).expect("write");
        state.put_state("\u{0}idx\u{0}", b"\x00\xff").expect("write");

        store.save(&state).expect("save");
        let reloaded = store.load().expect("reload");

        assert_eq!(
            reloaded.entries().expect("entries"),
            state.entries().expect("entries")
        );
    }

    #[rstest]
    fn save_replaces_previous_snapshot_without_leftovers(snapshot_file: SnapshotFixture) {
        let store = SnapshotStore::open(&snapshot_file.path).expect("open store");
        let state = MemoryWorldState::new();
        state.put_state("H1", b"first").expect("write");
        store.save(&state).expect("first save");
        state.put_state("H1", b"second").expect("write");
        store.save(&state).expect("second save");

        let reloaded = store.load().expect("reload");
        assert_eq!(
            reloaded.get_state("H1").expect("read"),
            Some(b"second".to_vec())
        );

        let parent = snapshot_file.path.parent().expect("parent");
        let names: Vec<String> = std::fs::read_dir(parent)
            .expect("list dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["world-state.json"]);
    }

    #[rstest]
    fn save_into_removed_directory_reports_write_error() {
        let root = TempDir::new().expect("tempdir");
        let state_dir = root.path().join("state");
        std::fs::create_dir(&state_dir).expect("create state dir");
        let path = Utf8PathBuf::from_path_buf(state_dir.join("world-state.json"))
            .expect("utf-8 temp path");
        let store = SnapshotStore::open(&path).expect("open store");
        std::fs::remove_dir(&state_dir).expect("remove state dir");
        let state = MemoryWorldState::new();
        state.put_state("H1", b"{}").expect("write");

        let result = store.save(&state);

        assert!(matches!(
            result,
            Err(SnapshotError::Write { path: ref failed, .. }) if *failed == path
        ));
    }

    #[rstest]
    fn encoded_snapshot_uses_hex_values() {
        let entries = BTreeMap::from([("H1".to_owned(), b"{}".to_vec())]);
        let encoded = encode_snapshot(&entries).expect("encode");
        let json: serde_json::Value = serde_json::from_str(&encoded).expect("valid json");

        assert_eq!(
            json,
            serde_json::json!({ "version": 1, "entries": { "H1": "7b7d" } })
        );
    }

    #[rstest]
    #[case::not_json("not json")]
    #[case::missing_version(r#"{"entries":{}}"#)]
    #[case::entries_not_map(r#"{"version":1,"entries":[]}"#)]
    fn rejects_malformed_snapshot(#[case] json: &str) {
        assert!(matches!(
            decode_snapshot(json),
            Err(SnapshotError::Parse { .. })
        ));
    }

    #[rstest]
    fn rejects_unknown_version() {
        assert_eq!(
            decode_snapshot(r#"{"version":2,"entries":{}}"#),
            Err(SnapshotError::UnsupportedVersion {
                expected: 1,
                actual: 2,
            })
        );
    }

    #[rstest]
    fn rejects_non_hex_value() {
        let result = decode_snapshot(r#"{"version":1,"entries":{"H1":"zz"}}"#);
        assert!(matches!(
            result,
            Err(SnapshotError::InvalidValue { key, .. }) if key == "H1"
        ));
    }

    #[rstest]
    fn version_without_entries_is_empty() {
        let entries = decode_snapshot(r#"{"version":1}"#).expect("valid snapshot");
        assert!(entries.is_empty());
    }

    #[rstest]
    fn open_rejects_missing_directory(snapshot_file: SnapshotFixture) {
        let path = snapshot_file
            .path
            .with_file_name("absent")
            .join("world-state.json");

        assert!(matches!(
            SnapshotStore::open(&path),
            Err(SnapshotError::Io { .. })
        ));
    }
}
