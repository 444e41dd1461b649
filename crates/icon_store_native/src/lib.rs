//! File-backed [`DurableIntentStore`] for native hosts.
//!
//! The intent namespace lives in its own JSON file (`<root>/<namespace>.json`) so it never
//! collides with unrelated application preferences. Every write goes to a temporary file in the
//! same directory, is flushed with `fsync`, and then atomically renamed over the previous file,
//! so a crash leaves either the old record or the new one on disk.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use icon_host::{DurableIntentStore, IntentRecord, StoreError, SwitchIntent};
use tempfile::NamedTempFile;
use tracing::debug;

/// Namespace used when the host does not choose one.
pub const DEFAULT_NAMESPACE: &str = "icon_switch";

fn validate_namespace(namespace: &str) -> Result<(), StoreError> {
    if namespace.is_empty() {
        return Err(StoreError::Write("Namespace must not be empty".to_string()));
    }
    if !namespace
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err(StoreError::Write(format!(
            "Namespace `{namespace}` contains unsupported characters"
        )));
    }
    Ok(())
}

fn load_record(path: &Path) -> Result<IntentRecord, StoreError> {
    if !path.exists() {
        return Ok(IntentRecord::default());
    }
    let raw = fs::read_to_string(path)
        .map_err(|err| StoreError::Read(format!("failed to read {}: {err}", path.display())))?;
    if raw.trim().is_empty() {
        return Ok(IntentRecord::default());
    }
    serde_json::from_str(&raw).map_err(|err| {
        StoreError::Corrupt(format!(
            "failed to parse intent record {}: {err}",
            path.display()
        ))
    })
}

fn save_record(path: &Path, record: &IntentRecord) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::Write(format!("{} has no parent", path.display())))?;
    let serialized = serde_json::to_vec(record)
        .map_err(|err| StoreError::Write(format!("failed to serialize intent record: {err}")))?;

    let write_err = |err: std::io::Error| {
        StoreError::Write(format!("failed to write {}: {err}", path.display()))
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
    staged.write_all(&serialized).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    staged.persist(path).map_err(|err| write_err(err.error))?;
    sync_dir(dir).map_err(write_err)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[derive(Debug, Clone)]
/// Intent store backed by one JSON record file.
pub struct FileIntentStore {
    file: PathBuf,
}

impl FileIntentStore {
    /// Creates a store for `namespace` rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the namespace is invalid or the directory cannot be created.
    pub fn from_root(root: impl AsRef<Path>, namespace: &str) -> Result<Self, StoreError> {
        validate_namespace(namespace)?;
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|err| {
            StoreError::Write(format!(
                "failed to create intent store dir {}: {err}",
                root.display()
            ))
        })?;
        Ok(Self {
            file: root.join(format!("{namespace}.json")),
        })
    }

    /// Returns the record file path.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Reads the full stored record.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(&self) -> Result<IntentRecord, StoreError> {
        load_record(&self.file)
    }

    fn update(&self, change: impl FnOnce(&mut IntentRecord)) -> Result<(), StoreError> {
        let mut record = load_record(&self.file)?;
        change(&mut record);
        save_record(&self.file, &record)?;
        debug!(path = %self.file.display(), "intent record persisted");
        Ok(())
    }
}

impl DurableIntentStore for FileIntentStore {
    fn record_pending(&self, intent: &SwitchIntent) -> Result<(), StoreError> {
        self.update(|record| record.set_pending(intent))
    }

    fn read_pending(&self) -> Result<Option<SwitchIntent>, StoreError> {
        Ok(self.load()?.pending_intent())
    }

    fn clear_pending(&self) -> Result<(), StoreError> {
        self.update(IntentRecord::clear_pending)
    }

    fn failure_count(&self) -> Result<u32, StoreError> {
        Ok(self.load()?.error_count)
    }

    fn set_failure_count(&self, count: u32) -> Result<(), StoreError> {
        self.update(|record| record.error_count = count)
    }
}
