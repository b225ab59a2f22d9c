//! The lock file: what was last successfully synchronized
//!
//! Maps each monitor key to the remote id it is bound to and the spec that
//! was sent. Single writer only; concurrent runs against the same file are
//! not guarded.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::desired::is_blank_document;
use crate::error::{OpenstatusError, Result};
use crate::model::MonitorSpec;
use crate::normalize::normalize_monitor;

/// Remote identity bound to a monitor key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub id: i64,
    pub monitor: MonitorSpec,
}

/// Lock entries keyed by monitor key
pub type LockState = BTreeMap<String, LockEntry>;

/// Reads and writes a lock file
#[derive(Debug, Clone)]
pub struct LockStore {
    path: PathBuf,
}

impl LockStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the lock state
    ///
    /// A missing file is an empty state. A file that exists but cannot be
    /// parsed is an error: treating it as empty would re-create every monitor.
    pub fn load(&self) -> Result<LockState> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No lock file at {:?}, starting empty", self.path);
                return Ok(LockState::new());
            }
            Err(e) => {
                return Err(OpenstatusError::Lock(format!(
                    "Failed to read lock file {:?}: {}",
                    self.path, e
                )))
            }
        };

        parse_lock_state(&content).map_err(|e| {
            OpenstatusError::Lock(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Replace the lock file with `lock`
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed over it, so readers see either the old or the new generation.
    pub fn save(&self, lock: &LockState) -> Result<()> {
        let content = serde_yaml::to_string(lock)?;
        write_atomically(&self.path, &content)?;
        tracing::debug!("Wrote {} lock entries to {:?}", lock.len(), self.path);
        Ok(())
    }
}

fn parse_lock_state(content: &str) -> Result<LockState> {
    if is_blank_document(content) {
        return Ok(LockState::new());
    }

    let mut lock: LockState = serde_yaml::from_str(content)?;
    for (key, entry) in lock.iter_mut() {
        normalize_monitor(key, &mut entry.monitor)?;
    }
    Ok(lock)
}

/// Write `content` to `path` through a sibling temporary file and a rename
pub(crate) fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
