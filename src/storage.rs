use crate::dates::{date_key, parse_date_key};
use crate::errors::StoreError;
use crate::models::DailyRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::{Arc, Mutex};
use std::{fs, io};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task;
use tracing::{debug, error, warn};

/// Storage key the whole history lives under.
pub const HISTORY_KEY: &str = "habitHistory";

/// A single key-value blob. Reads return `None` when nothing has been stored yet.
pub trait Storage: Send + Sync {
    fn read(&self) -> io::Result<Option<Vec<u8>>>;
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        // Writes happen under the tracker lock; on a multi-threaded runtime let
        // the worker hand off its other tasks while the disk is busy.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                task::block_in_place(|| write_atomically(&self.path, bytes))
            }
            _ => write_atomically(&self.path, bytes),
        }
    }
}

/// Writes beside the target and renames, so a crash never leaves half a blob.
fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// In-process blob; clones share the same contents.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Arc<Mutex<Option<Vec<u8>>>>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Arc::new(Mutex::new(Some(bytes.into()))),
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(test)]
impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.contents())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| io::Error::other("memory storage poisoned"))?;
        *guard = Some(bytes.to_vec());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryBlob {
    #[serde(rename = "habitHistory", default)]
    history: BTreeMap<String, DailyRecord>,
}

/// Date-keyed daily records, mirrored to a [`Storage`] blob after every write.
pub struct HistoryStore {
    storage: Box<dyn Storage>,
    days: BTreeMap<NaiveDate, DailyRecord>,
}

impl HistoryStore {
    /// Rehydrates from storage. Missing or unreadable data yields an empty store.
    pub fn load(storage: impl Storage + 'static) -> Self {
        let days = match storage.read() {
            Ok(Some(bytes)) => decode(&bytes),
            Ok(None) => BTreeMap::new(),
            Err(err) => {
                error!("failed to read history: {err}");
                BTreeMap::new()
            }
        };
        debug!(entries = days.len(), "history loaded");
        Self {
            storage: Box::new(storage),
            days,
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<DailyRecord> {
        self.days.get(&date).copied()
    }

    pub fn get_or_default(&self, date: NaiveDate) -> DailyRecord {
        self.get(date).unwrap_or_default()
    }

    /// Replaces the full record for `date` and persists the whole store.
    ///
    /// The in-memory value is kept even if persisting fails.
    pub fn upsert(&mut self, date: NaiveDate, record: DailyRecord) -> Result<(), StoreError> {
        self.days.insert(date, record.sanitized());
        self.persist()
    }

    pub fn snapshot(&self) -> BTreeMap<String, DailyRecord> {
        self.days
            .iter()
            .map(|(date, record)| (date_key(*date), *record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let blob = HistoryBlob {
            history: self.snapshot(),
        };
        let payload = serde_json::to_vec_pretty(&blob)?;
        self.storage.write(&payload)?;
        debug!(entries = self.days.len(), "history persisted");
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> BTreeMap<NaiveDate, DailyRecord> {
    let blob: HistoryBlob = match serde_json::from_slice(bytes) {
        Ok(blob) => blob,
        Err(err) => {
            warn!("failed to parse history, starting empty: {err}");
            return BTreeMap::new();
        }
    };

    let mut days = BTreeMap::new();
    for (key, record) in blob.history {
        match parse_date_key(&key) {
            Some(date) => {
                days.insert(date, record.sanitized());
            }
            None => warn!(key = %key, "skipping history entry with invalid date key"),
        }
    }
    days
}
