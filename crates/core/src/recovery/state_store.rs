//! Durable storage for [`RecoveryState`] records.

use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::state::RecoveryState;
use crate::errors::{Error, Result};

/// Storage interface for recovery progress.
#[async_trait]
pub trait RecoveryStateStore: Send + Sync {
    /// State of `market_id`, if it was ever saved.
    fn get(&self, market_id: &str) -> Result<Option<RecoveryState>>;

    /// State of `market_id`, or a fresh backfill state.
    fn get_or_create(&self, market_id: &str) -> Result<RecoveryState> {
        Ok(self
            .get(market_id)?
            .unwrap_or_else(|| RecoveryState::new(market_id)))
    }

    /// Every saved state, ordered by market id.
    fn get_all(&self) -> Result<Vec<RecoveryState>>;

    /// Persists `state` under its market id, replacing any previous record.
    async fn save(&self, state: &RecoveryState) -> Result<()>;
}

/// [`RecoveryStateStore`] backed by one JSON document keyed by market id.
///
/// Writes go to a sibling temp file first and are renamed into place, on the
/// blocking thread pool.
#[derive(Debug)]
pub struct JsonFileStateStore {
    file: Arc<StateFile>,
}

#[derive(Debug)]
struct StateFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(StateFile {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

impl StateFile {
    fn with_document<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut BTreeMap<String, RecoveryState>) -> Result<(T, bool)>,
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| Error::StateStore("State file lock poisoned".into()))?;
        let mut document = self.load_locked()?;
        let (value, dirty) = op(&mut document)?;
        if dirty {
            self.persist_locked(&document)?;
        }
        Ok(value)
    }

    fn load_locked(&self) -> Result<BTreeMap<String, RecoveryState>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let raw = fs::read(&self.path).map_err(|e| self.io_error("read", e))?;
        if raw.is_empty() {
            return Ok(BTreeMap::new());
        }

        let mut document: BTreeMap<String, RecoveryState> = serde_json::from_slice(&raw)
            .map_err(|e| {
                Error::StateStore(format!("{} is not a state document: {}", self.path.display(), e))
            })?;
        for (market_id, state) in document.iter_mut() {
            state.market_id = market_id.clone();
        }
        Ok(document)
    }

    fn persist_locked(&self, document: &BTreeMap<String, RecoveryState>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", e))?;
            }
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| self.io_error("write", e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| self.io_error("replace", e))?;
        Ok(())
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> Error {
        Error::StateStore(format!("Failed to {} {}: {}", action, self.path.display(), err))
    }
}

#[async_trait]
impl RecoveryStateStore for JsonFileStateStore {
    fn get(&self, market_id: &str) -> Result<Option<RecoveryState>> {
        self.file.with_document(|document| Ok((document.get(market_id).cloned(), false)))
    }

    fn get_all(&self) -> Result<Vec<RecoveryState>> {
        self.file.with_document(|document| Ok((document.values().cloned().collect(), false)))
    }

    async fn save(&self, state: &RecoveryState) -> Result<()> {
        debug!(
            "{}: saving state cursor={:?} last_stored={:?} recovered_all={}",
            state.market_id,
            state.current_request_timestamp,
            state.last_stored_timestamp,
            state.recovered_all
        );
        let file = Arc::clone(&self.file);
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            file.with_document(|document| {
                document.insert(state.market_id.clone(), state);
                Ok(((), true))
            })
        })
        .await
        .map_err(|e| Error::StateStore(format!("State write task failed: {}", e)))?
    }
}
