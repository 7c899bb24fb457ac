// src/guard/store.rs

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::guard::record::RunRecord;

/// Abstract storage for run records, one per task key.
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    fn load(&self, key: &str) -> Result<Option<RunRecord>>;
    /// Replace whatever is stored for `record.task_key`.
    fn save(&self, record: &RunRecord) -> Result<()>;
}

/// Stores each record as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, key: &str) -> Result<Option<RunRecord>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("reading run record at {:?}", path))?;

        match serde_json::from_str::<RunRecord>(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(task = %key, path = ?path, error = %e, "ignoring corrupt run record");
                Ok(None)
            }
        }
    }

    fn save(&self, record: &RunRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating record directory at {:?}", self.dir))?;

        let path = self.record_path(&record.task_key);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record).context("serializing run record")?;

        fs::write(&tmp, json).with_context(|| format!("writing run record at {:?}", tmp))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("replacing run record at {:?}", path))?;

        debug!(task = %record.task_key, pid = record.pid, "stored run record (file)");
        Ok(())
    }
}

/// Stores records in memory only.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    map: Mutex<HashMap<String, RunRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load(&self, key: &str) -> Result<Option<RunRecord>> {
        let map = self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("run record map poisoned"))?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, record: &RunRecord) -> Result<()> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| anyhow::anyhow!("run record map poisoned"))?;
        map.insert(record.task_key.clone(), record.clone());
        debug!(task = %record.task_key, pid = record.pid, "stored run record (memory)");
        Ok(())
    }
}
