use crate::errors::{PersistenceError, PersistenceResult};
use crate::lrs::Cmi5Session;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// A key-value document store.
pub trait StateStore {
    fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>>;
    fn save_state(&mut self, key: &str, state: &Value) -> PersistenceResult<()>;
}

impl<T: StateStore> StateStore for Rc<RefCell<T>> {
    fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>> {
        self.borrow_mut().get_state(key)
    }

    fn save_state(&mut self, key: &str, state: &Value) -> PersistenceResult<()> {
        self.borrow_mut().save_state(key, state)
    }
}

/// The learning record store's state API, used as the remote store.
impl StateStore for Cmi5Session {
    fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>> {
        Cmi5Session::get_state(self, key).map_err(|e| PersistenceError::Remote {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn save_state(&mut self, key: &str, state: &Value) -> PersistenceResult<()> {
        Cmi5Session::save_state(self, key, state).map_err(|e| PersistenceError::Remote {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

/// One JSON file per key, named `cmi5_state_<key>.json`.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    dir: PathBuf,
}

impl LocalStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("cmi5_state_{}.json", key))
    }
}

impl StateStore for LocalStateStore {
    fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save_state(&mut self, key: &str, state: &Value) -> PersistenceResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, serde_json::to_string_pretty(state)?)?;
        debug!(path = %path.display(), "state written");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    documents: HashMap<String, Value>,
}

impl MemoryStateStore {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }
}

impl StateStore for MemoryStateStore {
    fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>> {
        Ok(self.documents.get(key).cloned())
    }

    fn save_state(&mut self, key: &str, state: &Value) -> PersistenceResult<()> {
        self.documents.insert(key.to_string(), state.clone());
        Ok(())
    }
}
