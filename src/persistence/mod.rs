//! Best-effort document persistence: remote first, local fallback.

pub mod scheduler;
pub mod store;

pub use scheduler::{Clock, ManualClock, SaveScheduler, SystemClock};
pub use store::{LocalStateStore, MemoryStateStore, StateStore};

use serde_json::Value;
use tracing::{error, warn};

/// Keys under which the game stores its documents.
pub mod state_keys {
    pub const GAME_STATE: &str = "scadamon.gameState";
}

pub struct PersistenceGateway {
    remote: Option<Box<dyn StateStore>>,
    local: Box<dyn StateStore>,
}

impl PersistenceGateway {
    pub fn new(remote: Option<Box<dyn StateStore>>, local: Box<dyn StateStore>) -> Self {
        Self { remote, local }
    }

    /// No remote store; everything goes to `local`.
    pub fn local_only(local: Box<dyn StateStore>) -> Self {
        Self::new(None, local)
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Remote copy if there is one, otherwise the local copy. Failures are
    /// logged and read as "nothing stored".
    pub fn get_state(&mut self, key: &str) -> Option<Value> {
        if let Some(remote) = self.remote.as_mut() {
            match remote.get_state(key) {
                Ok(Some(document)) => return Some(document),
                Ok(None) => {}
                Err(e) => warn!(key, error = %e, "remote state read failed, trying local"),
            }
        }
        match self.local.get_state(key) {
            Ok(document) => document,
            Err(e) => {
                error!(key, error = %e, "local state read failed");
                None
            }
        }
    }

    /// Write remotely, falling back to local storage. Returns whether any
    /// store accepted the document.
    pub fn save_state(&mut self, key: &str, document: &Value) -> bool {
        if let Some(remote) = self.remote.as_mut() {
            match remote.save_state(key, document) {
                Ok(()) => return true,
                Err(e) => warn!(key, error = %e, "remote state write failed, falling back to local"),
            }
        }
        match self.local.save_state(key, document) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "local state write failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{PersistenceError, PersistenceResult};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct UnreachableStore;

    impl StateStore for UnreachableStore {
        fn get_state(&mut self, key: &str) -> PersistenceResult<Option<Value>> {
            Err(PersistenceError::Remote {
                key: key.to_string(),
                reason: "offline".to_string(),
            })
        }

        fn save_state(&mut self, key: &str, _state: &Value) -> PersistenceResult<()> {
            Err(PersistenceError::Remote {
                key: key.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_remote_failure_falls_back_to_local() {
        let local = Rc::new(RefCell::new(MemoryStateStore::default()));
        let mut gateway =
            PersistenceGateway::new(Some(Box::new(UnreachableStore)), Box::new(local.clone()));

        assert!(gateway.save_state(state_keys::GAME_STATE, &json!({ "version": 1 })));
        assert_eq!(
            local.borrow().get(state_keys::GAME_STATE),
            Some(&json!({ "version": 1 }))
        );
        assert_eq!(
            gateway.get_state(state_keys::GAME_STATE),
            Some(json!({ "version": 1 }))
        );
    }

    #[test]
    fn test_remote_copy_wins_when_present() {
        let remote = Rc::new(RefCell::new(MemoryStateStore::default()));
        let local = Rc::new(RefCell::new(MemoryStateStore::default()));
        remote
            .borrow_mut()
            .save_state("k", &json!("remote"))
            .unwrap();
        local.borrow_mut().save_state("k", &json!("local")).unwrap();

        let mut gateway = PersistenceGateway::new(Some(Box::new(remote)), Box::new(local));
        assert_eq!(gateway.get_state("k"), Some(json!("remote")));
    }

    #[test]
    fn test_total_failure_reports_false() {
        let mut gateway = PersistenceGateway::local_only(Box::new(UnreachableStore));
        assert!(!gateway.save_state("k", &json!(1)));
        assert_eq!(gateway.get_state("k"), None);
    }
}
