//! Runtime configuration, read from a RON file.
//!
//! Every field has a default, so a partial file only overrides what it names.
//! A missing or unreadable file falls back to defaults with a warning.

use crate::battle::BattleConfig;
use crate::lrs::LaunchParams;
use crate::quiz::QuizConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const CONFIG_PATH_VAR: &str = "SCADAMON_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "scadamon.ron";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub battle: BattleConfig,
    pub quiz: QuizConfig,
    pub persistence: PersistenceConfig,
    pub launch: LaunchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub save_dir: PathBuf,
    pub debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("saves"),
            debounce_ms: 1000,
        }
    }
}

/// cmi5 launch values for runs that are not started from an LMS launch URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub endpoint: Option<String>,
    pub auth: Option<String>,
    pub activity_id: Option<String>,
    pub registration: Option<String>,
    /// xAPI agent as JSON text.
    pub actor: Option<String>,
}

impl LaunchConfig {
    pub fn to_params(&self) -> LaunchParams {
        let actor = self
            .actor
            .as_deref()
            .and_then(|raw| match serde_json::from_str(raw) {
                Ok(actor) => Some(actor),
                Err(e) => {
                    error!(error = %e, "failed to parse configured actor");
                    None
                }
            });

        LaunchParams {
            endpoint: self.endpoint.clone(),
            auth: self.auth.clone(),
            activity_id: self.activity_id.clone(),
            registration: self.registration.clone(),
            actor,
        }
    }
}

impl GameConfig {
    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Load from `$SCADAMON_CONFIG`, or `scadamon.ron` in the working directory.
    pub fn load() -> Self {
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match Self::parse(&text) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }
}
