use crate::combatant::Combatant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

pub const SAVE_VERSION: u32 = 1;
pub const MAX_TEAM_SIZE: usize = 6;

/// The whole persisted game: player, roster, progress, and settings.
///
/// Every field except the timestamps has a default so documents written by
/// older versions load with the gaps filled in. Timestamps are stamped during
/// migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSave {
    #[serde(default = "current_version")]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub player: PlayerInfo,
    #[serde(default)]
    pub team: Vec<Combatant>,
    #[serde(default)]
    pub storage: Vec<Combatant>,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default)]
    pub module_stats: BTreeMap<u8, ModuleStats>,
    #[serde(default)]
    pub settings: Settings,
}

fn current_version() -> u32 {
    SAVE_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerInfo {
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub starter_choice: Option<String>,
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self {
            name: "Trainer".to_string(),
            started_at: None,
            starter_choice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    /// `intro`, `module<n>`, `gym<n>`, `catch<n>`, `elite4`, ...
    pub current_section: String,
    pub completed_modules: Vec<u8>,
    pub completed_gyms: Vec<u8>,
    pub completed_catch_phases: Vec<u8>,
    pub badges: Vec<String>,
    pub elite_four_defeated: Vec<String>,
    pub rival_defeated: bool,
    pub is_champion: bool,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_section: "intro".to_string(),
            completed_modules: Vec::new(),
            completed_gyms: Vec::new(),
            completed_catch_phases: Vec::new(),
            badges: Vec::new(),
            elite_four_defeated: Vec::new(),
            rival_defeated: false,
            is_champion: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStats {
    pub score: u8,
    pub completed_at: DateTime<Utc>,
    pub attempts: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Slow,
    #[default]
    Normal,
    Fast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub sound_enabled: bool,
    pub animation_speed: Pace,
    pub text_speed: Pace,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            animation_speed: Pace::Normal,
            text_speed: Pace::Normal,
        }
    }
}

impl GameSave {
    /// A blank save stamped with `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            version: SAVE_VERSION,
            created_at: now,
            updated_at: now,
            player: PlayerInfo::default(),
            team: Vec::new(),
            storage: Vec::new(),
            progress: Progress::default(),
            module_stats: BTreeMap::new(),
            settings: Settings::default(),
        }
    }

    /// Upgrade a stored document to the current version, stamping it with
    /// `now`. Missing timestamps are taken from `now` as well.
    ///
    /// Documents without a version are not saves; `None` means "start fresh".
    pub fn migrate(mut document: Value, now: DateTime<Utc>) -> Option<GameSave> {
        let version = document.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version == 0 {
            return None;
        }
        if let Some(fields) = document.as_object_mut() {
            let stamp = Value::String(now.to_rfc3339());
            fields.entry("createdAt").or_insert_with(|| stamp.clone());
            fields.entry("updatedAt").or_insert(stamp);
        }

        match serde_json::from_value::<GameSave>(document) {
            Ok(mut save) => {
                if save.version != SAVE_VERSION {
                    info!(from = save.version, to = SAVE_VERSION, "migrating save");
                    save.version = SAVE_VERSION;
                }
                save.updated_at = now;
                Some(save)
            }
            Err(e) => {
                warn!(error = %e, "stored save is unreadable, starting fresh");
                None
            }
        }
    }

    pub fn has_started(&self) -> bool {
        self.player.started_at.is_some()
    }
}
