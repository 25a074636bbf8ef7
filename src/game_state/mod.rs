//! The persisted game: the save document and the store that owns it.

pub mod save;
pub mod store;

pub use save::{GameSave, ModuleStats, Pace, PlayerInfo, Progress, Settings, MAX_TEAM_SIZE, SAVE_VERSION};
pub use store::{GameStateStore, GymReward, LevelUp, StoreDeps, TeamPlacement};
