//! SCADAmon: an ICS-security training game.
//!
//! Battles and end-of-module quizzes are driven by quiz answers. A correct
//! answer lands the player's attack; accuracy also blunts the enemy's.
//! Progress is persisted through a remote-first gateway and reported to a
//! learning record store as cmi5 statements.
//!
//! Static data (moves, species, trainers) is validated and embedded at compile
//! time by the build script.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod config;
pub mod data;
pub mod errors;
pub mod game_state;
pub mod lrs;
pub mod persistence;
pub mod progression;
pub mod questions;
pub mod quiz;
pub mod rng;

// --- PUBLIC API RE-EXPORTS ---

// Shared data definitions.
pub use schema::{Domain, ElementType, MoveData, Rarity, SpeciesData, SpeciesKind};

// Engines.
pub use battle::{
    BattleConfig, BattleDeps, BattleEngine, BattleEvent, BattleInput, BattleOutcome, BattlePhase,
    BattleSetup, EventBus, Opponent, RosterSink,
};
pub use quiz::{ModuleInfo, QuizConfig, QuizDeps, QuizEngine, QuizOutcome, QuizPhase};

// Runtime types.
pub use combatant::Combatant;
pub use config::GameConfig;
pub use game_state::{GameSave, GameStateStore, StoreDeps};
pub use lrs::{AnswerRecorder, Cmi5Session, LaunchParams, LrsClient, StatementLog};
pub use persistence::{PersistenceGateway, StateStore};
pub use questions::{load_question_bank, parse_question_bank, Question, QuestionPool};
pub use rng::BattleRng;

// Data access.
pub use data::{get_move_data, get_species_data};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleError, BattleResult, DataError, DataResult, LrsError, PersistenceError,
    QuizError, QuizResult, StoreError, StoreResult, TransitionError,
};
