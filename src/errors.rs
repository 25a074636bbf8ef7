use thiserror::Error;

/// Errors raised while resolving static data or loading question banks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("Species not found: {0}")]
    UnknownSpecies(String),
    #[error("Move not found: {0}")]
    UnknownMove(String),
    #[error("Trainer not found: {0}")]
    UnknownTrainer(String),
    #[error("Embedded game tables are corrupt: {0}")]
    CorruptTables(String),
    #[error("Question bank could not be parsed: {0}")]
    QuestionBank(String),
    #[error("No usable combatants for {0}")]
    EmptyRoster(String),
}

/// Player choices that reference something that cannot be used right now.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Team slot {0} does not exist")]
    InvalidTeamSlot(usize),
    #[error("Team slot {0} has fainted")]
    FaintedTarget(usize),
    #[error("Team slot {0} is already active")]
    AlreadyActive(usize),
    #[error("Move slot {0} does not exist")]
    InvalidMoveSlot(usize),
    #[error("Answer {index} is out of range for {options} options")]
    InvalidAnswer { index: usize, options: usize },
    #[error("Question has already been answered")]
    AlreadyAnswered,
}

/// An input arrived in a state whose transition table has no entry for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Input {input} is not accepted in state {state}")]
pub struct TransitionError {
    pub state: String,
    pub input: String,
}

impl TransitionError {
    pub fn new(state: impl std::fmt::Debug, input: impl std::fmt::Debug) -> Self {
        Self {
            state: format!("{:?}", state),
            input: format!("{:?}", input),
        }
    }
}

/// Main error type for the battle engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),
    #[error("Action error: {0}")]
    Action(#[from] ActionError),
    #[error("Question bank is empty")]
    EmptyBank,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Remote store rejected {key}: {reason}")]
    Remote { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum LrsError {
    #[error("Missing launch parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid actor: {0}")]
    InvalidActor(#[from] serde_json::Error),
    #[error("Statement transport failed: {0}")]
    Transport(String),
}

/// Errors raised by roster and progress operations on the game state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot remove the last team member")]
    LastMember,
    #[error("Team slot {0} does not exist")]
    InvalidSlot(usize),
    #[error("Not a starter species: {0}")]
    InvalidStarter(String),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;

pub type QuizResult<T> = Result<T, QuizError>;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub type StoreResult<T> = Result<T, StoreError>;
