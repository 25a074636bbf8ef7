//! End-of-module knowledge checks: a fixed set of questions, one answer
//! each, scored against a pass mark.

pub mod engine;
pub mod transitions;

pub use engine::{
    AnswerFeedback, ModuleInfo, QuizConfig, QuizDeps, QuizEngine, QuizOutcome, ReviewEntry,
};
pub use transitions::{QuizInput, QuizPhase};
