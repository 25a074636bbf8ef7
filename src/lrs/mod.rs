//! Learning-record reporting (cmi5 profile of xAPI).
//!
//! Engines only see [`AnswerRecorder`]. The game state store and the binary
//! hold a [`Cmi5Session`], which formats statements and hands them to an
//! [`LrsClient`]. No HTTP transport ships with the crate; [`StatementLog`]
//! keeps statements in memory for standalone play and tests.

pub mod launch;
pub mod session;
pub mod statement;

pub use launch::LaunchParams;
pub use session::Cmi5Session;
pub use statement::{format_duration, Statement, StatementResult, Verb};

use crate::errors::LrsError;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// The three operations a learning record store offers.
pub trait LrsClient {
    fn send_statement(&mut self, statement: &Statement) -> Result<(), LrsError>;
    fn get_state(&mut self, state_id: &str) -> Result<Option<Value>, LrsError>;
    fn save_state(&mut self, state_id: &str, state: &Value) -> Result<(), LrsError>;
}

/// Where battle and quiz engines report learner activity.
pub trait AnswerRecorder {
    fn record_answer(&mut self, question_id: &str, response: &str, correct: bool);

    fn record_progress(&mut self, _percent: u8) {}

    /// Final mastery result of a quiz attempt.
    fn record_result(&mut self, _score: u8, _passed: bool) {}
}

impl<T: AnswerRecorder> AnswerRecorder for Rc<RefCell<T>> {
    fn record_answer(&mut self, question_id: &str, response: &str, correct: bool) {
        self.borrow_mut().record_answer(question_id, response, correct);
    }

    fn record_progress(&mut self, percent: u8) {
        self.borrow_mut().record_progress(percent);
    }

    fn record_result(&mut self, score: u8, passed: bool) {
        self.borrow_mut().record_result(score, passed);
    }
}

#[derive(Debug, Default)]
struct LogInner {
    statements: Vec<Statement>,
    state: HashMap<String, Value>,
    failing: bool,
}

/// In-memory LRS. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct StatementLog {
    inner: Rc<RefCell<LogInner>>,
}

impl StatementLog {
    /// A log whose every call fails, standing in for an unreachable LRS.
    pub fn failing() -> Self {
        let log = Self::default();
        log.inner.borrow_mut().failing = true;
        log
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.inner.borrow().statements.clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.inner
            .borrow()
            .statements
            .iter()
            .filter_map(|s| s.verb_name().map(str::to_string))
            .collect()
    }

    fn check(&self) -> Result<(), LrsError> {
        if self.inner.borrow().failing {
            return Err(LrsError::Transport("learning record store unreachable".to_string()));
        }
        Ok(())
    }
}

impl LrsClient for StatementLog {
    fn send_statement(&mut self, statement: &Statement) -> Result<(), LrsError> {
        self.check()?;
        self.inner.borrow_mut().statements.push(statement.clone());
        Ok(())
    }

    fn get_state(&mut self, state_id: &str) -> Result<Option<Value>, LrsError> {
        self.check()?;
        Ok(self.inner.borrow().state.get(state_id).cloned())
    }

    fn save_state(&mut self, state_id: &str, state: &Value) -> Result<(), LrsError> {
        self.check()?;
        self.inner
            .borrow_mut()
            .state
            .insert(state_id.to_string(), state.clone());
        Ok(())
    }
}
