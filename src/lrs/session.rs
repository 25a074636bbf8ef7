use crate::errors::LrsError;
use crate::lrs::launch::LaunchParams;
use crate::lrs::statement::{
    format_duration, random_uuid, Activity, Score, Statement, StatementContext, StatementParts,
    StatementResult, Verb, VerbRef, STARTER_EXTENSION,
};
use crate::lrs::{AnswerRecorder, LrsClient};
use crate::rng::BattleRng;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, error, info};

/// One cmi5 launch: identity, session id, and the client statements go to.
///
/// Every verb helper is fire-and-forget. Transport failures are logged and
/// the game carries on.
pub struct Cmi5Session {
    client: Box<dyn LrsClient>,
    params: LaunchParams,
    session_id: String,
    started_at: DateTime<Utc>,
    initialized: bool,
    rng: BattleRng,
}

impl Cmi5Session {
    pub fn new(client: Box<dyn LrsClient>, params: LaunchParams, mut rng: BattleRng) -> Self {
        let session_id = random_uuid(&mut rng).to_string();
        Self {
            client,
            params,
            session_id,
            started_at: Utc::now(),
            initialized: false,
            rng,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_standalone(&self) -> bool {
        self.params.is_standalone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Restart the duration clock, e.g. for a session restored from elsewhere.
    pub fn set_started_at(&mut self, started_at: DateTime<Utc>) {
        self.started_at = started_at;
    }

    fn build(&mut self, parts: StatementParts) -> Statement {
        let activity_id = self.params.activity_id_or_default().to_string();
        Statement {
            id: random_uuid(&mut self.rng).to_string(),
            actor: self.params.actor.clone().unwrap_or(Value::Null),
            verb: parts.verb,
            object: parts.object.unwrap_or_else(|| Activity::new(activity_id)),
            context: StatementContext::cmi5(self.params.registration.clone(), &self.session_id),
            timestamp: Utc::now(),
            result: parts.result,
        }
    }

    /// Send a statement, returning its id on success.
    pub fn send(&mut self, parts: StatementParts) -> Result<String, LrsError> {
        let statement = self.build(parts);
        let verb = statement.verb_name().unwrap_or_default().to_string();
        self.client.send_statement(&statement)?;
        debug!(verb = %verb, statement_id = %statement.id, "statement sent");
        Ok(statement.id)
    }

    fn fire(&mut self, parts: StatementParts) {
        let verb = parts.verb.id.clone();
        if let Err(e) = self.send(parts) {
            error!(verb = %verb, error = %e, "failed to send statement");
        }
    }

    fn duration(&self) -> String {
        format_duration(Utc::now() - self.started_at)
    }

    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        if self.is_standalone() {
            info!("cmi5 session running in standalone mode");
        }
        self.fire(StatementParts::new(Verb::Initialized));
        self.initialized = true;
    }

    /// `initialized` with the chosen starter recorded as a result extension.
    pub fn started_game(&mut self, starter: &str) {
        self.fire(
            StatementParts::new(VerbRef::new(Verb::Initialized, "started game"))
                .result(StatementResult::default().with_extension(STARTER_EXTENSION, starter)),
        );
    }

    pub fn launched(&mut self) {
        self.fire(StatementParts::new(Verb::Launched).result(StatementResult::progress(0)));
    }

    pub fn progressed(&mut self, percent: u8) {
        self.fire(
            StatementParts::new(Verb::Progressed).result(StatementResult::progress(percent.min(100))),
        );
    }

    pub fn answered(&mut self, question_id: &str, response: &str, correct: bool) {
        let object = Activity::question(self.params.activity_id_or_default(), question_id);
        self.fire(
            StatementParts::new(Verb::Answered)
                .object(object)
                .result(StatementResult {
                    response: Some(response.to_string()),
                    success: Some(correct),
                    ..StatementResult::default()
                }),
        );
    }

    fn scored(&self, score: u8, success: bool) -> StatementResult {
        StatementResult {
            score: Some(Score::percent(score)),
            success: Some(success),
            completion: Some(true),
            duration: Some(self.duration()),
            ..StatementResult::default()
        }
    }

    pub fn passed(&mut self, score: u8) {
        let result = self.scored(score, true);
        self.fire(StatementParts::new(Verb::Passed).result(result));
    }

    pub fn failed(&mut self, score: u8) {
        let result = self.scored(score, false);
        self.fire(StatementParts::new(Verb::Failed).result(result));
    }

    pub fn completed(&mut self, score: u8, success: bool) {
        let result = self.scored(score, success);
        self.fire(StatementParts::new(Verb::Completed).result(result));
    }

    pub fn earned(&mut self, badge: &str, score: u8) {
        self.fire(
            StatementParts::new(Verb::Earned)
                .object(Activity::badge(badge))
                .result(StatementResult {
                    score: Some(Score::percent(score)),
                    ..StatementResult::default()
                }),
        );
    }

    pub fn terminate(&mut self) {
        if !self.initialized {
            return;
        }
        let result = StatementResult {
            duration: Some(self.duration()),
            ..StatementResult::default()
        };
        self.fire(StatementParts::new(Verb::Terminated).result(result));
        self.initialized = false;
    }

    pub fn get_state(&mut self, state_id: &str) -> Result<Option<Value>, LrsError> {
        self.client.get_state(state_id)
    }

    pub fn save_state(&mut self, state_id: &str, state: &Value) -> Result<(), LrsError> {
        self.client.save_state(state_id, state)
    }
}

impl AnswerRecorder for Cmi5Session {
    fn record_answer(&mut self, question_id: &str, response: &str, correct: bool) {
        self.answered(question_id, response, correct);
    }

    fn record_progress(&mut self, percent: u8) {
        self.progressed(percent);
    }

    fn record_result(&mut self, score: u8, passed: bool) {
        if passed {
            self.passed(score);
        } else {
            self.failed(score);
        }
        self.completed(score, passed);
    }
}
