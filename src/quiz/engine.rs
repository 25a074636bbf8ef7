use crate::errors::{ActionError, QuizError, QuizResult};
use crate::lrs::AnswerRecorder;
use crate::questions::{score_percent, Question, ShuffledQuestion};
use crate::quiz::transitions::{lookup, QuizInput, QuizPhase};
use crate::rng::BattleRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub questions_per_quiz: usize,
    pub passing_score: u8,
    pub randomize_questions: bool,
    pub randomize_answers: bool,
    pub show_feedback: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_quiz: 10,
            passing_score: 80,
            randomize_questions: true,
            randomize_answers: true,
            show_feedback: true,
        }
    }
}

/// The course module a quiz closes out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub id: String,
    pub name: String,
    pub badge: Option<String>,
}

impl Default for ModuleInfo {
    fn default() -> Self {
        Self {
            id: "unknown".to_string(),
            name: "Module".to_string(),
            badge: None,
        }
    }
}

pub type QuizCallback = Box<dyn FnMut(QuizOutcome)>;

pub struct QuizDeps {
    pub recorder: Box<dyn AnswerRecorder>,
    pub rng: BattleRng,
    /// Called once per finished attempt.
    pub on_complete: QuizCallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOutcome {
    pub passed: bool,
    pub score: u8,
    pub questions_asked: u32,
    pub questions_correct: u32,
    pub badge: Option<String>,
}

/// Returned from [`QuizEngine::answer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub selected_index: usize,
    pub correct_index: usize,
    /// Present only when feedback is enabled.
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewEntry {
    pub question_id: String,
    pub prompt: String,
    pub selected: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct RecordedAnswer {
    selected: usize,
    correct: bool,
}

pub struct QuizEngine {
    config: QuizConfig,
    module: ModuleInfo,
    bank: Vec<Question>,
    phase: QuizPhase,

    selected: Vec<ShuffledQuestion>,
    answers: Vec<Option<RecordedAnswer>>,
    current: usize,
    correct: u32,

    recorder: Box<dyn AnswerRecorder>,
    rng: BattleRng,
    on_complete: QuizCallback,
    outcome: Option<QuizOutcome>,
}

impl QuizEngine {
    pub fn new(
        config: QuizConfig,
        module: ModuleInfo,
        bank: Vec<Question>,
        deps: QuizDeps,
    ) -> QuizResult<Self> {
        if bank.is_empty() {
            return Err(QuizError::EmptyBank);
        }
        debug!(module = %module.id, questions = bank.len(), "quiz created");

        Ok(Self {
            config,
            module,
            bank,
            phase: QuizPhase::Ready,
            selected: Vec::new(),
            answers: Vec::new(),
            current: 0,
            correct: 0,
            recorder: deps.recorder,
            rng: deps.rng,
            on_complete: deps.on_complete,
            outcome: None,
        })
    }

    /// Pick this attempt's questions and show the first.
    pub fn start(&mut self) -> QuizResult<&ShuffledQuestion> {
        lookup(self.phase, QuizInput::Start)?;
        self.begin_attempt()
    }

    /// Start over after finishing. The previous result stays reported.
    pub fn retry(&mut self) -> QuizResult<&ShuffledQuestion> {
        lookup(self.phase, QuizInput::Retry)?;
        info!(module = %self.module.id, "quiz retried");
        self.begin_attempt()
    }

    fn begin_attempt(&mut self) -> QuizResult<&ShuffledQuestion> {
        let mut pool = self.bank.clone();
        if self.config.randomize_questions {
            self.rng.shuffle(&mut pool, "quiz question order");
        }
        pool.truncate(self.config.questions_per_quiz.max(1));

        self.selected = pool
            .into_iter()
            .map(|question| {
                if self.config.randomize_answers {
                    ShuffledQuestion::shuffle(question, &mut self.rng)
                } else {
                    ShuffledQuestion::unshuffled(question)
                }
            })
            .collect();
        self.answers = vec![None; self.selected.len()];
        self.current = 0;
        self.correct = 0;
        self.outcome = None;
        self.phase = QuizPhase::Asking;

        info!(module = %self.module.id, questions = self.selected.len(), "quiz started");
        self.recorder.record_progress(0);

        self.selected.first().ok_or(QuizError::EmptyBank)
    }

    /// Grade the shown option `index` of the current question.
    pub fn answer(&mut self, index: usize) -> QuizResult<AnswerFeedback> {
        lookup(self.phase, QuizInput::Answer(index))?;

        let question = &self.selected[self.current];
        let response = question
            .option_text(index)
            .ok_or(ActionError::InvalidAnswer {
                index,
                options: question.options.len(),
            })?
            .to_string();
        let correct = question.is_correct(index);
        let feedback = AnswerFeedback {
            correct,
            selected_index: index,
            correct_index: question.correct_index,
            explanation: if self.config.show_feedback {
                question.question.explanation.clone()
            } else {
                None
            },
        };

        self.recorder
            .record_answer(&question.question.id, &response, correct);
        debug!(question_id = %question.question.id, correct, "quiz answer");

        if correct {
            self.correct += 1;
        }
        self.answers[self.current] = Some(RecordedAnswer {
            selected: index,
            correct,
        });
        self.phase = QuizPhase::Feedback;

        let progress = ((self.current + 1) as f64 / self.selected.len() as f64 * 100.0).round();
        self.recorder.record_progress(progress as u8);

        Ok(feedback)
    }

    /// Move past the feedback. Returns the phase reached: `Asking` for
    /// another question, `Complete` after the last.
    pub fn next(&mut self) -> QuizResult<QuizPhase> {
        lookup(self.phase, QuizInput::Next)?;

        self.current += 1;
        if self.current >= self.selected.len() {
            self.complete();
        } else {
            self.phase = QuizPhase::Asking;
        }
        Ok(self.phase)
    }

    fn complete(&mut self) {
        self.phase = QuizPhase::Complete;
        let score = self.percentage();
        let passed = score >= self.config.passing_score;

        info!(module = %self.module.id, score, passed, "quiz complete");
        self.recorder.record_result(score, passed);

        let outcome = QuizOutcome {
            passed,
            score,
            questions_asked: self.selected.len() as u32,
            questions_correct: self.correct,
            badge: if passed { self.module.badge.clone() } else { None },
        };
        self.outcome = Some(outcome.clone());
        (self.on_complete)(outcome);
    }

    /// Every question of the attempt with the learner's choice and the answer.
    pub fn review(&self) -> Vec<ReviewEntry> {
        self.selected
            .iter()
            .zip(&self.answers)
            .map(|(question, answer)| ReviewEntry {
                question_id: question.question.id.clone(),
                prompt: question.question.prompt.clone(),
                selected: answer
                    .and_then(|a| question.option_text(a.selected))
                    .map(str::to_string),
                correct_answer: question.correct_text().to_string(),
                correct: answer.is_some_and(|a| a.correct),
                explanation: question.question.explanation.clone(),
            })
            .collect()
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    pub fn current_question(&self) -> Option<&ShuffledQuestion> {
        match self.phase {
            QuizPhase::Asking | QuizPhase::Feedback => self.selected.get(self.current),
            _ => None,
        }
    }

    /// Zero-based position of the current question.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.selected.len()
    }

    pub fn questions_correct(&self) -> u32 {
        self.correct
    }

    /// Correct answers over the attempt's length, rounded.
    pub fn percentage(&self) -> u8 {
        score_percent(self.correct, self.selected.len() as u32)
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }
}
