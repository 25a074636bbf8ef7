use crate::battle::engine::{BattleConfig, BattleDeps, BattleEngine, BattleOutcome, BattleSetup};
use crate::battle::enemy::Opponent;
use crate::battle::state::EventBus;
use crate::battle::transitions::BattleInput;
use crate::battle::RosterSink;
use crate::combatant::Combatant;
use crate::errors::BattleResult;
use crate::lrs::AnswerRecorder;
use crate::questions::{Question, QuestionKind};
use crate::rng::BattleRng;
use schema::{Domain, ElementType};
use std::cell::RefCell;
use std::rc::Rc;

/// A builder for test combatants with common defaults.
///
/// # Example
/// ```ignore
/// let gridling = TestCombatantBuilder::new("GRIDLING", 10)
///     .with_types(vec![ElementType::Ice])
///     .with_hp(500)
///     .build();
/// ```
pub struct TestCombatantBuilder {
    species: &'static str,
    level: u8,
    types: Option<Vec<ElementType>>,
    atk: Option<u16>,
    def: Option<u16>,
    max_hp: Option<u16>,
    current_hp: Option<u16>,
    moves: Option<Vec<String>>,
}

impl TestCombatantBuilder {
    pub fn new(species: &'static str, level: u8) -> Self {
        Self {
            species,
            level,
            types: None,
            atk: None,
            def: None,
            max_hp: None,
            current_hp: None,
            moves: None,
        }
    }

    pub fn with_types(mut self, types: Vec<ElementType>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_atk(mut self, atk: u16) -> Self {
        self.atk = Some(atk);
        self
    }

    pub fn with_def(mut self, def: u16) -> Self {
        self.def = Some(def);
        self
    }

    /// Sets max HP and heals to it.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.max_hp = Some(hp);
        self
    }

    /// Sets current HP only. Applied after `with_hp`.
    pub fn with_current_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn with_moves(mut self, moves: Vec<&str>) -> Self {
        self.moves = Some(moves.into_iter().map(String::from).collect());
        self
    }

    pub fn build(self) -> Combatant {
        let mut combatant = match Combatant::from_species_name(self.species, self.level) {
            Ok(combatant) => combatant,
            Err(err) => panic!("Failed to build test combatant {}: {}", self.species, err),
        };

        if let Some(types) = self.types {
            combatant.types = types;
        }
        if let Some(atk) = self.atk {
            combatant.stats.atk = atk;
        }
        if let Some(def) = self.def {
            combatant.stats.def = def;
        }
        if let Some(hp) = self.max_hp {
            combatant.stats.hp = hp;
            combatant.max_hp = hp;
            combatant.current_hp = hp;
        }
        if let Some(hp) = self.current_hp {
            combatant.set_hp(hp);
        }
        if let Some(moves) = self.moves {
            combatant.moves = moves;
        }
        combatant
    }
}

/// A four-option multiple choice question whose first option is correct.
pub fn test_question(id: &str, domain: Option<Domain>) -> Question {
    Question {
        id: id.to_string(),
        prompt: format!("Prompt for {}?", id),
        options: vec![
            "Option A".to_string(),
            "Option B".to_string(),
            "Option C".to_string(),
            "Option D".to_string(),
        ],
        correct_index: 0,
        domain,
        explanation: None,
        context: None,
        kind: QuestionKind::MultipleChoice,
        used: false,
    }
}

pub fn question_bank(size: usize) -> Vec<Question> {
    (0..size)
        .map(|i| test_question(&format!("q{}", i), None))
        .collect()
}

/// A sturdy combatant with no type immunities in play.
pub fn tank(species: &'static str, level: u8) -> TestCombatantBuilder {
    TestCombatantBuilder::new(species, level)
        .with_types(vec![ElementType::Ice])
        .with_hp(9999)
        .with_moves(vec!["DATA_EXFIL"])
}

#[derive(Default)]
pub struct RecorderEntries {
    pub answers: Vec<(String, String, bool)>,
    pub progress: Vec<u8>,
    pub results: Vec<(u8, bool)>,
}

/// Everything handed to the recorder, in order.
#[derive(Clone, Default)]
pub struct AnswerLog(pub Rc<RefCell<RecorderEntries>>);

impl AnswerLog {
    pub fn answers(&self) -> Vec<(String, String, bool)> {
        self.0.borrow().answers.clone()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.0.borrow().progress.clone()
    }

    pub fn results(&self) -> Vec<(u8, bool)> {
        self.0.borrow().results.clone()
    }
}

impl AnswerRecorder for AnswerLog {
    fn record_answer(&mut self, question_id: &str, response: &str, correct: bool) {
        self.0
            .borrow_mut()
            .answers
            .push((question_id.to_string(), response.to_string(), correct));
    }

    fn record_progress(&mut self, percent: u8) {
        self.0.borrow_mut().progress.push(percent);
    }

    fn record_result(&mut self, score: u8, passed: bool) {
        self.0.borrow_mut().results.push((score, passed));
    }
}

/// HP write-backs, in order.
#[derive(Clone, Default)]
pub struct HpLog(pub Rc<RefCell<Vec<(usize, u16)>>>);

impl HpLog {
    pub fn updates(&self) -> Vec<(usize, u16)> {
        self.0.borrow().clone()
    }
}

impl RosterSink for HpLog {
    fn update_hp(&mut self, slot: usize, hp: u16) {
        self.0.borrow_mut().push((slot, hp));
    }
}

/// A battle wired to in-memory recorders.
pub struct TestBattle {
    pub engine: BattleEngine,
    pub answers: AnswerLog,
    pub hp: HpLog,
    pub outcomes: Rc<RefCell<Vec<BattleOutcome>>>,
}

impl TestBattle {
    pub fn new(
        config: BattleConfig,
        opponent: Opponent,
        player_team: Vec<Combatant>,
        questions: Vec<Question>,
    ) -> BattleResult<Self> {
        Self::with_rng(config, opponent, player_team, questions, predictable_rng())
    }

    pub fn with_rng(
        config: BattleConfig,
        opponent: Opponent,
        player_team: Vec<Combatant>,
        questions: Vec<Question>,
        rng: BattleRng,
    ) -> BattleResult<Self> {
        let answers = AnswerLog::default();
        let hp = HpLog::default();
        let outcomes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outcomes);

        let engine = BattleEngine::new(
            BattleSetup {
                config,
                opponent,
                player_team,
                questions,
            },
            BattleDeps {
                recorder: Box::new(answers.clone()),
                roster: Box::new(hp.clone()),
                rng,
                on_complete: Box::new(move |outcome| sink.borrow_mut().push(outcome)),
            },
        )?;

        Ok(Self {
            engine,
            answers,
            hp,
            outcomes,
        })
    }

    pub fn outcomes(&self) -> Vec<BattleOutcome> {
        self.outcomes.borrow().clone()
    }

    /// Begin and lead with `slot`.
    pub fn start(&mut self, slot: usize) -> EventBus {
        assert_ok(self.engine.handle(BattleInput::Begin));
        assert_ok(self.engine.handle(BattleInput::SelectStarter(slot)))
    }

    pub fn answer_correctly(&mut self) -> EventBus {
        let index = self
            .engine
            .current_question()
            .expect("a question should be pending")
            .correct_index;
        assert_ok(self.engine.handle(BattleInput::Answer(index)))
    }

    pub fn answer_wrong(&mut self) -> EventBus {
        let question = self
            .engine
            .current_question()
            .expect("a question should be pending");
        let index = (question.correct_index + 1) % question.options.len();
        assert_ok(self.engine.handle(BattleInput::Answer(index)))
    }

    /// Use move slot 0 and answer.
    pub fn attack(&mut self, correct: bool) -> EventBus {
        assert_ok(self.engine.handle(BattleInput::ChooseMove(0)));
        if correct {
            self.answer_correctly()
        } else {
            self.answer_wrong()
        }
    }
}

pub fn wild(enemies: Vec<Combatant>) -> Opponent {
    Opponent::Wild { enemies }
}

pub fn config(passing_score: u8, questions_per_battle: u32) -> BattleConfig {
    BattleConfig {
        passing_score,
        questions_per_battle,
    }
}

/// Mid-range scripted rolls; useful when no specific outcome matters.
pub fn predictable_rng() -> BattleRng {
    BattleRng::new_for_test(vec![50; 100])
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
