use crate::battle::calculators::{defense_modifier, hp_after_enemy_attack, scale_damage};
use crate::battle::enemy::{Opponent, OpponentProfile};
use crate::battle::state::{BattleEvent, BattlePhase, DefenseBand, EventBus, Side, SwitchMode};
use crate::battle::transitions::{lookup, BattleInput, Step};
use crate::battle::RosterSink;
use crate::combatant::Combatant;
use crate::data::{get_move_data, resolve_moves};
use crate::errors::{ActionError, BattleResult, DataError, TransitionError};
use crate::lrs::AnswerRecorder;
use crate::progression::damage::calculate_damage;
use crate::questions::{score_percent, Question, QuestionPool, ShuffledQuestion};
use crate::rng::BattleRng;
use schema::MoveData;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub passing_score: u8,
    pub questions_per_battle: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            passing_score: 75,
            questions_per_battle: 25,
        }
    }
}

/// What a battle is about: its rules, who is fighting, and the questions.
#[derive(Debug, Clone)]
pub struct BattleSetup {
    pub config: BattleConfig,
    pub opponent: Opponent,
    pub player_team: Vec<Combatant>,
    pub questions: Vec<Question>,
}

pub type CompletionCallback = Box<dyn FnOnce(BattleOutcome)>;

/// Collaborators the engine reports to.
pub struct BattleDeps {
    pub recorder: Box<dyn AnswerRecorder>,
    pub roster: Box<dyn RosterSink>,
    pub rng: BattleRng,
    pub on_complete: CompletionCallback,
}

/// Handed to the host exactly once when the battle ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleOutcome {
    pub victory: bool,
    pub score: u8,
    pub questions_asked: u32,
    pub questions_correct: u32,
    pub badge: Option<String>,
}

/// The quiz-gated battle state machine.
///
/// Every call to [`BattleEngine::handle`] runs until the next point where the
/// player must choose something, returning the narrative produced on the way.
pub struct BattleEngine {
    config: BattleConfig,
    profile: OpponentProfile,
    phase: BattlePhase,

    player_team: Vec<Combatant>,
    player_current: usize,
    enemy_team: Vec<Combatant>,
    enemy_current: usize,

    questions: QuestionPool,
    questions_asked: u32,
    questions_correct: u32,
    selected_move: Option<&'static MoveData>,
    current_question: Option<ShuffledQuestion>,

    recorder: Box<dyn AnswerRecorder>,
    roster: Box<dyn RosterSink>,
    rng: BattleRng,
    on_complete: Option<CompletionCallback>,
    outcome: Option<BattleOutcome>,
}

impl BattleEngine {
    pub fn new(setup: BattleSetup, deps: BattleDeps) -> BattleResult<Self> {
        let BattleSetup {
            config,
            opponent,
            player_team,
            questions,
        } = setup;
        let BattleDeps {
            recorder,
            roster,
            mut rng,
            on_complete,
        } = deps;

        let profile = opponent.profile()?;
        if player_team.is_empty() {
            return Err(DataError::EmptyRoster("player".to_string()).into());
        }
        let enemy_team = opponent.build_roster(&player_team)?;
        if enemy_team.is_empty() {
            return Err(DataError::EmptyRoster(profile.name.clone()).into());
        }

        let bank_size = questions.len();
        let questions =
            QuestionPool::limited(questions, config.questions_per_battle as usize, &mut rng);
        if questions.len() < bank_size {
            debug!(from = bank_size, to = questions.len(), "limited question bank");
        }

        info!(
            opponent = %profile.name,
            enemies = enemy_team.len(),
            questions = questions.len(),
            "battle created"
        );

        Ok(Self {
            config,
            profile,
            phase: BattlePhase::Intro,
            player_team,
            player_current: 0,
            enemy_team,
            enemy_current: 0,
            questions,
            questions_asked: 0,
            questions_correct: 0,
            selected_move: None,
            current_question: None,
            recorder,
            roster,
            rng,
            on_complete: Some(on_complete),
            outcome: None,
        })
    }

    /// Feed one input. Inputs the current state does not accept, and choices
    /// that cannot be honoured, return an error and change nothing.
    pub fn handle(&mut self, input: BattleInput) -> BattleResult<EventBus> {
        let step = lookup(self.phase, input)?;
        debug!(phase = ?self.phase, input = ?input, step = ?step, "battle input");

        let mut bus = EventBus::new();
        match (step, input) {
            (Step::PlayIntro, BattleInput::Begin) => self.play_intro(&mut bus),
            (Step::SendOutStarter, BattleInput::SelectStarter(slot)) => {
                self.send_out_starter(slot, &mut bus)?
            }
            (Step::SelectMove, BattleInput::ChooseMove(slot)) => self.select_move(slot, &mut bus)?,
            (Step::OpenSwitchPanel, BattleInput::OpenSwitch) => {
                self.set_phase(BattlePhase::Switching(SwitchMode::Voluntary));
                bus.push(BattleEvent::ChooseSwitch);
            }
            (Step::CloseSwitchPanel, BattleInput::CancelSwitch) => self.start_player_turn(&mut bus),
            (Step::VoluntarySwitch, BattleInput::SwitchTo(slot)) => {
                self.voluntary_switch(slot, &mut bus)?
            }
            (Step::ForcedSwitch, BattleInput::SwitchTo(slot)) => self.forced_switch(slot, &mut bus)?,
            (Step::ResolveAnswer, BattleInput::Answer(index)) => {
                self.resolve_answer(index, &mut bus)?
            }
            _ => return Err(TransitionError::new(self.phase, input).into()),
        }
        Ok(bus)
    }

    fn set_phase(&mut self, phase: BattlePhase) {
        debug!(from = ?self.phase, to = ?phase, "battle phase");
        self.phase = phase;
    }

    fn play_intro(&mut self, bus: &mut EventBus) {
        if let Some(message) = &self.profile.pre_battle_message {
            bus.push(BattleEvent::TrainerSpeech {
                speaker: self.profile.name.clone(),
                message: message.clone(),
            });
        }
        bus.push(BattleEvent::EnemySentOut {
            trainer: self.profile.name.clone(),
            name: self.enemy_team[self.enemy_current].name.clone(),
        });

        if self.player_team.iter().all(Combatant::is_fainted) {
            warn!("battle started with no conscious team members");
            self.defeat(bus);
            return;
        }
        self.set_phase(BattlePhase::Switching(SwitchMode::Starter));
        bus.push(BattleEvent::ChooseLead);
    }

    fn check_conscious_slot(&self, slot: usize) -> Result<(), ActionError> {
        let member = self
            .player_team
            .get(slot)
            .ok_or(ActionError::InvalidTeamSlot(slot))?;
        if member.is_fainted() {
            return Err(ActionError::FaintedTarget(slot));
        }
        Ok(())
    }

    fn send_out_starter(&mut self, slot: usize, bus: &mut EventBus) -> BattleResult<()> {
        self.check_conscious_slot(slot)?;
        self.player_current = slot;
        bus.push(BattleEvent::PlayerSentOut {
            name: self.player_team[slot].name.clone(),
        });
        self.start_player_turn(bus);
        Ok(())
    }

    fn start_player_turn(&mut self, bus: &mut EventBus) {
        self.set_phase(BattlePhase::PlayerTurn);
        bus.push(BattleEvent::ChooseMove);
    }

    fn voluntary_switch(&mut self, slot: usize, bus: &mut EventBus) -> BattleResult<()> {
        if slot == self.player_current && slot < self.player_team.len() {
            return Err(ActionError::AlreadyActive(slot).into());
        }
        self.check_conscious_slot(slot)?;

        bus.push(BattleEvent::PlayerRecalled {
            name: self.player_team[self.player_current].name.clone(),
        });
        self.player_current = slot;
        bus.push(BattleEvent::PlayerSentOut {
            name: self.player_team[slot].name.clone(),
        });
        self.enemy_turn(bus);
        Ok(())
    }

    fn forced_switch(&mut self, slot: usize, bus: &mut EventBus) -> BattleResult<()> {
        self.check_conscious_slot(slot)?;
        self.player_current = slot;
        bus.push(BattleEvent::PlayerSentOut {
            name: self.player_team[slot].name.clone(),
        });
        self.start_player_turn(bus);
        Ok(())
    }

    fn select_move(&mut self, slot: usize, bus: &mut EventBus) -> BattleResult<()> {
        let move_id = self.player_team[self.player_current]
            .moves
            .get(slot)
            .ok_or(ActionError::InvalidMoveSlot(slot))?;
        let move_data = get_move_data(move_id)?;

        self.selected_move = Some(move_data);
        self.show_question(move_data, bus);
        Ok(())
    }

    fn show_question(&mut self, move_data: &'static MoveData, bus: &mut EventBus) {
        let Some(question) = self.questions.draw(Some(move_data.domain), &mut self.rng) else {
            debug!("no questions available, attack resolves as correct");
            self.resolve_attack(true, bus);
            return;
        };

        let shuffled = ShuffledQuestion::shuffle(question, &mut self.rng);
        self.questions_asked += 1;
        self.set_phase(BattlePhase::Question);
        bus.push(BattleEvent::QuestionAsked {
            move_name: move_data.name.clone(),
            question_id: shuffled.question.id.clone(),
            prompt: shuffled.question.prompt.clone(),
            options: shuffled.options.clone(),
        });
        self.current_question = Some(shuffled);
    }

    fn resolve_answer(&mut self, index: usize, bus: &mut EventBus) -> BattleResult<()> {
        let question = self
            .current_question
            .as_ref()
            .ok_or_else(|| TransitionError::new(self.phase, BattleInput::Answer(index)))?;
        let response = question
            .option_text(index)
            .ok_or(ActionError::InvalidAnswer {
                index,
                options: question.options.len(),
            })?
            .to_string();

        let correct = question.is_correct(index);
        if correct {
            self.questions_correct += 1;
        }
        self.recorder
            .record_answer(&question.question.id, &response, correct);
        bus.push(BattleEvent::AnswerChecked {
            correct,
            correct_answer: question.correct_text().to_string(),
        });
        debug!(question_id = %question.question.id, correct, score = self.score(), "answer checked");

        self.current_question = None;
        self.resolve_attack(correct, bus);
        Ok(())
    }

    fn resolve_attack(&mut self, correct: bool, bus: &mut EventBus) {
        self.set_phase(BattlePhase::PlayerAttack);
        let user = self.player_team[self.player_current].name.clone();

        match self.selected_move.take() {
            Some(move_data) if correct && move_data.power > 0 => {
                let outcome = calculate_damage(
                    &self.player_team[self.player_current],
                    &self.enemy_team[self.enemy_current],
                    move_data,
                    true,
                    &mut self.rng,
                );
                bus.push(BattleEvent::MoveUsed {
                    side: Side::Player,
                    user,
                    move_name: move_data.name.clone(),
                });
                bus.push(BattleEvent::AttackTypeEffectiveness {
                    multiplier: outcome.effectiveness,
                });

                let enemy = &mut self.enemy_team[self.enemy_current];
                enemy.take_damage(outcome.damage);
                bus.push(BattleEvent::DamageDealt {
                    side: Side::Enemy,
                    target: enemy.name.clone(),
                    damage: outcome.damage,
                    remaining_hp: enemy.current_hp,
                });

                if enemy.is_fainted() {
                    self.handle_enemy_faint(bus);
                    return;
                }
            }
            Some(move_data) if correct => {
                bus.push(BattleEvent::MoveUsed {
                    side: Side::Player,
                    user: user.clone(),
                    move_name: move_data.name.clone(),
                });
                bus.push(BattleEvent::StatsChanged { user });
            }
            _ => bus.push(BattleEvent::AttackMissed { user }),
        }

        self.enemy_turn(bus);
    }

    fn enemy_turn(&mut self, bus: &mut EventBus) {
        self.set_phase(BattlePhase::EnemyAttack);
        let enemy = &self.enemy_team[self.enemy_current];

        let moves = resolve_moves(enemy.moves.iter().map(String::as_str));
        if moves.is_empty() {
            bus.push(BattleEvent::EnemyPassed {
                name: enemy.name.clone(),
            });
            self.after_enemy_attack(bus);
            return;
        }
        let move_data = moves[self.rng.pick_index(moves.len(), "enemy move choice")];

        let score = self.score();
        let wrong_answers = self.questions_asked - self.questions_correct;
        let modifier = defense_modifier(score, self.config.passing_score, wrong_answers);

        bus.push(BattleEvent::MoveUsed {
            side: Side::Enemy,
            user: enemy.name.clone(),
            move_name: move_data.name.clone(),
        });
        bus.push(BattleEvent::DefenseApplied {
            band: modifier.band,
            multiplier: modifier.multiplier,
            wrong_answers,
        });

        if move_data.power > 0 {
            let base = calculate_damage(
                enemy,
                &self.player_team[self.player_current],
                move_data,
                true,
                &mut self.rng,
            );
            let damage = scale_damage(base.damage, modifier.multiplier);

            let player = &mut self.player_team[self.player_current];
            let remaining =
                hp_after_enemy_attack(player.current_hp, damage, score, self.config.passing_score);
            if remaining == 1 && player.current_hp <= damage {
                bus.push(BattleEvent::SurvivedAttack {
                    name: player.name.clone(),
                });
            }
            player.set_hp(remaining);
            bus.push(BattleEvent::DamageDealt {
                side: Side::Player,
                target: player.name.clone(),
                damage,
                remaining_hp: remaining,
            });
            self.roster.update_hp(self.player_current, remaining);

            if remaining == 0 {
                self.handle_player_faint(bus);
                return;
            }
        }

        self.after_enemy_attack(bus);
    }

    /// Checkpoint closing every enemy turn: ends the battle on the question
    /// limit, otherwise hands control back to the player.
    fn after_enemy_attack(&mut self, bus: &mut EventBus) {
        if self.questions_asked >= self.config.questions_per_battle {
            let score = self.score();
            if score >= self.config.passing_score {
                self.victory(bus);
            } else {
                self.question_limit_defeat(score, bus);
            }
            return;
        }

        self.start_player_turn(bus);
    }

    fn handle_enemy_faint(&mut self, bus: &mut EventBus) {
        bus.push(BattleEvent::Fainted {
            side: Side::Enemy,
            name: self.enemy_team[self.enemy_current].name.clone(),
        });

        if self.enemy_current + 1 < self.enemy_team.len() {
            self.enemy_current += 1;
            bus.push(BattleEvent::EnemySentOut {
                trainer: self.profile.name.clone(),
                name: self.enemy_team[self.enemy_current].name.clone(),
            });
            self.start_player_turn(bus);
        } else {
            self.victory(bus);
        }
    }

    fn handle_player_faint(&mut self, bus: &mut EventBus) {
        bus.push(BattleEvent::Fainted {
            side: Side::Player,
            name: self.player_team[self.player_current].name.clone(),
        });

        if self.player_team.iter().any(|member| !member.is_fainted()) {
            self.set_phase(BattlePhase::Switching(SwitchMode::Forced));
            bus.push(BattleEvent::ChooseReplacement);
        } else {
            self.defeat(bus);
        }
    }

    fn question_limit_defeat(&mut self, score: u8, bus: &mut EventBus) {
        bus.push(BattleEvent::ScoreBelowPassing {
            score,
            passing_score: self.config.passing_score,
        });
        bus.push(BattleEvent::TeamOverwhelmed);

        for (slot, member) in self.player_team.iter_mut().enumerate() {
            member.set_hp(0);
            self.roster.update_hp(slot, 0);
        }
        self.defeat(bus);
    }

    fn victory(&mut self, bus: &mut EventBus) {
        self.set_phase(BattlePhase::Victory);
        bus.push(BattleEvent::AllOpponentsDefeated);
        if let Some(message) = &self.profile.defeat_message {
            bus.push(BattleEvent::TrainerSpeech {
                speaker: self.profile.name.clone(),
                message: message.clone(),
            });
        }
        if let Some(badge) = &self.profile.badge {
            bus.push(BattleEvent::BadgeEarned {
                badge: badge.clone(),
            });
        }
        bus.push(BattleEvent::FinalScore {
            score: self.score(),
        });
        self.finish(true, bus);
    }

    fn defeat(&mut self, bus: &mut EventBus) {
        self.set_phase(BattlePhase::Defeat);
        bus.push(BattleEvent::AllPlayerFainted);
        bus.push(BattleEvent::FinalScore {
            score: self.score(),
        });
        bus.push(BattleEvent::ReviewPrompt);
        self.finish(false, bus);
    }

    fn finish(&mut self, victory: bool, bus: &mut EventBus) {
        let outcome = BattleOutcome {
            victory,
            score: self.score(),
            questions_asked: self.questions_asked,
            questions_correct: self.questions_correct,
            badge: if victory { self.profile.badge.clone() } else { None },
        };
        info!(
            victory,
            score = outcome.score,
            asked = outcome.questions_asked,
            correct = outcome.questions_correct,
            "battle finished"
        );
        bus.push(BattleEvent::BattleEnded { victory });
        self.outcome = Some(outcome.clone());
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(outcome);
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Running accuracy, 100 before any question.
    pub fn score(&self) -> u8 {
        score_percent(self.questions_correct, self.questions_asked)
    }

    pub fn questions_asked(&self) -> u32 {
        self.questions_asked
    }

    pub fn questions_correct(&self) -> u32 {
        self.questions_correct
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn opponent(&self) -> &OpponentProfile {
        &self.profile
    }

    pub fn player_team(&self) -> &[Combatant] {
        &self.player_team
    }

    pub fn enemy_team(&self) -> &[Combatant] {
        &self.enemy_team
    }

    pub fn active_player(&self) -> &Combatant {
        &self.player_team[self.player_current]
    }

    pub fn active_player_slot(&self) -> usize {
        self.player_current
    }

    pub fn active_enemy(&self) -> &Combatant {
        &self.enemy_team[self.enemy_current]
    }

    pub fn current_question(&self) -> Option<&ShuffledQuestion> {
        self.current_question.as_ref()
    }

    pub fn questions_remaining(&self) -> usize {
        self.questions.unused_count()
    }

    /// Final result, once the completion callback has fired.
    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    /// Band the next enemy attack would use.
    pub fn defense_band(&self) -> DefenseBand {
        defense_modifier(
            self.score(),
            self.config.passing_score,
            self.questions_asked - self.questions_correct,
        )
        .band
    }
}
