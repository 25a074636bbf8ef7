use crate::progression::type_chart::Effectiveness;
use serde::{Deserialize, Serialize};

/// Where the battle's state machine currently sits.
///
/// `PlayerAttack` and `EnemyAttack` are passed through while an answer is
/// being resolved; the engine never waits for input in either of them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    Intro,
    Switching(SwitchMode),
    PlayerTurn,
    Question,
    PlayerAttack,
    EnemyAttack,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, BattlePhase::Victory | BattlePhase::Defeat)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchMode {
    /// Mandatory lead selection after the intro; cannot be cancelled.
    Starter,
    /// Chosen from the player turn; consumes the turn.
    Voluntary,
    /// Replacing a fainted combatant; the enemy does not attack afterwards.
    Forced,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefenseBand {
    Strong,
    Passing,
    Weak,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Intro and roster changes
    TrainerSpeech {
        speaker: String,
        message: String,
    },
    EnemySentOut {
        trainer: String,
        name: String,
    },
    PlayerSentOut {
        name: String,
    },
    PlayerRecalled {
        name: String,
    },

    // Prompts
    ChooseLead,
    ChooseMove,
    ChooseSwitch,
    ChooseReplacement,

    // Questions
    QuestionAsked {
        move_name: String,
        question_id: String,
        prompt: String,
        options: Vec<String>,
    },
    AnswerChecked {
        correct: bool,
        correct_answer: String,
    },

    // Attacks
    MoveUsed {
        side: Side,
        user: String,
        move_name: String,
    },
    AttackMissed {
        user: String,
    },
    StatsChanged {
        user: String,
    },
    AttackTypeEffectiveness {
        multiplier: f64,
    },
    DefenseApplied {
        band: DefenseBand,
        multiplier: f64,
        wrong_answers: u32,
    },
    DamageDealt {
        side: Side,
        target: String,
        damage: u16,
        remaining_hp: u16,
    },
    SurvivedAttack {
        name: String,
    },
    EnemyPassed {
        name: String,
    },
    Fainted {
        side: Side,
        name: String,
    },

    // Battle end
    ScoreBelowPassing {
        score: u8,
        passing_score: u8,
    },
    TeamOverwhelmed,
    AllOpponentsDefeated,
    BadgeEarned {
        badge: String,
    },
    AllPlayerFainted,
    FinalScore {
        score: u8,
    },
    ReviewPrompt,
    BattleEnded {
        victory: bool,
    },
}

impl BattleEvent {
    /// Player-facing text for the event, or `None` for bookkeeping events.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::TrainerSpeech { speaker, message } => {
                Some(format!("{}: \"{}\"", speaker, message))
            }
            BattleEvent::EnemySentOut { trainer, name } => {
                Some(format!("{} sent out {}!", trainer, name))
            }
            BattleEvent::PlayerSentOut { name } => Some(format!("Go! {}!", name)),
            BattleEvent::PlayerRecalled { name } => Some(format!("Come back, {}!", name)),

            BattleEvent::ChooseLead => Some("Choose your lead SCADAmon!".to_string()),
            BattleEvent::ChooseMove => Some("Choose a move!".to_string()),
            BattleEvent::ChooseSwitch => Some("Choose a SCADAmon to switch to!".to_string()),
            BattleEvent::ChooseReplacement => {
                Some("Choose a SCADAmon to continue the battle!".to_string())
            }

            BattleEvent::QuestionAsked {
                move_name,
                prompt,
                options,
                ..
            } => {
                let mut text = format!(
                    "{}! Answer correctly to land the attack!\n{}",
                    move_name, prompt
                );
                for (i, option) in options.iter().enumerate() {
                    text.push_str(&format!("\n  {}) {}", i + 1, option));
                }
                Some(text)
            }
            BattleEvent::AnswerChecked {
                correct,
                correct_answer,
            } => {
                if *correct {
                    Some("Correct!".to_string())
                } else {
                    Some(format!("Wrong! The answer was: {}", correct_answer))
                }
            }

            BattleEvent::MoveUsed {
                user, move_name, ..
            } => Some(format!("{} used {}!", user, move_name)),
            BattleEvent::AttackMissed { user } => Some(format!("{}'s attack missed!", user)),
            BattleEvent::StatsChanged { user } => Some(format!("{}'s stats changed!", user)),
            BattleEvent::AttackTypeEffectiveness { multiplier } => {
                match Effectiveness::from_multiplier(*multiplier) {
                    Effectiveness::SuperEffective => Some("It's super effective!".to_string()),
                    Effectiveness::NotVeryEffective => {
                        Some("It's not very effective...".to_string())
                    }
                    Effectiveness::NoEffect => Some("It doesn't affect the enemy!".to_string()),
                    Effectiveness::Normal => None,
                }
            }
            BattleEvent::DefenseApplied {
                band,
                wrong_answers,
                ..
            } => match band {
                DefenseBand::Strong => Some("Your strong defenses reduce the impact!".to_string()),
                DefenseBand::Weak if *wrong_answers > 2 => {
                    Some("Your weak defenses make the attack more effective!".to_string())
                }
                _ => None,
            },
            BattleEvent::DamageDealt { .. } => None,
            BattleEvent::SurvivedAttack { .. } | BattleEvent::EnemyPassed { .. } => None,
            BattleEvent::Fainted { name, .. } => Some(format!("{} fainted!", name)),

            BattleEvent::ScoreBelowPassing {
                score,
                passing_score,
            } => Some(format!(
                "Your final score is {}% - below the {}% required!",
                score, passing_score
            )),
            BattleEvent::TeamOverwhelmed => {
                Some("All your SCADAmon are overwhelmed by the enemy!".to_string())
            }
            BattleEvent::AllOpponentsDefeated => Some("You defeated all opponents!".to_string()),
            BattleEvent::BadgeEarned { badge } => Some(format!("You earned the {}!", badge)),
            BattleEvent::AllPlayerFainted => Some("All your SCADAmon have fainted!".to_string()),
            BattleEvent::FinalScore { score } => Some(format!("Final Score: {}%", score)),
            BattleEvent::ReviewPrompt => Some("Review the material and try again!".to_string()),
            BattleEvent::BattleEnded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Player-facing lines, skipping silent events.
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().filter_map(BattleEvent::format).collect()
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print formatted text for each event, falling back to debug format for
    /// silent events.
    pub fn print_formatted(&self) {
        for event in &self.events {
            match event.format() {
                Some(formatted) => println!("  {}", formatted),
                None => println!("  {:?} (silent)", event),
            }
        }
    }

    pub fn contains(&self, predicate: impl Fn(&BattleEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }

    /// Return true if the event bus contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Return the number of events in the bus.
    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    /// One formatted line per visible event.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
