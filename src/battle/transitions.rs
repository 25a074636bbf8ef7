use crate::battle::state::{BattlePhase, SwitchMode};
use crate::errors::TransitionError;
use serde::{Deserialize, Serialize};

/// Everything the player (or host) can feed the battle engine.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleInput {
    Begin,
    SelectStarter(usize),
    ChooseMove(usize),
    OpenSwitch,
    CancelSwitch,
    SwitchTo(usize),
    Answer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Begin,
    SelectStarter,
    ChooseMove,
    OpenSwitch,
    CancelSwitch,
    SwitchTo,
    Answer,
}

impl BattleInput {
    pub fn kind(self) -> InputKind {
        match self {
            BattleInput::Begin => InputKind::Begin,
            BattleInput::SelectStarter(_) => InputKind::SelectStarter,
            BattleInput::ChooseMove(_) => InputKind::ChooseMove,
            BattleInput::OpenSwitch => InputKind::OpenSwitch,
            BattleInput::CancelSwitch => InputKind::CancelSwitch,
            BattleInput::SwitchTo(_) => InputKind::SwitchTo,
            BattleInput::Answer(_) => InputKind::Answer,
        }
    }
}

/// Work the engine does for an accepted (state, input) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    PlayIntro,
    SendOutStarter,
    SelectMove,
    OpenSwitchPanel,
    CloseSwitchPanel,
    VoluntarySwitch,
    ForcedSwitch,
    ResolveAnswer,
}

pub const TRANSITIONS: &[(BattlePhase, InputKind, Step)] = &[
    (BattlePhase::Intro, InputKind::Begin, Step::PlayIntro),
    (
        BattlePhase::Switching(SwitchMode::Starter),
        InputKind::SelectStarter,
        Step::SendOutStarter,
    ),
    (BattlePhase::PlayerTurn, InputKind::ChooseMove, Step::SelectMove),
    (BattlePhase::PlayerTurn, InputKind::OpenSwitch, Step::OpenSwitchPanel),
    (
        BattlePhase::Switching(SwitchMode::Voluntary),
        InputKind::CancelSwitch,
        Step::CloseSwitchPanel,
    ),
    (
        BattlePhase::Switching(SwitchMode::Voluntary),
        InputKind::SwitchTo,
        Step::VoluntarySwitch,
    ),
    (
        BattlePhase::Switching(SwitchMode::Forced),
        InputKind::SwitchTo,
        Step::ForcedSwitch,
    ),
    (BattlePhase::Question, InputKind::Answer, Step::ResolveAnswer),
];

pub fn lookup(phase: BattlePhase, input: BattleInput) -> Result<Step, TransitionError> {
    TRANSITIONS
        .iter()
        .find(|(from, kind, _)| *from == phase && *kind == input.kind())
        .map(|(_, _, step)| *step)
        .ok_or_else(|| TransitionError::new(phase, input))
}
