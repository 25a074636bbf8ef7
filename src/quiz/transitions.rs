use crate::errors::{ActionError, QuizError, TransitionError};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Ready,
    Asking,
    /// The current question has been answered; waiting for `next`.
    Feedback,
    Complete,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizInput {
    Start,
    Answer(usize),
    Next,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizInputKind {
    Start,
    Answer,
    Next,
    Retry,
}

impl QuizInput {
    pub fn kind(self) -> QuizInputKind {
        match self {
            QuizInput::Start => QuizInputKind::Start,
            QuizInput::Answer(_) => QuizInputKind::Answer,
            QuizInput::Next => QuizInputKind::Next,
            QuizInput::Retry => QuizInputKind::Retry,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStep {
    Begin,
    Grade,
    Advance,
    Restart,
}

/// `None` marks a pair that is recognised but refused with an action error.
const TRANSITIONS: &[(QuizPhase, QuizInputKind, Option<QuizStep>)] = &[
    (QuizPhase::Ready, QuizInputKind::Start, Some(QuizStep::Begin)),
    (QuizPhase::Asking, QuizInputKind::Answer, Some(QuizStep::Grade)),
    (QuizPhase::Feedback, QuizInputKind::Answer, None),
    (QuizPhase::Feedback, QuizInputKind::Next, Some(QuizStep::Advance)),
    (QuizPhase::Complete, QuizInputKind::Retry, Some(QuizStep::Restart)),
];

pub fn lookup(phase: QuizPhase, input: QuizInput) -> Result<QuizStep, QuizError> {
    let entry = TRANSITIONS
        .iter()
        .find(|(from, kind, _)| *from == phase && *kind == input.kind())
        .ok_or_else(|| TransitionError::new(phase, input))?;
    match entry.2 {
        Some(step) => Ok(step),
        None => Err(ActionError::AlreadyAnswered.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(QuizPhase::Ready, QuizInput::Start, QuizStep::Begin)]
    #[case(QuizPhase::Asking, QuizInput::Answer(2), QuizStep::Grade)]
    #[case(QuizPhase::Feedback, QuizInput::Next, QuizStep::Advance)]
    #[case(QuizPhase::Complete, QuizInput::Retry, QuizStep::Restart)]
    fn test_accepted_pairs(#[case] phase: QuizPhase, #[case] input: QuizInput, #[case] step: QuizStep) {
        assert_eq!(lookup(phase, input), Ok(step));
    }

    #[rstest]
    #[case(QuizPhase::Ready, QuizInput::Answer(0))]
    #[case(QuizPhase::Asking, QuizInput::Next)]
    #[case(QuizPhase::Asking, QuizInput::Start)]
    #[case(QuizPhase::Complete, QuizInput::Next)]
    #[case(QuizPhase::Ready, QuizInput::Retry)]
    fn test_rejected_pairs(#[case] phase: QuizPhase, #[case] input: QuizInput) {
        assert_eq!(
            lookup(phase, input),
            Err(QuizError::Transition(TransitionError::new(phase, input)))
        );
    }

    #[test]
    fn test_second_answer_is_an_action_error() {
        assert_eq!(
            lookup(QuizPhase::Feedback, QuizInput::Answer(1)),
            Err(QuizError::Action(ActionError::AlreadyAnswered))
        );
    }
}
