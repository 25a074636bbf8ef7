pub mod calculators;
pub mod enemy;
pub mod engine;
pub mod state;
pub mod transitions;

#[cfg(test)]
pub(crate) mod tests;

use std::cell::RefCell;
use std::rc::Rc;

pub use engine::{BattleConfig, BattleDeps, BattleEngine, BattleOutcome, BattleSetup};
pub use enemy::{Opponent, OpponentProfile};
pub use state::{BattleEvent, BattlePhase, EventBus, Side, SwitchMode};
pub use transitions::BattleInput;

/// Receives HP changes to the player's roster as they happen in battle, so
/// damage survives the battle being abandoned.
pub trait RosterSink {
    fn update_hp(&mut self, slot: usize, hp: u16);
}

impl<T: RosterSink> RosterSink for Rc<RefCell<T>> {
    fn update_hp(&mut self, slot: usize, hp: u16) {
        self.borrow_mut().update_hp(slot, hp);
    }
}
