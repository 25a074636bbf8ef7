use crate::combatant::Combatant;
use crate::progression::type_chart::type_effectiveness;
use crate::rng::BattleRng;
use schema::MoveData;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: u16,
    pub effectiveness: f64,
}

impl DamageOutcome {
    fn none(effectiveness: f64) -> Self {
        DamageOutcome {
            damage: 0,
            effectiveness,
        }
    }
}

/// Damage `attacker` deals to `defender` with `move_data`.
///
/// A wrong answer, a status move, or an immune defender all yield exactly 0.
/// Otherwise the result is at least 1.
pub fn calculate_damage(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    answered_correctly: bool,
    rng: &mut BattleRng,
) -> DamageOutcome {
    let effectiveness = type_effectiveness(move_data.element, &defender.types);

    if !answered_correctly || move_data.power == 0 || effectiveness == 0.0 {
        return DamageOutcome::none(effectiveness);
    }

    let level = attacker.level as f64;
    let power = move_data.power as f64;
    let attack = attacker.stats.atk as f64;
    let defense = (defender.stats.def as f64).max(1.0);

    let raw = (((2.0 * level / 5.0 + 2.0) * power * (attack / defense)) / 50.0 + 2.0).floor();
    let typed = (raw * effectiveness).floor();
    let varied = (typed * rng.variance("damage variance")).floor();

    DamageOutcome {
        damage: varied.clamp(1.0, u16::MAX as f64) as u16,
        effectiveness,
    }
}
