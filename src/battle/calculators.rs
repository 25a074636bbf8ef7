//! Pure arithmetic for the enemy's attack: how the player's running
//! accuracy scales incoming damage and when it keeps them standing.

use crate::battle::state::DefenseBand;

const STRONG_DEFENSE_SCORE: u8 = 90;
const STRONG_DEFENSE_MULTIPLIER: f64 = 0.3;
const PASSING_DEFENSE_MULTIPLIER: f64 = 0.5;
const PENALTY_PER_WRONG_ANSWER: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DefenseModifier {
    pub band: DefenseBand,
    pub multiplier: f64,
}

/// Damage multiplier for an enemy attack given the player's accuracy so far.
pub fn defense_modifier(score: u8, passing_score: u8, wrong_answers: u32) -> DefenseModifier {
    if score >= STRONG_DEFENSE_SCORE {
        DefenseModifier {
            band: DefenseBand::Strong,
            multiplier: STRONG_DEFENSE_MULTIPLIER,
        }
    } else if score >= passing_score {
        DefenseModifier {
            band: DefenseBand::Passing,
            multiplier: PASSING_DEFENSE_MULTIPLIER,
        }
    } else {
        DefenseModifier {
            band: DefenseBand::Weak,
            multiplier: 1.0 + wrong_answers as f64 * PENALTY_PER_WRONG_ANSWER,
        }
    }
}

pub fn scale_damage(base: u16, multiplier: f64) -> u16 {
    (base as f64 * multiplier).floor().clamp(0.0, u16::MAX as f64) as u16
}

/// HP left after taking `damage`. A player at or above the passing score
/// is left on 1 HP instead of fainting.
pub fn hp_after_enemy_attack(current_hp: u16, damage: u16, score: u8, passing_score: u8) -> u16 {
    let remaining = current_hp.saturating_sub(damage);
    if remaining == 0 && score >= passing_score {
        1
    } else {
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(100, 75, 0, DefenseBand::Strong, 0.3)]
    #[case(90, 75, 2, DefenseBand::Strong, 0.3)]
    #[case(89, 75, 2, DefenseBand::Passing, 0.5)]
    #[case(75, 75, 5, DefenseBand::Passing, 0.5)]
    #[case(74, 75, 0, DefenseBand::Weak, 1.0)]
    #[case(50, 75, 4, DefenseBand::Weak, 1.6)]
    #[case(92, 95, 1, DefenseBand::Strong, 0.3)]
    fn test_defense_bands(
        #[case] score: u8,
        #[case] passing: u8,
        #[case] wrong: u32,
        #[case] band: DefenseBand,
        #[case] multiplier: f64,
    ) {
        let modifier = defense_modifier(score, passing, wrong);
        assert_eq!(modifier.band, band);
        assert!((modifier.multiplier - multiplier).abs() < 1e-9);
    }

    #[test]
    fn test_scale_damage_floors() {
        assert_eq!(scale_damage(10, 0.3), 3);
        assert_eq!(scale_damage(1, 0.3), 0);
        assert_eq!(scale_damage(10, 1.45), 14);
    }

    #[rstest]
    #[case(80, 200)]
    #[case(75, 30)]
    #[case(100, 30)]
    fn test_passing_player_survives_any_hit(#[case] score: u8, #[case] hp: u16) {
        assert_eq!(hp_after_enemy_attack(hp, u16::MAX, score, 75), 1);
        assert_eq!(hp_after_enemy_attack(hp, hp, score, 75), 1);
    }

    #[test]
    fn test_failing_player_can_faint() {
        assert_eq!(hp_after_enemy_attack(30, 40, 74, 75), 0);
        assert_eq!(hp_after_enemy_attack(30, 10, 74, 75), 20);
    }
}
