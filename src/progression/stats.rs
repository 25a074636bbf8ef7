use schema::BaseStats;
use serde::{Deserialize, Serialize};

/// Level-derived stat block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spd: u16,
    pub int: u16,
    pub res: u16,
}

/// `floor(2*b*L/100 + L + 10)`
pub fn calculate_stat(base: u16, level: u8) -> u16 {
    let level = level as u32;
    let stat = (2 * base as u32 * level) / 100 + level + 10;
    stat.min(u16::MAX as u32) as u16
}

/// Same as [`calculate_stat`] with an extra `+L`.
pub fn calculate_hp(base: u16, level: u8) -> u16 {
    calculate_stat(base, level).saturating_add(level as u16)
}

impl StatBlock {
    pub fn for_level(base: &BaseStats, level: u8) -> Self {
        StatBlock {
            hp: calculate_hp(base.hp, level),
            atk: calculate_stat(base.atk, level),
            def: calculate_stat(base.def, level),
            spd: calculate_stat(base.spd, level),
            int: calculate_stat(base.int, level),
            res: calculate_stat(base.res, level),
        }
    }
}
