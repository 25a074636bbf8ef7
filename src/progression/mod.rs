//! Pure game-math: stats, type matchups, damage, leveling, and catch rarity.

pub mod catching;
pub mod damage;
pub mod leveling;
pub mod stats;
pub mod type_chart;
