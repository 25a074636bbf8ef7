use crate::ElementType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spd: u16,
    pub int: u16,
    pub res: u16,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    pub into: String,
    pub level: u8,
}

/// How a species picks its known moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovePool {
    /// level -> moves learned at that level
    Learnset(BTreeMap<u8, Vec<String>>),
    /// Threat species always know the same list.
    Fixed(Vec<String>),
}

impl MovePool {
    /// All move ids this pool can ever produce, in table order.
    pub fn all_moves(&self) -> Vec<&str> {
        match self {
            MovePool::Learnset(levels) => levels
                .values()
                .flat_map(|moves| moves.iter().map(String::as_str))
                .collect(),
            MovePool::Fixed(moves) => moves.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeciesKind {
    Starter,
    Wild {
        rarity: Rarity,
        available_after_gym: u8,
    },
    Enemy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: u16,
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
    pub description: String,
    pub kind: SpeciesKind,
    pub moves: MovePool,
    pub evolution: Option<Evolution>,
}

impl SpeciesData {
    pub fn rarity(&self) -> Option<Rarity> {
        match self.kind {
            SpeciesKind::Wild { rarity, .. } => Some(rarity),
            _ => None,
        }
    }
}
