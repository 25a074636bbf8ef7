use crate::{Domain, ElementType};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatKind {
    Hp,
    Atk,
    Def,
    Spd,
    Int,
    Res,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatStage {
    pub stat: StatKind,
    pub stages: i8,
}

/// Stat-stage change declared by a status move.
///
/// Battles do not track stat stages, so nothing reads this at resolution
/// time. It is carried so the tables stay faithful to the course content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEffect {
    pub changes: Vec<StatStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: String,
    pub name: String,
    pub element: ElementType,
    /// 0 marks a status move.
    pub power: u16,
    /// Declared hit chance. Hits are decided by quiz answers instead, so this
    /// is display-only.
    pub accuracy: u8,
    pub domain: Domain,
    pub description: String,
    pub effect: Option<MoveEffect>,
}

impl MoveData {
    pub fn is_status(&self) -> bool {
        self.power == 0
    }
}
