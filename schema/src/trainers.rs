use crate::Domain;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub species: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymLeader {
    pub id: u8,
    pub name: String,
    pub title: String,
    pub badge: String,
    pub domain: Domain,
    pub team: Vec<TeamEntry>,
    pub pre_battle_message: String,
    pub defeat_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliteAdmin {
    pub id: String,
    pub name: String,
    pub title: String,
    pub specialty: String,
    pub team: Vec<TeamEntry>,
    pub pre_battle_message: String,
    pub defeat_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RivalData {
    pub name: String,
    pub title: String,
    /// (player starter, rival lead) pairs.
    pub counters: Vec<(String, String)>,
    pub default_lead: String,
    pub lead_level: u8,
    /// Everything behind the lead.
    pub team: Vec<TeamEntry>,
    pub pre_battle_message: String,
    pub defeat_message: String,
}

impl RivalData {
    /// The rival leads with whatever counters the player's starter.
    pub fn lead_for(&self, player_starter: &str) -> &str {
        self.counters
            .iter()
            .find(|(starter, _)| starter == player_starter)
            .map(|(_, lead)| lead.as_str())
            .unwrap_or(&self.default_lead)
    }
}
