use crate::combatant::Combatant;
use crate::data::{elite_admin, get_species_data, gym_leader, rival, rival_team};
use crate::errors::DataResult;
use schema::TeamEntry;
use tracing::{debug, warn};

const MAX_LEVEL: u8 = 100;
const FALLBACK_MOVES: [&str; 2] = ["MALWARE_INJECT", "PHISHING_LURE"];
const UNNAMED_TRAINER: &str = "Enemy";

/// Who the player is fighting.
#[derive(Debug, Clone, PartialEq)]
pub enum Opponent {
    Gym(u8),
    EliteFour(String),
    Rival { player_starter: String },
    /// Enemies used exactly as given, with no trainer and no level scaling.
    Wild { enemies: Vec<Combatant> },
}

/// Trainer text and rewards attached to an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpponentProfile {
    pub name: String,
    pub pre_battle_message: Option<String>,
    pub defeat_message: Option<String>,
    pub badge: Option<String>,
}

impl Opponent {
    pub fn profile(&self) -> DataResult<OpponentProfile> {
        Ok(match self {
            Opponent::Gym(id) => {
                let leader = gym_leader(*id)?;
                OpponentProfile {
                    name: leader.name.clone(),
                    pre_battle_message: Some(leader.pre_battle_message.clone()),
                    defeat_message: Some(leader.defeat_message.clone()),
                    badge: Some(leader.badge.clone()),
                }
            }
            Opponent::EliteFour(id) => {
                let admin = elite_admin(id)?;
                OpponentProfile {
                    name: admin.name.clone(),
                    pre_battle_message: Some(admin.pre_battle_message.clone()),
                    defeat_message: Some(admin.defeat_message.clone()),
                    badge: None,
                }
            }
            Opponent::Rival { .. } => {
                let rival = rival()?;
                OpponentProfile {
                    name: rival.name.clone(),
                    pre_battle_message: Some(rival.pre_battle_message.clone()),
                    defeat_message: Some(rival.defeat_message.clone()),
                    badge: None,
                }
            }
            Opponent::Wild { .. } => OpponentProfile {
                name: UNNAMED_TRAINER.to_string(),
                ..OpponentProfile::default()
            },
        })
    }

    /// The opponent's lineup, scaled to the player's roster where it has a trainer.
    pub fn build_roster(&self, player_team: &[Combatant]) -> DataResult<Vec<Combatant>> {
        let entries = match self {
            Opponent::Gym(id) => gym_leader(*id)?.team.clone(),
            Opponent::EliteFour(id) => elite_admin(id)?.team.clone(),
            Opponent::Rival { player_starter } => rival_team(player_starter)?,
            Opponent::Wild { enemies } => return Ok(enemies.clone()),
        };
        Ok(scale_roster(&entries, average_level(player_team)))
    }
}

/// Rounded mean level of a roster.
pub fn average_level(team: &[Combatant]) -> u8 {
    if team.is_empty() {
        return 1;
    }
    let total: u32 = team.iter().map(|member| member.level as u32).sum();
    (total as f64 / team.len() as f64).round() as u8
}

/// Instantiate a trainer's team. The first enemy matches `average_level`,
/// each later slot one level higher; the listed levels are ignored.
/// Unknown species are skipped without closing the gap they leave.
pub fn scale_roster(entries: &[TeamEntry], average_level: u8) -> Vec<Combatant> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let species = match get_species_data(&entry.species) {
                Ok(species) => species,
                Err(e) => {
                    warn!(species = %entry.species, error = %e, "skipping unknown enemy");
                    return None;
                }
            };
            let level = average_level
                .saturating_add(index.min(MAX_LEVEL as usize) as u8)
                .clamp(1, MAX_LEVEL);
            debug!(species = %species.name, level, listed = entry.level, "creating enemy");

            let mut enemy = Combatant::new(species, level);
            if enemy.moves.is_empty() {
                enemy.moves = FALLBACK_MOVES.iter().map(|id| id.to_string()).collect();
            }
            Some(enemy)
        })
        .collect()
}
