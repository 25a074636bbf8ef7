use crate::{EliteAdmin, GymLeader, MoveData, RivalData, SpeciesData};
use serde::{Deserialize, Serialize};

/// Every static table the game needs, in the shape the build script embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTables {
    pub moves: Vec<MoveData>,
    pub species: Vec<SpeciesData>,
    pub gym_leaders: Vec<GymLeader>,
    pub elite_four: Vec<EliteAdmin>,
    pub rival: RivalData,
}

/// Trainer half of the tables, as written in `data/trainers.ron`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerTables {
    pub gym_leaders: Vec<GymLeader>,
    pub elite_four: Vec<EliteAdmin>,
    pub rival: RivalData,
}

impl GameTables {
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Names every move/species reference that does not resolve.
    pub fn dangling_references(&self) -> Vec<String> {
        let has_move = |id: &str| self.moves.iter().any(|m| m.id == id);
        let has_species = |name: &str| self.species.iter().any(|s| s.name == name);
        let mut missing = Vec::new();

        for species in &self.species {
            for move_id in species.moves.all_moves() {
                if !has_move(move_id) {
                    missing.push(format!("{} -> move {}", species.name, move_id));
                }
            }
        }

        let teams = self
            .gym_leaders
            .iter()
            .map(|g| (g.name.as_str(), &g.team))
            .chain(self.elite_four.iter().map(|e| (e.name.as_str(), &e.team)))
            .chain(std::iter::once((self.rival.name.as_str(), &self.rival.team)));
        for (trainer, team) in teams {
            for entry in team {
                if !has_species(&entry.species) {
                    missing.push(format!("{} -> species {}", trainer, entry.species));
                }
            }
        }

        for (_, lead) in &self.rival.counters {
            if !has_species(lead) {
                missing.push(format!("{} -> species {}", self.rival.name, lead));
            }
        }
        missing
    }
}
