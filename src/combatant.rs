use crate::data::get_species_data;
use crate::errors::DataResult;
use crate::progression::leveling::{exp_for_level, moves_for_level};
use crate::progression::stats::StatBlock;
use rand::Rng;
use schema::{ElementType, SpeciesData};
use serde::{Deserialize, Serialize};

/// A creature instance, either on the player's roster or fielded by an opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub definition_id: u16,
    pub name: String,
    pub types: Vec<ElementType>,
    pub level: u8,
    pub current_hp: u16,
    pub max_hp: u16,
    pub stats: StatBlock,
    pub moves: Vec<String>,
    pub exp: u32,
}

impl Combatant {
    /// Build a fresh, fully healed instance of `species` at `level`.
    pub fn new(species: &SpeciesData, level: u8) -> Self {
        let stats = StatBlock::for_level(&species.base_stats, level);
        Combatant {
            id: generate_instance_id(),
            definition_id: species.id,
            name: species.name.clone(),
            types: species.types.clone(),
            level,
            current_hp: stats.hp,
            max_hp: stats.hp,
            stats,
            moves: moves_for_level(&species.moves, level),
            exp: exp_for_level(level),
        }
    }

    /// Same as [`Combatant::new`], resolving the species by name.
    pub fn from_species_name(name: &str, level: u8) -> DataResult<Self> {
        Ok(Self::new(get_species_data(name)?, level))
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply damage, flooring HP at 0. Returns true if this caused a faint.
    pub fn take_damage(&mut self, damage: u16) -> bool {
        let was_fainted = self.is_fainted();
        self.current_hp = self.current_hp.saturating_sub(damage);
        !was_fainted && self.is_fainted()
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.max_hp);
    }

    pub fn heal_fully(&mut self) {
        self.current_hp = self.max_hp;
    }

    /// Move to `new_level`: recompute stats and moves and restore HP.
    pub fn level_up_to(&mut self, species: &SpeciesData, new_level: u8) {
        self.level = new_level;
        self.stats = StatBlock::for_level(&species.base_stats, new_level);
        self.max_hp = self.stats.hp;
        self.current_hp = self.max_hp;
        self.exp = exp_for_level(new_level);
        self.moves = moves_for_level(&species.moves, new_level);
    }

    pub fn hp_percent(&self) -> u8 {
        if self.max_hp == 0 {
            return 0;
        }
        ((self.current_hp as u32 * 100) / self.max_hp as u32).min(100) as u8
    }
}

/// `scadamon_<millis>_<9 base-36 chars>`
fn generate_instance_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("scadamon_{}_{}", chrono::Utc::now().timestamp_millis(), suffix)
}
