//! Read-only access to the embedded data tables.
//!
//! The tables are validated and serialized by the build script; at runtime
//! they are decoded once and looked up by name through compile-time maps.

use crate::errors::{DataError, DataResult};
use schema::{EliteAdmin, GameTables, GymLeader, MoveData, RivalData, SpeciesData, SpeciesKind, TeamEntry};
use std::sync::LazyLock;
use tracing::warn;

include!(concat!(env!("OUT_DIR"), "/generated_data.rs"));

static TABLES: LazyLock<Result<GameTables, String>> = LazyLock::new(|| {
    GameTables::from_bytes(include_bytes!(concat!(env!("OUT_DIR"), "/game_data.bin")))
        .map_err(|e| e.to_string())
});

/// Decoded tables, or the reason they could not be decoded.
pub fn tables() -> DataResult<&'static GameTables> {
    TABLES
        .as_ref()
        .map_err(|reason| DataError::CorruptTables(reason.clone()))
}

pub fn get_move_data(id: &str) -> DataResult<&'static MoveData> {
    let tables = tables()?;
    MOVE_INDEX
        .get(id)
        .and_then(|&index| tables.moves.get(index))
        .ok_or_else(|| DataError::UnknownMove(id.to_string()))
}

pub fn get_species_data(name: &str) -> DataResult<&'static SpeciesData> {
    let tables = tables()?;
    SPECIES_INDEX
        .get(name)
        .and_then(|&index| tables.species.get(index))
        .ok_or_else(|| DataError::UnknownSpecies(name.to_string()))
}

/// Resolves a list of move ids, dropping (and logging) any that are unknown.
pub fn resolve_moves<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<&'static MoveData> {
    ids.into_iter()
        .filter_map(|id| match get_move_data(id) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(move_id = id, error = %e, "skipping unresolvable move");
                None
            }
        })
        .collect()
}

pub fn gym_leader(id: u8) -> DataResult<&'static GymLeader> {
    tables()?
        .gym_leaders
        .iter()
        .find(|leader| leader.id == id)
        .ok_or_else(|| DataError::UnknownTrainer(format!("gym {}", id)))
}

pub fn gym_leaders() -> DataResult<&'static [GymLeader]> {
    Ok(&tables()?.gym_leaders)
}

pub fn elite_admin(id: &str) -> DataResult<&'static EliteAdmin> {
    tables()?
        .elite_four
        .iter()
        .find(|admin| admin.id == id)
        .ok_or_else(|| DataError::UnknownTrainer(id.to_string()))
}

pub fn elite_four() -> DataResult<&'static [EliteAdmin]> {
    Ok(&tables()?.elite_four)
}

pub fn rival() -> DataResult<&'static RivalData> {
    Ok(&tables()?.rival)
}

/// The rival's full lineup: the counter to the player's starter first.
pub fn rival_team(player_starter: &str) -> DataResult<Vec<TeamEntry>> {
    let rival = rival()?;
    let mut team = vec![TeamEntry {
        species: rival.lead_for(player_starter).to_string(),
        level: rival.lead_level,
    }];
    team.extend(rival.team.iter().cloned());
    Ok(team)
}

pub fn starters() -> DataResult<Vec<&'static SpeciesData>> {
    Ok(tables()?
        .species
        .iter()
        .filter(|species| species.kind == SpeciesKind::Starter)
        .collect())
}

pub fn wild_species() -> DataResult<impl Iterator<Item = &'static SpeciesData>> {
    Ok(tables()?
        .species
        .iter()
        .filter(|species| matches!(species.kind, SpeciesKind::Wild { .. })))
}
