use crate::data::wild_species;
use crate::errors::DataResult;
use schema::{Rarity, SpeciesData, SpeciesKind};

/// Minimum catch-phase quiz score that unlocks a rarity.
pub fn min_score_for(rarity: Rarity) -> u8 {
    match rarity {
        Rarity::Legendary => 100,
        Rarity::Rare => 92,
        Rarity::Uncommon => 88,
        Rarity::Common => 0,
    }
}

pub fn unlocked_rarities(score: u8) -> Vec<Rarity> {
    [Rarity::Common, Rarity::Uncommon, Rarity::Rare, Rarity::Legendary]
        .into_iter()
        .filter(|&rarity| score >= min_score_for(rarity))
        .collect()
}

/// Wild species the player may catch after clearing `completed_gyms` with
/// `score` on the catch-phase quiz.
pub fn available_wild_species(
    completed_gyms: &[u8],
    score: u8,
) -> DataResult<Vec<&'static SpeciesData>> {
    let max_gym = completed_gyms.iter().copied().max().unwrap_or(0);
    let rarities = unlocked_rarities(score);

    Ok(wild_species()?
        .filter(|species| match species.kind {
            SpeciesKind::Wild {
                rarity,
                available_after_gym,
            } => available_after_gym <= max_gym && rarities.contains(&rarity),
            _ => false,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rarity_thresholds() {
        assert_eq!(unlocked_rarities(87), vec![Rarity::Common]);
        assert_eq!(unlocked_rarities(88), vec![Rarity::Common, Rarity::Uncommon]);
        assert_eq!(
            unlocked_rarities(92),
            vec![Rarity::Common, Rarity::Uncommon, Rarity::Rare]
        );
        assert_eq!(unlocked_rarities(100).len(), 4);
    }

    #[test]
    fn test_nothing_is_available_before_the_first_gym() {
        assert!(available_wild_species(&[], 100).unwrap().is_empty());
    }

    #[test]
    fn test_first_gym_commons() {
        let names: Vec<&str> = available_wild_species(&[1], 50)
            .unwrap()
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["SENSORB", "ACTUMON", "HMINDER"]);
    }

    #[test]
    fn test_high_score_unlocks_rarer_species() {
        let species = available_wild_species(&[1, 2, 3], 92).unwrap();
        assert!(species.iter().any(|s| s.name == "OPCURON"));
        assert!(species.iter().all(|s| s.rarity() != Some(Rarity::Legendary)));
    }
}
