use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ElementType {
    Electric,
    Water,
    Fire,
    Steel,
    Poison,
    Ghost,
    Ground,
    Ice,
    Normal,
    Dark,
}

/// What an attacking type does to each defending type it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matchup {
    pub strong_against: &'static [ElementType],
    pub weak_against: &'static [ElementType],
    pub immune: &'static [ElementType],
}

impl ElementType {
    /// Chart row for this type when it is the attacking type.
    pub fn matchup(self) -> Matchup {
        use ElementType::*;

        let (strong_against, weak_against, immune): (
            &'static [ElementType],
            &'static [ElementType],
            &'static [ElementType],
        ) = match self {
            Electric => (&[Water], &[Ground], &[]),
            Water => (&[Fire], &[Electric], &[]),
            Fire => (&[Steel, Ice], &[Water], &[]),
            Steel => (&[Ice, Poison], &[Fire, Ground], &[Poison]),
            Poison => (&[Water], &[Steel, Ground], &[]),
            Ghost => (&[Ghost, Normal], &[Dark], &[Normal]),
            Ground => (&[Electric, Steel, Fire], &[Water, Ice], &[Electric]),
            Ice => (&[Ground, Fire], &[Fire, Steel], &[]),
            Normal => (&[], &[], &[Ghost]),
            Dark => (&[Ghost], &[], &[]),
        };

        Matchup {
            strong_against,
            weak_against,
            immune,
        }
    }
}

/// Training topic shared by moves and questions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Domain {
    IcsBasics,
    Architecture,
    Protocols,
    Windows,
    Unix,
    Governance,
    Response,
    Synthesis,
    General,
    Threats,
}

impl Domain {
    /// Course module this domain belongs to. `General` and `Threats` are not
    /// tied to a module and return 0.
    pub fn module_number(self) -> u8 {
        match self {
            Domain::IcsBasics => 1,
            Domain::Architecture => 2,
            Domain::Protocols => 3,
            Domain::Windows => 4,
            Domain::Unix => 5,
            Domain::Governance => 6,
            Domain::Response => 7,
            Domain::Synthesis => 8,
            Domain::General | Domain::Threats => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_domain_round_trips_through_snake_case() {
        assert_eq!(Domain::from_str("ics_basics").unwrap(), Domain::IcsBasics);
        assert_eq!(Domain::IcsBasics.to_string(), "ics_basics");
        assert_eq!(Domain::Synthesis.module_number(), 8);
        assert_eq!(Domain::Threats.module_number(), 0);
    }

    #[test]
    fn test_element_names_are_upper_case() {
        assert_eq!(ElementType::Electric.to_string(), "ELECTRIC");
        assert_eq!(ElementType::from_str("ghost").unwrap(), ElementType::Ghost);
    }

    #[test]
    fn test_steel_is_both_strong_and_immune_against_poison() {
        let steel = ElementType::Steel.matchup();
        assert!(steel.strong_against.contains(&ElementType::Poison));
        assert!(steel.immune.contains(&ElementType::Poison));
    }
}
