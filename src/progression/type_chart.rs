use schema::ElementType;

/// Multiplier for `attack` hitting a defender with `defenders` types.
///
/// Immunity on any defending type short-circuits to 0. Strong (x2) and weak
/// (x0.5) compose multiplicatively across the defender's types.
pub fn type_effectiveness(attack: ElementType, defenders: &[ElementType]) -> f64 {
    let matchup = attack.matchup();
    let mut multiplier = 1.0;

    for defender in defenders {
        if matchup.immune.contains(defender) {
            return 0.0;
        }
        if matchup.strong_against.contains(defender) {
            multiplier *= 2.0;
        }
        if matchup.weak_against.contains(defender) {
            multiplier *= 0.5;
        }
    }

    multiplier
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    NoEffect,
    NotVeryEffective,
    Normal,
    SuperEffective,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier == 0.0 {
            Effectiveness::NoEffect
        } else if multiplier < 1.0 {
            Effectiveness::NotVeryEffective
        } else if multiplier > 1.0 {
            Effectiveness::SuperEffective
        } else {
            Effectiveness::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use ElementType::*;

    #[rstest]
    #[case(Electric, &[Water], 2.0)]
    #[case(Electric, &[Ground], 0.5)]
    #[case(Ground, &[Electric], 0.0)]
    #[case(Normal, &[Ghost], 0.0)]
    #[case(Ghost, &[Normal, Dark], 0.0)]
    #[case(Steel, &[Poison], 0.0)]
    #[case(Fire, &[Steel, Ice], 4.0)]
    #[case(Ice, &[Fire], 1.0)]
    #[case(Dark, &[Normal], 1.0)]
    fn test_type_effectiveness(
        #[case] attack: ElementType,
        #[case] defenders: &[ElementType],
        #[case] expected: f64,
    ) {
        assert_eq!(type_effectiveness(attack, defenders), expected);
    }

    #[test]
    fn test_strong_and_weak_dual_type_composes_to_neutral() {
        // Electric is strong against Water and weak against Ground.
        assert_eq!(type_effectiveness(Electric, &[Water, Ground]), 1.0);
        // Poison: strong vs Water, weak vs Steel.
        assert_eq!(type_effectiveness(Poison, &[Steel, Water]), 1.0);
    }

    #[test]
    fn test_effectiveness_categories() {
        assert_eq!(Effectiveness::from_multiplier(0.0), Effectiveness::NoEffect);
        assert_eq!(Effectiveness::from_multiplier(0.25), Effectiveness::NotVeryEffective);
        assert_eq!(Effectiveness::from_multiplier(1.0), Effectiveness::Normal);
        assert_eq!(Effectiveness::from_multiplier(4.0), Effectiveness::SuperEffective);
    }
}
