use schema::MovePool;

const MAX_KNOWN_MOVES: usize = 4;

/// Level range a milestone pulls the roster into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelBand {
    pub base_level: u8,
    pub max_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Gym(u8),
    EliteFour,
}

impl Milestone {
    pub fn level_band(self) -> Option<LevelBand> {
        let (base_level, max_level) = match self {
            Milestone::Gym(1) => (10, 15),
            Milestone::Gym(2) => (18, 22),
            Milestone::Gym(3) => (26, 30),
            Milestone::Gym(4) => (32, 38),
            Milestone::Gym(5) => (38, 44),
            Milestone::Gym(6) => (44, 50),
            Milestone::Gym(7) => (50, 56),
            Milestone::Gym(8) => (56, 62),
            Milestone::EliteFour => (60, 70),
            Milestone::Gym(_) => return None,
        };
        Some(LevelBand {
            base_level,
            max_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XpBonus {
    pub multiplier: f64,
    pub label: &'static str,
}

/// Bonus band for a milestone score.
pub fn xp_bonus(score: u8) -> XpBonus {
    let (multiplier, label) = match score {
        100.. => (1.25, "PERFECT!"),
        95..=99 => (1.15, "Excellent!"),
        90..=94 => (1.10, "Great!"),
        80..=89 => (1.05, "Good!"),
        _ => (1.0, "Keep practicing!"),
    };
    XpBonus { multiplier, label }
}

/// `min(max, L + floor((max - L) * 0.5 * multiplier))`. Never lowers a level.
pub fn target_level(current: u8, band: LevelBand, multiplier: f64) -> u8 {
    if current >= band.max_level {
        return current;
    }
    let gap = (band.max_level - current) as f64;
    let gained = (gap * 0.5 * multiplier).floor() as u8;
    current.saturating_add(gained).min(band.max_level)
}

/// The last four moves a pool yields at `level`, oldest first.
pub fn moves_for_level(pool: &MovePool, level: u8) -> Vec<String> {
    let learned: Vec<&String> = match pool {
        MovePool::Learnset(levels) => levels
            .range(..=level)
            .flat_map(|(_, moves)| moves.iter())
            .collect(),
        MovePool::Fixed(moves) => moves.iter().collect(),
    };
    let skip = learned.len().saturating_sub(MAX_KNOWN_MOVES);
    learned.into_iter().skip(skip).cloned().collect()
}

pub fn exp_for_level(level: u8) -> u32 {
    (level as u32).pow(3)
}
