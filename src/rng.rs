use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Source of every random decision in a battle or quiz.
///
/// `Scripted` replays a fixed list of outcomes in the 1..=100 range (cycling
/// when it runs out) so tests can pin down shuffles, draws, and variance.
#[derive(Debug, Clone)]
pub enum BattleRng {
    Random(StdRng),
    Scripted { outcomes: Vec<u8>, index: usize },
}

impl BattleRng {
    pub fn from_entropy() -> Self {
        BattleRng::Random(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        BattleRng::Random(StdRng::seed_from_u64(seed))
    }

    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        BattleRng::Scripted { outcomes, index: 0 }
    }

    /// A roll in 1..=100.
    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        let outcome = match self {
            BattleRng::Random(rng) => rng.random_range(1..=100),
            BattleRng::Scripted { outcomes, index } => {
                if outcomes.is_empty() {
                    1
                } else {
                    let outcome = outcomes[*index % outcomes.len()].clamp(1, 100);
                    *index += 1;
                    outcome
                }
            }
        };
        trace!(outcome, reason, "rng consumed");
        outcome
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        match self {
            BattleRng::Random(rng) => rng.random_range(0..len),
            BattleRng::Scripted { .. } => {
                let outcome = self.next_outcome(reason) as usize;
                ((outcome - 1) * len / 100).min(len - 1)
            }
        }
    }

    /// Damage variance factor in [0.85, 1.00].
    pub fn variance(&mut self, reason: &str) -> f64 {
        match self {
            BattleRng::Random(rng) => rng.random_range(0.85..=1.0),
            BattleRng::Scripted { .. } => {
                let outcome = self.next_outcome(reason) as f64;
                0.85 + (outcome - 1.0) / 99.0 * 0.15
            }
        }
    }

    /// Fill `bytes` with random data. Scripted rolls are used byte for byte.
    pub fn fill_bytes(&mut self, bytes: &mut [u8], reason: &str) {
        match self {
            BattleRng::Random(rng) => rng.fill(bytes),
            BattleRng::Scripted { .. } => {
                for byte in bytes.iter_mut() {
                    *byte = self.next_outcome(reason);
                }
            }
        }
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T], reason: &str) {
        for i in (1..items.len()).rev() {
            let j = self.pick_index(i + 1, reason);
            items.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 0)]
    #[case(50, 1)]
    #[case(100, 3)]
    fn test_scripted_pick_maps_rolls_onto_range(#[case] roll: u8, #[case] expected: usize) {
        let mut rng = BattleRng::new_for_test(vec![roll]);
        assert_eq!(rng.pick_index(4, "test"), expected);
    }

    #[test]
    fn test_scripted_variance_spans_the_band() {
        let mut rng = BattleRng::new_for_test(vec![1, 100]);
        assert!((rng.variance("low") - 0.85).abs() < 1e-9);
        assert!((rng.variance("high") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scripted_outcomes_cycle() {
        let mut rng = BattleRng::new_for_test(vec![10, 20]);
        let rolls: Vec<u8> = (0..4).map(|_| rng.next_outcome("cycle")).collect();
        assert_eq!(rolls, vec![10, 20, 10, 20]);
    }

    #[test]
    fn test_scripted_fill_bytes_replays_rolls() {
        let mut rng = BattleRng::new_for_test(vec![3, 200]);
        let mut bytes = [0u8; 3];
        rng.fill_bytes(&mut bytes, "test");
        assert_eq!(bytes, [3, 100, 3]);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = BattleRng::seeded(7);
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items, "test");
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_random_variance_stays_in_band() {
        let mut rng = BattleRng::seeded(42);
        for _ in 0..200 {
            let v = rng.variance("band");
            assert!((0.85..=1.0).contains(&v));
        }
    }
}
