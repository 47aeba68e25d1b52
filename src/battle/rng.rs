use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// The single source of randomness for a battle.
///
/// Reseeded at the start of every turn from `(seed, turn)`, so a turn's
/// outcome does not depend on how much randomness earlier turns consumed.
/// Tests can queue scripted outcomes which are consumed before the
/// generator is consulted.
#[derive(Debug, Clone)]
pub struct BattleRng {
    seed: u64,
    inner: StdRng,
    scripted: VecDeque<u32>,
}

impl BattleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
            scripted: VecDeque::new(),
        }
    }

    /// A generator that answers with `outcomes` first. Each scripted value is
    /// reduced modulo the requested bound.
    pub fn new_for_test(seed: u64, outcomes: Vec<u32>) -> Self {
        Self {
            scripted: outcomes.into(),
            ..Self::new(seed)
        }
    }

    pub fn push_outcomes(&mut self, outcomes: impl IntoIterator<Item = u32>) {
        self.scripted.extend(outcomes);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scripted_remaining(&self) -> usize {
        self.scripted.len()
    }

    pub fn reseed_for_turn(&mut self, turn: u32) {
        self.inner = StdRng::seed_from_u64(turn_seed(self.seed, turn));
    }

    /// Uniform integer in `[0, n)`. Bounds of 0 or 1 answer 0 without
    /// consuming anything.
    pub fn random_int(&mut self, n: u32, reason: &str) -> u32 {
        if n <= 1 {
            return 0;
        }
        let value = match self.scripted.pop_front() {
            Some(scripted) => scripted % n,
            None => self.inner.random_range(0..n),
        };
        trace!(reason, bound = n, value, "rng consumed");
        value
    }

    /// Uniform integer in `[min, max]`.
    pub fn random_between(&mut self, min: u32, max: u32, reason: &str) -> u32 {
        if max <= min {
            return min;
        }
        min + self.random_int(max - min + 1, reason)
    }

    /// Percent roll. Certain outcomes never touch the generator.
    pub fn chance(&mut self, percent: u32, reason: &str) -> bool {
        match percent {
            0 => false,
            p if p >= 100 => true,
            p => self.random_int(100, reason) < p,
        }
    }

    /// Fisher-Yates shuffle driven by `random_int`, so scripted outcomes
    /// apply to shuffles too.
    pub fn shuffle<T>(&mut self, items: &mut [T], reason: &str) {
        for i in (1..items.len()).rev() {
            let j = self.random_int(i as u32 + 1, reason) as usize;
            items.swap(i, j);
        }
    }
}

fn turn_seed(seed: u64, turn: u32) -> u64 {
    // splitmix64 finalizer over the combined value
    let mut z = seed ^ (u64::from(turn)).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reseeding_makes_turns_independent_of_history() {
        let mut a = BattleRng::new(42);
        let mut b = BattleRng::new(42);
        for _ in 0..17 {
            a.random_int(100, "burn some values");
        }
        a.reseed_for_turn(3);
        b.reseed_for_turn(3);
        let from_a: Vec<u32> = (0..8).map(|_| a.random_int(1000, "compare")).collect();
        let from_b: Vec<u32> = (0..8).map(|_| b.random_int(1000, "compare")).collect();
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn test_scripted_outcomes_are_consumed_first() {
        let mut rng = BattleRng::new_for_test(7, vec![5, 250]);
        assert_eq!(rng.random_int(100, "first"), 5);
        assert_eq!(rng.random_int(100, "second"), 50);
        assert_eq!(rng.scripted_remaining(), 0);
        assert!(rng.random_int(100, "fallback") < 100);
    }

    #[test]
    fn test_certain_chances_do_not_consume() {
        let mut rng = BattleRng::new_for_test(7, vec![99]);
        assert!(rng.chance(100, "always"));
        assert!(!rng.chance(0, "never"));
        assert_eq!(rng.scripted_remaining(), 1);
    }

    #[test]
    fn test_shuffle_keeps_every_element() {
        let mut rng = BattleRng::new(11);
        let mut items = vec![1, 2, 3, 4, 5];
        rng.shuffle(&mut items, "test");
        items.sort();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }
}
