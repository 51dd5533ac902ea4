//! Seeded random number generation for deck shuffling.
//!
//! A session shuffles exactly once, when its conversation cards are
//! loaded onto the stack. Seeding makes that shuffle reproducible in
//! tests; production builds seed from OS entropy.
//!
//! ```
//! use obrolan::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//!
//! let mut left: Vec<u32> = (0..10).collect();
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this RNG was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..=upper`.
    pub fn index_inclusive(&mut self, upper: usize) -> usize {
        self.inner.gen_range(0..=upper)
    }

    /// Shuffle a slice in place (Fisher–Yates).
    ///
    /// Walks from the last index down to 1, swapping each position with a
    /// uniformly chosen index in `[0, i]`. Every permutation is equally
    /// likely.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.index_inclusive(i);
            slice.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.index_inclusive(1000), rng2.index_inclusive(1000));
        }
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        let a: Vec<_> = (0..20).map(|_| rng1.index_inclusive(1_000_000)).collect();
        let b: Vec<_> = (0..20).map(|_| rng2.index_inclusive(1_000_000)).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_index_inclusive_bounds() {
        let mut rng = GameRng::new(9);
        for upper in 0..50 {
            for _ in 0..20 {
                assert!(rng.index_inclusive(upper) <= upper);
            }
        }
        assert_eq!(rng.index_inclusive(0), 0);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GameRng::new(42);
        let original: Vec<u32> = (0..30).collect();
        let mut shuffled = original.clone();

        rng.shuffle(&mut shuffled);

        assert_ne!(shuffled, original);
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }

    #[test]
    fn test_shuffle_small_slices() {
        let mut rng = GameRng::new(3);

        let mut empty: Vec<u8> = Vec::new();
        rng.shuffle(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![7];
        rng.shuffle(&mut one);
        assert_eq!(one, vec![7]);
    }

    #[test]
    fn test_shuffle_covers_all_orders() {
        // 3 elements -> 6 permutations; each should show up over many runs.
        let mut rng = GameRng::new(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            let mut v = [0u8, 1, 2];
            rng.shuffle(&mut v);
            seen.insert(v);
        }
        assert_eq!(seen.len(), 6);
    }
}
