//! Message rotation
//!
//! Tracks which catalog entry a group sends next. The order is a permutation
//! of catalog indices; with shuffling enabled it is reshuffled every time the
//! cursor wraps around, so each full cycle sends every message exactly once.

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Rotation cursor and permutation for one group
#[derive(Debug, Clone)]
pub struct Rotation {
    order: Vec<usize>,
    cursor: Option<usize>,
    shuffle: bool,
    rng: ChaCha8Rng,
}

impl Rotation {
    /// Create a rotation over `len` messages
    pub fn new(len: usize, shuffle: bool) -> Self {
        Self::with_rng(len, shuffle, ChaCha8Rng::from_entropy())
    }

    /// Create a rotation whose shuffles are reproducible
    pub fn with_seed(len: usize, shuffle: bool, seed: u64) -> Self {
        Self::with_rng(len, shuffle, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(len: usize, shuffle: bool, rng: ChaCha8Rng) -> Self {
        Self {
            order: (0..len).collect(),
            cursor: None,
            shuffle,
            rng,
        }
    }

    /// Catalog index to send on this tick
    ///
    /// Wraps to the start of the order first when the rotation has not begun
    /// or has run off the end, reshuffling if enabled. Does not move the
    /// cursor; call [`Rotation::advance`] once the message is delivered.
    pub fn select(&mut self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }

        let cursor = match self.cursor {
            Some(cursor) if cursor < self.order.len() => cursor,
            _ => {
                if self.shuffle {
                    self.order.shuffle(&mut self.rng);
                }
                self.cursor = Some(0);
                0
            }
        };

        Some(self.order[cursor])
    }

    /// Move the cursor past the message just sent
    pub fn advance(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            *cursor += 1;
        }
    }

    /// Position within the current cycle, `None` before the first tick
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Current permutation of catalog indices
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    /// Run `ticks` select/advance steps
    fn play(mut rotation: Rotation, ticks: usize) -> Vec<usize> {
        let mut indices = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            let Some(index) = rotation.select() else {
                break;
            };
            indices.push(index);
            rotation.advance();
        }
        indices
    }

    #[test]
    fn test_sequential_order() {
        let indices = play(Rotation::new(3, false), 7);
        assert_eq!(indices, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_cursor_lifecycle() {
        let mut rotation = Rotation::new(2, false);
        assert_eq!(rotation.cursor(), None);

        assert_eq!(rotation.select(), Some(0));
        assert_eq!(rotation.cursor(), Some(0));
        // selecting again without advancing repeats the message
        assert_eq!(rotation.select(), Some(0));

        rotation.advance();
        assert_eq!(rotation.select(), Some(1));
        rotation.advance();
        assert_eq!(rotation.cursor(), Some(2));

        assert_eq!(rotation.select(), Some(0));
        assert_eq!(rotation.cursor(), Some(0));
    }

    #[test]
    fn test_advance_before_start_is_noop() {
        let mut rotation = Rotation::new(3, false);
        rotation.advance();
        assert_eq!(rotation.cursor(), None);
        assert_eq!(rotation.select(), Some(0));
    }

    #[test]
    fn test_empty_rotation() {
        let mut rotation = Rotation::new(0, true);
        assert!(rotation.is_empty());
        assert_eq!(rotation.select(), None);
        assert!(play(rotation, 3).is_empty());
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let a = play(Rotation::with_seed(10, true, 7), 30);
        let b = play(Rotation::with_seed(10, true, 7), 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_happens_on_first_tick() {
        let mut rotation = Rotation::with_seed(50, true, 1);
        assert_eq!(rotation.order(), (0..50).collect::<Vec<_>>().as_slice());
        rotation.select();
        assert_ne!(rotation.order(), (0..50).collect::<Vec<_>>().as_slice());
    }

    proptest! {
        #[test]
        fn prop_unshuffled_repeats_template_order(len in 1usize..20, cycles in 1usize..5) {
            let indices = play(Rotation::new(len, false), len * cycles);
            let expected: Vec<_> = (0..cycles).flat_map(|_| 0..len).collect();
            prop_assert_eq!(indices, expected);
        }

        #[test]
        fn prop_shuffled_cycles_are_permutations(len in 1usize..20, cycles in 1usize..5, seed in any::<u64>()) {
            let indices = play(Rotation::with_seed(len, true, seed), len * cycles);
            for cycle in indices.chunks(len) {
                let unique: BTreeSet<_> = cycle.iter().copied().collect();
                prop_assert_eq!(unique.len(), len);
                prop_assert!(unique.iter().all(|i| *i < len));
            }
        }
    }
}
