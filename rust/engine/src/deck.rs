use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};

/// The 52-card deck and the RNG that drives both dealing and ascension picks.
///
/// Shuffling is in place and cumulative: each deal reshuffles the current
/// order rather than a fresh deck, so the sequence of deals is fully
/// determined by the seed.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        let rng = ChaCha20Rng::seed_from_u64(seed);
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            rng,
        }
    }

    /// Fisher–Yates: from the last index down to 1, swap with a uniform
    /// index in `[0, i]`.
    pub fn shuffle(&mut self) {
        for i in (1..self.cards.len()).rev() {
            let j = self.rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    /// Shuffles, then returns the first `hand_size` cards (at most 52).
    pub fn deal(&mut self, hand_size: usize) -> Vec<Card> {
        self.shuffle();
        let n = hand_size.min(self.cards.len());
        self.cards[..n].to_vec()
    }

    /// Uniformly picks one of `candidates`.
    pub fn pick(&mut self, candidates: &[Card]) -> Option<Card> {
        candidates.choose(&mut self.rng).copied()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}
