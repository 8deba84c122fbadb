use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::core::Language;
use crate::session::Word;

/// Source of words for the stream.
pub trait WordSupply {
    /// Produce `count` words. Calls are independent of one another.
    fn generate(&mut self, count: usize) -> Vec<Word>;
}

/// Uniform picks with replacement from a dictionary.
pub struct RandomWordSupply {
    words: Vec<String>,
    rng: StdRng,
}

impl RandomWordSupply {
    pub fn new(language: Language) -> Self {
        Self {
            words: language.words,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(language: Language, seed: u64) -> Self {
        Self {
            words: language.words,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WordSupply for RandomWordSupply {
    fn generate(&mut self, count: usize) -> Vec<Word> {
        (0..count)
            .filter_map(|_| self.words.choose(&mut self.rng))
            .map(|w| Word::new(w.as_str()))
            .collect()
    }
}

/// Repeats a fixed list in order. Deterministic streams for tests and demos.
#[derive(Debug, Clone)]
pub struct CyclingWordSupply {
    words: Vec<Word>,
    next: usize,
}

impl CyclingWordSupply {
    pub fn new<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            words: words.iter().map(|w| Word::new(w.as_ref())).collect(),
            next: 0,
        }
    }
}

impl WordSupply for CyclingWordSupply {
    fn generate(&mut self, count: usize) -> Vec<Word> {
        if self.words.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| {
                let word = self.words[self.next % self.words.len()].clone();
                self.next += 1;
                word
            })
            .collect()
    }
}
