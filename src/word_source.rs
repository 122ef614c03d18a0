use crate::language::Language;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::fmt;

/// Supplier of target words for a test
pub trait WordSource: fmt::Debug {
    /// Return exactly `count` non-empty words, in display order.
    fn request_words(&mut self, count: usize) -> Vec<String>;
}

/// Random words drawn (with replacement) from an embedded language list
#[derive(Debug)]
pub struct LanguageWordSource {
    language: Language,
    rng: StdRng,
}

impl LanguageWordSource {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic word order for a given seed
    pub fn with_seed(language: Language, seed: u64) -> Self {
        Self {
            language,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WordSource for LanguageWordSource {
    fn request_words(&mut self, count: usize) -> Vec<String> {
        let words = &self.language.words;
        let mut selected: Vec<String> = Vec::with_capacity(count);

        while selected.len() < count {
            let Some(mut pick) = words.choose(&mut self.rng) else {
                break;
            };
            // one redraw to avoid the same word twice in a row
            if words.len() > 1 && selected.last() == Some(pick) {
                if let Some(again) = words.choose(&mut self.rng) {
                    pick = again;
                }
            }
            selected.push(pick.clone());
        }

        selected
    }
}

/// Cycles through a fixed list, starting from the first word on every request
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWordSource {
    words: Vec<String>,
}

impl FixedWordSource {
    pub fn new(words: Vec<String>) -> Self {
        Self {
            words: words.into_iter().filter(|w| !w.is_empty()).collect(),
        }
    }

    /// Split a custom prompt on whitespace
    pub fn from_prompt(prompt: &str) -> Self {
        Self::new(prompt.split_whitespace().map(str::to_string).collect())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for FixedWordSource {
    fn request_words(&mut self, count: usize) -> Vec<String> {
        self.words.iter().cycle().take(count).cloned().collect()
    }
}
