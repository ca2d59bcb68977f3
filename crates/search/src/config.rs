use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FUZZY_DISTANCE: usize = 20;

/// Tuning for a single search call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Non-matching characters tolerated between two matched needle
    /// characters is `fuzzy_distance - 1`; must be at least 1
    pub fuzzy_distance: usize,

    /// Whole words to return before the match
    pub words_before: usize,

    /// Whole words to return after the match
    pub words_after: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_distance: DEFAULT_FUZZY_DISTANCE,
            words_before: 0,
            words_after: 0,
        }
    }
}

impl SearchConfig {
    /// Exact-ish matching: no filler allowed between matched characters.
    pub fn strict() -> Self {
        Self {
            fuzzy_distance: 1,
            ..Default::default()
        }
    }

    pub fn with_fuzzy_distance(mut self, fuzzy_distance: usize) -> Self {
        self.fuzzy_distance = fuzzy_distance;
        self
    }

    pub fn with_context(mut self, words_before: usize, words_after: usize) -> Self {
        self.words_before = words_before;
        self.words_after = words_after;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.fuzzy_distance == 0 {
            return Err(SearchError::InvalidFuzzyDistance(self.fuzzy_distance));
        }
        Ok(())
    }
}
