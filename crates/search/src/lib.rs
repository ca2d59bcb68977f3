//! Fuzzy phrase location in plain text.
//!
//! [`search`] finds the first order-preserving, gap-bounded occurrence of a
//! needle in a haystack and returns the matched slice together with whole
//! words of surrounding context.

mod config;
mod context;
mod error;
mod matcher;
mod normalize;
mod search;

pub use config::{SearchConfig, DEFAULT_FUZZY_DISTANCE};
pub use context::{extract_context, ContextWindow};
pub use error::{Result, SearchError};
pub use matcher::{FuzzyMatcher, MatchSpan};
pub use normalize::{fold_char, normalize};
pub use search::{search, SearchResult};
