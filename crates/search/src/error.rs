use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("fuzzy_distance must be at least 1 (got {0})")]
    InvalidFuzzyDistance(usize),
}
