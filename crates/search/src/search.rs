use crate::config::SearchConfig;
use crate::context::extract_context;
use crate::error::Result;
use crate::matcher::{FuzzyMatcher, MatchSpan};
use serde::{Deserialize, Serialize};

/// Outcome of one search call.
///
/// An empty `matched_text` means "not found"; use [`SearchResult::is_found`]
/// rather than comparing strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub matched_text: String,
    pub before: String,
    pub after: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<MatchSpan>,
}

impl SearchResult {
    fn not_found(query: &str) -> Self {
        Self {
            query: query.to_string(),
            matched_text: String::new(),
            before: String::new(),
            after: String::new(),
            span: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.span.is_some()
    }
}

/// Locate `needle` in `haystack` and collect the surrounding words.
///
/// Fails only when `config` is invalid; a miss is a regular result.
pub fn search(needle: &str, haystack: &str, config: &SearchConfig) -> Result<SearchResult> {
    config.validate()?;
    let matcher = FuzzyMatcher::new(config.fuzzy_distance)?;

    let Some(span) = matcher.find(needle, haystack) else {
        log::debug!(
            "no match for {:?} in {} bytes (fuzzy_distance={})",
            needle,
            haystack.len(),
            config.fuzzy_distance
        );
        return Ok(SearchResult::not_found(needle));
    };

    let Some(matched_text) = span.slice(haystack).filter(|text| !text.is_empty()) else {
        return Ok(SearchResult::not_found(needle));
    };

    let window = extract_context(haystack, span, config.words_before, config.words_after);
    log::debug!(
        "matched {:?} at {}..{} for {:?}",
        matched_text,
        span.start,
        span.end,
        needle
    );

    Ok(SearchResult {
        query: needle.to_string(),
        matched_text: matched_text.to_string(),
        before: window.before,
        after: window.after,
        span: Some(span),
    })
}
