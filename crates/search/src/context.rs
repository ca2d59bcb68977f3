use crate::matcher::MatchSpan;
use serde::{Deserialize, Serialize};

/// Whole words surrounding a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWindow {
    pub before: String,
    pub after: String,
}

/// Collect up to `words_before` / `words_after` whitespace-delimited words
/// around `span` in `text`.
///
/// A word that touches the match with no whitespace in between (the match
/// started or ended mid-word) is dropped entirely and does not count
/// towards either limit.
pub fn extract_context(
    text: &str,
    span: MatchSpan,
    words_before: usize,
    words_after: usize,
) -> ContextWindow {
    let head = text.get(..span.start).unwrap_or_default();
    let tail = text.get(span.end..).unwrap_or_default();

    ContextWindow {
        before: words_before_match(head, words_before),
        after: words_after_match(tail, words_after),
    }
}

fn words_before_match(head: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    let head = head.trim_end_matches(|ch: char| !ch.is_whitespace());
    let mut words: Vec<&str> = head.split_whitespace().rev().take(limit).collect();
    words.reverse();
    words.join(" ")
}

fn words_after_match(tail: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    let tail = tail.trim_start_matches(|ch: char| !ch.is_whitespace());
    tail.split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}
