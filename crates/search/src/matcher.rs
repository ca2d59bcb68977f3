use crate::error::{Result, SearchError};
use crate::normalize::{fold_char, normalize};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Byte range of a match inside the original haystack.
///
/// Both ends always fall on `char` boundaries of the text the span was
/// produced from, so slicing with [`MatchSpan::slice`] cannot panic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Matched text, or `None` when the span does not fit `text`.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.range())
    }
}

/// Greedy, order-preserving subsequence matcher with a bounded gap.
///
/// Needle characters must appear in the haystack in order. Between two
/// consecutive matched characters at most `fuzzy_distance - 1` other
/// characters may sit; hitting `fuzzy_distance` abandons the attempt and
/// restarts the needle from the current haystack position. The haystack
/// cursor never moves backwards.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    fuzzy_distance: usize,
}

impl FuzzyMatcher {
    pub fn new(fuzzy_distance: usize) -> Result<Self> {
        if fuzzy_distance == 0 {
            return Err(SearchError::InvalidFuzzyDistance(fuzzy_distance));
        }
        Ok(Self { fuzzy_distance })
    }

    pub fn fuzzy_distance(&self) -> usize {
        self.fuzzy_distance
    }

    /// Find the first match of `needle` in `haystack`.
    ///
    /// Case is folded on both sides; literal spaces in the needle are
    /// ignored. The returned span indexes the original `haystack`.
    pub fn find(&self, needle: &str, haystack: &str) -> Option<MatchSpan> {
        let folded_needle = normalize(needle);
        let needle_len = folded_needle.chars().count();
        let haystack_len = haystack.chars().count();

        if haystack_len < needle_len {
            return None;
        }
        if haystack_len == needle_len && folded_needle == normalize(haystack) {
            return Some(MatchSpan {
                start: 0,
                end: haystack.len(),
            });
        }

        let pattern: Vec<char> = folded_needle.chars().filter(|&ch| ch != ' ').collect();
        if pattern.is_empty() {
            return None;
        }

        let mut cursor = haystack.char_indices();
        let mut restarts = 0usize;

        'attempt: loop {
            let mut start: Option<usize> = None;
            let mut end = 0usize;

            'pattern: for &wanted in &pattern {
                let mut skipped = 0usize;
                for (offset, ch) in cursor.by_ref() {
                    if fold_char(ch) == wanted {
                        start.get_or_insert(offset);
                        end = offset + ch.len_utf8();
                        continue 'pattern;
                    }

                    skipped += 1;
                    if start.is_some() && skipped == self.fuzzy_distance {
                        restarts += 1;
                        continue 'attempt;
                    }
                }
                log::trace!("fuzzy match exhausted haystack after {restarts} restarts");
                return None;
            }

            let start = start?;
            log::trace!("fuzzy match at {start}..{end} after {restarts} restarts");
            return Some(MatchSpan { start, end });
        }
    }
}
