/// Fold a single codepoint to lowercase.
///
/// Only the first codepoint of the lowercase mapping is kept, so the fold is
/// strictly one-to-one on codepoints and positions in a folded string line up
/// with positions in its source.
#[must_use]
pub fn fold_char(ch: char) -> char {
    if ch.is_ascii() {
        return ch.to_ascii_lowercase();
    }
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Case-fold a whole string, codepoint by codepoint.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn folds_ascii_and_unicode() {
        assert_eq!(normalize("Skill:Brand"), "skill:brand");
        assert_eq!(normalize("ÜBER Straße"), "über straße");
        assert_eq!(normalize("ПРИВЕТ"), "привет");
    }

    #[test]
    fn keeps_codepoint_count() {
        // 'İ' lowercases to two codepoints; only the base letter survives.
        let folded = normalize("İstanbul");
        assert_eq!(folded.chars().count(), "İstanbul".chars().count());
        assert!(folded.starts_with('i'));
    }

    proptest! {
        #[test]
        fn proptest_normalize_is_idempotent(text in "\\PC{0,64}") {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
