// Char-indexed string helpers and the single tokenization point shared by
// compound correction and corpus ingestion.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// Matches letters, digits, underscore, apostrophes, hyphen and brackets.
static WORDS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"['’\w\-\[_\]]+").expect("words regex is valid"));

/// Parse a string into lowercased words.
pub fn parse_words(text: &str) -> Vec<String> {
    WORDS_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Normalize ligatures: "scientiﬁc" "ﬁelds" "ﬁnal"
pub fn unicode_normalization_form_kc(input: &str) -> String {
    input.nfkc().collect::<String>()
}

pub(crate) fn len(s: &str) -> usize {
    s.chars().count()
}

pub(crate) fn remove(s: &str, index: usize) -> String {
    s.chars()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, ch)| ch)
        .collect()
}

pub(crate) fn slice(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end - start).collect()
}

pub(crate) fn suffix(s: &str, start: usize) -> String {
    s.chars().skip(start).collect()
}

pub(crate) fn at(s: &str, i: isize) -> Option<char> {
    if i < 0 {
        return None;
    }
    s.chars().nth(i as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_words_lowercases_and_keeps_word_characters() {
        assert_eq!(
            parse_words("Can you READ this, and-that?"),
            vec!["can", "you", "read", "this", "and-that"]
        );
        assert_eq!(parse_words("it's the cat’s toy"), vec!["it's", "the", "cat’s", "toy"]);
        assert_eq!(parse_words("  ,.;  "), Vec::<String>::new());
    }

    #[test]
    fn nfkc_folds_ligatures() {
        assert_eq!(unicode_normalization_form_kc("scientiﬁc"), "scientific");
    }

    #[test]
    fn char_helpers_operate_on_chars_not_bytes() {
        assert_eq!(len("łąka"), 4);
        assert_eq!(remove("łąka", 1), "łka");
        assert_eq!(slice("łąka", 1, 3), "ąk");
        assert_eq!(suffix("łąka", 2), "ka");
        assert_eq!(at("łąka", 0), Some('ł'));
        assert_eq!(at("łąka", -1), None);
        assert_eq!(at("łąka", 9), None);
    }
}
