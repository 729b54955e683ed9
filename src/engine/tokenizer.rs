use std::ops::Range;

use icu_normalizer::ComposingNormalizerBorrowed;

/// A passage split into word tokens plus the canonical text typists are
/// compared against. Built once per passage load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenizedPassage {
    words: Vec<String>,
    expected: Vec<char>,
    word_spans: Vec<Range<usize>>,
}

impl TokenizedPassage {
    pub fn new(content: &str) -> Self {
        let normalized = normalize(content);
        let words: Vec<String> = normalized.split_whitespace().map(str::to_string).collect();

        let mut expected = Vec::new();
        let mut word_spans = Vec::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            if i > 0 {
                expected.push(' ');
            }
            let start = expected.len();
            expected.extend(word.chars());
            word_spans.push(start..expected.len());
        }

        Self {
            words,
            expected,
            word_spans,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn expected(&self) -> &[char] {
        &self.expected
    }

    pub fn expected_text(&self) -> String {
        self.expected.iter().collect()
    }

    /// Char offset one past the end of word `word_index`, clamped to the last
    /// word. This bounds the diff window to completed words plus the active one.
    pub fn window_end(&self, word_index: usize) -> usize {
        match self.word_spans.len() {
            0 => 0,
            n => self.word_spans[word_index.min(n - 1)].end,
        }
    }

    pub fn expected_window(&self, word_index: usize) -> &[char] {
        &self.expected[..self.window_end(word_index)]
    }
}

/// Compatibility-normalize and fold typographic quotes to ASCII, since typed
/// input is always straight-quote ASCII.
pub fn normalize(content: &str) -> String {
    let nfkc = ComposingNormalizerBorrowed::new_nfkc();
    nfkc.normalize(content)
        .chars()
        .map(|ch| match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
            _ => ch,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace_runs() {
        let passage = TokenizedPassage::new("  the   quick\n\tbrown fox ");
        assert_eq!(passage.words(), &["the", "quick", "brown", "fox"]);
        assert_eq!(passage.expected_text(), "the quick brown fox");
    }

    #[test]
    fn test_curly_quotes_become_straight() {
        let passage = TokenizedPassage::new("\u{201C}Don\u{2019}t\u{201D} panic");
        assert_eq!(passage.expected_text(), "\"Don't\" panic");
    }

    #[test]
    fn test_compatibility_forms_are_folded() {
        let passage = TokenizedPassage::new("wait\u{2026} and\u{00A0}see");
        assert_eq!(passage.words(), &["wait...", "and", "see"]);
    }

    #[test]
    fn test_blank_passage_has_no_words() {
        let passage = TokenizedPassage::new(" \n\t ");
        assert!(passage.is_empty());
        assert_eq!(passage.window_end(0), 0);
        assert!(passage.expected().is_empty());
    }

    #[test]
    fn test_window_end_tracks_word_boundaries() {
        let passage = TokenizedPassage::new("the quick fox");
        assert_eq!(passage.window_end(0), 3);
        assert_eq!(passage.window_end(1), 9);
        assert_eq!(passage.window_end(2), 13);
        // Clamped once the active index runs past the final word.
        assert_eq!(passage.window_end(7), 13);
        assert_eq!(passage.expected_window(1).iter().collect::<String>(), "the quick");
    }
}
