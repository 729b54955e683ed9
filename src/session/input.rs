use crate::engine::metrics::WordOutcome;
use crate::engine::tokenizer::TokenizedPassage;

/// The typed text plus one outcome per confirmed word boundary.
///
/// The outcome ledger only ever grows by judging the word that a space just
/// closed, and shrinks only when backspace deletes that space again, so it
/// always equals a from-scratch comparison of `typed` against the passage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypedInput {
    typed: Vec<char>,
    word_outcomes: Vec<WordOutcome>,
    active_start: usize,
}

impl TypedInput {
    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    pub fn typed_text(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn word_outcomes(&self) -> &[WordOutcome] {
        &self.word_outcomes
    }

    pub fn current_word_index(&self) -> usize {
        self.word_outcomes.len()
    }

    pub fn active_word(&self) -> String {
        self.typed[self.active_start..].iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty()
    }

    pub fn clear(&mut self) {
        self.typed.clear();
        self.word_outcomes.clear();
        self.active_start = 0;
    }
}

/// Apply one typed character. Returns whether it was accepted.
///
/// A space is a word boundary: it is refused when the active word is empty
/// (no empty words) and after the final word (there is nothing to move on to).
pub fn process_char(input: &mut TypedInput, passage: &TokenizedPassage, ch: char) -> bool {
    if ch.is_control() {
        return false;
    }

    if ch == ' ' {
        let index = input.current_word_index();
        if input.active_start == input.typed.len() || index + 1 >= passage.word_count() {
            return false;
        }
        let outcome = WordOutcome::judge(passage.word(index), &input.active_word());
        input.word_outcomes.push(outcome);
        input.typed.push(' ');
        input.active_start = input.typed.len();
        return true;
    }

    input.typed.push(ch);
    true
}

/// Delete the last typed character. Deleting a boundary space reopens the
/// previous word and drops its outcome.
pub fn process_backspace(input: &mut TypedInput) -> bool {
    match input.typed.pop() {
        None => false,
        Some(' ') => {
            input.word_outcomes.pop();
            input.active_start = input
                .typed
                .iter()
                .rposition(|&c| c == ' ')
                .map_or(0, |p| p + 1);
            true
        }
        Some(_) => true,
    }
}

/// Submission closes the active word without a trailing space.
pub fn confirm_active_word(input: &mut TypedInput, passage: &TokenizedPassage) {
    if input.active_start == input.typed.len() {
        return;
    }
    let index = input.current_word_index();
    let outcome = WordOutcome::judge(passage.word(index), &input.active_word());
    input.word_outcomes.push(outcome);
    input.active_start = input.typed.len();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::metrics::word_outcomes;

    fn type_str(input: &mut TypedInput, passage: &TokenizedPassage, s: &str) {
        for ch in s.chars() {
            process_char(input, passage, ch);
        }
    }

    #[test]
    fn test_space_confirms_word() {
        let passage = TokenizedPassage::new("the quick fox");
        let mut input = TypedInput::default();
        type_str(&mut input, &passage, "the qu");
        assert_eq!(input.current_word_index(), 1);
        assert_eq!(input.word_outcomes(), &[WordOutcome::Correct]);
        assert_eq!(input.active_word(), "qu");
    }

    #[test]
    fn test_space_on_empty_word_is_refused() {
        let passage = TokenizedPassage::new("the quick fox");
        let mut input = TypedInput::default();
        assert!(!process_char(&mut input, &passage, ' '));
        type_str(&mut input, &passage, "the");
        assert!(process_char(&mut input, &passage, ' '));
        assert!(!process_char(&mut input, &passage, ' '));
        assert_eq!(input.typed_text(), "the ");
    }

    #[test]
    fn test_space_after_final_word_is_refused() {
        let passage = TokenizedPassage::new("to be");
        let mut input = TypedInput::default();
        type_str(&mut input, &passage, "to be");
        assert!(!process_char(&mut input, &passage, ' '));
        // Overtyping within the final word is still accepted.
        assert!(process_char(&mut input, &passage, 'e'));
        assert_eq!(input.typed_text(), "to bee");
    }

    #[test]
    fn test_control_chars_are_refused() {
        let passage = TokenizedPassage::new("abc");
        let mut input = TypedInput::default();
        assert!(!process_char(&mut input, &passage, '\n'));
        assert!(!process_char(&mut input, &passage, '\t'));
        assert!(input.is_empty());
    }

    #[test]
    fn test_backspace_over_boundary_reopens_word() {
        let passage = TokenizedPassage::new("the quick fox");
        let mut input = TypedInput::default();
        type_str(&mut input, &passage, "teh q");
        assert_eq!(input.word_outcomes(), &[WordOutcome::Incorrect]);
        assert!(process_backspace(&mut input));
        assert!(process_backspace(&mut input));
        assert_eq!(input.current_word_index(), 0);
        assert_eq!(input.active_word(), "teh");
        process_backspace(&mut input);
        process_backspace(&mut input);
        type_str(&mut input, &passage, "he ");
        assert_eq!(input.word_outcomes(), &[WordOutcome::Correct]);
    }

    #[test]
    fn test_backspace_on_empty_input() {
        let mut input = TypedInput::default();
        assert!(!process_backspace(&mut input));
    }

    #[test]
    fn test_ledger_matches_recomputation() {
        let passage = TokenizedPassage::new("alpha beta gamma delta");
        let mut input = TypedInput::default();
        let script = "alpah beta\x08\x08\x08\x08\x08\x08x gamma delt";
        for ch in script.chars() {
            if ch == '\x08' {
                process_backspace(&mut input);
            } else {
                process_char(&mut input, &passage, ch);
            }
            assert_eq!(
                input.word_outcomes(),
                word_outcomes(passage.words(), &input.typed_text()).as_slice()
            );
        }
    }

    #[test]
    fn test_confirm_active_word_on_submit() {
        let passage = TokenizedPassage::new("the quick fox");
        let mut input = TypedInput::default();
        type_str(&mut input, &passage, "the quick fo");
        confirm_active_word(&mut input, &passage);
        assert_eq!(
            input.word_outcomes(),
            &[WordOutcome::Correct, WordOutcome::Correct, WordOutcome::Incorrect]
        );
        // Nothing left to confirm.
        confirm_active_word(&mut input, &passage);
        assert_eq!(input.current_word_index(), 3);
    }
}
