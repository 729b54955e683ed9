use serde::Serialize;

/// Characters whose mismatches are weighted as punctuation mistakes.
pub const PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':', '\'', '"', '(', ')', '/'];

pub fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CharStatus {
    Correct,
    Wrong,
}

/// How a single aligned position came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Mark {
    Match,
    /// Typed a different character in place of the expected one.
    Substituted,
    /// The typist jumped over this expected character.
    Skipped,
    /// A stray typed character with no expected counterpart.
    Inserted,
    /// Typed beyond the end of the expected window.
    Overtyped,
    /// Expected character the typist has not reached.
    Untyped,
}

impl Mark {
    pub fn status(self) -> CharStatus {
        match self {
            Mark::Match => CharStatus::Correct,
            _ => CharStatus::Wrong,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffEntry {
    pub mark: Mark,
    pub expected_index: Option<usize>,
    pub expected: Option<char>,
    pub typed: Option<char>,
}

impl DiffEntry {
    fn paired(mark: Mark, index: usize, expected: char, typed: char) -> Self {
        Self {
            mark,
            expected_index: Some(index),
            expected: Some(expected),
            typed: Some(typed),
        }
    }

    fn expected_only(mark: Mark, index: usize, expected: char) -> Self {
        Self {
            mark,
            expected_index: Some(index),
            expected: Some(expected),
            typed: None,
        }
    }

    fn typed_only(mark: Mark, typed: char) -> Self {
        Self {
            mark,
            expected_index: None,
            expected: None,
            typed: Some(typed),
        }
    }

    pub fn status(&self) -> CharStatus {
        self.mark.status()
    }

    /// Whether this entry consumed a typed character and got it wrong.
    pub fn is_typed_mistake(&self) -> bool {
        self.typed.is_some() && self.mark != Mark::Match
    }

    pub fn is_punctuation_mistake(&self) -> bool {
        self.is_typed_mistake()
            && (self.expected.is_some_and(is_punctuation) || self.typed.is_some_and(is_punctuation))
    }
}

/// Per-expected-character fact handed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CharacterHighlight {
    pub index: usize,
    pub ch: char,
    pub status: CharStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    entries: Vec<DiffEntry>,
}

impl Diff {
    pub fn entries(&self) -> &[DiffEntry] {
        &self.entries
    }

    pub fn correct_count(&self) -> usize {
        self.entries.iter().filter(|e| e.mark == Mark::Match).count()
    }

    pub fn typed_mistakes(&self) -> usize {
        self.entries.iter().filter(|e| e.is_typed_mistake()).count()
    }

    pub fn punctuation_mistakes(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.is_punctuation_mistake())
            .count()
    }

    pub fn highlights(&self) -> Vec<CharacterHighlight> {
        self.entries
            .iter()
            .filter_map(|e| {
                Some(CharacterHighlight {
                    index: e.expected_index?,
                    ch: e.expected?,
                    status: e.status(),
                })
            })
            .collect()
    }
}

/// Greedy alignment with a single character of lookahead.
///
/// On a mismatch, a typed char equal to the *next* expected char means the
/// current expected char was skipped; a *next* typed char equal to the current
/// expected char means the typed char was a stray insertion. Anything else is a
/// substitution. Runs of several insertions or deletions are not recovered.
pub fn align(expected: &[char], typed: &[char]) -> Diff {
    let mut entries = Vec::with_capacity(expected.len().max(typed.len()));
    let (mut i, mut t) = (0, 0);

    while i < expected.len() {
        let exp = expected[i];
        let Some(&got) = typed.get(t) else {
            entries.push(DiffEntry::expected_only(Mark::Untyped, i, exp));
            i += 1;
            continue;
        };

        if exp == got {
            entries.push(DiffEntry::paired(Mark::Match, i, exp, got));
            i += 1;
            t += 1;
        } else if expected.get(i + 1) == Some(&got) {
            entries.push(DiffEntry::expected_only(Mark::Skipped, i, exp));
            i += 1;
        } else if typed.get(t + 1) == Some(&exp) {
            entries.push(DiffEntry::typed_only(Mark::Inserted, got));
            t += 1;
        } else {
            entries.push(DiffEntry::paired(Mark::Substituted, i, exp, got));
            i += 1;
            t += 1;
        }
    }

    entries.extend(
        typed[t.min(typed.len())..]
            .iter()
            .map(|&got| DiffEntry::typed_only(Mark::Overtyped, got)),
    );

    Diff { entries }
}
