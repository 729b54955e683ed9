use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::diff::{self, Diff};
use crate::error::PolicyError;

/// Which character count the gross speed is derived from. Exam pages have
/// historically disagreed, so both are kept selectable per category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrossSpeedFormula {
    #[default]
    CorrectChars,
    TypedChars,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualificationPolicy {
    #[serde(default = "default_min_accuracy")]
    pub min_accuracy: u32,
    #[serde(default = "default_min_gross_speed")]
    pub min_gross_speed: u32,
    #[serde(default = "default_min_duration_secs")]
    pub min_duration_secs: u64,
    #[serde(default = "default_chars_per_word")]
    pub chars_per_word: f64,
    #[serde(default = "default_mistake_penalty_chars")]
    pub mistake_penalty_chars: f64,
    #[serde(default = "default_punctuation_mistake_weight")]
    pub punctuation_mistake_weight: f64,
    #[serde(default)]
    pub gross_formula: GrossSpeedFormula,
}

fn default_min_accuracy() -> u32 {
    80
}
fn default_min_gross_speed() -> u32 {
    35
}
fn default_min_duration_secs() -> u64 {
    60
}
fn default_chars_per_word() -> f64 {
    5.0
}
fn default_mistake_penalty_chars() -> f64 {
    5.0
}
fn default_punctuation_mistake_weight() -> f64 {
    0.5
}

impl Default for QualificationPolicy {
    fn default() -> Self {
        Self {
            min_accuracy: default_min_accuracy(),
            min_gross_speed: default_min_gross_speed(),
            min_duration_secs: default_min_duration_secs(),
            chars_per_word: default_chars_per_word(),
            mistake_penalty_chars: default_mistake_penalty_chars(),
            punctuation_mistake_weight: default_punctuation_mistake_weight(),
            gross_formula: GrossSpeedFormula::default(),
        }
    }
}

impl QualificationPolicy {
    /// Reject values that would make the speed formulas meaningless.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(self.chars_per_word.is_finite() && self.chars_per_word > 0.0) {
            return Err(PolicyError::CharsPerWord(self.chars_per_word));
        }
        if !(self.mistake_penalty_chars.is_finite() && self.mistake_penalty_chars >= 0.0) {
            return Err(PolicyError::MistakePenalty(self.mistake_penalty_chars));
        }
        if !(self.punctuation_mistake_weight.is_finite() && self.punctuation_mistake_weight >= 0.0)
        {
            return Err(PolicyError::PunctuationWeight(self.punctuation_mistake_weight));
        }
        if self.min_accuracy > 100 {
            return Err(PolicyError::MinAccuracy(self.min_accuracy));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WordOutcome {
    Correct,
    Incorrect,
}

impl WordOutcome {
    /// Judge a typed word at a confirmed boundary. Words typed past the end of
    /// the passage have no counterpart and are always incorrect.
    pub fn judge(expected: Option<&str>, typed: &str) -> Self {
        match expected {
            Some(word) if word == typed => WordOutcome::Correct,
            _ => WordOutcome::Incorrect,
        }
    }
}

/// Reference outcome list recomputed from scratch: every space-terminated
/// segment of `typed` is a confirmed word.
pub fn word_outcomes(words: &[String], typed: &str) -> Vec<WordOutcome> {
    let mut segments: Vec<&str> = typed.split(' ').collect();
    segments.pop();
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| WordOutcome::judge(words.get(i).map(String::as_str), seg))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub gross_speed_wpm: u32,
    pub net_speed_wpm: u32,
    pub accuracy_percent: u32,
    pub mistake_count: usize,
    pub punctuation_mistake_count: usize,
    pub correct_chars: usize,
    pub typed_chars: usize,
    pub total_words: usize,
    pub correct_words: usize,
    pub incorrect_words: usize,
    pub time_taken_secs: u64,
    pub qualified: bool,
}

impl MetricsSnapshot {
    pub fn zero(total_words: usize) -> Self {
        Self {
            total_words,
            ..Self::default()
        }
    }
}

pub struct MetricsInput<'a> {
    /// Expected characters of the completed words plus the active one.
    pub expected: &'a [char],
    pub typed: &'a [char],
    pub elapsed: Duration,
    pub word_outcomes: &'a [WordOutcome],
    pub total_words: usize,
}

#[derive(Clone, Debug)]
pub struct MetricsCalculator {
    policy: QualificationPolicy,
}

impl MetricsCalculator {
    pub fn new(policy: QualificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &QualificationPolicy {
        &self.policy
    }

    pub fn compute(&self, input: &MetricsInput) -> MetricsSnapshot {
        let diff = diff::align(input.expected, input.typed);
        self.compute_aligned(&diff, input)
    }

    /// Same as [`compute`](Self::compute) with an alignment the caller already
    /// holds for `input.expected` / `input.typed`.
    pub fn compute_aligned(&self, diff: &Diff, input: &MetricsInput) -> MetricsSnapshot {
        let policy = &self.policy;
        let elapsed_secs = input.elapsed.as_secs_f64();
        // One-second floor keeps early speeds finite.
        let elapsed_minutes = (elapsed_secs / 60.0).max(1.0 / 60.0);

        let correct_chars = diff.correct_count();
        let typed_chars = input.typed.len();
        let punctuation_mistakes = diff.punctuation_mistakes();
        let normal_mistakes = typed_chars
            .saturating_sub(correct_chars)
            .saturating_sub(punctuation_mistakes);
        let weighted_mistakes =
            normal_mistakes as f64 + punctuation_mistakes as f64 * policy.punctuation_mistake_weight;

        let gross_chars = match policy.gross_formula {
            GrossSpeedFormula::CorrectChars => correct_chars,
            GrossSpeedFormula::TypedChars => typed_chars,
        };
        let gross_speed_wpm =
            ((gross_chars as f64 / policy.chars_per_word) / elapsed_minutes).round() as u32;

        let net_chars =
            (correct_chars as f64 - weighted_mistakes * policy.mistake_penalty_chars).max(0.0);
        let net_speed_wpm = (net_chars / policy.chars_per_word / elapsed_minutes).round() as u32;

        let accuracy_percent = if typed_chars == 0 {
            0
        } else {
            (correct_chars as f64 / typed_chars as f64 * 100.0)
                .min(100.0)
                .round() as u32
        };

        let correct_words = input
            .word_outcomes
            .iter()
            .filter(|o| **o == WordOutcome::Correct)
            .count();
        let incorrect_words = input.word_outcomes.len() - correct_words;

        let qualified = input.elapsed >= Duration::from_secs(policy.min_duration_secs)
            && gross_speed_wpm >= policy.min_gross_speed
            && accuracy_percent >= policy.min_accuracy;

        MetricsSnapshot {
            gross_speed_wpm,
            net_speed_wpm,
            accuracy_percent,
            mistake_count: normal_mistakes + punctuation_mistakes,
            punctuation_mistake_count: punctuation_mistakes,
            correct_chars,
            typed_chars,
            total_words: input.total_words,
            correct_words,
            incorrect_words,
            time_taken_secs: input.elapsed.as_secs(),
            qualified,
        }
    }
}
