use std::time::Duration;

use proptest::prelude::*;

use examtyper::engine::diff::{CharStatus, Mark, align};
use examtyper::engine::metrics::{
    MetricsCalculator, MetricsInput, MetricsSnapshot, QualificationPolicy, word_outcomes,
};
use examtyper::engine::tokenizer::TokenizedPassage;
use examtyper::passage::Passage;
use examtyper::session::clock::ManualClock;
use examtyper::session::input::{TypedInput, process_backspace, process_char};
use examtyper::session::state::{Session, SessionSettings};

const PASSAGE: &str = "ab. a b, ba ab";
const BACKSPACE: char = '\u{8}';

fn text(max: usize) -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', ' ', '.', ',']), 0..max)
}

/// Keystroke scripts where `\u{8}` stands for backspace.
fn script(max: usize) -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', ' ', '.', BACKSPACE]), 0..max)
}

fn policy() -> impl Strategy<Value = QualificationPolicy> {
    (0u32..=100, 0u32..=60, 0u64..=120, 0.0f64..=2.0).prop_map(
        |(min_accuracy, min_gross_speed, min_duration_secs, punctuation_mistake_weight)| {
            QualificationPolicy {
                min_accuracy,
                min_gross_speed,
                min_duration_secs,
                punctuation_mistake_weight,
                ..QualificationPolicy::default()
            }
        },
    )
}

fn compute(policy: QualificationPolicy, expected: &[char], typed: &[char], secs: u64) -> MetricsSnapshot {
    let typed_text: String = typed.iter().collect();
    let passage = TokenizedPassage::new(&expected.iter().collect::<String>());
    let outcomes = word_outcomes(passage.words(), &typed_text);
    let input = MetricsInput {
        expected,
        typed,
        elapsed: Duration::from_secs(secs),
        word_outcomes: &outcomes,
        total_words: passage.word_count(),
    };
    MetricsCalculator::new(policy).compute(&input)
}

proptest! {
    #[test]
    fn alignment_accounts_for_every_char(expected in text(40), typed in text(40)) {
        let diff = align(&expected, &typed);
        let typed_seen = diff.entries().iter().filter(|e| e.typed.is_some()).count();
        let expected_seen = diff.entries().iter().filter(|e| e.expected.is_some()).count();
        prop_assert_eq!(typed_seen, typed.len());
        prop_assert_eq!(expected_seen, expected.len());
        prop_assert_eq!(diff.correct_count() + diff.typed_mistakes(), typed.len());
        prop_assert_eq!(diff.highlights().len(), expected.len());
    }

    #[test]
    fn alignment_is_deterministic(expected in text(30), typed in text(30)) {
        prop_assert_eq!(align(&expected, &typed), align(&expected, &typed));
    }

    #[test]
    fn copying_exactly_is_all_correct(expected in text(40)) {
        let diff = align(&expected, &expected);
        prop_assert!(diff.entries().iter().all(|e| e.mark == Mark::Match));
        prop_assert!(diff.highlights().iter().all(|h| h.status == CharStatus::Correct));
    }

    #[test]
    fn metrics_stay_in_range(
        policy in policy(),
        expected in text(40),
        typed in text(40),
        secs in 0u64..600,
    ) {
        let s = compute(policy, &expected, &typed, secs);
        prop_assert!(s.accuracy_percent <= 100);
        prop_assert!(s.net_speed_wpm <= s.gross_speed_wpm);
        prop_assert!(s.correct_chars <= s.typed_chars);
        prop_assert!(s.punctuation_mistake_count <= s.mistake_count);
        prop_assert_eq!(s.typed_chars, typed.len());
        prop_assert_eq!(s.time_taken_secs, secs);
        if typed.is_empty() {
            prop_assert_eq!(s.accuracy_percent, 0);
        }
    }

    #[test]
    fn qualified_means_every_threshold_met(
        policy in policy(),
        typed in text(40),
        secs in 0u64..180,
    ) {
        let expected: Vec<char> = PASSAGE.chars().collect();
        let s = compute(policy.clone(), &expected, &typed, secs);
        let meets = secs >= policy.min_duration_secs
            && s.gross_speed_wpm >= policy.min_gross_speed
            && s.accuracy_percent >= policy.min_accuracy;
        prop_assert_eq!(s.qualified, meets);
    }

    #[test]
    fn metrics_are_deterministic(policy in policy(), typed in text(30), secs in 0u64..300) {
        let expected: Vec<char> = PASSAGE.chars().collect();
        prop_assert_eq!(
            compute(policy.clone(), &expected, &typed, secs),
            compute(policy, &expected, &typed, secs)
        );
    }

    #[test]
    fn word_ledger_matches_recount(keys in script(60)) {
        let passage = TokenizedPassage::new(PASSAGE);
        let mut input = TypedInput::default();
        for key in keys {
            if key == BACKSPACE {
                process_backspace(&mut input);
            } else {
                process_char(&mut input, &passage, key);
            }
            prop_assert_eq!(
                input.word_outcomes().to_vec(),
                word_outcomes(passage.words(), &input.typed_text())
            );
            prop_assert!(input.current_word_index() < passage.word_count());
        }
    }

    #[test]
    fn restart_always_returns_to_zero(keys in script(40), secs in 0u64..30, paused in any::<bool>()) {
        let clock = ManualClock::new();
        let mut session = Session::with_clock(
            Passage::new("prop", PASSAGE),
            SessionSettings::default(),
            clock.clone(),
        );
        session.start().unwrap();
        for key in keys {
            if key == BACKSPACE {
                session.backspace().unwrap();
            } else {
                session.type_char(key).unwrap();
            }
        }
        clock.advance_secs(secs);
        if paused {
            session.pause().unwrap();
        }

        session.restart();
        let words = TokenizedPassage::new(PASSAGE).word_count();
        prop_assert_eq!(session.snapshot(), MetricsSnapshot::zero(words));
        prop_assert_eq!(session.typed_text(), "");
    }
}
