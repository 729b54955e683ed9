use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::engine::metrics::{MetricsSnapshot, QualificationPolicy};

/// One threshold band: applies when the measured value is at least `min`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: u32,
    pub message: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl Band {
    fn new(min: u32, message: &str, suggestions: &[&str]) -> Self {
        Self {
            min,
            message: message.to_string(),
            suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackBands {
    #[serde(default = "default_accuracy_bands")]
    pub accuracy: Vec<Band>,
    #[serde(default = "default_speed_bands")]
    pub speed: Vec<Band>,
}

fn default_accuracy_bands() -> Vec<Band> {
    vec![
        Band::new(90, "Excellent accuracy.", &[]),
        Band::new(
            70,
            "Good accuracy, but there is room to reduce errors.",
            &["Slow down slightly on difficult words and focus on precision."],
        ),
        Band::new(
            0,
            "Accuracy needs significant work.",
            &["Practise short passages slowly until errors drop, then build speed."],
        ),
    ]
}

fn default_speed_bands() -> Vec<Band> {
    vec![
        Band::new(60, "Outstanding speed.", &[]),
        Band::new(45, "Very good speed.", &["Hold this pace on longer passages."]),
        Band::new(
            35,
            "Good speed, enough for most exam requirements.",
            &["Practise daily to keep a comfortable margin above the cut-off."],
        ),
        Band::new(30, "Fair speed.", &["Push towards 35 WPM with timed drills."]),
        Band::new(
            20,
            "Speed is below most exam requirements.",
            &["Use home-row drills to build finger speed."],
        ),
        Band::new(
            0,
            "Speed needs significant improvement.",
            &["Start with basic finger-placement exercises."],
        ),
    ]
}

impl Default for FeedbackBands {
    fn default() -> Self {
        Self {
            accuracy: default_accuracy_bands(),
            speed: default_speed_bands(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub text: String,
    pub suggestions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct FeedbackGenerator {
    policy: QualificationPolicy,
    accuracy: Vec<Band>,
    speed: Vec<Band>,
}

impl FeedbackGenerator {
    pub fn new(bands: FeedbackBands, policy: QualificationPolicy) -> Self {
        let FeedbackBands {
            mut accuracy,
            mut speed,
        } = bands;
        // Highest threshold first; first match wins.
        accuracy.sort_by_key(|b| Reverse(b.min));
        speed.sort_by_key(|b| Reverse(b.min));
        Self {
            policy,
            accuracy,
            speed,
        }
    }

    pub fn generate(&self, snapshot: &MetricsSnapshot) -> Feedback {
        let accuracy_band = pick(&self.accuracy, snapshot.accuracy_percent);
        let speed_band = pick(&self.speed, snapshot.gross_speed_wpm);

        let verdict = if snapshot.qualified {
            "Qualified"
        } else {
            "Not qualified yet"
        };
        let mut text = format!(
            "{verdict}: {} WPM gross, {} WPM net at {}% accuracy.",
            snapshot.gross_speed_wpm, snapshot.net_speed_wpm, snapshot.accuracy_percent
        );
        for band in [accuracy_band, speed_band].into_iter().flatten() {
            text.push(' ');
            text.push_str(&band.message);
        }

        let mut suggestions: Vec<String> = Vec::new();
        let mut suggest = |s: String| {
            if !suggestions.contains(&s) {
                suggestions.push(s);
            }
        };

        for band in [accuracy_band, speed_band].into_iter().flatten() {
            for s in &band.suggestions {
                suggest(s.clone());
            }
        }

        let policy = &self.policy;
        if snapshot.accuracy_percent < policy.min_accuracy {
            suggest(format!(
                "Raise accuracy from {}% to at least {}%.",
                snapshot.accuracy_percent, policy.min_accuracy
            ));
        }
        if snapshot.gross_speed_wpm < policy.min_gross_speed {
            suggest(format!(
                "Build speed by {} WPM to reach the {} WPM requirement.",
                policy.min_gross_speed - snapshot.gross_speed_wpm,
                policy.min_gross_speed
            ));
        }
        if snapshot.time_taken_secs < policy.min_duration_secs {
            suggest(format!(
                "Keep typing for at least {} seconds; this attempt lasted {}.",
                policy.min_duration_secs, snapshot.time_taken_secs
            ));
        }
        if snapshot.punctuation_mistake_count > 0 {
            suggest(format!(
                "Review punctuation: {} punctuation mistake(s) were counted at {} of a full mistake.",
                snapshot.punctuation_mistake_count, policy.punctuation_mistake_weight
            ));
        }

        Feedback { text, suggestions }
    }
}

fn pick(bands: &[Band], value: u32) -> Option<&Band> {
    bands.iter().find(|b| value >= b.min)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn snapshot(gross: u32, accuracy: u32) -> MetricsSnapshot {
        MetricsSnapshot {
            gross_speed_wpm: gross,
            net_speed_wpm: gross,
            accuracy_percent: accuracy,
            time_taken_secs: 600,
            typed_chars: 100,
            ..MetricsSnapshot::default()
        }
    }

    fn generator() -> FeedbackGenerator {
        FeedbackGenerator::new(FeedbackBands::default(), QualificationPolicy::default())
    }

    #[rstest]
    #[case(95, "Excellent accuracy.")]
    #[case(90, "Excellent accuracy.")]
    #[case(89, "Good accuracy")]
    #[case(70, "Good accuracy")]
    #[case(69, "Accuracy needs significant work.")]
    #[case(0, "Accuracy needs significant work.")]
    fn test_accuracy_bands(#[case] accuracy: u32, #[case] expected: &str) {
        let feedback = generator().generate(&snapshot(50, accuracy));
        assert!(feedback.text.contains(expected), "{}", feedback.text);
    }

    #[rstest]
    #[case(75, "Outstanding speed.")]
    #[case(60, "Outstanding speed.")]
    #[case(50, "Very good speed.")]
    #[case(35, "Good speed")]
    #[case(34, "Fair speed.")]
    #[case(25, "below most exam requirements")]
    #[case(10, "Speed needs significant improvement.")]
    fn test_speed_bands(#[case] gross: u32, #[case] expected: &str) {
        let feedback = generator().generate(&snapshot(gross, 95));
        assert!(feedback.text.contains(expected), "{}", feedback.text);
    }

    #[test]
    fn test_verdict_follows_qualification() {
        let mut s = snapshot(40, 95);
        s.qualified = true;
        assert!(generator().generate(&s).text.starts_with("Qualified:"));
        s.qualified = false;
        assert!(generator().generate(&s).text.starts_with("Not qualified yet:"));
    }

    #[test]
    fn test_shortfall_suggestions() {
        let mut s = snapshot(30, 75);
        s.time_taken_secs = 20;
        s.punctuation_mistake_count = 2;
        let feedback = generator().generate(&s);
        let all = feedback.suggestions.join("\n");
        assert!(all.contains("Raise accuracy from 75% to at least 80%."));
        assert!(all.contains("Build speed by 5 WPM to reach the 35 WPM requirement."));
        assert!(all.contains("at least 60 seconds"));
        assert!(all.contains("2 punctuation mistake(s)"));
    }

    #[test]
    fn test_no_shortfall_when_thresholds_met() {
        let feedback = generator().generate(&snapshot(65, 98));
        assert!(feedback.suggestions.is_empty(), "{:?}", feedback.suggestions);
    }

    #[test]
    fn test_band_order_in_config_does_not_matter() {
        let bands = FeedbackBands {
            accuracy: vec![
                Band::new(0, "low", &[]),
                Band::new(90, "high", &[]),
                Band::new(70, "mid", &[]),
            ],
            speed: vec![],
        };
        let generator = FeedbackGenerator::new(bands, QualificationPolicy::default());
        assert!(generator.generate(&snapshot(40, 80)).text.ends_with("mid"));
        assert!(generator.generate(&snapshot(40, 91)).text.ends_with("high"));
    }

    #[test]
    fn test_feedback_is_deterministic() {
        let s = snapshot(33, 81);
        assert_eq!(generator().generate(&s), generator().generate(&s));
    }

    #[test]
    fn test_bands_from_toml() {
        let bands: FeedbackBands = toml::from_str(
            r#"
[[speed]]
min = 30
message = "Meets the court typing cut-off."
suggestions = ["Keep going."]
"#,
        )
        .unwrap();
        assert_eq!(bands.speed.len(), 1);
        assert_eq!(bands.accuracy, default_accuracy_bands());
    }
}
