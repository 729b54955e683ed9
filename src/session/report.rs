use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::feedback::Feedback;
use crate::engine::metrics::MetricsSnapshot;
use crate::session::state::TypingMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmitReason {
    Manual,
    Timeout,
}

/// Final outcome of a submitted session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub exam: String,
    pub passage_title: String,
    pub mode: TypingMode,
    pub reason: SubmitReason,
    pub duration_secs: u64,
    pub snapshot: MetricsSnapshot,
    pub feedback: Feedback,
    /// Diagnostic only, never part of the scoring.
    pub idle_secs: u64,
    pub backspace_count: u32,
    pub submitted_at: DateTime<Utc>,
}

impl SessionReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_json_uses_readable_enums() {
        let report = SessionReport {
            exam: "ssc-cgl".to_string(),
            passage_title: "Monsoon".to_string(),
            mode: TypingMode::PaperTyping,
            reason: SubmitReason::Timeout,
            duration_secs: 900,
            snapshot: MetricsSnapshot::zero(12),
            feedback: Feedback::default(),
            idle_secs: 4,
            backspace_count: 2,
            submitted_at: Utc::now(),
        };
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"reason\": \"timeout\""));
        assert!(json.contains("\"mode\": \"paper\""));
        assert!(json.contains("\"total_words\": 12"));

        let back: SessionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
