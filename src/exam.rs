use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::feedback::FeedbackBands;
use crate::engine::metrics::QualificationPolicy;
use crate::error::ExamError;
use crate::session::state::{SessionSettings, TypingMode};

#[derive(Embed)]
#[folder = "assets/exams/"]
struct ExamAssets;

pub const DEFAULT_EXAM: &str = "general";

/// One exam category: its timing, qualification rules and feedback bands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExamCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Position in the menu.
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default)]
    pub mode: TypingMode,
    #[serde(default)]
    pub policy: QualificationPolicy,
    #[serde(default)]
    pub feedback: FeedbackBands,
}

fn default_duration_secs() -> u64 {
    600
}

impl ExamCategory {
    /// Look up a category, preferring the user's exams dir over the bundled set.
    pub fn load(id: &str) -> Option<Self> {
        Self::load_from(id, user_exams_dir().as_deref())
    }

    pub fn load_from(id: &str, user_dir: Option<&Path>) -> Option<Self> {
        let filename = format!("{id}.toml");

        if let Some(dir) = user_dir {
            let path = dir.join(&filename);
            if let Ok(content) = fs::read_to_string(&path) {
                match parse(&content) {
                    Ok(exam) => return Some(exam),
                    Err(e) => warn!(path = %path.display(), error = %e, "ignoring user exam file"),
                }
            }
        }

        let file = ExamAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        match parse(content) {
            Ok(exam) => Some(exam),
            Err(e) => {
                warn!(exam = id, error = %e, "bundled exam file is invalid");
                None
            }
        }
    }

    /// Bundled ids plus any extra user-defined ids.
    pub fn available_ids(user_dir: Option<&Path>) -> Vec<String> {
        let mut ids: Vec<String> = ExamAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        let entries = user_dir.and_then(|dir| fs::read_dir(dir).ok());
        for entry in entries.into_iter().flatten().flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(id) = name.strip_suffix(".toml") {
                if !ids.iter().any(|i| i == id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    /// Every loadable category in menu order.
    pub fn all() -> Vec<Self> {
        Self::all_from(user_exams_dir().as_deref())
    }

    pub fn all_from(user_dir: Option<&Path>) -> Vec<Self> {
        let mut exams: Vec<Self> = Self::available_ids(user_dir)
            .iter()
            .filter_map(|id| Self::load_from(id, user_dir))
            .collect();
        exams.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        exams
    }

    pub fn session_settings(&self, idle_threshold: Duration) -> SessionSettings {
        SessionSettings {
            exam: self.id.clone(),
            mode: self.mode,
            duration_secs: self.duration_secs,
            policy: self.policy.clone(),
            feedback: self.feedback.clone(),
            idle_threshold,
        }
    }
}

fn parse(content: &str) -> Result<ExamCategory, ExamError> {
    let exam: ExamCategory = toml::from_str(content)?;
    exam.policy.validate()?;
    if exam.duration_secs == 0 {
        return Err(ExamError::ZeroDuration);
    }
    Ok(exam)
}

pub fn user_exams_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("examtyper").join("exams"))
}
