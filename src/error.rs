use std::path::PathBuf;

use thiserror::Error;

use crate::session::state::{SessionAction, SessionState};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("passage is empty")]
    EmptyPassage,
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: SessionState,
        action: SessionAction,
    },
    #[error("keystrokes are only accepted while running (session is {0})")]
    NotRunning(SessionState),
}

/// A qualification policy whose numbers would make the speed formulas meaningless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolicyError {
    #[error("chars_per_word must be positive, got {0}")]
    CharsPerWord(f64),
    #[error("mistake_penalty_chars must not be negative, got {0}")]
    MistakePenalty(f64),
    #[error("punctuation_mistake_weight must not be negative, got {0}")]
    PunctuationWeight(f64),
    #[error("min_accuracy is a percentage, got {0}")]
    MinAccuracy(u32),
}

#[derive(Debug, Error)]
pub enum ExamError {
    #[error("malformed exam file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("duration_secs must be positive")]
    ZeroDuration,
}

#[derive(Debug, Error)]
pub enum PassageError {
    #[error("no passages available for exam '{0}'")]
    NoneAvailable(String),
    #[error("malformed passage data in {source_name}: {message}")]
    Malformed {
        source_name: String,
        message: String,
    },
    #[error("cannot read passage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
