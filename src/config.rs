use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::exam::DEFAULT_EXAM;
use crate::session::state::TypingMode;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_exam")]
    pub exam: String,
    /// Overrides the exam category's typing mode when set.
    #[serde(default)]
    pub mode: Option<TypingMode>,
    /// Overrides the exam category's duration when set.
    #[serde(default)]
    pub duration_secs: Option<u64>,
    #[serde(default = "default_idle_threshold_secs")]
    pub idle_threshold_secs: u64,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_exam() -> String {
    DEFAULT_EXAM.to_string()
}
fn default_idle_threshold_secs() -> u64 {
    10
}
fn default_log_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("examtyper")
        .join("logs")
        .to_string_lossy()
        .to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            exam: default_exam(),
            mode: None,
            duration_secs: None,
            idle_threshold_secs: default_idle_threshold_secs(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            if config.duration_secs == Some(0) {
                bail!("duration_secs in {} must be positive", path.display());
            }
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examtyper")
            .join("config.toml")
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.exam, "general");
        assert_eq!(config.idle_threshold_secs, 10);
        assert!(config.mode.is_none());
        assert!(config.duration_secs.is_none());
        assert!(config.log_dir.contains("logs"));
    }

    #[test]
    fn test_config_overrides() {
        let toml_str = r#"
theme = "gruvbox-dark"
exam = "ssc-cgl"
mode = "paper"
duration_secs = 120
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.theme, "gruvbox-dark");
        assert_eq!(config.exam, "ssc-cgl");
        assert_eq!(config.mode, Some(TypingMode::PaperTyping));
        assert_eq!(config.duration_secs, Some(120));
        assert_eq!(config.idle_threshold_secs, 10);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            exam: "rrb-ntpc".to_string(),
            mode: Some(TypingMode::ScreenTyping),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "idle_threshold_secs = \"ten\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn test_zero_duration_override_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "duration_secs = 0").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("must be positive"));
    }
}
