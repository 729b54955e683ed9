use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::seq::SliceRandom;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PassageError;

#[derive(Embed)]
#[folder = "assets/passages/"]
struct PassageAssets;

const FALLBACK_EXAM: &str = "general";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub title: String,
    pub content: String,
}

impl Passage {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct PassageFile {
    #[serde(default)]
    passages: Vec<Passage>,
}

/// Where passages for an exam category come from.
pub trait PassageSource {
    fn passages(&self, exam_id: &str) -> Result<Vec<Passage>, PassageError>;

    /// Pick one usable passage at random. Blank passages are never picked.
    fn pick<R: Rng + ?Sized>(&self, exam_id: &str, rng: &mut R) -> Result<Passage, PassageError>
    where
        Self: Sized,
    {
        let passages: Vec<Passage> = self
            .passages(exam_id)?
            .into_iter()
            .filter(|p| !p.is_blank())
            .collect();
        passages
            .choose(rng)
            .cloned()
            .ok_or_else(|| PassageError::NoneAvailable(exam_id.to_string()))
    }
}

/// Passages bundled into the binary under `assets/passages/<exam>.toml`.
/// Exams without their own file practise on the general set.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedPassages;

impl EmbeddedPassages {
    fn load(name: &str) -> Result<Option<Vec<Passage>>, PassageError> {
        let filename = format!("{name}.toml");
        let Some(file) = PassageAssets::get(&filename) else {
            return Ok(None);
        };
        let content = std::str::from_utf8(file.data.as_ref()).map_err(|e| PassageError::Malformed {
            source_name: filename.clone(),
            message: e.to_string(),
        })?;
        parse_toml(content, &filename).map(Some)
    }
}

impl PassageSource for EmbeddedPassages {
    fn passages(&self, exam_id: &str) -> Result<Vec<Passage>, PassageError> {
        if let Some(passages) = Self::load(exam_id)? {
            return Ok(passages);
        }
        debug!(exam = exam_id, "no bundled passages, using general set");
        Self::load(FALLBACK_EXAM)?.ok_or_else(|| PassageError::NoneAvailable(exam_id.to_string()))
    }
}

/// Passages read from a user-supplied file, regardless of exam.
///
/// A `.toml` file holds `[[passages]]` tables; anything else is plain text
/// whose first non-empty line is the title and the rest the content.
#[derive(Debug, Clone)]
pub struct FilePassages {
    path: PathBuf,
}

impl FilePassages {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PassageSource for FilePassages {
    fn passages(&self, _exam_id: &str) -> Result<Vec<Passage>, PassageError> {
        let content = fs::read_to_string(&self.path).map_err(|source| PassageError::Io {
            path: self.path.clone(),
            source,
        })?;
        let source_name = self.path.display().to_string();
        let is_toml = self
            .path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            parse_toml(&content, &source_name)
        } else {
            Ok(parse_plain_text(&content, &source_name).into_iter().collect())
        }
    }
}

fn parse_toml(content: &str, source_name: &str) -> Result<Vec<Passage>, PassageError> {
    let file: PassageFile = toml::from_str(content).map_err(|e| PassageError::Malformed {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })?;
    Ok(file.passages)
}

fn parse_plain_text(content: &str, source_name: &str) -> Option<Passage> {
    let mut lines = content.lines().skip_while(|l| l.trim().is_empty());
    let first = lines.next()?.trim();
    let body: Vec<&str> = lines.collect();
    let body = body.join("\n");
    if body.trim().is_empty() {
        // A single line is all content.
        return Some(Passage::new(file_stem_title(source_name), first));
    }
    Some(Passage::new(first, body.trim()))
}

fn file_stem_title(source_name: &str) -> String {
    Path::new(source_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| source_name.to_string())
}
