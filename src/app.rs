use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use examtyper::config::Config;
use examtyper::engine::metrics::QualificationPolicy;
use examtyper::error::SessionError;
use examtyper::exam::ExamCategory;
use examtyper::passage::{EmbeddedPassages, FilePassages, Passage, PassageSource};
use examtyper::session::report::SessionReport;
use examtyper::session::state::{Session, SessionState, TickOutcome, TickToken, TypingMode};

use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Test,
    Result,
}

/// Command-line choices that outlive a single test.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub passage_file: Option<PathBuf>,
    pub duration_override: Option<u64>,
    pub mode_override: Option<TypingMode>,
    pub json_report: Option<PathBuf>,
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub exams: Vec<ExamCategory>,
    pub exam: Option<ExamCategory>,
    pub session: Option<Session>,
    pub status: Option<String>,
    pub should_quit: bool,
    tick_token: Option<TickToken>,
    options: Options,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme, exams: Vec<ExamCategory>, options: Options) -> Self {
        let mut menu = Menu::new(&exams, theme);
        menu.mode_override = options.mode_override.or(config.mode);
        if let Some(i) = exams.iter().position(|e| e.id == config.exam) {
            menu.selected = i;
        }

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            exams,
            exam: None,
            session: None,
            status: None,
            should_quit: false,
            tick_token: None,
            options,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn policy(&self) -> Option<&QualificationPolicy> {
        self.exam.as_ref().map(|e| &e.policy)
    }

    pub fn report(&self) -> Option<&SessionReport> {
        self.session.as_ref().and_then(Session::report)
    }

    pub fn start_exam(&mut self, index: usize) -> Result<()> {
        let exam = self
            .exams
            .get(index)
            .cloned()
            .context("no exam at that menu position")?;
        let passage = self.pick_passage(&exam.id)?;

        let mut settings = exam.session_settings(self.config.idle_threshold());
        if let Some(mode) = self.menu.mode_override {
            settings.mode = mode;
        }
        if let Some(secs) = self.options.duration_override.or(self.config.duration_secs) {
            settings.duration_secs = secs;
        }

        info!(exam = %exam.id, passage = %passage.title, "exam selected");
        self.session = Some(Session::new(passage, settings));
        self.exam = Some(exam);
        self.tick_token = None;
        self.status = None;
        self.screen = AppScreen::Test;
        Ok(())
    }

    pub fn start_selected(&mut self) {
        if let Err(e) = self.start_exam(self.menu.selected) {
            warn!(error = %format!("{e:#}"), "could not start exam");
            self.status = Some(format!("{e:#}"));
        }
    }

    fn pick_passage(&mut self, exam_id: &str) -> Result<Passage> {
        let passage = match &self.options.passage_file {
            Some(path) => FilePassages::new(path).pick(exam_id, &mut self.rng),
            None => EmbeddedPassages.pick(exam_id, &mut self.rng),
        };
        passage.with_context(|| format!("loading a passage for '{exam_id}'"))
    }

    /// The first printable key of an idle test starts the clock.
    pub fn type_char(&mut self, ch: char) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() == SessionState::Idle {
            match session.start() {
                Ok(token) => self.tick_token = Some(token),
                Err(SessionError::EmptyPassage) => {
                    self.status = Some("This passage is empty; press n for another.".to_string());
                    return;
                }
                Err(e) => {
                    self.status = Some(e.to_string());
                    return;
                }
            }
        }
        if let Err(e) = session.type_char(ch) {
            self.status = Some(keystroke_status(e));
        }
    }

    pub fn backspace(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.backspace() {
            Ok(_) => {}
            // Nothing to delete before the first key.
            Err(SessionError::NotRunning(SessionState::Idle)) => {}
            Err(e) => self.status = Some(keystroke_status(e)),
        }
    }

    pub fn toggle_pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.state() {
            SessionState::Running => {
                if session.pause().is_ok() {
                    self.tick_token = None;
                }
            }
            SessionState::Paused => {
                if let Ok(token) = session.resume() {
                    self.tick_token = Some(token);
                    self.status = None;
                }
            }
            SessionState::Idle | SessionState::Submitted => {}
        }
    }

    pub fn submit(&mut self) {
        let submitted = self
            .session
            .as_mut()
            .is_some_and(|session| session.submit().is_ok());
        if submitted {
            self.finish();
        }
    }

    /// Forwarded once per second of wall time.
    pub fn on_second(&mut self) {
        let (Some(session), Some(token)) = (self.session.as_mut(), self.tick_token) else {
            return;
        };
        if session.tick(token) == TickOutcome::TimedOut {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.tick_token = None;
        self.screen = AppScreen::Result;
        let Some(path) = self.options.json_report.clone() else {
            return;
        };
        let written = match self.report() {
            Some(report) => write_report(&path, report),
            None => return,
        };
        if let Err(e) = written {
            warn!(error = %format!("{e:#}"), "report not written");
            self.status = Some(format!("{e:#}"));
        }
    }

    /// Same passage, fresh attempt.
    pub fn retry(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.restart();
        }
        self.tick_token = None;
        self.status = None;
        self.screen = AppScreen::Test;
    }

    pub fn new_passage(&mut self) {
        let Some(exam_id) = self.exam.as_ref().map(|e| e.id.clone()) else {
            return;
        };
        let passage = match self.pick_passage(&exam_id) {
            Ok(p) => p,
            Err(e) => {
                self.status = Some(format!("{e:#}"));
                return;
            }
        };
        if let Some(session) = self.session.as_mut() {
            session.restart();
            if let Err(e) = session.select_passage(passage) {
                self.status = Some(e.to_string());
            }
        }
        self.tick_token = None;
        self.screen = AppScreen::Test;
    }

    /// Esc on the test screen: abandon the attempt, or leave if nothing started.
    pub fn escape_test(&mut self) {
        match self.session.as_ref().map(Session::state) {
            Some(SessionState::Idle) | None => self.go_to_menu(),
            Some(_) => self.retry(),
        }
    }

    pub fn go_to_menu(&mut self) {
        self.session = None;
        self.exam = None;
        self.tick_token = None;
        self.status = None;
        self.screen = AppScreen::Menu;
    }
}

fn keystroke_status(e: SessionError) -> String {
    match e {
        SessionError::NotRunning(SessionState::Paused) => "Paused. Press Tab to resume.".to_string(),
        other => other.to_string(),
    }
}

pub fn write_report(path: &Path, report: &SessionReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = report.to_json_pretty()?;
    fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
    Ok(())
}
