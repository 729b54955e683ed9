use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::diff::{self, CharacterHighlight, Diff};
use crate::engine::feedback::{FeedbackBands, FeedbackGenerator};
use crate::engine::metrics::{MetricsCalculator, MetricsInput, MetricsSnapshot, QualificationPolicy};
use crate::engine::tokenizer::TokenizedPassage;
use crate::error::SessionError;
use crate::passage::Passage;
use crate::session::clock::{Clock, MonotonicClock};
use crate::session::idle::IdleTracker;
use crate::session::input::{self, TypedInput};
use crate::session::report::{SessionReport, SubmitReason};
use crate::session::timer::{CountdownTimer, TimerTick};

/// Period of the countdown tick the host forwards while running.
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    Submitted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Paused => "paused",
            SessionState::Submitted => "submitted",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Pause,
    Resume,
    Submit,
    SelectPassage,
    ChangeMode,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionAction::Start => "start",
            SessionAction::Pause => "pause",
            SessionAction::Resume => "resume",
            SessionAction::Submit => "submit",
            SessionAction::SelectPassage => "select a passage",
            SessionAction::ChangeMode => "change typing mode",
        };
        f.write_str(s)
    }
}

/// Screen typing shows per-character highlights as you go; paper typing
/// withholds them until the session is submitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypingMode {
    #[default]
    #[serde(rename = "screen")]
    ScreenTyping,
    #[serde(rename = "paper")]
    PaperTyping,
}

impl TypingMode {
    pub fn label(self) -> &'static str {
        match self {
            TypingMode::ScreenTyping => "Screen Typing",
            TypingMode::PaperTyping => "Paper Typing",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TypingMode::ScreenTyping => TypingMode::PaperTyping,
            TypingMode::PaperTyping => TypingMode::ScreenTyping,
        }
    }
}

impl fmt::Display for TypingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypingMode::ScreenTyping => "screen",
            TypingMode::PaperTyping => "paper",
        })
    }
}

impl FromStr for TypingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "screen" | "screen-typing" => Ok(TypingMode::ScreenTyping),
            "paper" | "paper-typing" => Ok(TypingMode::PaperTyping),
            other => Err(format!("unknown typing mode '{other}' (expected screen or paper)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub exam: String,
    pub mode: TypingMode,
    pub duration_secs: u64,
    pub policy: QualificationPolicy,
    pub feedback: FeedbackBands,
    pub idle_threshold: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            exam: "general".to_string(),
            mode: TypingMode::default(),
            duration_secs: 300,
            policy: QualificationPolicy::default(),
            feedback: FeedbackBands::default(),
            idle_threshold: Duration::from_secs(10),
        }
    }
}

/// Identifies one running stretch. Ticks carrying an older token are ignored,
/// so a tick queued before a pause, submit or restart can never act after it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Stale,
    Counting { remaining_secs: u64, idle: bool },
    TimedOut,
}

pub struct Session<C: Clock = MonotonicClock> {
    clock: C,
    exam: String,
    mode: TypingMode,
    passage: Passage,
    tokens: TokenizedPassage,
    calculator: MetricsCalculator,
    feedback: FeedbackGenerator,

    state: SessionState,
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    running_since: Option<Instant>,
    banked: Duration,
    last_keystroke_at: Option<Instant>,

    input: TypedInput,
    diff: Diff,
    backspace_count: u32,
    timer: CountdownTimer,
    idle: IdleTracker,
    report: Option<SessionReport>,
}

impl Session<MonotonicClock> {
    pub fn new(passage: Passage, settings: SessionSettings) -> Self {
        Self::with_clock(passage, settings, MonotonicClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(passage: Passage, settings: SessionSettings, clock: C) -> Self {
        let tokens = TokenizedPassage::new(&passage.content);
        let diff = diff::align(tokens.expected_window(0), &[]);
        Self {
            clock,
            exam: settings.exam,
            mode: settings.mode,
            passage,
            tokens,
            calculator: MetricsCalculator::new(settings.policy.clone()),
            feedback: FeedbackGenerator::new(settings.feedback, settings.policy),
            state: SessionState::Idle,
            generation: 0,
            started_at: None,
            running_since: None,
            banked: Duration::ZERO,
            last_keystroke_at: None,
            input: TypedInput::default(),
            diff,
            backspace_count: 0,
            timer: CountdownTimer::new(settings.duration_secs),
            idle: IdleTracker::new(settings.idle_threshold),
            report: None,
        }
    }

    // --- Accessors ---

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> TypingMode {
        self.mode
    }

    pub fn exam(&self) -> &str {
        &self.exam
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn tokens(&self) -> &TokenizedPassage {
        &self.tokens
    }

    pub fn typed_text(&self) -> String {
        self.input.typed_text()
    }

    pub fn current_word_index(&self) -> usize {
        self.input.current_word_index()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.timer.remaining_secs()
    }

    pub fn duration_secs(&self) -> u64 {
        self.timer.duration_secs()
    }

    pub fn time_progress(&self) -> f64 {
        self.timer.progress()
    }

    pub fn idle_secs(&self) -> u64 {
        self.idle.idle_secs()
    }

    pub fn backspace_count(&self) -> u32 {
        self.backspace_count
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    pub fn tick_token(&self) -> TickToken {
        TickToken {
            generation: self.generation,
        }
    }

    /// Time spent running, excluding paused stretches.
    pub fn elapsed(&self) -> Duration {
        let live = self
            .running_since
            .map(|since| self.clock.now().saturating_duration_since(since))
            .unwrap_or_default();
        self.banked + live
    }

    /// Whether per-character correctness may be shown right now.
    pub fn highlights_visible(&self) -> bool {
        match self.mode {
            TypingMode::ScreenTyping => true,
            TypingMode::PaperTyping => self.state == SessionState::Submitted,
        }
    }

    /// The current alignment regardless of typing mode.
    pub fn diff(&self) -> &Diff {
        &self.diff
    }

    pub fn visible_diff(&self) -> Option<&Diff> {
        self.highlights_visible().then_some(&self.diff)
    }

    pub fn highlights(&self) -> Vec<CharacterHighlight> {
        self.visible_diff()
            .map(Diff::highlights)
            .unwrap_or_default()
    }

    // --- Transitions ---

    pub fn start(&mut self) -> Result<TickToken, SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.reject(SessionAction::Start));
        }
        if self.tokens.is_empty() {
            warn!(title = %self.passage.title, "refusing to start on an empty passage");
            return Err(SessionError::EmptyPassage);
        }
        let now = self.clock.now();
        self.state = SessionState::Running;
        self.started_at = Some(Utc::now());
        self.running_since = Some(now);
        self.last_keystroke_at = Some(now);
        self.generation += 1;
        info!(
            exam = %self.exam,
            passage = %self.passage.title,
            mode = %self.mode,
            duration_secs = self.timer.duration_secs(),
            "session started"
        );
        Ok(self.tick_token())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Running {
            return Err(self.reject(SessionAction::Pause));
        }
        self.bank_running_time();
        self.state = SessionState::Paused;
        self.generation += 1;
        debug!(elapsed_ms = self.banked.as_millis() as u64, "session paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<TickToken, SessionError> {
        if self.state != SessionState::Paused {
            return Err(self.reject(SessionAction::Resume));
        }
        let now = self.clock.now();
        self.running_since = Some(now);
        // Time spent paused is not idle time.
        self.last_keystroke_at = Some(now);
        self.state = SessionState::Running;
        self.generation += 1;
        debug!("session resumed");
        Ok(self.tick_token())
    }

    /// Manual submit. Only a running session can be submitted, so a second
    /// submit is rejected and leaves the first report untouched.
    pub fn submit(&mut self) -> Result<&SessionReport, SessionError> {
        if self.state != SessionState::Running {
            return Err(self.reject(SessionAction::Submit));
        }
        Ok(self.finalize(SubmitReason::Manual))
    }

    /// Back to Idle with the same passage. Allowed from every state.
    pub fn restart(&mut self) {
        let from = self.state;
        self.reset_run();
        info!(from = %from, "session restarted");
    }

    pub fn select_passage(&mut self, passage: Passage) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.reject(SessionAction::SelectPassage));
        }
        debug!(title = %passage.title, "passage selected");
        self.tokens = TokenizedPassage::new(&passage.content);
        self.passage = passage;
        self.reset_run();
        Ok(())
    }

    pub fn set_mode(&mut self, mode: TypingMode) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(self.reject(SessionAction::ChangeMode));
        }
        self.mode = mode;
        Ok(())
    }

    /// One countdown tick. Timeout is reported at most once per run.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        if token.generation != self.generation || self.state != SessionState::Running {
            debug!(
                token = token.generation,
                current = self.generation,
                "ignoring stale tick"
            );
            return TickOutcome::Stale;
        }

        let now = self.clock.now();
        let last = self.last_keystroke_at.unwrap_or(now);
        let idle = self.idle.on_tick(now, last, TICK);

        match self.timer.tick(self.elapsed()) {
            TimerTick::Counting(remaining_secs) => TickOutcome::Counting {
                remaining_secs,
                idle,
            },
            TimerTick::Expired => {
                self.finalize(SubmitReason::Timeout);
                TickOutcome::TimedOut
            }
            TimerTick::Idle => TickOutcome::Stale,
        }
    }

    // --- Keystrokes ---

    pub fn type_char(&mut self, ch: char) -> Result<MetricsSnapshot, SessionError> {
        self.ensure_running()?;
        self.last_keystroke_at = Some(self.clock.now());
        if input::process_char(&mut self.input, &self.tokens, ch) {
            self.refresh_diff();
        }
        Ok(self.measure())
    }

    pub fn backspace(&mut self) -> Result<MetricsSnapshot, SessionError> {
        self.ensure_running()?;
        self.last_keystroke_at = Some(self.clock.now());
        if input::process_backspace(&mut self.input) {
            self.backspace_count += 1;
            self.refresh_diff();
        }
        Ok(self.measure())
    }

    /// Current metrics. Idle sessions always read as zero; a submitted
    /// session keeps reporting the figures it was submitted with.
    pub fn snapshot(&self) -> MetricsSnapshot {
        match self.state {
            SessionState::Idle => MetricsSnapshot::zero(self.tokens.word_count()),
            SessionState::Submitted => match &self.report {
                Some(report) => report.snapshot,
                None => self.measure(),
            },
            SessionState::Running | SessionState::Paused => self.measure(),
        }
    }

    // --- Internals ---

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.state == SessionState::Running {
            Ok(())
        } else {
            Err(SessionError::NotRunning(self.state))
        }
    }

    fn reject(&self, action: SessionAction) -> SessionError {
        debug!(from = %self.state, %action, "rejected transition");
        SessionError::InvalidTransition {
            from: self.state,
            action,
        }
    }

    fn bank_running_time(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += self.clock.now().saturating_duration_since(since);
        }
    }

    fn refresh_diff(&mut self) {
        let window = self.tokens.expected_window(self.input.current_word_index());
        self.diff = diff::align(window, self.input.typed());
    }

    fn measure(&self) -> MetricsSnapshot {
        let input = MetricsInput {
            expected: self.tokens.expected_window(self.input.current_word_index()),
            typed: self.input.typed(),
            elapsed: self.elapsed(),
            word_outcomes: self.input.word_outcomes(),
            total_words: self.tokens.word_count(),
        };
        self.calculator.compute_aligned(&self.diff, &input)
    }

    fn reset_run(&mut self) {
        self.state = SessionState::Idle;
        self.generation += 1;
        self.started_at = None;
        self.running_since = None;
        self.banked = Duration::ZERO;
        self.last_keystroke_at = None;
        self.input.clear();
        self.refresh_diff();
        self.backspace_count = 0;
        self.timer.reset();
        self.idle.reset();
        self.report = None;
    }

    fn finalize(&mut self, reason: SubmitReason) -> &SessionReport {
        self.bank_running_time();
        if reason == SubmitReason::Timeout {
            // A late tick must not stretch the test past its length.
            self.banked = self.banked.min(self.timer.limit());
        }
        input::confirm_active_word(&mut self.input, &self.tokens);
        self.refresh_diff();

        let snapshot = self.measure();
        let feedback = self.feedback.generate(&snapshot);
        self.state = SessionState::Submitted;
        self.generation += 1;

        info!(
            exam = %self.exam,
            ?reason,
            gross = snapshot.gross_speed_wpm,
            net = snapshot.net_speed_wpm,
            accuracy = snapshot.accuracy_percent,
            qualified = snapshot.qualified,
            idle_secs = self.idle.idle_secs(),
            "session submitted"
        );

        self.report.insert(SessionReport {
            exam: self.exam.clone(),
            passage_title: self.passage.title.clone(),
            mode: self.mode,
            reason,
            duration_secs: self.timer.duration_secs(),
            snapshot,
            feedback,
            idle_secs: self.idle.idle_secs(),
            backspace_count: self.backspace_count,
            submitted_at: Utc::now(),
        })
    }
}
