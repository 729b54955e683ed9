use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use examtyper::engine::metrics::{MetricsSnapshot, QualificationPolicy};
use examtyper::session::state::SessionState;

use crate::ui::theme::{Theme, ThemeColors};

pub struct StatsSidebar<'a> {
    snapshot: &'a MetricsSnapshot,
    policy: &'a QualificationPolicy,
    remaining_secs: u64,
    idle_secs: u64,
    state: SessionState,
    /// Paper typing keeps accuracy and mistakes to itself until submission.
    hide_accuracy: bool,
    theme: &'a Theme,
}

impl<'a> StatsSidebar<'a> {
    pub fn new(
        snapshot: &'a MetricsSnapshot,
        policy: &'a QualificationPolicy,
        remaining_secs: u64,
        idle_secs: u64,
        state: SessionState,
        hide_accuracy: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            snapshot,
            policy,
            remaining_secs,
            idle_secs,
            state,
            hide_accuracy,
            theme,
        }
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// One-line stats for layouts without a sidebar.
pub fn compact_stats(snapshot: &MetricsSnapshot, remaining_secs: u64, hide_accuracy: bool) -> String {
    if hide_accuracy {
        format!(
            "{}  |  {} WPM",
            format_clock(remaining_secs),
            snapshot.gross_speed_wpm
        )
    } else {
        format!(
            "{}  |  {} WPM  |  net {}  |  {}%  |  {} err",
            format_clock(remaining_secs),
            snapshot.gross_speed_wpm,
            snapshot.net_speed_wpm,
            snapshot.accuracy_percent,
            snapshot.mistake_count
        )
    }
}

fn threshold_color(colors: &ThemeColors, value: u32, min: u32) -> Color {
    if value >= min {
        colors.success()
    } else if value + 10 >= min {
        colors.warning()
    } else {
        colors.error()
    }
}

fn row<'s>(label: &'s str, value: String, color: Color, colors: &ThemeColors) -> Line<'s> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(colors.fg())),
        Span::styled(value, Style::default().fg(color)),
    ])
}

impl Widget for StatsSidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let s = self.snapshot;

        let state_label = match self.state {
            SessionState::Idle => "Type to begin",
            SessionState::Running => "Running",
            SessionState::Paused => "Paused",
            SessionState::Submitted => "Submitted",
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format_clock(self.remaining_secs),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(state_label, Style::default().fg(colors.text_pending()))),
            Line::from(""),
            row(
                "Gross: ",
                format!("{} WPM", s.gross_speed_wpm),
                threshold_color(colors, s.gross_speed_wpm, self.policy.min_gross_speed),
                colors,
            ),
        ];

        if self.hide_accuracy {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Accuracy shown after submit",
                Style::default().fg(colors.text_pending()),
            )));
        } else {
            lines.push(row("Net:   ", format!("{} WPM", s.net_speed_wpm), colors.accent(), colors));
            lines.push(Line::from(""));
            lines.push(row(
                "Accuracy: ",
                format!("{}%", s.accuracy_percent),
                threshold_color(colors, s.accuracy_percent, self.policy.min_accuracy),
                colors,
            ));
            lines.push(row(
                "Mistakes: ",
                format!("{} ({} punct.)", s.mistake_count, s.punctuation_mistake_count),
                colors.error(),
                colors,
            ));
            lines.push(Line::from(""));
            lines.push(row(
                "Words: ",
                format!("{}/{}", s.correct_words, s.total_words),
                colors.success(),
                colors,
            ));
            lines.push(row("Wrong: ", s.incorrect_words.to_string(), colors.error(), colors));
        }

        lines.push(Line::from(""));
        lines.push(row("Time:  ", format!("{}s", s.time_taken_secs), colors.fg(), colors));
        if self.idle_secs > 0 {
            lines.push(row("Idle:  ", format!("{}s", self.idle_secs), colors.warning(), colors));
        }

        let block = Block::bordered()
            .title(" Stats ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
