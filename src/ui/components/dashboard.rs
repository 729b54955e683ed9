use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use examtyper::engine::metrics::QualificationPolicy;
use examtyper::session::report::{SessionReport, SubmitReason};

use crate::ui::components::stats_sidebar::format_clock;
use crate::ui::theme::Theme;

pub struct Dashboard<'a> {
    pub report: &'a SessionReport,
    pub policy: &'a QualificationPolicy,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(report: &'a SessionReport, policy: &'a QualificationPolicy, theme: &'a Theme) -> Self {
        Self {
            report,
            policy,
            theme,
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let r = self.report;
        let s = &r.snapshot;

        let block = Block::bordered()
            .title(format!(" {} : {} ", r.exam, r.passage_title))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(7),
                Constraint::Min(4),
                Constraint::Length(2),
            ])
            .split(inner);

        let (verdict, verdict_color) = if s.qualified {
            ("QUALIFIED", colors.success())
        } else {
            ("NOT QUALIFIED", colors.error())
        };
        let reason = match r.reason {
            SubmitReason::Manual => "submitted",
            SubmitReason::Timeout => "time up",
        };
        Paragraph::new(Line::from(vec![
            Span::styled(
                verdict,
                Style::default()
                    .fg(verdict_color)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({reason}, {})", r.mode.label()),
                Style::default().fg(colors.text_pending()),
            ),
        ]))
        .alignment(Alignment::Center)
        .render(layout[0], buf);

        let label = |text: &'static str| Span::styled(text, Style::default().fg(colors.fg()));
        let pass_fail = |ok: bool| if ok { colors.success() } else { colors.error() };
        let detail = |text: String| Span::styled(text, Style::default().fg(colors.text_pending()));

        let figures = vec![
            Line::from(vec![
                label("  Gross speed: "),
                Span::styled(
                    format!("{} WPM", s.gross_speed_wpm),
                    Style::default()
                        .fg(pass_fail(s.gross_speed_wpm >= self.policy.min_gross_speed))
                        .add_modifier(Modifier::BOLD),
                ),
                detail(format!("  (need {})", self.policy.min_gross_speed)),
            ]),
            Line::from(vec![
                label("  Net speed:   "),
                Span::styled(format!("{} WPM", s.net_speed_wpm), Style::default().fg(colors.accent())),
            ]),
            Line::from(vec![
                label("  Accuracy:    "),
                Span::styled(
                    format!("{}%", s.accuracy_percent),
                    Style::default()
                        .fg(pass_fail(s.accuracy_percent >= self.policy.min_accuracy))
                        .add_modifier(Modifier::BOLD),
                ),
                detail(format!("  ({}/{} chars correct)", s.correct_chars, s.typed_chars)),
            ]),
            Line::from(vec![
                label("  Mistakes:    "),
                Span::styled(s.mistake_count.to_string(), Style::default().fg(colors.error())),
                detail(format!("  ({} punctuation)", s.punctuation_mistake_count)),
            ]),
            Line::from(vec![
                label("  Words:       "),
                Span::styled(
                    format!("{} correct, {} wrong", s.correct_words, s.incorrect_words),
                    Style::default().fg(colors.fg()),
                ),
                detail(format!("  of {}", s.total_words)),
            ]),
            Line::from(vec![
                label("  Time:        "),
                Span::styled(format_clock(s.time_taken_secs), Style::default().fg(colors.fg())),
                detail(format!(
                    "  (idle {}s, {} backspaces)",
                    r.idle_secs, r.backspace_count
                )),
            ]),
        ];
        Paragraph::new(figures).render(layout[1], buf);

        let mut feedback = vec![
            Line::from(Span::styled(
                r.feedback.text.as_str(),
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        for suggestion in &r.feedback.suggestions {
            feedback.push(Line::from(vec![
                Span::styled("  \u{2022} ", Style::default().fg(colors.accent())),
                Span::styled(suggestion.as_str(), Style::default().fg(colors.fg())),
            ]));
        }
        Paragraph::new(feedback)
            .block(
                Block::bordered()
                    .title(" Feedback ")
                    .border_style(Style::default().fg(colors.border())),
            )
            .wrap(Wrap { trim: true })
            .render(layout[2], buf);

        Paragraph::new(Line::from(vec![
            Span::styled("  [r] Retry  ", Style::default().fg(colors.accent())),
            Span::styled("[n] New passage  ", Style::default().fg(colors.accent())),
            Span::styled("[Esc] Menu  ", Style::default().fg(colors.accent())),
            Span::styled("[q] Quit", Style::default().fg(colors.accent())),
        ]))
        .render(layout[3], buf);
    }
}
