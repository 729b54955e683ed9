use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use examtyper::exam::ExamCategory;
use examtyper::session::state::TypingMode;

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

impl MenuItem {
    fn from_exam(index: usize, exam: &ExamCategory) -> Self {
        let p = &exam.policy;
        let rules = format!(
            "{} min, {} WPM, {}% accuracy, {}",
            exam.duration_secs / 60,
            p.min_gross_speed,
            p.min_accuracy,
            exam.mode.label()
        );
        let description = if exam.description.is_empty() {
            rules
        } else {
            format!("{} ({rules})", exam.description)
        };
        Self {
            key: (index + 1).to_string(),
            label: exam.name.clone(),
            description,
        }
    }
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    /// Mode forced on every exam, if the candidate picked one.
    pub mode_override: Option<TypingMode>,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(exams: &[ExamCategory], theme: &'a Theme) -> Self {
        Self {
            items: exams
                .iter()
                .enumerate()
                .map(|(i, e)| MenuItem::from_exam(i, e))
                .collect(),
            selected: 0,
            mode_override: None,
            theme,
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    /// Digit shortcut to an item index.
    pub fn index_for_key(&self, ch: char) -> Option<usize> {
        self.items.iter().position(|item| item.key.starts_with(ch) && item.key.len() == 1)
    }

    pub fn cycle_mode(&mut self) {
        self.mode_override = match self.mode_override {
            None => Some(TypingMode::ScreenTyping),
            Some(TypingMode::ScreenTyping) => Some(TypingMode::PaperTyping),
            Some(TypingMode::PaperTyping) => None,
        };
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(2),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "examtyper",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Typing tests for government exams",
                Style::default().fg(colors.fg()),
            )),
            Line::from(""),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(3))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };

            let label_text = format!(" {indicator} [{key}] {label}", key = item.key, label = item.label);
            let desc_text = format!("     {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if is_selected {
                            colors.accent()
                        } else {
                            colors.fg()
                        })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(
                    desc_text,
                    Style::default().fg(colors.text_pending()),
                )),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }

        let mode_text = match self.mode_override {
            Some(mode) => mode.label(),
            None => "exam default",
        };
        let footer = Line::from(vec![
            Span::styled("  [Enter] Start  ", Style::default().fg(colors.accent())),
            Span::styled("[m] Mode: ", Style::default().fg(colors.accent())),
            Span::styled(mode_text, Style::default().fg(colors.fg())),
            Span::styled("  [q] Quit", Style::default().fg(colors.accent())),
        ]);
        Paragraph::new(footer).render(layout[3], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu<'static> {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        Menu::new(&ExamCategory::all_from(None), theme)
    }

    #[test]
    fn test_menu_lists_every_exam_with_digit_keys() {
        let m = menu();
        assert_eq!(m.items.len(), 6);
        assert_eq!(m.items[0].key, "1");
        assert_eq!(m.index_for_key('3'), Some(2));
        assert_eq!(m.index_for_key('9'), None);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut m = menu();
        m.prev();
        assert_eq!(m.selected, 5);
        m.next();
        assert_eq!(m.selected, 0);
    }

    #[test]
    fn test_cycle_mode() {
        let mut m = menu();
        m.cycle_mode();
        assert_eq!(m.mode_override, Some(TypingMode::ScreenTyping));
        m.cycle_mode();
        assert_eq!(m.mode_override, Some(TypingMode::PaperTyping));
        m.cycle_mode();
        assert_eq!(m.mode_override, None);
    }
}
