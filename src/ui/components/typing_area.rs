use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use examtyper::engine::diff::{Diff, Mark};

use crate::ui::theme::Theme;

/// The passage to copy, coloured by the alignment when one is visible.
pub struct TypingArea<'a> {
    expected: &'a [char],
    diff: Option<&'a Diff>,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> TypingArea<'a> {
    pub fn new(expected: &'a [char], diff: Option<&'a Diff>, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            expected,
            diff,
            title,
            theme,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Plain,
    Pending,
    Cursor,
    Correct,
    Wrong,
}

fn cells(len: usize, diff: Option<&Diff>) -> Vec<Cell> {
    let Some(diff) = diff else {
        return vec![Cell::Plain; len];
    };

    let mut cells = vec![Cell::Pending; len];
    let mut cursor = None;
    for entry in diff.entries() {
        let Some(i) = entry.expected_index else { continue };
        if i >= len {
            continue;
        }
        cells[i] = match entry.mark {
            Mark::Match => Cell::Correct,
            Mark::Untyped => {
                cursor.get_or_insert(i);
                Cell::Pending
            }
            _ => Cell::Wrong,
        };
    }

    // Past the alignment window the next char to type is the window end.
    let cursor = cursor.or_else(|| {
        diff.entries()
            .iter()
            .filter_map(|e| e.expected_index)
            .max()
            .map(|i| i + 1)
            .or(Some(0))
    });
    if let Some(i) = cursor.filter(|&i| i < len) {
        cells[i] = Cell::Cursor;
    }
    cells
}

impl Widget for TypingArea<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let spans: Vec<Span> = self
            .expected
            .iter()
            .zip(cells(self.expected.len(), self.diff))
            .map(|(&ch, cell)| {
                let style = match cell {
                    Cell::Plain => Style::default().fg(colors.fg()),
                    Cell::Pending => Style::default().fg(colors.text_pending()),
                    Cell::Cursor => Style::default()
                        .fg(colors.text_cursor_fg())
                        .bg(colors.text_cursor_bg()),
                    Cell::Correct => Style::default().fg(colors.text_correct()),
                    Cell::Wrong => Style::default()
                        .fg(colors.text_incorrect())
                        .bg(colors.text_incorrect_bg())
                        .add_modifier(Modifier::UNDERLINED),
                };
                Span::styled(ch.to_string(), style)
            })
            .collect();

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// What the candidate has typed so far, always uncoloured.
pub struct TypedText<'a> {
    typed: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> TypedText<'a> {
    pub fn new(typed: &'a str, focused: bool, theme: &'a Theme) -> Self {
        Self {
            typed,
            focused,
            theme,
        }
    }
}

impl Widget for TypedText<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let mut spans = vec![Span::styled(
            self.typed,
            Style::default().fg(colors.text_typed()),
        )];
        if self.focused {
            spans.push(Span::styled(
                " ",
                Style::default().bg(colors.text_cursor_bg()),
            ));
        }

        let block = Block::bordered()
            .title(" Your typing ")
            .border_style(Style::default().fg(if self.focused {
                colors.border_focused()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(Line::from(spans))
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use examtyper::engine::diff::align;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_hidden_diff_renders_plain() {
        assert_eq!(cells(3, None), vec![Cell::Plain; 3]);
    }

    #[test]
    fn test_cursor_sits_on_first_untyped_char() {
        let diff = align(&chars("abcd"), &chars("ax"));
        assert_eq!(
            cells(6, Some(&diff)),
            vec![
                Cell::Correct,
                Cell::Wrong,
                Cell::Cursor,
                Cell::Pending,
                Cell::Pending,
                Cell::Pending,
            ]
        );
    }

    #[test]
    fn test_cursor_after_complete_window() {
        let diff = align(&chars("ab"), &chars("ab"));
        assert_eq!(
            cells(4, Some(&diff)),
            vec![Cell::Correct, Cell::Correct, Cell::Cursor, Cell::Pending]
        );
    }

    #[test]
    fn test_empty_typing_puts_cursor_at_start() {
        let diff = align(&chars("ab"), &[]);
        assert_eq!(cells(2, Some(&diff))[0], Cell::Cursor);
    }
}
