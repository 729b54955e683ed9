use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥100 cols: passage + sidebar, countdown bar
    Medium, // 60-99 cols: full-width passage, stats in the header, countdown bar
    Narrow, // <60 cols: full-width passage, stats in the header
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 100 {
            LayoutTier::Wide
        } else if area.width >= 60 {
            LayoutTier::Medium
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn show_progress_bar(&self, height: u16) -> bool {
        height >= 20 && *self != LayoutTier::Narrow
    }

    pub fn show_sidebar(&self) -> bool {
        *self == LayoutTier::Wide
    }
}

/// Regions of the test screen.
pub struct TestLayout {
    pub header: Rect,
    pub passage: Rect,
    pub typed: Rect,
    pub sidebar: Option<Rect>,
    pub countdown: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl TestLayout {
    pub fn new(area: Rect) -> Self {
        let tier = LayoutTier::from_area(area);
        let countdown_height = if tier.show_progress_bar(area.height) { 3 } else { 0 };

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(countdown_height),
                Constraint::Length(2),
            ])
            .split(area);

        let (content, sidebar) = if tier.show_sidebar() {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
                .split(vertical[1]);
            (horizontal[0], Some(horizontal[1]))
        } else {
            (vertical[1], None)
        };

        let stacked = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(content);

        Self {
            header: vertical[0],
            passage: stacked[0],
            typed: stacked[1],
            sidebar,
            countdown: (countdown_height > 0).then_some(vertical[2]),
            footer: vertical[3],
            tier,
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 60;
    const MIN_POPUP_HEIGHT: u16 = 18;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_layout_has_sidebar_and_countdown() {
        let layout = TestLayout::new(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.tier, LayoutTier::Wide);
        assert!(layout.sidebar.is_some());
        assert!(layout.countdown.is_some());
    }

    #[test]
    fn test_narrow_layout_drops_sidebar_and_countdown() {
        let layout = TestLayout::new(Rect::new(0, 0, 50, 40));
        assert_eq!(layout.tier, LayoutTier::Narrow);
        assert!(layout.sidebar.is_none());
        assert!(layout.countdown.is_none());
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[Tab] Pause", "[Ctrl-S] Submit", "[Esc] Restart"], 30);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  [Tab] Pause"));
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 50, 10);
        let r = centered_rect(50, 50, area);
        assert!(r.width <= area.width && r.height <= area.height);
    }
}
