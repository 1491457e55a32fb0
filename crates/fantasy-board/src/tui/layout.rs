// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the board:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Recommendations (55%)                             |
// +-------------------------+------------------------+
// | Teams (40%)             | Live Scores (60%)      |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::protocol::PanelId;

/// Resolved screen areas for each board zone.
#[derive(Debug, Clone)]
pub struct BoardLayout {
    /// Top row: load progress and focused panel.
    pub status_bar: Rect,
    pub recommendations: Rect,
    pub teams: Rect,
    pub live_scores: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

impl BoardLayout {
    pub fn panel_area(&self, panel: PanelId) -> Rect {
        match panel {
            PanelId::Recommendations => self.recommendations,
            PanelId::Teams => self.teams,
            PanelId::LiveScores => self.live_scores,
        }
    }
}

/// Build the board layout from the available terminal area.
pub fn build_layout(area: Rect) -> BoardLayout {
    // Vertical: status(1) | recommendations | bottom row | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),       // status bar
            Constraint::Percentage(55),  // recommendations
            Constraint::Min(5),          // teams + live scores
            Constraint::Length(1),       // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let recommendations = vertical[1];
    let bottom = vertical[2];
    let help_bar = vertical[3];

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(bottom);

    BoardLayout {
        status_bar,
        recommendations,
        teams: horizontal[0],
        live_scores: horizontal[1],
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    fn all_rects(layout: &BoardLayout) -> [(&'static str, Rect); 5] {
        [
            ("status_bar", layout.status_bar),
            ("recommendations", layout.recommendations),
            ("teams", layout.teams),
            ("live_scores", layout.live_scores),
            ("help_bar", layout.help_bar),
        ]
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for (name, rect) in all_rects(&layout) {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{} has zero area: {:?}",
                name,
                rect
            );
        }
    }

    #[test]
    fn layout_bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_bottom_row_side_by_side() {
        let layout = build_layout(test_area());
        assert_eq!(layout.teams.y, layout.live_scores.y);
        assert!(layout.teams.x < layout.live_scores.x);
        assert!(layout.recommendations.y < layout.teams.y);
        assert!(layout.live_scores.width > layout.teams.width);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for (name, rect) in all_rects(&layout) {
            assert!(rect.x + rect.width <= area.width, "{name} exceeds width");
            assert!(rect.y + rect.height <= area.height, "{name} exceeds height");
        }
    }

    #[test]
    fn panel_area_maps_each_panel() {
        let layout = build_layout(test_area());
        assert_eq!(layout.panel_area(PanelId::Teams), layout.teams);
        assert_eq!(layout.panel_area(PanelId::LiveScores), layout.live_scores);
        assert_eq!(layout.panel_area(PanelId::Recommendations), layout.recommendations);
    }
}
