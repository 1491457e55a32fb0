// Status bar widget: board lifecycle, load progress, panel focus indicator.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{BoardSnapshot, PanelId};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [activity indicator] [load counter] [panel bar]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = activity_indicator(&state.snapshot, state.torn_down);
    spans.push(Span::styled(
        format!(" {} ", dot),
        Style::default().fg(dot_color),
    ));

    spans.push(Span::styled(
        progress_label(&state.snapshot),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
    spans.extend(panel_spans(state.focus));

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Return the activity dot character and its color.
///
/// Yellow while any panel is still loading, green once all have settled,
/// gray after the board has been torn down.
pub fn activity_indicator(snapshot: &BoardSnapshot, torn_down: bool) -> (&'static str, Color) {
    if torn_down {
        ("●", Color::Gray)
    } else if snapshot.settled_count() < PanelId::ALL.len() {
        ("●", Color::Yellow)
    } else {
        ("●", Color::Green)
    }
}

/// E.g. "2/3 loaded".
pub fn progress_label(snapshot: &BoardSnapshot) -> String {
    format!("{}/{} loaded", snapshot.settled_count(), PanelId::ALL.len())
}

/// Panel indicator spans with the focused panel highlighted.
/// E.g. "[Recommendations] [Teams] [Live Scores]"
pub fn panel_spans(focus: PanelId) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for panel in PanelId::ALL {
        let style = if panel == focus {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}]", panel.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelStatus;

    #[test]
    fn indicator_loading_then_settled() {
        let mut snapshot = BoardSnapshot::default();
        assert_eq!(activity_indicator(&snapshot, false).1, Color::Yellow);

        snapshot.recommendations.status = PanelStatus::Loaded;
        snapshot.teams.status = PanelStatus::Failed;
        snapshot.live_scores.status = PanelStatus::Loaded;
        assert_eq!(activity_indicator(&snapshot, false).1, Color::Green);
        assert_eq!(activity_indicator(&snapshot, true).1, Color::Gray);
    }

    #[test]
    fn progress_label_counts_settled_panels() {
        let mut snapshot = BoardSnapshot::default();
        assert_eq!(progress_label(&snapshot), "0/3 loaded");
        snapshot.teams.status = PanelStatus::Failed;
        assert_eq!(progress_label(&snapshot), "1/3 loaded");
    }

    #[test]
    fn panel_spans_highlight_focus() {
        let spans = panel_spans(PanelId::Teams);
        // 0=[Recommendations], 1=" ", 2=[Teams]
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[4].content.as_ref(), "[Live Scores]");
    }

    #[test]
    fn render_does_not_panic_with_defaults() {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
