// Panel widget: one board panel as a table.
//
// Header row from the panel's column headers, one row per record in
// response order. The block title carries the panel's load status.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::model::Record;
use crate::panel::{PanelSnapshot, PanelStatus};

/// Render `panel` into the given area, starting at row `scroll`.
///
/// When `focused` is true, the border is highlighted to indicate this panel
/// receives scroll keys.
pub fn render<R: Record>(
    frame: &mut Frame,
    area: Rect,
    panel: &PanelSnapshot<R>,
    scroll: usize,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(panel_title(panel));

    if panel.rows.is_empty() {
        let paragraph = Paragraph::new(empty_message(panel.status))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let headers = R::PANEL.headers();
    let header = Row::new(headers.iter().map(|h| Cell::from(*h)).collect::<Vec<_>>()).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let visible_rows = visible_rows(area);
    let scroll = clamp_scroll(scroll, panel.rows.len(), visible_rows);

    let rows: Vec<Row> = panel
        .rows
        .iter()
        .skip(scroll)
        .take(visible_rows)
        .map(|record| Row::new(record.cells().into_iter().map(Cell::from).collect::<Vec<_>>()))
        .collect();

    let widths = column_widths(headers.len());
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

/// Block title, e.g. "Teams (30)" once loaded or "Teams (loading)".
pub fn panel_title<R: Record>(panel: &PanelSnapshot<R>) -> String {
    match panel.status {
        PanelStatus::Loaded => format!("{} ({})", R::PANEL.title(), panel.rows.len()),
        status => format!("{} ({})", R::PANEL.title(), status.label()),
    }
}

/// Placeholder text for a panel with no rows.
pub fn empty_message(status: PanelStatus) -> &'static str {
    match status {
        PanelStatus::Idle | PanelStatus::Loading => "  Loading...",
        PanelStatus::Loaded | PanelStatus::Failed => "  No rows",
    }
}

/// Number of data rows a panel drawn in `area` can show (borders and the
/// header row excluded).
pub fn visible_rows(area: Rect) -> usize {
    (area.height as usize).saturating_sub(3).max(1)
}

/// Keep at least one page of rows visible.
pub fn clamp_scroll(scroll: usize, total: usize, visible: usize) -> usize {
    scroll.min(total.saturating_sub(visible))
}

fn column_widths(columns: usize) -> Vec<Constraint> {
    let n = columns.max(1) as u32;
    (0..n).map(|_| Constraint::Ratio(1, n)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
