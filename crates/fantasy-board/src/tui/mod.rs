// Terminal board: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the latest `BoardSnapshot`. The board
// event loop pushes `UiUpdate` messages over an mpsc channel; the TUI applies
// them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{BoardSnapshot, PanelId, UiUpdate, UserCommand};

use layout::{build_layout, BoardLayout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state mirroring the board for rendering.
pub struct ViewState {
    /// Latest snapshot pushed by the board event loop.
    pub snapshot: BoardSnapshot,
    /// Panel that receives scroll keys.
    pub focus: PanelId,
    /// Per-panel scroll offsets.
    pub scroll_offset: HashMap<PanelId, usize>,
    /// Per-panel data rows that fit on screen, from the last layout pass.
    pub visible_rows: HashMap<PanelId, usize>,
    /// Set once the board has been torn down.
    pub torn_down: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            snapshot: BoardSnapshot::default(),
            focus: PanelId::Recommendations,
            scroll_offset: HashMap::new(),
            visible_rows: HashMap::new(),
            torn_down: false,
        }
    }
}

impl ViewState {
    pub fn scroll(&self, panel: PanelId) -> usize {
        self.scroll_offset.get(&panel).copied().unwrap_or(0)
    }

    /// Largest useful scroll offset for `panel`: the last full page.
    /// Before the first layout pass one row is assumed visible.
    pub fn max_scroll(&self, panel: PanelId) -> usize {
        let visible = self.visible_rows.get(&panel).copied().unwrap_or(1);
        self.snapshot.row_count(panel).saturating_sub(visible)
    }

    /// Record how many rows each panel can show in a terminal of size
    /// `area`, and pull stored offsets back within range.
    pub fn update_viewport(&mut self, area: Rect) {
        let layout = build_layout(area);
        for panel in PanelId::ALL {
            self.visible_rows
                .insert(panel, widgets::panel::visible_rows(layout.panel_area(panel)));
            let max = self.max_scroll(panel);
            if let Some(offset) = self.scroll_offset.get_mut(&panel) {
                *offset = (*offset).min(max);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            state.snapshot = *snapshot;
        }
        UiUpdate::TornDown => {
            state.torn_down = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete board frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    render_panels(frame, &layout, state);
    render_help_bar(frame, &layout);
}

fn render_panels(frame: &mut Frame, layout: &BoardLayout, state: &ViewState) {
    let snapshot = &state.snapshot;
    widgets::panel::render(
        frame,
        layout.panel_area(PanelId::Recommendations),
        &snapshot.recommendations,
        state.scroll(PanelId::Recommendations),
        state.focus == PanelId::Recommendations,
    );
    widgets::panel::render(
        frame,
        layout.panel_area(PanelId::Teams),
        &snapshot.teams,
        state.scroll(PanelId::Teams),
        state.focus == PanelId::Teams,
    );
    widgets::panel::render(
        frame,
        layout.panel_area(PanelId::LiveScores),
        &snapshot.live_scores,
        state.scroll(PanelId::LiveScores),
        state.focus == PanelId::LiveScores,
    );
}

fn render_help_bar(frame: &mut Frame, layout: &BoardLayout) {
    let text = " q:Quit | Tab/1-3:Focus | j/k:Scroll | PgUp/PgDn:Page";
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            text,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Board event loop has exited.
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Ok(size) = terminal.size() {
                    view_state.update_viewport(Rect::new(0, 0, size.width, size.height));
                }
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
