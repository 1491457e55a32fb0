// The board: the rendering surface that owns the three panels.
//
// `mount` starts one loader task per panel. Each task sends exactly one
// `PanelEvent` back; `apply` routes it to its panel while the board is still
// active. After `teardown` every late result is discarded.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::fetch::{self, Transport};
use crate::model::{LiveScore, PlayerRecommendation, Record, Team};
use crate::panel::{Panel, Resolution};
use crate::protocol::{BoardSnapshot, PanelEvent, PanelId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board is already mounted")]
    AlreadyMounted,

    #[error("board has been torn down")]
    TornDown,
}

/// Where the board is in its own lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Mounted,
    TornDown,
}

pub struct Board {
    pub recommendations: Panel<PlayerRecommendation>,
    pub teams: Panel<Team>,
    pub live_scores: Panel<LiveScore>,
    lifecycle: Lifecycle,
}

impl Board {
    /// Build a board whose panels fetch from the configured endpoints.
    pub fn new(config: &Config) -> Self {
        Board::with_endpoints(
            config.endpoint_url(PanelId::Recommendations),
            config.endpoint_url(PanelId::Teams),
            config.endpoint_url(PanelId::LiveScores),
        )
    }

    pub fn with_endpoints(
        recommendations: impl Into<String>,
        teams: impl Into<String>,
        live_scores: impl Into<String>,
    ) -> Self {
        Board {
            recommendations: Panel::new(recommendations),
            teams: Panel::new(teams),
            live_scores: Panel::new(live_scores),
            lifecycle: Lifecycle::Created,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// The "still active" check: results are only applied while mounted.
    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    /// Start loading all three panels. Must be called from within a tokio
    /// runtime. Each panel gets its own task; there is no ordering between
    /// them.
    pub fn mount(
        &mut self,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn DiagnosticSink>,
        tx: mpsc::Sender<PanelEvent>,
    ) -> Result<Vec<JoinHandle<()>>, BoardError> {
        match self.lifecycle {
            Lifecycle::Created => {}
            Lifecycle::Mounted => return Err(BoardError::AlreadyMounted),
            Lifecycle::TornDown => return Err(BoardError::TornDown),
        }
        self.lifecycle = Lifecycle::Mounted;
        info!("Mounting board, fetching 3 panels");

        Ok(vec![
            spawn_loader(&mut self.recommendations, transport.clone(), sink.clone(), tx.clone()),
            spawn_loader(&mut self.teams, transport.clone(), sink.clone(), tx.clone()),
            spawn_loader(&mut self.live_scores, transport, sink, tx),
        ])
    }

    /// Route a loader result to its panel. Discarded once the board is no
    /// longer active.
    pub fn apply(&mut self, event: PanelEvent) -> Resolution {
        if !self.is_active() {
            debug!(
                "Discarding {} result, board is {:?}",
                event.panel(),
                self.lifecycle
            );
            return Resolution::Ignored;
        }

        match event {
            PanelEvent::Recommendations(result) => self.recommendations.resolve(result),
            PanelEvent::Teams(result) => self.teams.resolve(result),
            PanelEvent::LiveScores(result) => self.live_scores.resolve(result),
        }
    }

    /// Deactivate the board. In-flight loads keep running but their results
    /// will be ignored.
    pub fn teardown(&mut self) {
        if self.lifecycle != Lifecycle::TornDown {
            info!("Tearing down board ({} of 3 panels settled)", self.settled_count());
        }
        self.lifecycle = Lifecycle::TornDown;
    }

    /// True once every panel is `Loaded` or `Failed`.
    pub fn is_settled(&self) -> bool {
        self.settled_count() == PanelId::ALL.len()
    }

    fn settled_count(&self) -> usize {
        [
            self.recommendations.status(),
            self.teams.status(),
            self.live_scores.status(),
        ]
        .iter()
        .filter(|s| s.is_settled())
        .count()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            recommendations: self.recommendations.snapshot(),
            teams: self.teams.snapshot(),
            live_scores: self.live_scores.snapshot(),
        }
    }
}

/// Mark `panel` as loading and spawn its one-shot loader task.
fn spawn_loader<R: Record>(
    panel: &mut Panel<R>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn DiagnosticSink>,
    tx: mpsc::Sender<PanelEvent>,
) -> JoinHandle<()> {
    panel.begin_load();
    let url = panel.endpoint().to_string();
    tokio::spawn(async move {
        let result = fetch::load_panel::<R>(transport, sink, url).await;
        if tx.send(R::into_event(result)).await.is_err() {
            debug!("Board receiver dropped, {} result not delivered", R::PANEL);
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
