// Generic panel: one endpoint, one collection, one load per lifetime.
//
// State machine: Idle -> Loading -> {Loaded | Failed}. Both end states are
// terminal. The collection is only ever replaced whole, on success.

use tracing::{debug, info};

use crate::model::Record;
use crate::protocol::{PanelId, PanelResult};

/// Lifecycle state of a single panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl PanelStatus {
    /// True once the panel has reached `Loaded` or `Failed`.
    pub fn is_settled(self) -> bool {
        matches!(self, PanelStatus::Loaded | PanelStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            PanelStatus::Idle => "idle",
            PanelStatus::Loading => "loading",
            PanelStatus::Loaded => "loaded",
            PanelStatus::Failed => "failed",
        }
    }
}

/// What happened when a loader result was offered to a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The collection was replaced with `rows` records.
    Loaded { rows: usize },
    /// The fetch failed; the collection is unchanged.
    Failed,
    /// The result was not applied (panel not loading, or board inactive).
    Ignored,
}

/// One independently fetched and rendered section of the board.
#[derive(Debug)]
pub struct Panel<R: Record> {
    endpoint: String,
    status: PanelStatus,
    rows: Vec<R>,
}

impl<R: Record> Panel<R> {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Panel {
            endpoint: endpoint.into(),
            status: PanelStatus::Idle,
            rows: Vec::new(),
        }
    }

    pub fn id(&self) -> PanelId {
        R::PANEL
    }

    /// Fully resolved URL this panel fetches from.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> PanelStatus {
        self.status
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Move `Idle -> Loading`. Returns false if the panel has already been
    /// started, since each panel loads at most once.
    pub fn begin_load(&mut self) -> bool {
        if self.status != PanelStatus::Idle {
            debug!("{} panel already {}, not loading again", R::PANEL, self.status.label());
            return false;
        }
        self.status = PanelStatus::Loading;
        true
    }

    /// Apply the loader's outcome. Only a `Loading` panel accepts one.
    pub fn resolve(&mut self, result: PanelResult<R>) -> Resolution {
        if self.status != PanelStatus::Loading {
            debug!(
                "Ignoring {} result for panel in state {}",
                R::PANEL,
                self.status.label()
            );
            return Resolution::Ignored;
        }

        match result {
            Ok(rows) => {
                let count = rows.len();
                self.rows = rows;
                self.status = PanelStatus::Loaded;
                info!("{} panel loaded {} rows", R::PANEL, count);
                Resolution::Loaded { rows: count }
            }
            Err(err) => {
                // Already reported to the diagnostic sink by the loader.
                debug!("{} panel failed: {}", R::PANEL, err);
                self.status = PanelStatus::Failed;
                Resolution::Failed
            }
        }
    }

    pub fn snapshot(&self) -> PanelSnapshot<R> {
        PanelSnapshot {
            endpoint: self.endpoint.clone(),
            status: self.status,
            rows: self.rows.clone(),
        }
    }
}

/// Owned, render-ready copy of a panel's state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSnapshot<R> {
    pub endpoint: String,
    pub status: PanelStatus,
    pub rows: Vec<R>,
}

impl<R: Record> PanelSnapshot<R> {
    pub fn empty(endpoint: impl Into<String>) -> Self {
        PanelSnapshot {
            endpoint: endpoint.into(),
            status: PanelStatus::Idle,
            rows: Vec::new(),
        }
    }

    /// Display cells for every row, in response order.
    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(R::cells).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
