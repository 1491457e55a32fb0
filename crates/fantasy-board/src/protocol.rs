// Message types shared between the panel loaders, the board orchestrator and
// the TUI.
//
// Loaders push exactly one `PanelEvent` each. The orchestrator pushes
// `UiUpdate`s to whichever surface is rendering, and receives `UserCommand`s
// back from it.

use std::fmt;

use crate::fetch::FetchError;
use crate::model::{LiveScore, PlayerRecommendation, Team};
use crate::panel::{PanelSnapshot, PanelStatus};

// ---------------------------------------------------------------------------
// Panel identity
// ---------------------------------------------------------------------------

/// Which of the three panels a message or record type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Recommendations,
    Teams,
    LiveScores,
}

/// How a panel lays out its rows in the HTML page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelLayout {
    Table,
    List,
}

impl PanelId {
    /// All panels in page order.
    pub const ALL: [PanelId; 3] = [PanelId::Recommendations, PanelId::Teams, PanelId::LiveScores];

    /// Short title used in logs and TUI block titles.
    pub fn title(self) -> &'static str {
        match self {
            PanelId::Recommendations => "Recommendations",
            PanelId::Teams => "Teams",
            PanelId::LiveScores => "Live Scores",
        }
    }

    /// Section heading above the panel in the HTML page. The recommendations
    /// table sits directly under the page title and has none.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            PanelId::Recommendations => None,
            PanelId::Teams => Some("Teams"),
            PanelId::LiveScores => Some("Live Scores"),
        }
    }

    pub fn layout(self) -> PanelLayout {
        match self {
            PanelId::Teams => PanelLayout::List,
            PanelId::Recommendations | PanelId::LiveScores => PanelLayout::Table,
        }
    }

    /// Column headers, one per cell produced by the record's row mapper.
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            PanelId::Recommendations => &["Player", "Team", "Position", "Score"],
            PanelId::Teams => &["Team", "ID", "Code"],
            PanelId::LiveScores => &["Home Team", "Away Team", "Home Score", "Away Score", "Status"],
        }
    }

    /// Endpoint path served by the fantasy service.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            PanelId::Recommendations => "/recommendations",
            PanelId::Teams => "/teams",
            PanelId::LiveScores => "/livescores",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

// ---------------------------------------------------------------------------
// Loader -> orchestrator
// ---------------------------------------------------------------------------

/// Outcome of one panel fetch: the full collection, or the failure.
pub type PanelResult<R> = Result<Vec<R>, FetchError>;

/// One-shot result delivered by a panel loader task.
#[derive(Debug)]
pub enum PanelEvent {
    Recommendations(PanelResult<PlayerRecommendation>),
    Teams(PanelResult<Team>),
    LiveScores(PanelResult<LiveScore>),
}

impl PanelEvent {
    pub fn panel(&self) -> PanelId {
        match self {
            PanelEvent::Recommendations(_) => PanelId::Recommendations,
            PanelEvent::Teams(_) => PanelId::Teams,
            PanelEvent::LiveScores(_) => PanelId::LiveScores,
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            PanelEvent::Recommendations(r) => r.is_ok(),
            PanelEvent::Teams(r) => r.is_ok(),
            PanelEvent::LiveScores(r) => r.is_ok(),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator <-> surface
// ---------------------------------------------------------------------------

/// Owned copy of everything a renderer needs from the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub recommendations: PanelSnapshot<PlayerRecommendation>,
    pub teams: PanelSnapshot<Team>,
    pub live_scores: PanelSnapshot<LiveScore>,
}

impl BoardSnapshot {
    pub fn status(&self, panel: PanelId) -> PanelStatus {
        match panel {
            PanelId::Recommendations => self.recommendations.status,
            PanelId::Teams => self.teams.status,
            PanelId::LiveScores => self.live_scores.status,
        }
    }

    pub fn row_count(&self, panel: PanelId) -> usize {
        match panel {
            PanelId::Recommendations => self.recommendations.rows.len(),
            PanelId::Teams => self.teams.rows.len(),
            PanelId::LiveScores => self.live_scores.rows.len(),
        }
    }

    /// Number of panels that have reached a terminal state.
    pub fn settled_count(&self) -> usize {
        PanelId::ALL
            .iter()
            .filter(|p| self.status(**p).is_settled())
            .count()
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        BoardSnapshot {
            recommendations: PanelSnapshot::empty(PanelId::Recommendations.default_endpoint()),
            teams: PanelSnapshot::empty(PanelId::Teams.default_endpoint()),
            live_scores: PanelSnapshot::empty(PanelId::LiveScores.default_endpoint()),
        }
    }
}

/// Updates pushed from the orchestrator to the rendering surface.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Full board state after a panel changed.
    Snapshot(Box<BoardSnapshot>),
    /// The board was torn down; no further snapshots follow.
    TornDown,
}

/// Commands sent from the rendering surface to the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FetchCause, FetchError};

    #[test]
    fn headers_match_page_columns() {
        assert_eq!(PanelId::Recommendations.headers().len(), 4);
        assert_eq!(PanelId::Teams.headers().len(), 3);
        assert_eq!(PanelId::LiveScores.headers().len(), 5);
    }

    #[test]
    fn default_endpoints() {
        assert_eq!(PanelId::Recommendations.default_endpoint(), "/recommendations");
        assert_eq!(PanelId::Teams.default_endpoint(), "/teams");
        assert_eq!(PanelId::LiveScores.default_endpoint(), "/livescores");
    }

    #[test]
    fn only_teams_is_a_list() {
        assert_eq!(PanelId::Teams.layout(), PanelLayout::List);
        assert_eq!(PanelId::Recommendations.layout(), PanelLayout::Table);
        assert_eq!(PanelId::LiveScores.layout(), PanelLayout::Table);
    }

    #[test]
    fn event_reports_its_panel() {
        let ok = PanelEvent::Teams(Ok(vec![]));
        assert_eq!(ok.panel(), PanelId::Teams);
        assert!(ok.is_success());

        let failed = PanelEvent::LiveScores(Err(FetchError::new(
            "http://localhost:5000/livescores",
            FetchCause::Status(500),
        )));
        assert_eq!(failed.panel(), PanelId::LiveScores);
        assert!(!failed.is_success());
    }

    #[test]
    fn default_snapshot_is_idle_and_empty() {
        let snapshot = BoardSnapshot::default();
        for panel in PanelId::ALL {
            assert_eq!(snapshot.status(panel), PanelStatus::Idle);
            assert_eq!(snapshot.row_count(panel), 0);
        }
        assert_eq!(snapshot.settled_count(), 0);
    }
}
