// Board orchestration.
//
// The central event loop that applies panel loader results to the board,
// reacts to user commands from the rendering surface, and pushes UI updates
// back to it. Panel state is only ever mutated here.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::board::Board;
use crate::panel::Resolution;
use crate::protocol::{BoardSnapshot, PanelEvent, UiUpdate, UserCommand};

/// When the event loop should stop on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Stop once every panel has settled (static page rendering).
    WhenSettled,
    /// Keep running until the user quits (terminal mode).
    OnQuit,
}

/// Run the board event loop.
///
/// Listens on two channels using `tokio::select!`:
/// 1. Panel loader results
/// 2. User commands from the rendering surface
///
/// Pushes a fresh snapshot through `ui_tx` after every applied result. The
/// board is torn down before returning; the returned snapshot is its final
/// state just before teardown.
pub async fn run(
    mut event_rx: mpsc::Receiver<PanelEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut board: Board,
    exit: ExitPolicy,
) -> anyhow::Result<BoardSnapshot> {
    info!("Board event loop started ({:?})", exit);

    // When all loaders are done the channel closes; stop polling it so
    // tokio::select! never spins on a closed receiver.
    let mut events_open = true;

    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(board.snapshot())))
        .await;

    loop {
        if exit == ExitPolicy::WhenSettled && (board.is_settled() || !events_open) {
            info!("All panels settled");
            break;
        }

        tokio::select! {
            // --- Panel loader results ---
            event = event_rx.recv(), if events_open => {
                match event {
                    Some(event) => {
                        let panel = event.panel();
                        match board.apply(event) {
                            Resolution::Ignored => {
                                debug!("{} result ignored", panel);
                            }
                            resolution => {
                                debug!("{} resolved: {:?}", panel, resolution);
                                let _ = ui_tx
                                    .send(UiUpdate::Snapshot(Box::new(board.snapshot())))
                                    .await;
                            }
                        }
                    }
                    None => {
                        info!("Panel loader channel closed");
                        events_open = false;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    let snapshot = board.snapshot();
    board.teardown();
    let _ = ui_tx.send(UiUpdate::TornDown).await;
    info!("Board event loop exiting");
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::diagnostics::RecordingSink;
    use crate::fetch::{FetchCause, FetchError, StaticResponse, StaticTransport};
    use crate::model::Team;
    use crate::panel::PanelStatus;
    use crate::protocol::PanelId;

    const REC: &str = "http://localhost:5000/recommendations";
    const TEAMS: &str = "http://localhost:5000/teams";
    const LIVE: &str = "http://localhost:5000/livescores";

    fn board() -> Board {
        Board::with_endpoints(REC, TEAMS, LIVE)
    }

    fn teams_body() -> &'static str {
        r#"[{"team_name":"Hawks","team_id":1610612737,"team_code":"ATL"},
            {"team_name":"Celtics","team_id":1610612738,"team_code":"BOS"}]"#
    }

    #[tokio::test]
    async fn event_loop_exits_when_settled() {
        let transport = StaticTransport::new()
            .with(REC, StaticResponse::ok("[]"))
            .with(TEAMS, StaticResponse::ok(teams_body()))
            .with(LIVE, StaticResponse::status(503));
        let sink = RecordingSink::new();

        let mut board = board();
        let (event_tx, event_rx) = mpsc::channel(8);
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, ui_rx) = mpsc::channel(16);
        drop(ui_rx);

        board
            .mount(Arc::new(transport), Arc::new(sink.clone()), event_tx)
            .unwrap();

        let snapshot = run(event_rx, cmd_rx, ui_tx, board, ExitPolicy::WhenSettled)
            .await
            .unwrap();

        assert_eq!(snapshot.status(PanelId::Recommendations), PanelStatus::Loaded);
        assert_eq!(snapshot.status(PanelId::Teams), PanelStatus::Loaded);
        assert_eq!(snapshot.status(PanelId::LiveScores), PanelStatus::Failed);
        assert_eq!(snapshot.teams.rows.len(), 2);
        assert_eq!(sink.entries().len(), 1);
    }

    #[tokio::test]
    async fn event_loop_handles_quit_command() {
        let (_event_tx, event_rx) = mpsc::channel::<PanelEvent>(8);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, _ui_rx) = mpsc::channel(16);

        let handle = tokio::spawn(run(event_rx, cmd_rx, ui_tx, board(), ExitPolicy::OnQuit));

        cmd_tx.send(UserCommand::Quit).await.unwrap();

        let snapshot = handle.await.unwrap().unwrap();
        assert_eq!(snapshot.settled_count(), 0);
    }

    #[tokio::test]
    async fn event_loop_pushes_snapshot_per_result() {
        let mut board = board();
        let (event_tx, event_rx) = mpsc::channel(8);
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, mut ui_rx) = mpsc::channel(16);

        // Mount against a transport whose tasks we ignore; results are fed
        // by hand through a separate sender.
        let (loader_tx, _loader_rx) = mpsc::channel(8);
        board
            .mount(
                Arc::new(StaticTransport::new()),
                Arc::new(RecordingSink::new()),
                loader_tx,
            )
            .unwrap();

        let handle = tokio::spawn(run(event_rx, cmd_rx, ui_tx, board, ExitPolicy::OnQuit));

        // Initial snapshot: everything loading.
        match ui_rx.recv().await.unwrap() {
            UiUpdate::Snapshot(s) => {
                assert_eq!(s.status(PanelId::Teams), PanelStatus::Loading);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        let teams: Vec<Team> = serde_json::from_str(teams_body()).unwrap();
        event_tx.send(PanelEvent::Teams(Ok(teams))).await.unwrap();

        match ui_rx.recv().await.unwrap() {
            UiUpdate::Snapshot(s) => {
                assert_eq!(s.status(PanelId::Teams), PanelStatus::Loaded);
                assert_eq!(s.row_count(PanelId::Teams), 2);
                assert_eq!(s.status(PanelId::LiveScores), PanelStatus::Loading);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        // A second result for the same panel is ignored: no snapshot.
        event_tx.send(PanelEvent::Teams(Ok(vec![]))).await.unwrap();
        event_tx
            .send(PanelEvent::LiveScores(Err(FetchError::new(LIVE, FetchCause::Status(500)))))
            .await
            .unwrap();

        match ui_rx.recv().await.unwrap() {
            UiUpdate::Snapshot(s) => {
                assert_eq!(s.row_count(PanelId::Teams), 2);
                assert_eq!(s.status(PanelId::LiveScores), PanelStatus::Failed);
            }
            other => panic!("Expected Snapshot, got {:?}", other),
        }

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let _ = handle.await;

        let mut saw_teardown = false;
        while let Some(update) = ui_rx.recv().await {
            if matches!(update, UiUpdate::TornDown) {
                saw_teardown = true;
            }
        }
        assert!(saw_teardown);
    }

    #[tokio::test]
    async fn event_loop_exits_when_loaders_vanish() {
        // Loader channel closes before any panel settles (e.g. a loader task
        // was aborted); WhenSettled must not hang.
        let mut board = board();
        let (loader_tx, _loader_rx) = mpsc::channel(8);
        board
            .mount(
                Arc::new(StaticTransport::new()),
                Arc::new(RecordingSink::new()),
                loader_tx,
            )
            .unwrap();

        let (event_tx, event_rx) = mpsc::channel::<PanelEvent>(8);
        drop(event_tx);
        let (_cmd_tx, cmd_rx) = mpsc::channel(8);
        let (ui_tx, _ui_rx) = mpsc::channel(16);

        let snapshot = run(event_rx, cmd_rx, ui_tx, board, ExitPolicy::WhenSettled)
            .await
            .unwrap();
        assert_eq!(snapshot.settled_count(), 0);
    }
}
