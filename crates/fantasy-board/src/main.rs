// Fantasy board entry point.
//
// Startup sequence:
// 1. Parse CLI arguments
// 2. Load config, apply CLI overrides
// 3. Initialize tracing (file in --tui mode, stderr otherwise)
// 4. Create mpsc channels, mount the board (one loader task per panel)
// 5. Spawn the board event loop
// 6. Run the TUI, or wait for every panel to settle
// 7. Render the final snapshot to HTML

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use fantasy_board::app::{self, ExitPolicy};
use fantasy_board::board::Board;
use fantasy_board::config::{self, Config, ConfigOverrides};
use fantasy_board::diagnostics::TracingSink;
use fantasy_board::fetch::HttpTransport;
use fantasy_board::protocol::{BoardSnapshot, PanelId, UserCommand};
use fantasy_board::render::{render_page, PageOptions};
use fantasy_board::tui;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Fetch fantasy basketball recommendations, teams and live scores and
/// render them as a static HTML page.
struct Cli {
    /// Directory holding `defaults/` and `config/`.
    #[arg(long, value_name = "DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Override `service.base_url`.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Write the HTML page here instead of `output.path`. Use "-" for stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Show the board in the terminal until `q` is pressed.
    #[arg(long)]
    tui: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. CLI
    let cli = Cli::parse();

    // 2. Config
    let overrides = ConfigOverrides {
        base_url: cli.base_url.clone(),
        output: cli.output.clone(),
    };
    let config =
        config::load_config_in(&cli.base_dir, &overrides).context("failed to load configuration")?;

    // 3. Tracing
    init_tracing(&config, &cli.base_dir, cli.tui)?;
    info!("Fantasy board starting up");
    for panel in PanelId::ALL {
        info!("{} <- {}", panel, config.endpoint_url(panel));
    }

    // 4. Channels and board
    let (event_tx, event_rx) = mpsc::channel(PanelId::ALL.len());
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ui_tx, ui_rx) = mpsc::channel(64);

    let mut board = Board::new(&config);
    let loaders = board
        .mount(Arc::new(HttpTransport::new()), Arc::new(TracingSink), event_tx)
        .context("failed to mount board")?;

    // 5. Board event loop
    let exit = if cli.tui {
        ExitPolicy::OnQuit
    } else {
        ExitPolicy::WhenSettled
    };
    let app_handle = tokio::spawn(app::run(event_rx, cmd_rx, ui_tx, board, exit));

    // 6. Surface
    if cli.tui {
        if let Err(e) = tui::run(ui_rx, cmd_tx).await {
            error!("TUI error: {:#}", e);
        }
    } else {
        // No surface consumes UI updates in page mode.
        drop(ui_rx);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, rendering what has loaded so far");
                let _ = cmd_tx.send(UserCommand::Quit).await;
            }
        });
    }

    let snapshot = app_handle
        .await
        .context("board event loop panicked")?
        .context("board event loop failed")?;

    // Loaders whose results arrived after teardown are no longer needed.
    for loader in loaders {
        loader.abort();
    }

    info!(
        "Board settled: {}/{} panels ({} recommendations, {} teams, {} live scores)",
        snapshot.settled_count(),
        PanelId::ALL.len(),
        snapshot.row_count(PanelId::Recommendations),
        snapshot.row_count(PanelId::Teams),
        snapshot.row_count(PanelId::LiveScores),
    );

    // 7. HTML. In terminal mode only when an output was asked for.
    if !cli.tui || cli.output.is_some() {
        write_page(&config, &snapshot)?;
    }

    info!("Fantasy board shut down cleanly");
    Ok(())
}

fn write_page(config: &Config, snapshot: &BoardSnapshot) -> anyhow::Result<()> {
    let options = PageOptions::new(config.output.title.clone()).generated_at(Utc::now());
    let html = render_page(snapshot, &options);

    if config.writes_to_stdout() {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(html.as_bytes())
            .and_then(|_| stdout.flush())
            .context("failed to write page to stdout")?;
    } else {
        let path = Path::new(&config.output.path);
        std::fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}

/// Initialize tracing. The TUI owns the terminal, so in that mode logs go to
/// a file under `logging.log_dir`; otherwise they go to stderr.
fn init_tracing(config: &Config, base_dir: &Path, to_file: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true);

    if to_file {
        let log_dir = base_dir.join(&config.logging.log_dir);
        std::fs::create_dir_all(&log_dir)
            .with_context(|| format!("failed to create {}", log_dir.display()))?;
        let log_file = std::fs::File::create(log_dir.join("fantasy-board.log"))?;

        let subscriber = builder
            .with_writer(log_file)
            .with_ansi(false)
            .with_thread_ids(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("failed to set tracing subscriber")?;
    } else {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)
            .context("failed to set tracing subscriber")?;
    }

    Ok(())
}
