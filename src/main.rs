use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use env_logger::Builder;
use log::{error, info, warn, LevelFilter};
use tokio::net::TcpListener;

use sudoku_server::server::{app, AppState};
use sudoku_server::{Config, LogNotifier, PuzzleKind, Result};

#[tokio::main]
async fn main() -> ExitCode {
    setup_logger();
    info!("Sudoku Server starting...");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Server stopped: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    info!("Data directory: {}", config.data_dir.display());
    info!("Upload directory: {}", config.upload_dir.display());

    for kind in [PuzzleKind::Normal, PuzzleKind::Variant] {
        let path = kind.store_path(&config.data_dir);
        if !path.exists() {
            // Requests for this kind will answer with an error until it appears.
            warn!("Puzzle store missing: {}", path.display());
        }
    }

    let notifier = Arc::new(LogNotifier::new(config.notify_address.clone()));
    let addr = config.bind_addr;
    let state = Arc::new(AppState::new(config, notifier));

    let listener = TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn setup_logger() {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .init();
}
