//! Meridian terminal host entry point.

use std::sync::{Arc, Mutex};

use meridian_cli::config::CliConfig;
use meridian_cli::error::AppError;
use meridian_cli::host::drive;
use meridian_cli::terminal::TerminalPresenter;
use meridian_core::clock::SystemClock;
use meridian_core::rng::SeededRng;
use meridian_session::{SessionEngine, SharedRng};
use meridian_snapshot_store::FileSnapshotRepository;
use meridian_story::loader;
use tokio::io::BufReader;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), AppError> {
    // Logs go to stderr so they never interleave with the transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let runtime = Runtime::new()?;
    let result = runtime.block_on(serve());
    // Stdin reads run on a blocking thread that cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn serve() -> Result<(), AppError> {
    let config = CliConfig::from_env()?;
    tracing::info!(
        snapshot_path = %config.snapshot_path.display(),
        seeded = config.seed.is_some(),
        "Starting Meridian"
    );

    let story = match &config.story_path {
        Some(path) => loader::from_path(path)?,
        None => loader::bundled()?,
    };
    let rng: SharedRng = match config.seed {
        Some(seed) => Arc::new(Mutex::new(SeededRng::from_seed(seed))),
        None => Arc::new(Mutex::new(SeededRng::from_os())),
    };
    let presenter = Arc::new(TerminalPresenter::stdout());

    let (engine, handle) = SessionEngine::new(
        Arc::new(story),
        presenter.clone(),
        Arc::new(FileSnapshotRepository::new(&config.snapshot_path)),
        Arc::new(SystemClock),
        rng,
        config.engine_config(),
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "interrupt handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    drive(engine, handle, stdin, presenter.as_ref(), interrupt).await?;
    tracing::info!("Session closed");
    Ok(())
}
