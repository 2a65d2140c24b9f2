//! Runs the engine alongside the prompt reader.

use std::future::Future;
use std::io::Write;

use meridian_session::{CommandKind, SessionEngine, SessionHandle};
use tokio::io::AsyncBufRead;
use tracing::{debug, info};

use crate::error::AppError;
use crate::input::pump;
use crate::terminal::TerminalPresenter;

/// Drives `engine` with commands read from `reader` until the engine stops.
///
/// When `interrupt` resolves first, a shutdown is queued instead of waiting
/// for more input. Returns as soon as the engine is done, even if `reader`
/// is still blocked on a read, so the caller can tear the runtime down
/// without waiting for it.
///
/// # Errors
///
/// Returns `AppError::Io` if reading input fails.
pub async fn drive<R, W, I>(
    engine: SessionEngine,
    handle: SessionHandle,
    reader: R,
    presenter: &TerminalPresenter<W>,
    interrupt: I,
) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
    I: Future<Output = ()>,
{
    let input = async move {
        let result = tokio::select! {
            result = pump(reader, &handle, presenter) => result,
            () = interrupt => {
                info!("interrupt received; shutting down");
                // The engine may already be gone; nothing left to stop then.
                let _ = handle.send(CommandKind::Shutdown).await;
                Ok(())
            }
        };
        // Dropping the last handle lets the engine finish once input ends.
        drop(handle);
        result
    };
    let run = engine.run();
    tokio::pin!(run, input);

    tokio::select! {
        () = &mut run => {
            debug!("engine finished before input ended");
            Ok(())
        }
        result = &mut input => {
            run.await;
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{TimeZone, Utc};
    use meridian_session::testing::RecordingPresenter;
    use meridian_session::{EngineConfig, SessionSnapshot, SharedRng};
    use meridian_test_support::{FixedClock, InMemorySnapshotRepository, MinRng};
    use tokio::io::BufReader;

    use super::*;

    fn engine(
        snapshots: Arc<InMemorySnapshotRepository>,
    ) -> (SessionEngine, SessionHandle, Arc<RecordingPresenter>) {
        let recorder = Arc::new(RecordingPresenter::new());
        let rng: SharedRng = Arc::new(Mutex::new(MinRng));
        let (engine, handle) = SessionEngine::new(
            Arc::new(meridian_story::loader::bundled().unwrap()),
            recorder.clone(),
            snapshots,
            Arc::new(FixedClock(
                Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            )),
            rng,
            EngineConfig {
                start_fast: true,
                ..EngineConfig::default()
            },
        );
        (engine, handle, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_once_the_engine_stops_while_a_read_is_pending() {
        // Arrange
        let (engine, handle, _) = engine(Arc::new(InMemorySnapshotRepository::new()));
        let (_keyboard, stdin) = tokio::io::duplex(64);
        let observer = handle.clone();
        observer.send(CommandKind::Shutdown).await.unwrap();
        let terminal = TerminalPresenter::new(Vec::new());

        // Act
        let result = drive(
            engine,
            handle,
            BufReader::new(stdin),
            &terminal,
            std::future::pending(),
        )
        .await;

        // Assert
        assert!(result.is_ok());
        assert!(observer.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_shuts_the_engine_down() {
        // Arrange
        let (engine, handle, _) = engine(Arc::new(InMemorySnapshotRepository::new()));
        let (_keyboard, stdin) = tokio::io::duplex(64);
        let observer = handle.clone();
        let terminal = TerminalPresenter::new(Vec::new());

        // Act
        let result = drive(
            engine,
            handle,
            BufReader::new(stdin),
            &terminal,
            std::future::ready(()),
        )
        .await;

        // Assert
        assert!(result.is_ok());
        assert!(observer.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_saves_and_stops() {
        // Arrange
        let snapshots = Arc::new(InMemorySnapshotRepository::new());
        let (engine, handle, recorder) = engine(snapshots.clone());
        let typed: &[u8] = b"";
        let terminal = TerminalPresenter::new(Vec::new());

        // Act
        let result = drive(engine, handle, typed, &terminal, std::future::pending()).await;

        // Assert
        assert!(result.is_ok());
        assert!(!recorder.choice_offers().is_empty());
        let last = SessionSnapshot::from_stored(&snapshots.current().unwrap()).unwrap();
        assert_eq!(last.current_node, meridian_story::loader::bundled().unwrap().start_id());
    }
}
