//! Stdin commands driving a real engine.

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use meridian_cli::input::pump;
use meridian_cli::terminal::TerminalPresenter;
use meridian_session::testing::RecordingPresenter;
use meridian_session::{EngineConfig, SessionEngine, SharedRng};
use meridian_test_support::{EmptySnapshotRepository, FixedClock, MinRng};

#[tokio::test(start_paused = true)]
async fn test_typed_commands_reach_the_engine_until_quit() {
    // Arrange
    let recorder = Arc::new(RecordingPresenter::new());
    let rng: SharedRng = Arc::new(Mutex::new(MinRng));
    let (engine, handle) = SessionEngine::new(
        Arc::new(meridian_story::loader::bundled().unwrap()),
        recorder.clone(),
        Arc::new(EmptySnapshotRepository),
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        )),
        rng,
        EngineConfig::default(),
    );
    let terminal = TerminalPresenter::new(Vec::new());
    let typed: &[u8] = b"f\nbogus\n\nq\nr\n";

    // Act
    pump(typed, &handle, &terminal).await.unwrap();
    engine.run().await;

    // Assert
    assert!(
        recorder
            .system_messages()
            .contains(&"FAST MODE ENABLED".to_owned())
    );
    assert!(handle.is_closed());
    let hints = String::from_utf8(terminal.into_inner()).unwrap();
    assert_eq!(hints, "  (unrecognized input: bogus)\n");
}

#[tokio::test]
async fn test_pump_stops_once_the_engine_is_gone() {
    let rng: SharedRng = Arc::new(Mutex::new(MinRng));
    let (engine, handle) = SessionEngine::new(
        Arc::new(meridian_story::loader::bundled().unwrap()),
        Arc::new(RecordingPresenter::new()),
        Arc::new(EmptySnapshotRepository),
        Arc::new(FixedClock(Utc::now())),
        rng,
        EngineConfig::default(),
    );
    drop(engine);
    let terminal = TerminalPresenter::new(Vec::new());
    let typed: &[u8] = b"1\n2\n";

    let result = pump(typed, &handle, &terminal).await;

    assert!(result.is_ok());
}
