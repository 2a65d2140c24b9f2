//! Shared helpers for session engine integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use meridian_core::clock::Clock;
use meridian_core::repository::SnapshotRepository;
use meridian_session::testing::RecordingPresenter;
use meridian_session::{EngineConfig, SessionEngine, SessionHandle, SharedRng};
use meridian_story::{
    Choice, ChoiceAction, ChoiceKind, Ending, ResourceEffect, ResourcePatch, StoryGraph,
    StoryNode,
};
use meridian_test_support::{FixedClock, InMemorySnapshotRepository, MinRng};

/// Engine plus the collaborators a test inspects.
pub struct Harness {
    pub engine: SessionEngine,
    pub handle: SessionHandle,
    pub presenter: Arc<RecordingPresenter>,
}

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Default config with fast mode on, so deliveries take milliseconds of
/// (paused) time.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        start_fast: true,
        ..EngineConfig::default()
    }
}

/// Builds an engine with a fixed clock and a minimum-rolling RNG.
pub fn harness(
    story: StoryGraph,
    snapshots: Arc<dyn SnapshotRepository>,
    config: EngineConfig,
) -> Harness {
    let presenter = Arc::new(RecordingPresenter::new());
    let rng: SharedRng = Arc::new(Mutex::new(MinRng));
    let (engine, handle) = SessionEngine::new(
        Arc::new(story),
        presenter.clone(),
        snapshots,
        fixed_clock(),
        rng,
        config,
    );
    Harness {
        engine,
        handle,
        presenter,
    }
}

/// Harness over `relay_story` with an in-memory snapshot repository.
pub fn relay_harness(telemetry: bool) -> (Harness, Arc<InMemorySnapshotRepository>) {
    let snapshots = Arc::new(InMemorySnapshotRepository::new());
    let harness = harness(relay_story(telemetry), snapshots.clone(), fast_config());
    (harness, snapshots)
}

fn choice(text: &str, kind: ChoiceKind, next: &str) -> Choice {
    Choice::new(text, kind, Some(next.to_owned()))
}

/// A small story:
///
/// ```text
/// start --supportive--> calm --supportive--> steady --supportive--> hatch
///   |                                                                 |-- safe --> rescued (ending)
///   |--urgent--> sprint --(delay)--> hatch                            |-- safe --> missing_node (dangling)
///   `--technical (no next)                                            `-- technical --> locker (dead end)
/// ```
///
/// With `telemetry`, the last start message carries the telemetry marker.
pub fn relay_story(telemetry: bool) -> StoryGraph {
    let link_line = if telemetry {
        "Patching my suit telemetry through now."
    } else {
        "Stay with me."
    };
    let mut keep_running = choice("Keep running!", ChoiceKind::Other, "hatch");
    keep_running.action = Some(ChoiceAction::Delay {
        message: Some("Alex is sprinting down the corridor...".into()),
        duration: Some(4000),
    });

    let nodes = vec![
        StoryNode::new(
            "start",
            vec!["Can you hear me?".into(), link_line.into()],
        )
        .with_choices(vec![
            choice("Breathe. I'm here.", ChoiceKind::Supportive, "calm"),
            choice("Run!", ChoiceKind::Urgent, "sprint"),
            Choice::new("Check the systems.", ChoiceKind::Technical, None),
        ]),
        StoryNode::new("calm", vec!["Okay... okay.".into()]).with_choices(vec![choice(
            "You're doing great.",
            ChoiceKind::Supportive,
            "steady",
        )]),
        StoryNode::new("steady", vec!["Better now.".into()]).with_choices(vec![choice(
            "Keep going.",
            ChoiceKind::Supportive,
            "hatch",
        )]),
        StoryNode::new("sprint", vec!["Running!".into()])
            .with_effects(ResourceEffect {
                set: None,
                drift: Some(ResourcePatch {
                    oxygen: Some(-10),
                    ..ResourcePatch::default()
                }),
            })
            .with_choices(vec![keep_running]),
        StoryNode::new("hatch", vec!["I'm at the hatch.".into()]).with_choices(vec![
            choice("Open it.", ChoiceKind::Safe, "rescued"),
            choice("Wander off.", ChoiceKind::Safe, "missing_node"),
            choice("Check the locker.", ChoiceKind::Technical, "locker"),
        ]),
        StoryNode::new("locker", vec!["It's empty.".into()]),
        StoryNode::new("rescued", vec!["I'm out!".into()]).with_ending(Ending {
            title: Some("Rescued".into()),
            message: Some("Alex made it.".into()),
        }),
    ];
    StoryGraph::new("start", vec!["LINK UP".into()], nodes).unwrap()
}
