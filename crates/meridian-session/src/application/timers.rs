//! Background decay timers.
//!
//! One task owns four intervals and applies whichever tick fires first. The
//! task checks the shared state's decay epoch under the state lock before
//! every mutation, so once [`DecayTimers::cancel`] returns no tick can
//! mutate state or refresh the presenter.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, interval_at};
use tracing::{debug, warn};

use super::lock;
use super::presenter::{Presenter, Sender};
use crate::application::engine::SharedRng;
use crate::domain::decay::{self, DecayNotice, DecaySchedule, DecayTick};
use crate::domain::state::SessionState;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Collaborators of the timer task.
pub(crate) struct TickContext {
    pub(crate) state: Arc<Mutex<SessionState>>,
    pub(crate) rng: SharedRng,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) schedule: DecaySchedule,
    pub(crate) unit: Duration,
}

/// Handle to a running set of decay ticks.
pub(crate) struct DecayTimers {
    handle: JoinHandle<()>,
}

enum TickOutcome {
    Continue,
    Critical,
    Stopped,
}

impl DecayTimers {
    /// Spawns the ticks at the cadence implied by the current state. The
    /// caller must have bumped the state's decay epoch beforehand if older
    /// timers may still exist.
    pub(crate) fn launch(ctx: TickContext) -> Self {
        let (epoch, critical) = {
            let state = lock(&ctx.state);
            (state.decay_epoch, state.critical_event_fired)
        };
        debug!(epoch, critical, "decay timers launched");
        Self {
            handle: tokio::spawn(run(ctx, epoch, critical)),
        }
    }

    /// Stops every tick. No tick fires after this returns.
    pub(crate) async fn cancel(self, state: &Mutex<SessionState>) {
        {
            let mut state = lock(state);
            state.decay_epoch += 1;
        }
        self.handle.abort();
        if let Err(e) = self.handle.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "decay timer task failed");
        }
    }
}

fn every(unit: Duration, units: u32) -> Interval {
    let period = unit.saturating_mul(units).max(MIN_PERIOD);
    interval_at(Instant::now() + period, period)
}

async fn run(ctx: TickContext, epoch: u64, critical: bool) {
    let schedule = ctx.schedule;
    let mut elapsed = every(ctx.unit, schedule.elapsed_every);
    let mut stress = every(ctx.unit, schedule.stress_every);
    let mut oxygen = every(
        ctx.unit,
        if critical {
            schedule.oxygen_critical_every
        } else {
            schedule.oxygen_every
        },
    );
    let mut power = every(ctx.unit, schedule.power_every);

    loop {
        let tick = tokio::select! {
            _ = elapsed.tick() => DecayTick::Elapsed,
            _ = stress.tick() => DecayTick::Stress,
            _ = oxygen.tick() => DecayTick::Oxygen,
            _ = power.tick() => DecayTick::Power,
        };
        match apply(&ctx, epoch, tick).await {
            TickOutcome::Continue => {}
            TickOutcome::Critical => {
                oxygen = every(ctx.unit, schedule.oxygen_critical_every);
            }
            TickOutcome::Stopped => break,
        }
    }
    debug!(epoch, "decay timers stopped");
}

async fn apply(ctx: &TickContext, epoch: u64, tick: DecayTick) -> TickOutcome {
    let (levels, notice) = {
        let mut state = lock(&ctx.state);
        if state.decay_epoch != epoch || !state.decay_live() {
            return TickOutcome::Stopped;
        }
        let notice = {
            let mut rng = lock(&ctx.rng);
            decay::apply_tick(tick, &mut state, &mut *rng, &ctx.schedule)
        };
        if notice.is_some() {
            state.transcript_len += 1;
        }
        (state.resources.snapshot(), notice)
    };
    debug!(?tick, ?levels, "decay tick");

    if let Some(notice) = notice {
        ctx.presenter
            .display_message(notice.text(), Sender::System)
            .await;
    }
    ctx.presenter.display_status(&levels).await;

    if notice == Some(DecayNotice::CriticalEvent) {
        TickOutcome::Critical
    } else {
        TickOutcome::Continue
    }
}
