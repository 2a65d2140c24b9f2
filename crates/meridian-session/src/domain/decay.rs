//! Resource decay rules. The timers in the application layer decide when a
//! tick happens; these functions decide what it does.

use meridian_core::rng::DeterministicRng;

use super::resources::{Resource, ResourceModel};
use super::state::SessionState;

/// Cadence of the four decay ticks, in time units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecaySchedule {
    /// Elapsed-time tick.
    pub elapsed_every: u32,
    /// Stress tick.
    pub stress_every: u32,
    /// Oxygen tick before the critical event.
    pub oxygen_every: u32,
    /// Oxygen tick after the critical event.
    pub oxygen_critical_every: u32,
    /// Power tick.
    pub power_every: u32,
    /// Elapsed units at which the critical event fires.
    pub critical_after: u64,
}

impl Default for DecaySchedule {
    fn default() -> Self {
        Self {
            elapsed_every: 1,
            stress_every: 5,
            oxygen_every: 8,
            oxygen_critical_every: 4,
            power_every: 10,
            critical_after: 300,
        }
    }
}

/// Which of the four ticks fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayTick {
    /// Elapsed time.
    Elapsed,
    /// Stress rise.
    Stress,
    /// Oxygen loss.
    Oxygen,
    /// Power loss.
    Power,
}

/// System notice a tick may raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayNotice {
    /// Stress above 80.
    Panic,
    /// Oxygen below 20.
    OxygenCritical,
    /// Power below 30.
    PowerFailing,
    /// The one-time critical event.
    CriticalEvent,
}

impl DecayNotice {
    /// Text shown as a system line.
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Panic => "WARNING: CONTACT VITALS ELEVATED. PANIC RESPONSE DETECTED.",
            Self::OxygenCritical => "WARNING: OXYGEN RESERVES CRITICAL.",
            Self::PowerFailing => "WARNING: SUIT POWER FAILING.",
            Self::CriticalEvent => "ALERT: HULL BREACH EXPANDING. OXYGEN LOSS ACCELERATING.",
        }
    }
}

fn roll(rng: &mut dyn DeterministicRng, min: u32, max: u32) -> i32 {
    i32::try_from(rng.next_u32_range(min, max)).unwrap_or(i32::MAX)
}

/// Advances elapsed time by one unit. Returns the critical event notice the
/// first time the threshold is reached.
pub fn elapsed_tick(state: &mut SessionState, schedule: &DecaySchedule) -> Option<DecayNotice> {
    state.elapsed_units += 1;
    if !state.critical_event_fired && state.elapsed_units >= schedule.critical_after {
        state.critical_event_fired = true;
        return Some(DecayNotice::CriticalEvent);
    }
    None
}

/// Stress rises by 1 to 3. Above 80 there is a 30% chance of a panic notice.
pub fn stress_tick(
    resources: &mut ResourceModel,
    rng: &mut dyn DeterministicRng,
) -> Option<DecayNotice> {
    resources.adjust(Resource::Stress, roll(rng, 1, 3));
    (resources.get(Resource::Stress) > 80 && rng.chance(30)).then_some(DecayNotice::Panic)
}

/// Oxygen falls by 1 to 2. Below 20 there is a 40% chance of a notice.
pub fn oxygen_tick(
    resources: &mut ResourceModel,
    rng: &mut dyn DeterministicRng,
) -> Option<DecayNotice> {
    resources.adjust(Resource::Oxygen, -roll(rng, 1, 2));
    (resources.get(Resource::Oxygen) < 20 && rng.chance(40))
        .then_some(DecayNotice::OxygenCritical)
}

/// Power falls by 1 to 2. Below 30 there is a 40% chance of a notice.
pub fn power_tick(
    resources: &mut ResourceModel,
    rng: &mut dyn DeterministicRng,
) -> Option<DecayNotice> {
    resources.adjust(Resource::Power, -roll(rng, 1, 2));
    (resources.get(Resource::Power) < 30 && rng.chance(40)).then_some(DecayNotice::PowerFailing)
}

/// Applies one tick to the state.
pub fn apply_tick(
    tick: DecayTick,
    state: &mut SessionState,
    rng: &mut dyn DeterministicRng,
    schedule: &DecaySchedule,
) -> Option<DecayNotice> {
    match tick {
        DecayTick::Elapsed => elapsed_tick(state, schedule),
        DecayTick::Stress => stress_tick(&mut state.resources, rng),
        DecayTick::Oxygen => oxygen_tick(&mut state.resources, rng),
        DecayTick::Power => power_tick(&mut state.resources, rng),
    }
}
