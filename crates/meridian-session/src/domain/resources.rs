//! The four session resources and their clamping rules.

use meridian_story::{ResourceEffect, ResourcePatch};
use serde::{Deserialize, Serialize};

/// Lower bound of every resource.
pub const RESOURCE_MIN: i32 = 0;
/// Upper bound of every resource.
pub const RESOURCE_MAX: i32 = 100;

/// A read-only copy of the resource levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLevels {
    /// Breathable air remaining.
    pub oxygen: i32,
    /// Suit and pod battery.
    pub power: i32,
    /// The contact's stress.
    pub stress: i32,
    /// The contact's trust in the player.
    pub trust: i32,
}

impl ResourceLevels {
    /// Levels at the start of every session.
    pub const CANONICAL_START: Self = Self {
        oxygen: 78,
        power: 42,
        stress: 35,
        trust: 50,
    };
}

impl Default for ResourceLevels {
    fn default() -> Self {
        Self::CANONICAL_START
    }
}

/// Names a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Oxygen.
    Oxygen,
    /// Power.
    Power,
    /// Stress.
    Stress,
    /// Trust.
    Trust,
}

/// Mutable resource state. Every mutation clamps into
/// [`RESOURCE_MIN`]..=[`RESOURCE_MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceModel {
    levels: ResourceLevels,
}

impl ResourceModel {
    /// Creates a model at the canonical starting levels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a model from arbitrary levels, clamping each one.
    #[must_use]
    pub fn from_levels(levels: ResourceLevels) -> Self {
        Self {
            levels: ResourceLevels {
                oxygen: clamp(levels.oxygen),
                power: clamp(levels.power),
                stress: clamp(levels.stress),
                trust: clamp(levels.trust),
            },
        }
    }

    /// Adds each present field of `patch` to the matching level.
    pub fn apply_delta(&mut self, patch: &ResourcePatch) {
        for (resource, delta) in fields(patch) {
            self.adjust(resource, delta);
        }
    }

    /// Replaces each present field of `patch`.
    pub fn set_absolute(&mut self, patch: &ResourcePatch) {
        for (resource, value) in fields(patch) {
            *self.slot(resource) = clamp(value);
        }
    }

    /// Applies an authored node effect: `set` first, then `drift`.
    pub fn apply_effect(&mut self, effect: &ResourceEffect) {
        if let Some(set) = &effect.set {
            self.set_absolute(set);
        }
        if let Some(drift) = &effect.drift {
            self.apply_delta(drift);
        }
    }

    /// Adjusts one resource by `delta`.
    pub fn adjust(&mut self, resource: Resource, delta: i32) {
        let slot = self.slot(resource);
        *slot = clamp(slot.saturating_add(delta));
    }

    /// Current level of one resource.
    #[must_use]
    pub fn get(&self, resource: Resource) -> i32 {
        match resource {
            Resource::Oxygen => self.levels.oxygen,
            Resource::Power => self.levels.power,
            Resource::Stress => self.levels.stress,
            Resource::Trust => self.levels.trust,
        }
    }

    /// Read-only copy of the levels.
    #[must_use]
    pub fn snapshot(&self) -> ResourceLevels {
        self.levels
    }

    fn slot(&mut self, resource: Resource) -> &mut i32 {
        match resource {
            Resource::Oxygen => &mut self.levels.oxygen,
            Resource::Power => &mut self.levels.power,
            Resource::Stress => &mut self.levels.stress,
            Resource::Trust => &mut self.levels.trust,
        }
    }
}

fn clamp(value: i32) -> i32 {
    value.clamp(RESOURCE_MIN, RESOURCE_MAX)
}

fn fields(patch: &ResourcePatch) -> impl Iterator<Item = (Resource, i32)> {
    [
        (Resource::Oxygen, patch.oxygen),
        (Resource::Power, patch.power),
        (Resource::Stress, patch.stress),
        (Resource::Trust, patch.trust),
    ]
    .into_iter()
    .filter_map(|(resource, value)| value.map(|v| (resource, v)))
}

#[cfg(test)]
mod tests {
    use meridian_core::rng::{DeterministicRng, SeededRng};

    use super::*;

    fn in_bounds(levels: ResourceLevels) -> bool {
        [levels.oxygen, levels.power, levels.stress, levels.trust]
            .iter()
            .all(|v| (RESOURCE_MIN..=RESOURCE_MAX).contains(v))
    }

    fn random_patch(rng: &mut SeededRng) -> ResourcePatch {
        let mut field = || {
            if rng.chance(50) {
                Some(i32::try_from(rng.next_u32_range(0, 600)).unwrap() - 300)
            } else {
                None
            }
        };
        ResourcePatch {
            oxygen: field(),
            power: field(),
            stress: field(),
            trust: field(),
        }
    }

    #[test]
    fn test_new_model_starts_at_canonical_levels() {
        let model = ResourceModel::new();

        assert_eq!(
            model.snapshot(),
            ResourceLevels {
                oxygen: 78,
                power: 42,
                stress: 35,
                trust: 50
            }
        );
    }

    #[test]
    fn test_apply_delta_only_touches_present_fields() {
        // Arrange
        let mut model = ResourceModel::new();
        let patch = ResourcePatch {
            trust: Some(8),
            stress: Some(-5),
            ..ResourcePatch::default()
        };

        // Act
        model.apply_delta(&patch);

        // Assert
        let levels = model.snapshot();
        assert_eq!(levels.trust, 58);
        assert_eq!(levels.stress, 30);
        assert_eq!(levels.oxygen, 78);
        assert_eq!(levels.power, 42);
    }

    #[test]
    fn test_apply_delta_clamps_at_both_bounds() {
        let mut model = ResourceModel::new();

        model.apply_delta(&ResourcePatch {
            oxygen: Some(500),
            power: Some(-500),
            stress: Some(i32::MAX),
            trust: Some(i32::MIN),
        });

        let levels = model.snapshot();
        assert_eq!(levels.oxygen, 100);
        assert_eq!(levels.power, 0);
        assert_eq!(levels.stress, 100);
        assert_eq!(levels.trust, 0);
    }

    #[test]
    fn test_set_absolute_replaces_and_clamps() {
        let mut model = ResourceModel::new();

        model.set_absolute(&ResourcePatch {
            oxygen: Some(30),
            power: Some(140),
            ..ResourcePatch::default()
        });

        assert_eq!(model.get(Resource::Oxygen), 30);
        assert_eq!(model.get(Resource::Power), 100);
        assert_eq!(model.get(Resource::Stress), 35);
    }

    #[test]
    fn test_apply_effect_sets_before_drifting() {
        // Arrange
        let mut model = ResourceModel::new();
        let effect = ResourceEffect {
            set: Some(ResourcePatch {
                oxygen: Some(30),
                ..ResourcePatch::default()
            }),
            drift: Some(ResourcePatch {
                oxygen: Some(-10),
                ..ResourcePatch::default()
            }),
        };

        // Act
        model.apply_effect(&effect);

        // Assert
        assert_eq!(model.get(Resource::Oxygen), 20);
    }

    #[test]
    fn test_from_levels_clamps_out_of_range_input() {
        let model = ResourceModel::from_levels(ResourceLevels {
            oxygen: -4,
            power: 101,
            stress: 50,
            trust: 50,
        });

        assert_eq!(model.get(Resource::Oxygen), 0);
        assert_eq!(model.get(Resource::Power), 100);
    }

    #[test]
    fn test_levels_stay_in_bounds_under_arbitrary_mutation_sequences() {
        // Arrange
        let mut rng = SeededRng::from_seed(0x6d65_7269);
        let mut model = ResourceModel::new();

        // Act + Assert
        for step in 0..2_000 {
            let patch = random_patch(&mut rng);
            if step % 3 == 0 {
                model.set_absolute(&patch);
            } else {
                model.apply_delta(&patch);
            }
            assert!(in_bounds(model.snapshot()), "out of bounds at step {step}");
        }
    }
}
