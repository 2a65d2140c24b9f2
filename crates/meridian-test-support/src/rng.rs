//! Test RNGs: deterministic `DeterministicRng` implementations for tests.

use meridian_core::rng::DeterministicRng;

/// Always returns the low end of the requested range.
///
/// With percentage rolls taken as `[1, 100]`, every chance check with a
/// non-zero percentage succeeds.
#[derive(Debug, Default)]
pub struct MinRng;

impl DeterministicRng for MinRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Always returns the high end of the requested range.
///
/// Every chance check below 100% fails.
#[derive(Debug, Default)]
pub struct MaxRng;

impl DeterministicRng for MaxRng {
    fn next_u32_range(&mut self, _min: u32, max: u32) -> u32 {
        max
    }

    fn next_f64(&mut self) -> f64 {
        0.999
    }
}

/// An RNG that replays a scripted sequence, clamping each value into the
/// requested range and cycling when the script runs out.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if self.values.is_empty() {
            return min;
        }
        let value = self.values[self.index % self.values.len()];
        self.index += 1;
        value.clamp(min, max.max(min))
    }

    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32_range(0, 999)) / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_rng_clamps_and_cycles() {
        // Arrange
        let mut rng = SequenceRng::new(vec![5, 1]);

        // Act
        let drawn: Vec<u32> = (0..4).map(|_| rng.next_u32_range(1, 3)).collect();

        // Assert
        assert_eq!(drawn, vec![3, 1, 3, 1]);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_min_rng_always_wins_chance_rolls() {
        let mut rng = MinRng;
        assert!(rng.chance(30));
    }

    #[test]
    fn test_max_rng_never_wins_partial_chance_rolls() {
        let mut rng = MaxRng;
        assert!(!rng.chance(99));
    }
}
