// Time accumulator - Auxiliary time driven by the clock's frame delta
// Lets a visual parameter run on its own speed without touching the beat

/// Accumulates tick deltas (seconds) scaled by a speed factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAccumulator {
    accumulated: f64,
    speed_factor: f64,
}

impl TimeAccumulator {
    pub fn new(speed_factor: f64) -> Self {
        Self {
            accumulated: 0.0,
            speed_factor,
        }
    }

    /// Advance by one frame delta in seconds
    pub fn tick(&mut self, delta_s: f64) {
        self.accumulated += delta_s * self.speed_factor;
    }

    /// Change speed; already accumulated time is kept
    pub fn set_speed_factor(&mut self, factor: f64) {
        self.speed_factor = factor;
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn time(&self) -> f64 {
        self.accumulated
    }
}

impl Default for TimeAccumulator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_change_keeps_history() {
        let mut acc = TimeAccumulator::new(2.0);
        acc.tick(0.5);
        assert_eq!(acc.time(), 1.0);

        acc.set_speed_factor(0.5);
        acc.tick(1.0);
        assert_eq!(acc.time(), 1.5);
    }

    #[test]
    fn test_negative_speed_runs_backwards() {
        let mut acc = TimeAccumulator::new(-1.0);
        acc.tick(0.25);
        assert_eq!(acc.time(), -0.25);
    }
}
