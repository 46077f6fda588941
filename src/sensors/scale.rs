//! Pod weight tracking.
//!
//! The load cell is tared at every boot, so a live sample is only a delta
//! since power-on.  The absolute weight is the persisted baseline plus the
//! latest delta; the sum is what gets written back on the persist cadence,
//! becoming the next boot's baseline.

/// Last known pod mass in grams.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightTracker {
    baseline_g: f32,
    live_g: Option<f32>,
}

impl WeightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the baseline from storage.  Non-finite values load as zero.
    pub fn restore(&mut self, persisted_g: f32) {
        self.baseline_g = if persisted_g.is_finite() { persisted_g } else { 0.0 };
    }

    /// Record a fresh sample from the load cell.
    pub fn update(&mut self, sample_g: f32) {
        if sample_g.is_finite() {
            self.live_g = Some(sample_g);
        }
    }

    /// Absolute weight: baseline plus the latest live delta.
    pub fn weight_g(&self) -> f32 {
        self.baseline_g + self.live_g.unwrap_or(0.0)
    }

    /// Operator scale reset: drop the persisted baseline.
    pub fn reset(&mut self) {
        self.baseline_g = 0.0;
    }

    pub fn has_sample(&self) -> bool {
        self.live_g.is_some()
    }
}
