//! System configuration parameters
//!
//! All tunable parameters for the pod controller.
//! Values are loaded from NVS at boot and fall back to these defaults.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodConfig {
    // --- Flow meter ---
    /// Calibration: flow meter pulses per millilitre.
    pub pulses_per_ml: u16,

    // --- Actions ---
    /// When false, `clean` commands are accepted but ignored.
    pub clean_enabled: bool,
    /// When true, a running Water action reports itself as Drain (the
    /// deployed firmware's behaviour).  Routing is unaffected.
    pub water_reports_as_drain: bool,

    // --- Scale ---
    /// HX711 raw counts per gram.
    pub scale_calibration_factor: f32,
    /// Samples averaged for the boot-time tare.
    pub scale_tare_samples: u8,

    // --- Timing ---
    /// Poll loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry publish interval (seconds)
    pub publish_interval_secs: u32,
    /// Flow/weight persist interval (seconds).  Kept longer than the
    /// publish interval to bound flash wear.
    pub persist_interval_secs: u32,
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            // Flow meter
            pulses_per_ml: 7, // ~7055 pulses per litre

            // Actions
            clean_enabled: false,
            water_reports_as_drain: true,

            // Scale
            scale_calibration_factor: 25.95,
            scale_tare_samples: 16,

            // Timing
            control_loop_interval_ms: 100, // 10 Hz
            publish_interval_secs: 1,
            persist_interval_secs: 20,
        }
    }
}

impl PodConfig {
    /// Range-check every field.  The `&'static str` names the offending
    /// field and its valid range.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.pulses_per_ml == 0 {
            return Err("pulses_per_ml must be >= 1");
        }
        if !(self.scale_calibration_factor.is_finite() && self.scale_calibration_factor > 0.0) {
            return Err("scale_calibration_factor must be finite and > 0");
        }
        if self.scale_tare_samples == 0 {
            return Err("scale_tare_samples must be >= 1");
        }
        if !(10..=5000).contains(&self.control_loop_interval_ms) {
            return Err("control_loop_interval_ms must be 10–5000");
        }
        if !(1..=3600).contains(&self.publish_interval_secs) {
            return Err("publish_interval_secs must be 1–3600");
        }
        if self.persist_interval_secs <= self.publish_interval_secs {
            return Err("persist_interval_secs must exceed publish_interval_secs");
        }
        if self.persist_interval_secs > 86_400 {
            return Err("persist_interval_secs must be <= 86400");
        }
        Ok(())
    }

    pub fn publish_interval_ms(&self) -> u64 {
        u64::from(self.publish_interval_secs) * 1000
    }

    pub fn persist_interval_ms(&self) -> u64 {
        u64::from(self.persist_interval_secs) * 1000
    }
}
