//! Hall-effect flow meter pulse accounting.
//!
//! The meter emits one pulse per ~1/7 mL.  An ISR applies a signed step to
//! an atomic counter on each rising edge: `+1` while a net-inflow action
//! (Refill) is live, `-1` in every other state including Idle.  The control
//! loop measures the volume moved by a run as `|counter - mark|`, and
//! publishes the raw counter as the pod's lifetime net volume.
//!
//! The step is chosen by the poll loop on each action transition and only
//! *read* by the ISR, so each edge is a single load plus a single
//! lock-free `fetch_add`.  The poll loop reads the
//! counter with one atomic load; it never combines two reads.

use core::sync::atomic::{AtomicI32, Ordering};

/// Counter shared with the GPIO ISR.
/// `static` because ISR callbacks in ESP-IDF cannot capture closures.
pub static FLOW_COUNTER: FlowCounter = FlowCounter::new();

/// Called from the GPIO ISR on each rising edge of the flow meter.
pub fn flow_isr_handler() {
    FLOW_COUNTER.on_edge();
}

/// Signed pulse counter plus the direction the next edge is counted in.
#[derive(Debug)]
pub struct FlowCounter {
    pulses: AtomicI32,
    step: AtomicI32,
}

impl Default for FlowCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowCounter {
    /// Counter at zero, counting edges as outflow (the Idle direction).
    pub const fn new() -> Self {
        Self {
            pulses: AtomicI32::new(0),
            step: AtomicI32::new(-1),
        }
    }

    /// One detected rising edge.  ISR-safe.
    pub fn on_edge(&self) {
        let step = self.step.load(Ordering::Acquire);
        self.pulses.fetch_add(step, Ordering::AcqRel);
    }

    /// Select the sign applied by subsequent edges.
    pub fn set_inflow(&self, inflow: bool) {
        self.step.store(if inflow { 1 } else { -1 }, Ordering::Release);
    }

    pub fn is_inflow(&self) -> bool {
        self.step.load(Ordering::Acquire) > 0
    }

    /// Single-load snapshot of the raw counter.
    pub fn load(&self) -> i32 {
        self.pulses.load(Ordering::Acquire)
    }

    /// Zero the counter.  The caller guarantees no action is running.
    pub fn reset(&self) {
        self.pulses.store(0, Ordering::Release);
    }

    /// Seed the counter from a persisted value at boot.
    pub fn restore(&self, pulses: i32) {
        self.pulses.store(pulses, Ordering::Release);
    }
}

/// Whole millilitres represented by `pulses` (truncating toward zero).
pub fn volume_ml(pulses: i32, pulses_per_ml: u16) -> i32 {
    pulses / i32::from(pulses_per_ml.max(1))
}
