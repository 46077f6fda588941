//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the action machine, the weight tracker, and the
//! publish/persist cadences.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService        │
//! ActuatorPort ◀──│  ActionMachine · Flow   │ ──▶ StoragePort
//!                 └────────────────────────┘
//! ```

use log::{info, warn};

use crate::action::routing::ActuatorId;
use crate::action::{ActionKind, ActionMachine, ActionStopped, StartOutcome, StopReason};
use crate::config::PodConfig;
use crate::error::{ActionError, Result};
use crate::sensors::flow::{FlowCounter, volume_ml};
use crate::sensors::scale::WeightTracker;

use super::commands::AppCommand;
use super::events::{ActuatorTelemetry, AppEvent, TelemetryData};
use super::persistence;
use super::ports::{ActuatorPort, EventSink, SensorPort, StoragePort};

// ───────────────────────────────────────────────────────────────
// Cadence
// ───────────────────────────────────────────────────────────────

/// A fixed-interval timer driven by the poll loop's clock.
/// Fires on the first check, then every `interval_ms`.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    interval_ms: u64,
    last_ms: Option<u64>,
}

impl Cadence {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// `true` when the interval has elapsed; re-arms from `now_ms`.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let fire = match self.last_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if fire {
            self.last_ms = Some(now_ms);
        }
        fire
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService<'a> {
    machine: ActionMachine<'a>,
    flow: &'a FlowCounter,
    weight: WeightTracker,
    config: PodConfig,
    publish: Cadence,
    persist: Cadence,
    tick_count: u64,
}

impl<'a> AppService<'a> {
    /// Construct the service from configuration.
    ///
    /// Does **not** restore persisted state; call [`boot`](Self::boot) next.
    pub fn new(config: PodConfig, flow: &'a FlowCounter) -> Self {
        let machine = ActionMachine::new(&config, flow);
        Self {
            machine,
            flow,
            weight: WeightTracker::new(),
            publish: Cadence::new(config.publish_interval_ms()),
            persist: Cadence::new(config.persist_interval_ms()),
            config,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Restore the flow counter and weight baseline from storage and
    /// announce the restored values.
    pub fn boot(&mut self, storage: &impl StoragePort, sink: &mut impl EventSink) {
        match persistence::load_flow_counter(storage) {
            Some(pulses) => {
                self.flow.restore(pulses);
                info!("Loaded flow counter from storage: {}", pulses);
            }
            None => info!("No stored flow counter, keeping {}", self.flow.load()),
        }

        let weight_g = persistence::load_weight(storage);
        self.weight.restore(weight_g);
        info!("Loaded weight from storage: {:.2} g", weight_g);

        sink.emit(&AppEvent::Booted {
            flow_pulses: self.flow.load(),
            weight_g: self.weight.weight_g(),
        });
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle: sample weight → evaluate stop conditions →
    /// publish on cadence → persist on cadence.
    ///
    /// `hw` is both the [`SensorPort`] and the [`ActuatorPort`].
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort),
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Load cell
        if let Some(sample) = hw.read_weight_sample() {
            self.weight.update(sample);
        }

        // 2. Stop conditions
        if let Some(stopped) = self.machine.tick(now_ms, || hw.level_reached()) {
            self.finish_stop(stopped, hw, storage, sink);
        }

        // 3. Telemetry
        if self.publish.due(now_ms) {
            let telemetry = self.build_telemetry(hw);
            sink.emit(&AppEvent::Telemetry(telemetry));
        }

        // 4. Persist
        if self.persist.due(now_ms) {
            if let Err(e) = persistence::save_weight(storage, self.weight.weight_g()) {
                warn!("Periodic weight save failed: {}", e);
            }
            if let Err(e) = persistence::save_flow_counter(storage, self.flow.load()) {
                warn!("Periodic flow save failed: {}", e);
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.  A rejected command leaves every piece
    /// of state, actuators included, exactly as it was.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        hw: &mut impl ActuatorPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::Start {
                kind,
                max_ml,
                max_seconds,
            } => match self.machine.start(kind, max_ml, max_seconds, now_ms)? {
                StartOutcome::Started(started) => {
                    self.apply_routing(hw);
                    sink.emit(&AppEvent::ActionStarted(started));
                }
                StartOutcome::Ignored(kind) => {
                    info!("Start {} accepted and ignored", kind.label());
                }
            },
            AppCommand::Idle => match self.machine.stop(StopReason::Manual, now_ms) {
                Some(stopped) => self.finish_stop(stopped, hw, storage, sink),
                None => {
                    // Still drive everything off: clears any manual override.
                    self.apply_routing(hw);
                    info!("Idle requested while already idle");
                }
            },
            AppCommand::ResetFlow => {
                if !self.machine.is_idle() {
                    return Err(ActionError::FlowResetWhileRunning(self.machine.kind()).into());
                }
                self.flow.reset();
                info!("Flow counter reset");
                if let Err(e) = persistence::save_flow_counter(storage, self.flow.load()) {
                    warn!("Saving reset flow counter failed: {}", e);
                }
            }
            AppCommand::ResetScale => {
                self.weight.reset();
                info!("Scale baseline reset");
                if let Err(e) = persistence::save_weight(storage, 0.0) {
                    warn!("Saving reset weight failed: {}", e);
                }
            }
            AppCommand::Override { actuator, on } => {
                if !self.machine.is_idle() {
                    warn!(
                        "Override {}={} while {} is running",
                        actuator.label(),
                        on,
                        self.machine.kind().label()
                    );
                }
                hw.write(actuator, on);
                info!("Override {} -> {}", actuator.label(), on);
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot: commanded state from the machine, sensed
    /// state from the hardware.
    pub fn build_telemetry(&self, hw: &mut (impl SensorPort + ActuatorPort)) -> TelemetryData {
        let commanded = self.machine.commanded();
        let mut actuators = [ActuatorTelemetry::default(); ActuatorId::COUNT];
        for (id, on) in commanded.iter() {
            actuators[id.index()] = ActuatorTelemetry {
                commanded: on,
                readback: hw.read_back(id),
            };
        }

        let flow_pulses = self.flow.load();
        TelemetryData {
            action: self.machine.kind(),
            actuators,
            level_reached: hw.level_reached(),
            water_detected: hw.water_detected(),
            flow_pulses,
            volume_ml: volume_ml(flow_pulses, self.config.pulses_per_ml),
            weight_g: self.weight.weight_g(),
        }
    }

    /// Reported action (`Idle` when nothing runs).
    pub fn action(&self) -> ActionKind {
        self.machine.kind()
    }

    pub fn machine(&self) -> &ActionMachine<'a> {
        &self.machine
    }

    pub fn weight_g(&self) -> f32 {
        self.weight.weight_g()
    }

    /// Total poll cycles executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &PodConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    /// Write the full commanded vector before returning.
    fn apply_routing(&self, hw: &mut impl ActuatorPort) {
        for (id, on) in self.machine.commanded().iter() {
            hw.write(id, on);
        }
    }

    /// De-energise, persist the counter, announce the stop.
    fn finish_stop(
        &self,
        stopped: ActionStopped,
        hw: &mut impl ActuatorPort,
        storage: &mut impl StoragePort,
        sink: &mut impl EventSink,
    ) {
        self.apply_routing(hw);
        if let Err(e) = persistence::save_flow_counter(storage, self.flow.load()) {
            warn!("Saving flow counter after stop failed: {}", e);
        }
        sink.emit(&AppEvent::ActionStopped(stopped));
    }
}
