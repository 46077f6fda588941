//! Mock hardware adapter for integration tests.
//!
//! Records every actuator write so tests can assert on the full command
//! history without touching real GPIO registers.  Individual pads can be
//! forced stuck to simulate a welded relay.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use podctl::action::StopReason;
use podctl::action::routing::{ActuatorId, ActuatorVector};
use podctl::app::events::{AppEvent, TelemetryData};
use podctl::app::ports::{
    ActuatorPort, ConfigError, ConfigPort, EventSink, SensorPort, StorageError, StoragePort,
};
use podctl::config::PodConfig;

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    /// Every `write` in call order.
    pub writes: Vec<(ActuatorId, bool)>,
    latch: [bool; ActuatorId::COUNT],
    /// Pad level that overrides the latch on readback.
    pub stuck: [Option<bool>; ActuatorId::COUNT],
    pub level: bool,
    pub water: bool,
    pub weight_samples: VecDeque<f32>,
    /// Number of level-switch samples taken.
    pub level_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current output latches as a vector.
    pub fn outputs(&self) -> ActuatorVector {
        let mut v = ActuatorVector::ALL_OFF;
        for id in ActuatorId::ALL {
            v.set(id, self.latch[id.index()]);
        }
        v
    }

    pub fn output(&self, id: ActuatorId) -> bool {
        self.latch[id.index()]
    }
}

impl ActuatorPort for MockHardware {
    fn write(&mut self, id: ActuatorId, on: bool) {
        self.writes.push((id, on));
        self.latch[id.index()] = on;
    }

    fn read_back(&mut self, id: ActuatorId) -> bool {
        self.stuck[id.index()].unwrap_or(self.latch[id.index()])
    }
}

impl SensorPort for MockHardware {
    fn level_reached(&mut self) -> bool {
        self.level_reads += 1;
        self.level
    }

    fn water_detected(&mut self) -> bool {
        self.water
    }

    fn read_weight_sample(&mut self) -> Option<f32> {
        self.weight_samples.pop_front()
    }
}

// ── MockNvs ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNvs {
    store: HashMap<String, Vec<u8>>,
    pub fail_writes: bool,
    /// Successful writes per `"namespace::key"`.
    pub write_counts: HashMap<String, u32>,
    config: Cell<Option<PodConfig>>,
}

#[allow(dead_code)]
impl MockNvs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes_to(&self, namespace: &str, key: &str) -> u32 {
        self.write_counts
            .get(&format!("{}::{}", namespace, key))
            .copied()
            .unwrap_or(0)
    }

    pub fn raw(&self, namespace: &str, key: &str) -> Option<&[u8]> {
        self.store
            .get(&format!("{}::{}", namespace, key))
            .map(Vec::as_slice)
    }
}

impl StoragePort for MockNvs {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let k = format!("{}::{}", namespace, key);
        match self.store.get(&k) {
            Some(v) => {
                let n = v.len().min(buf.len());
                buf[..n].copy_from_slice(&v[..n]);
                Ok(n)
            }
            None => Err(StorageError::NotFound),
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        let k = format!("{}::{}", namespace, key);
        *self.write_counts.entry(k.clone()).or_insert(0) += 1;
        self.store.insert(k, data.to_vec());
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.store.contains_key(&format!("{}::{}", namespace, key))
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.remove(&format!("{}::{}", namespace, key));
        Ok(())
    }
}

impl ConfigPort for MockNvs {
    fn load(&self) -> Result<PodConfig, ConfigError> {
        let cfg = self.config.take();
        self.config.set(cfg.clone());
        Ok(cfg.unwrap_or_default())
    }

    fn save(&self, config: &PodConfig) -> Result<(), ConfigError> {
        config.validate().map_err(ConfigError::ValidationFailed)?;
        self.config.set(Some(config.clone()));
        Ok(())
    }
}

// ── CollectingSink ────────────────────────────────────────────

#[derive(Default)]
pub struct CollectingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }

    pub fn starts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::ActionStarted(_)))
            .count()
    }

    pub fn stop_reasons(&self) -> Vec<StopReason> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ActionStopped(s) => Some(s.reason),
                _ => None,
            })
            .collect()
    }

    pub fn telemetry(&self) -> Vec<&TelemetryData> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Telemetry(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for CollectingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
