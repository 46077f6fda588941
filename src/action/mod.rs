//! Action state machine and stop-condition evaluator.
//!
//! ```text
//!            start(kind, maxMl, maxSeconds)
//!   ┌──────┐ ─────────────────────────────▶ ┌────────────────────────────┐
//!   │ IDLE │                                │ REFILL │ DRAIN │ CLEAN │ … │
//!   └──────┘ ◀───────────────────────────── └────────────────────────────┘
//!            stop(LevelReached | TimeLimit | VolumeLimit | Manual)
//! ```
//!
//! Every transition passes through Idle: `start` is refused while a run is
//! live, so actuators are always fully de-energised between runs.
//!
//! [`ActionMachine`] is pure bookkeeping.  It updates its commanded
//! [`ActuatorVector`] and the flow counter's direction; applying the vector
//! to hardware, persisting, and emitting events is the job of
//! [`AppService`](crate::app::service::AppService).

pub mod routing;

use log::info;

use crate::config::PodConfig;
use crate::error::ActionError;
use crate::sensors::flow::FlowCounter;
use routing::{ActuatorVector, routing};

// ---------------------------------------------------------------------------
// Action identity
// ---------------------------------------------------------------------------

/// Enumeration of all actions.  Must stay in sync with [`ACTION_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionKind {
    Idle = 0,
    Refill = 1,
    Drain = 2,
    Clean = 3,
    Water = 4,
}

impl ActionKind {
    /// Total number of actions; used to size the descriptor table.
    pub const COUNT: usize = 5;

    pub const ALL: [ActionKind; Self::COUNT] = [
        Self::Idle,
        Self::Refill,
        Self::Drain,
        Self::Clean,
        Self::Water,
    ];

    /// Convert an index back to `ActionKind`.  Panics on out-of-range in
    /// debug builds; returns `Idle` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::Refill,
            2 => Self::Drain,
            3 => Self::Clean,
            4 => Self::Water,
            _ => {
                debug_assert!(false, "invalid action index: {idx}");
                Self::Idle
            }
        }
    }

    pub fn descriptor(self) -> &'static ActionDescriptor {
        &ACTION_TABLE[self as usize]
    }

    /// Upper-case name used in event strings.
    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    /// Look up the action named by a command property (`"refill"`, …).
    pub fn from_command(name: &str) -> Option<Self> {
        ACTION_TABLE.iter().find(|d| d.command == name).map(|d| d.kind)
    }

    /// Net-inflow actions count flow pulses upward.
    pub fn is_inflow(self) -> bool {
        self.descriptor().inflow
    }

    /// Whether the level switch ends this action.
    pub fn stops_on_level(self) -> bool {
        self.descriptor().stops_on_level
    }
}

// ---------------------------------------------------------------------------
// Descriptor table (one row per action)
// ---------------------------------------------------------------------------

/// Static descriptor for a single action.
pub struct ActionDescriptor {
    pub kind: ActionKind,
    pub label: &'static str,
    /// Command property suffix (`actions/<command>`).
    pub command: &'static str,
    pub inflow: bool,
    pub stops_on_level: bool,
}

/// Indexed by `ActionKind as usize`.
pub const ACTION_TABLE: [ActionDescriptor; ActionKind::COUNT] = [
    ActionDescriptor {
        kind: ActionKind::Idle,
        label: "IDLE",
        command: "idle",
        inflow: false,
        stops_on_level: false,
    },
    ActionDescriptor {
        kind: ActionKind::Refill,
        label: "REFILL",
        command: "refill",
        inflow: true,
        stops_on_level: true,
    },
    ActionDescriptor {
        kind: ActionKind::Drain,
        label: "DRAIN",
        command: "drain",
        inflow: false,
        stops_on_level: false,
    },
    ActionDescriptor {
        kind: ActionKind::Clean,
        label: "CLEAN",
        command: "clean",
        inflow: false,
        stops_on_level: true,
    },
    ActionDescriptor {
        kind: ActionKind::Water,
        label: "WATER",
        command: "water",
        inflow: false,
        stops_on_level: false,
    },
];

// ---------------------------------------------------------------------------
// Stop reasons and run records
// ---------------------------------------------------------------------------

/// Why a run ended.  Exactly one per stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    LevelReached,
    TimeLimit,
    VolumeLimit,
    Manual,
}

impl StopReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::LevelReached => "level reached",
            Self::TimeLimit => "time reached",
            Self::VolumeLimit => "max ml reached",
            Self::Manual => "idle command",
        }
    }
}

/// The live run.  Exists only while the machine is not Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRun {
    /// The action that was commanded (selects the routing).
    pub requested: ActionKind,
    /// The action the machine reports and evaluates stop conditions for.
    pub kind: ActionKind,
    pub started_at_ms: u64,
    pub pulse_mark: i32,
    pub max_seconds: u32,
    pub max_pulses: i32,
}

/// Resolved limits of a run that just started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionStarted {
    pub requested: ActionKind,
    pub kind: ActionKind,
    pub max_ml: i32,
    pub max_seconds: u32,
}

/// Summary of a run that just ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionStopped {
    pub requested: ActionKind,
    pub kind: ActionKind,
    pub reason: StopReason,
    pub max_ml: i32,
    pub max_seconds: u32,
    pub moved_pulses: u32,
    pub elapsed_ms: u64,
}

/// Result of an accepted `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(ActionStarted),
    /// Accepted but not run (Clean while disabled).  No state changed.
    Ignored(ActionKind),
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// The single owned aggregate of action state.
pub struct ActionMachine<'a> {
    flow: &'a FlowCounter,
    run: Option<ActionRun>,
    commanded: ActuatorVector,
    pulses_per_ml: u16,
    clean_enabled: bool,
    water_reports_as_drain: bool,
}

impl<'a> ActionMachine<'a> {
    /// A machine in Idle.  Puts the flow counter in the Idle direction.
    pub fn new(config: &PodConfig, flow: &'a FlowCounter) -> Self {
        flow.set_inflow(ActionKind::Idle.is_inflow());
        Self {
            flow,
            run: None,
            commanded: ActuatorVector::ALL_OFF,
            pulses_per_ml: config.pulses_per_ml.max(1),
            clean_enabled: config.clean_enabled,
            water_reports_as_drain: config.water_reports_as_drain,
        }
    }

    /// Begin `kind`, bounded by `max_ml` and `max_seconds`.
    ///
    /// Refused with [`ActionError::AlreadyRunning`] while any run is live and
    /// with [`ActionError::InvalidParameters`] for non-positive limits; in
    /// both cases nothing changes.
    pub fn start(
        &mut self,
        kind: ActionKind,
        max_ml: i32,
        max_seconds: i32,
        now_ms: u64,
    ) -> Result<StartOutcome, ActionError> {
        if let Some(run) = &self.run {
            return Err(ActionError::AlreadyRunning(run.kind));
        }
        if kind == ActionKind::Idle || max_ml <= 0 || max_seconds <= 0 {
            return Err(ActionError::InvalidParameters);
        }
        let max_pulses = max_ml
            .checked_mul(i32::from(self.pulses_per_ml))
            .ok_or(ActionError::InvalidParameters)?;

        if kind == ActionKind::Clean && !self.clean_enabled {
            info!("Action CLEAN disabled by configuration, ignoring");
            return Ok(StartOutcome::Ignored(kind));
        }

        let reported = if kind == ActionKind::Water && self.water_reports_as_drain {
            ActionKind::Drain
        } else {
            kind
        };

        // Direction first, then the mark: an edge landing in between is
        // already counted the new way and shows up in this run's delta.
        self.flow.set_inflow(reported.is_inflow());
        let pulse_mark = self.flow.load();

        let max_seconds = max_seconds as u32;
        self.commanded = routing(kind);
        self.run = Some(ActionRun {
            requested: kind,
            kind: reported,
            started_at_ms: now_ms,
            pulse_mark,
            max_seconds,
            max_pulses,
        });

        info!(
            "Action {} started (mark={} max_pulses={} max_seconds={})",
            kind.label(),
            pulse_mark,
            max_pulses,
            max_seconds
        );

        Ok(StartOutcome::Started(ActionStarted {
            requested: kind,
            kind: reported,
            max_ml: max_pulses / i32::from(self.pulses_per_ml),
            max_seconds,
        }))
    }

    /// Evaluate stop conditions for the live run, first match wins:
    /// level (Refill/Clean only), then time, then volume.
    ///
    /// `level_reached` is only sampled when the running action stops on
    /// level.  Returns the stop summary if the run ended on this tick.
    pub fn tick(
        &mut self,
        now_ms: u64,
        level_reached: impl FnOnce() -> bool,
    ) -> Option<ActionStopped> {
        let run = self.run?;

        let reason = if run.kind.stops_on_level() && level_reached() {
            StopReason::LevelReached
        } else if now_ms.saturating_sub(run.started_at_ms) >= u64::from(run.max_seconds) * 1000 {
            StopReason::TimeLimit
        } else if self.moved_pulses(&run) >= run.max_pulses as u32 {
            StopReason::VolumeLimit
        } else {
            return None;
        };

        self.stop(reason, now_ms)
    }

    /// End the live run.  Idempotent: `None` when already Idle.
    pub fn stop(&mut self, reason: StopReason, now_ms: u64) -> Option<ActionStopped> {
        let run = self.run.take()?;

        self.commanded = routing(ActionKind::Idle);
        self.flow.set_inflow(ActionKind::Idle.is_inflow());
        let moved_pulses = self.moved_pulses(&run);

        info!(
            "Action {} stopped: {} (moved {} pulses)",
            run.requested.label(),
            reason.describe(),
            moved_pulses
        );

        Some(ActionStopped {
            requested: run.requested,
            kind: run.kind,
            reason,
            max_ml: run.max_pulses / i32::from(self.pulses_per_ml),
            max_seconds: run.max_seconds,
            moved_pulses,
            elapsed_ms: now_ms.saturating_sub(run.started_at_ms),
        })
    }

    /// The reported action (`Idle` when no run is live).
    pub fn kind(&self) -> ActionKind {
        self.run.map_or(ActionKind::Idle, |r| r.kind)
    }

    pub fn is_idle(&self) -> bool {
        self.run.is_none()
    }

    pub fn run(&self) -> Option<&ActionRun> {
        self.run.as_ref()
    }

    /// Commanded actuator levels for the current action.
    pub fn commanded(&self) -> ActuatorVector {
        self.commanded
    }

    pub fn pulses_per_ml(&self) -> u16 {
        self.pulses_per_ml
    }

    fn moved_pulses(&self, run: &ActionRun) -> u32 {
        self.flow.load().wrapping_sub(run.pulse_mark).unsigned_abs()
    }
}
