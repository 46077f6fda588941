//! Actuator routing: the fixed mapping from action to commanded outputs.
//!
//! ```text
//! ┌────────┬──────┬────────────┬──────────────┬───────────┬───────────┬───────────┐
//! │ Action │ pump │ in-primary │ in-secondary │ out-drain │ out-flush │ out-water │
//! ├────────┼──────┼────────────┼──────────────┼───────────┼───────────┼───────────┤
//! │ Idle   │  -   │     -      │      -       │     -     │     -     │     -     │
//! │ Refill │  on  │     -      │      on      │     -     │    on     │     -     │
//! │ Drain  │  on  │     on     │      -       │    on     │     -     │     -     │
//! │ Clean  │  on  │     -      │      on      │    on     │     -     │     -     │
//! │ Water  │  on  │     on     │      -       │     -     │     -     │    on     │
//! └────────┴──────┴────────────┴──────────────┴───────────┴───────────┴───────────┘
//! ```
//!
//! The six outputs are one homogeneous array indexed by [`ActuatorId`];
//! [`routing`] is a total `const fn` over [`ActionKind`] so adding an action
//! without a routing row is a compile error.

use super::ActionKind;

// ---------------------------------------------------------------------------
// Actuator identity
// ---------------------------------------------------------------------------

/// The six binary outputs of the pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActuatorId {
    Pump = 0,
    InPrimary = 1,
    InSecondary = 2,
    OutDrain = 3,
    OutFlush = 4,
    OutWater = 5,
}

impl ActuatorId {
    pub const COUNT: usize = 6;

    /// Every actuator in index order.
    pub const ALL: [ActuatorId; Self::COUNT] = [
        Self::Pump,
        Self::InPrimary,
        Self::InSecondary,
        Self::OutDrain,
        Self::OutFlush,
        Self::OutWater,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Settable property path used by telemetry and the override interface.
    pub const fn property(self) -> &'static str {
        match self {
            Self::Pump => "pump/run",
            Self::InPrimary => "valves/in-primary",
            Self::InSecondary => "valves/in-secondary",
            Self::OutDrain => "valves/out-drain",
            Self::OutFlush => "valves/out-flush",
            Self::OutWater => "valves/out-water",
        }
    }

    /// Short name for log lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pump => "pump",
            Self::InPrimary => "in-primary",
            Self::InSecondary => "in-secondary",
            Self::OutDrain => "out-drain",
            Self::OutFlush => "out-flush",
            Self::OutWater => "out-water",
        }
    }

    pub fn from_property(property: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.property() == property)
    }
}

// ---------------------------------------------------------------------------
// Commanded vector
// ---------------------------------------------------------------------------

/// One commanded (or sensed) level per actuator.  `true` = energised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorVector {
    states: [bool; ActuatorId::COUNT],
}

impl ActuatorVector {
    /// Everything de-energised: the Idle routing.
    pub const ALL_OFF: Self = Self {
        states: [false; ActuatorId::COUNT],
    };

    /// Build a vector from named flags (argument order matches the table
    /// in the module docs).
    pub const fn new(
        pump: bool,
        in_primary: bool,
        in_secondary: bool,
        out_drain: bool,
        out_flush: bool,
        out_water: bool,
    ) -> Self {
        Self {
            states: [pump, in_primary, in_secondary, out_drain, out_flush, out_water],
        }
    }

    pub const fn get(&self, id: ActuatorId) -> bool {
        self.states[id.index()]
    }

    pub fn set(&mut self, id: ActuatorId, on: bool) {
        self.states[id.index()] = on;
    }

    pub fn is_all_off(&self) -> bool {
        self.states.iter().all(|on| !on)
    }

    /// `(id, level)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ActuatorId, bool)> + '_ {
        ActuatorId::ALL.into_iter().map(|id| (id, self.get(id)))
    }
}

// ---------------------------------------------------------------------------
// Routing table
// ---------------------------------------------------------------------------

/// The commanded vector for `kind`.
pub const fn routing(kind: ActionKind) -> ActuatorVector {
    //                                pump   in-pri in-sec out-dr out-fl out-wa
    match kind {
        ActionKind::Idle => ActuatorVector::ALL_OFF,
        ActionKind::Refill => ActuatorVector::new(true, false, true, false, true, false),
        ActionKind::Drain => ActuatorVector::new(true, true, false, true, false, false),
        ActionKind::Clean => ActuatorVector::new(true, false, true, true, false, false),
        ActionKind::Water => ActuatorVector::new(true, true, false, false, false, true),
    }
}
