//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish over MQTT,
//! update a Homie property, etc.
//!
//! Every start and every stop produces exactly one event.  `Display`
//! renders the human-readable event string the operator sees.

use core::fmt::{self, Write as _};

use crate::action::routing::ActuatorId;
use crate::action::{ActionKind, ActionStarted, ActionStopped};

/// Capacity of a rendered event string.
pub const EVENT_TEXT_CAPACITY: usize = 256;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Persisted state was restored and the poll loop is about to start.
    Booted { flow_pulses: i32, weight_g: f32 },

    /// An action run began.
    ActionStarted(ActionStarted),

    /// An action run ended.
    ActionStopped(ActionStopped),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// Commanded and sensed level of one actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActuatorTelemetry {
    pub commanded: bool,
    pub readback: bool,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub action: ActionKind,
    /// Indexed by [`ActuatorId::index`].
    pub actuators: [ActuatorTelemetry; ActuatorId::COUNT],
    pub level_reached: bool,
    pub water_detected: bool,
    /// Raw signed flow counter (lifetime net pulses).
    pub flow_pulses: i32,
    pub volume_ml: i32,
    pub weight_g: f32,
}

impl TelemetryData {
    pub fn actuator(&self, id: ActuatorId) -> ActuatorTelemetry {
        self.actuators[id.index()]
    }

    /// Actuators whose sensed level differs from the commanded one.
    pub fn diverged(&self) -> impl Iterator<Item = ActuatorId> + '_ {
        ActuatorId::ALL.into_iter().filter(|id| {
            let a = self.actuator(*id);
            a.commanded != a.readback
        })
    }
}

impl AppEvent {
    /// Render into a fixed-capacity buffer.  Text beyond
    /// [`EVENT_TEXT_CAPACITY`] is dropped.
    pub fn render(&self) -> heapless::String<EVENT_TEXT_CAPACITY> {
        let mut out = heapless::String::new();
        let _ = write!(out, "{self}");
        out
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Booted {
                flow_pulses,
                weight_g,
            } => write!(
                f,
                "Booted. flow counter: {flow_pulses} weight: {weight_g:.2} g"
            ),
            Self::ActionStarted(s) => write!(
                f,
                "Start action {}. max ml: {} max time in seconds: {}",
                s.requested.label(),
                s.max_ml,
                s.max_seconds
            ),
            Self::ActionStopped(s) => write!(
                f,
                "Stopped action {} due to {} event. max ml: {} max time in seconds: {}",
                s.requested.label(),
                s.reason.describe(),
                s.max_ml,
                s.max_seconds
            ),
            Self::Telemetry(t) => {
                write!(
                    f,
                    "action={} flow={} ({} ml) weight={:.2} g level={} water={}",
                    t.action.label(),
                    t.flow_pulses,
                    t.volume_ml,
                    t.weight_g,
                    u8::from(t.level_reached),
                    u8::from(t.water_detected)
                )?;
                for id in ActuatorId::ALL {
                    let a = t.actuator(id);
                    write!(
                        f,
                        " {}={}/{}",
                        id.label(),
                        u8::from(a.commanded),
                        u8::from(a.readback)
                    )?;
                }
                Ok(())
            }
        }
    }
}
