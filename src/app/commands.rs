//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (the serial
//! console today, a pub-sub transport later) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.
//!
//! Commands arrive as `(property, payload)` string pairs.  Decoding is
//! strict and happens entirely here: a malformed or out-of-range payload
//! never reaches the action state machine.

use serde::Deserialize;

use crate::action::ActionKind;
use crate::action::routing::ActuatorId;
use crate::error::CommandError;

/// The only payload accepted by reset and idle properties.
pub const TRUE_TOKEN: &str = "true";
pub const FALSE_TOKEN: &str = "false";

const ACTIONS_PREFIX: &str = "actions/";

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Begin a bounded action.
    Start {
        kind: ActionKind,
        max_ml: i32,
        max_seconds: i32,
    },

    /// Manual stop of the running action.
    Idle,

    /// Zero the flow counter.  Refused while an action runs.
    ResetFlow,

    /// Drop the persisted weight baseline.
    ResetScale,

    /// Drive one actuator directly, outside of any routing.
    Override { actuator: ActuatorId, on: bool },
}

/// JSON body of a start command.  Wider than `i32` so out-of-range
/// numbers are reported as such rather than as parse failures.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPayload {
    max_ml: i64,
    max_seconds: i64,
}

impl AppCommand {
    /// Decode a property write.
    pub fn decode(property: &str, payload: &str) -> Result<Self, CommandError> {
        if let Some(name) = property.strip_prefix(ACTIONS_PREFIX) {
            return match ActionKind::from_command(name) {
                Some(ActionKind::Idle) => {
                    expect_true(payload)?;
                    Ok(Self::Idle)
                }
                Some(kind) => decode_start(kind, payload),
                None => Err(CommandError::UnknownProperty),
            };
        }

        match property {
            "flow/reset" => {
                expect_true(payload)?;
                Ok(Self::ResetFlow)
            }
            "scale/reset" => {
                expect_true(payload)?;
                Ok(Self::ResetScale)
            }
            _ => {
                let actuator =
                    ActuatorId::from_property(property).ok_or(CommandError::UnknownProperty)?;
                let on = match payload {
                    TRUE_TOKEN => true,
                    FALSE_TOKEN => false,
                    _ => return Err(CommandError::MalformedPayload),
                };
                Ok(Self::Override { actuator, on })
            }
        }
    }
}

fn expect_true(payload: &str) -> Result<(), CommandError> {
    if payload == TRUE_TOKEN {
        Ok(())
    } else {
        Err(CommandError::ResetRejected)
    }
}

fn decode_start(kind: ActionKind, payload: &str) -> Result<AppCommand, CommandError> {
    let body: StartPayload =
        serde_json::from_str(payload).map_err(|_| CommandError::MalformedPayload)?;
    Ok(AppCommand::Start {
        kind,
        max_ml: positive_i32(body.max_ml)?,
        max_seconds: positive_i32(body.max_seconds)?,
    })
}

fn positive_i32(value: i64) -> Result<i32, CommandError> {
    match i32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(CommandError::OutOfRange),
    }
}
