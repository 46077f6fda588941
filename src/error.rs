//! Unified error types for the pod controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! poll loop's error handling uniform.  All variants are `Copy` so they can
//! be passed back through the command path without allocation.
//!
//! Every error in this crate is local and recoverable: the caller is told the
//! command was rejected and the controller state is left exactly as it was.

use core::fmt;

use crate::action::ActionKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The action state machine refused a transition.
    Action(ActionError),
    /// An inbound command could not be decoded.
    Command(CommandError),
    /// A persistence slot could not be read or written.
    Persistence(PersistenceError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(e) => write!(f, "action: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Persistence(e) => write!(f, "persistence: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action state machine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// `start` while another action is live.  Carries the running action.
    AlreadyRunning(ActionKind),
    /// A volume or time limit was zero, negative, or overflowed the pulse
    /// counter range.
    InvalidParameters,
    /// Flow reset requested while an action is running.
    FlowResetWhileRunning(ActionKind),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning(kind) => write!(f, "action {} already running", kind.label()),
            Self::InvalidParameters => write!(f, "invalid volume/time limits"),
            Self::FlowResetWhileRunning(kind) => {
                write!(f, "flow reset refused while {} is running", kind.label())
            }
        }
    }
}

impl From<ActionError> for Error {
    fn from(e: ActionError) -> Self {
        Self::Action(e)
    }
}

// ---------------------------------------------------------------------------
// Command intake errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The property path does not name a settable property.
    UnknownProperty,
    /// The payload was not the expected JSON object or boolean literal.
    MalformedPayload,
    /// A limit was outside `1..=i32::MAX`.
    OutOfRange,
    /// A reset/idle command carried anything other than the literal `true`.
    ResetRejected,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty => write!(f, "unknown property"),
            Self::MalformedPayload => write!(f, "malformed payload"),
            Self::OutOfRange => write!(f, "limit out of range"),
            Self::ResetRejected => write!(f, "reset rejected (payload is not `true`)"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

/// Reported by the persistence gateway.  The control loop logs these and
/// carries on; a failed save never alters control behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistenceError {
    NotFound,
    Failed,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "slot not found"),
            Self::Failed => write!(f, "slot write failed"),
        }
    }
}

impl From<PersistenceError> for Error {
    fn from(e: PersistenceError) -> Self {
        Self::Persistence(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
