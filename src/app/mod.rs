//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the pod controller:
//! command intake, action orchestration, telemetry, and the persistence
//! slots.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod persistence;
pub mod ports;
pub mod service;
