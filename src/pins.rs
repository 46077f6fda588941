//! GPIO pin assignments for the pod controller board.
//!
//! Single source of truth; every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Valves (relay outputs, HIGH = open)
// ---------------------------------------------------------------------------

pub const VALVE_IN_PRIMARY_GPIO: i32 = 27;
pub const VALVE_IN_SECONDARY_GPIO: i32 = 25;
pub const VALVE_OUT_FLUSH_GPIO: i32 = 12;
pub const VALVE_OUT_DRAIN_GPIO: i32 = 32;
pub const VALVE_OUT_WATER_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Pump (relay output, HIGH = running)
// ---------------------------------------------------------------------------

pub const PUMP_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Sensors: Digital / Pulse
// ---------------------------------------------------------------------------

/// Hall-effect flow meter: pulse output, rising-edge interrupt, pull-up.
pub const FLOWMETER_GPIO: i32 = 17;

/// Water-presence detector.  Active LOW (LOW = water present).
pub const WATER_SENSOR_GPIO: i32 = 16;

/// Float level switch, pull-down.  Active LOW (LOW = level reached).
pub const LEVEL_SWITCH_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// HX711 load-cell amplifier
// ---------------------------------------------------------------------------

/// Data out (input-only pad on ESP32).
pub const HX711_DT_GPIO: i32 = 35;
/// Serial clock.
pub const HX711_SCK_GPIO: i32 = 14;

