//! Actuator and sensor drivers plus hardware initialisation.

pub mod actuator;
pub mod hw_init;
pub mod hx711;
