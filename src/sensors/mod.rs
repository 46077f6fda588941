//! Sensor-side state owned by the core: the ISR-fed flow counter and the
//! reconstructed pod weight.  Raw pin reads live behind
//! [`SensorPort`](crate::app::ports::SensorPort).

pub mod flow;
pub mod scale;
