//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                 |
//! |----------------|--------------------|-----------------------------|
//! | `hardware`     | SensorPort         | level/water GPIO, HX711     |
//! |                | ActuatorPort       | valve and pump relays       |
//! | `log_sink`     | EventSink          | Serial log output           |
//! | `nvs`          | ConfigPort         | NVS / in-memory store       |
//! |                | StoragePort        |                             |
//! | `time`         | -                  | ESP32 system timer          |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
