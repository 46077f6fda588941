//! Persistence slots for the two quantities that survive a power cycle.
//!
//! | slot          | type  | on load                                         |
//! |---------------|-------|-------------------------------------------------|
//! | `pod::flow`   | `i32` | missing, undecodable or `-1` → leave counter    |
//! | `pod::weight` | `f32` | missing, undecodable or non-finite → `0.0`      |
//!
//! Values are `postcard`-encoded into small stack buffers.  Load never
//! fails from the caller's point of view; save returns a
//! [`PersistenceError`] the caller logs and otherwise ignores.

use log::{debug, warn};

use crate::error::PersistenceError;

use super::ports::{StorageError, StoragePort};

pub const NAMESPACE: &str = "pod";
pub const FLOW_KEY: &str = "flow";
pub const WEIGHT_KEY: &str = "weight";

/// Value an erased slot decodes to; treated as "nothing stored".
pub const FLOW_ERASED_SENTINEL: i32 = -1;

/// Large enough for a varint `i32` or a raw `f32`.
const SLOT_BUF_LEN: usize = 8;

/// Persisted flow counter, or `None` when the counter should keep its
/// compiled-in default.
pub fn load_flow_counter(storage: &impl StoragePort) -> Option<i32> {
    let pulses: i32 = read_slot(storage, FLOW_KEY)?;
    if pulses == FLOW_ERASED_SENTINEL {
        debug!("persistence: flow slot holds the erased sentinel");
        return None;
    }
    Some(pulses)
}

pub fn save_flow_counter(
    storage: &mut impl StoragePort,
    pulses: i32,
) -> Result<(), PersistenceError> {
    write_slot(storage, FLOW_KEY, &pulses)
}

/// Persisted weight in grams; `0.0` when absent or not a number.
pub fn load_weight(storage: &impl StoragePort) -> f32 {
    match read_slot::<f32>(storage, WEIGHT_KEY) {
        Some(w) if w.is_finite() => w,
        Some(_) => {
            warn!("persistence: weight slot is not finite, using 0");
            0.0
        }
        None => 0.0,
    }
}

pub fn save_weight(storage: &mut impl StoragePort, grams: f32) -> Result<(), PersistenceError> {
    write_slot(storage, WEIGHT_KEY, &grams)
}

fn read_slot<T: serde::de::DeserializeOwned>(storage: &impl StoragePort, key: &str) -> Option<T> {
    let mut buf = [0u8; SLOT_BUF_LEN];
    let len = match storage.read(NAMESPACE, key, &mut buf) {
        Ok(len) => len,
        Err(StorageError::NotFound) => {
            debug!("persistence: {}::{} not found", NAMESPACE, key);
            return None;
        }
        Err(e) => {
            warn!("persistence: reading {}::{} failed: {}", NAMESPACE, key, e);
            return None;
        }
    };
    match postcard::from_bytes(&buf[..len]) {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("persistence: {}::{} is undecodable ({} bytes)", NAMESPACE, key, len);
            None
        }
    }
}

fn write_slot<T: serde::Serialize>(
    storage: &mut impl StoragePort,
    key: &str,
    value: &T,
) -> Result<(), PersistenceError> {
    let mut buf = [0u8; SLOT_BUF_LEN];
    let encoded = postcard::to_slice(value, &mut buf).map_err(|_| PersistenceError::Failed)?;
    storage.write(NAMESPACE, key, encoded).map_err(|e| {
        warn!("persistence: writing {}::{} failed: {}", NAMESPACE, key, e);
        match e {
            StorageError::NotFound => PersistenceError::NotFound,
            _ => PersistenceError::Failed,
        }
    })
}
