//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the ESP-IDF
//! logger (which goes to UART / USB-CDC in production).  A pub-sub adapter
//! would implement the same trait and publish `event.render()`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!("TELEM | {}", event);
                for id in t.diverged() {
                    let a = t.actuator(id);
                    warn!(
                        "TELEM | {} commanded={} readback={}",
                        id.label(),
                        a.commanded,
                        a.readback
                    );
                }
            }
            AppEvent::ActionStarted(_) | AppEvent::ActionStopped(_) => {
                info!("EVENT | {}", event);
            }
            AppEvent::Booted { .. } => {
                info!("BOOT  | {}", event);
            }
        }
    }
}
