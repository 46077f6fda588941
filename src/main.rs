//! Pod controller firmware: main entry point.
//!
//! Hexagonal architecture driven by one cooperative poll loop plus the
//! flow-meter ISR.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter    PodClock       │
//! │  (Sensor+Actuator) (EventSink)    (Config+NVS)  (uptime)       │
//! │  console reader ──▶ AppCommand::decode                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  ActionMachine · routing · flow · weight · cadences    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  flow ISR ──▶ FLOW_COUNTER (atomic)                            │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::mpsc;

use anyhow::{Result, anyhow};
use log::{error, info, warn};

use podctl::adapters::hardware::BoardHardware;
use podctl::adapters::log_sink::LogEventSink;
use podctl::adapters::nvs::NvsAdapter;
use podctl::adapters::time::PodClock;
use podctl::app::commands::AppCommand;
use podctl::app::ports::ConfigPort;
use podctl::app::service::AppService;
use podctl::config::PodConfig;
use podctl::drivers::hw_init;
use podctl::sensors::flow::FLOW_COUNTER;

/// Not-ready polls (1 ms apart) allowed for the boot tare.
const TARE_MAX_POLLS: u32 = 2_000;

/// Stack for the console reader thread.
const CONSOLE_STACK_BYTES: usize = 4096;

/// Inbound console lines waiting for the poll loop.
const CONSOLE_QUEUE_DEPTH: usize = 8;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  podctl v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals().map_err(|e| anyhow!("HAL init failed: {e}"))?;
    if let Err(e) = hw_init::init_isr_service() {
        // Without the ISR no pulses are counted; time and level stops
        // still work, so keep running.
        error!("ISR service init failed: {}; flow counting disabled", e);
    }

    // ── 3. Load config from NVS (or defaults) ─────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {e}"))?;
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            PodConfig::default()
        }
    };

    // ── 4. Hardware adapter + scale tare ──────────────────────
    let mut hw = BoardHardware::board(config.scale_calibration_factor);
    if !hw.tare_scale(config.scale_tare_samples, TARE_MAX_POLLS) {
        warn!("Scale tare timeout, check HX711 wiring; weight is untared");
    }

    // ── 5. Application service ────────────────────────────────
    let clock = PodClock::new();
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(config.clone(), &FLOW_COUNTER);
    app.boot(&nvs, &mut sink);

    // ── 6. Console command reader ─────────────────────────────
    let (tx, rx) = mpsc::sync_channel::<String>(CONSOLE_QUEUE_DEPTH);
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(CONSOLE_STACK_BYTES)
        .spawn(move || console_reader(tx))?;

    info!("System ready. Entering poll loop.");

    // ── 7. Poll loop ──────────────────────────────────────────
    let interval = std::time::Duration::from_millis(u64::from(config.control_loop_interval_ms));
    loop {
        while let Ok(line) = rx.try_recv() {
            let Some((property, payload)) = split_command_line(&line) else {
                warn!("Console: expected `<property> <payload>`, got {:?}", line);
                continue;
            };
            let cmd = match AppCommand::decode(property, payload) {
                Ok(cmd) => cmd,
                Err(e) => {
                    warn!("Command {} rejected: {}", property, e);
                    continue;
                }
            };
            if let Err(e) = app.handle_command(cmd, clock.uptime_ms(), &mut hw, &mut nvs, &mut sink) {
                warn!("Command {} refused: {}", property, e);
            }
        }

        app.tick(clock.uptime_ms(), &mut hw, &mut nvs, &mut sink);
        std::thread::sleep(interval);
    }
}

/// Forward console lines to the poll loop until stdin closes.
fn console_reader(tx: mpsc::SyncSender<String>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        }
    }
}

/// `"actions/refill {\"maxMl\":5,\"maxSeconds\":60}"` → property + payload.
fn split_command_line(line: &str) -> Option<(&str, &str)> {
    let (property, payload) = line.trim().split_once(char::is_whitespace)?;
    Some((property, payload.trim()))
}
