//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures GPIO directions, pulls and the flow-meter interrupt using raw
//! ESP-IDF sys calls.  Called once from `main()` before the poll loop
//! starts.  [`GpioPin`] wraps a configured pad behind the `embedded-hal`
//! digital traits so drivers stay target-agnostic.
//!
//! On the host every pad is an entry in an atomic level table, which tests
//! drive through [`sim_set_level`].

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::action::routing::ActuatorId;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc) => write!(f, "flow ISR handler add failed (rc={})", rc),
        }
    }
}

/// Actuator pads in [`ActuatorId`] index order.
pub const ACTUATOR_GPIOS: [i32; ActuatorId::COUNT] = [
    pins::PUMP_GPIO,
    pins::VALVE_IN_PRIMARY_GPIO,
    pins::VALVE_IN_SECONDARY_GPIO,
    pins::VALVE_OUT_DRAIN_GPIO,
    pins::VALVE_OUT_FLUSH_GPIO,
    pins::VALVE_OUT_WATER_GPIO,
];

pub const fn actuator_gpio(id: ActuatorId) -> i32 {
    ACTUATOR_GPIOS[id.index()]
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the poll loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // Active-low inputs idle high; the HX711 holds DT high until ready.
    for pin in [pins::LEVEL_SWITCH_GPIO, pins::WATER_SENSOR_GPIO, pins::HX711_DT_GPIO] {
        sim_set_level(pin, true);
    }
    for pin in ACTUATOR_GPIOS {
        sim_set_level(pin, false);
    }
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Outputs ──────────────────────────────────────────────

/// Actuators are configured input+output so a read returns the pad level,
/// not the output latch.
#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in ACTUATOR_GPIOS.iter().chain(&[pins::HX711_SCK_GPIO]) {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured (6 actuators + HX711 SCK)");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    // (pin, pull-up, pull-down)
    let input_pins = [
        (pins::FLOWMETER_GPIO, true, false),
        (pins::WATER_SENSOR_GPIO, false, false),
        (pins::LEVEL_SWITCH_GPIO, false, true),
        // GPIO35 is input-only with no internal pulls.
        (pins::HX711_DT_GPIO, false, false),
    ];

    for &(pin, up, down) in &input_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: if up { gpio_pullup_t_GPIO_PULLUP_ENABLE } else { gpio_pullup_t_GPIO_PULLUP_DISABLE },
            pull_down_en: if down { gpio_pulldown_t_GPIO_PULLDOWN_ENABLE } else { gpio_pulldown_t_GPIO_PULLDOWN_DISABLE },
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

// ── Raw pad access ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was validated during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
const SIM_PAD_COUNT: usize = 40;

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: [core::sync::atomic::AtomicBool; SIM_PAD_COUNT] =
    [const { core::sync::atomic::AtomicBool::new(false) }; SIM_PAD_COUNT];

/// Force a simulated pad level (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    if let Some(level) = usize::try_from(pin).ok().and_then(|i| SIM_LEVELS.get(i)) {
        level.store(high, core::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    usize::try_from(pin)
        .ok()
        .and_then(|i| SIM_LEVELS.get(i))
        .is_some_and(|level| level.load(core::sync::atomic::Ordering::Relaxed))
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim_set_level(pin, high);
}

// ── embedded-hal pin ──────────────────────────────────────────

/// A configured pad addressed by GPIO number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin {
    num: i32,
}

impl GpioPin {
    pub const fn new(num: i32) -> Self {
        Self { num }
    }

    pub const fn num(&self) -> i32 {
        self.num
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.num, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.num, true);
        Ok(())
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.num))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.num))
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Busy-wait delay used for bit-banged protocols.
#[cfg(target_os = "espidf")]
pub type PlatformDelay = esp_idf_hal::delay::Ets;

#[cfg(not(target_os = "espidf"))]
pub type PlatformDelay = SimDelay;

/// Host delay: returns immediately.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimDelay;

#[cfg(not(target_os = "espidf"))]
impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

pub fn platform_delay() -> PlatformDelay {
    #[cfg(target_os = "espidf")]
    {
        esp_idf_hal::delay::Ets
    }
    #[cfg(not(target_os = "espidf"))]
    {
        SimDelay
    }
}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::sensors::flow::flow_isr_handler;

#[cfg(target_os = "espidf")]
unsafe extern "C" fn flow_gpio_isr(_arg: *mut core::ffi::c_void) {
    flow_isr_handler();
}

/// Install the per-pin GPIO ISR service and register the flow-meter
/// rising-edge handler.  Call after init_peripherals() and before the
/// poll loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed (acceptable).  The registered handler
    // is a static function that only touches an atomic counter.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        gpio_set_intr_type(pins::FLOWMETER_GPIO, gpio_int_type_t_GPIO_INTR_POSEDGE);
        let ret = gpio_isr_handler_add(pins::FLOWMETER_GPIO, Some(flow_gpio_isr), core::ptr::null_mut());
        if ret != ESP_OK {
            return Err(HwInitError::IsrHandlerFailed(ret));
        }
        gpio_intr_enable(pins::FLOWMETER_GPIO);

        info!("hw_init: ISR service installed (flow meter, rising edge)");
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}
