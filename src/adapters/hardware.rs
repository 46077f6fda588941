//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the six [`BinaryActuator`]s, the two active-low digital sensors
//! and the HX711, exposing them through [`SensorPort`] and
//! [`ActuatorPort`].  This is the only module in the system that touches
//! actual hardware.  On non-espidf targets, [`GpioPin`] is backed by the
//! simulated pad table in `hw_init`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::action::routing::ActuatorId;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::actuator::BinaryActuator;
use crate::drivers::hw_init::{self, GpioPin, PlatformDelay};
use crate::drivers::hx711::Hx711;
use crate::pins;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<O, I, SCK, DT, D> {
    actuators: [BinaryActuator<O>; ActuatorId::COUNT],
    level_switch: I,
    water_sensor: I,
    scale: Hx711<SCK, DT, D>,
}

/// The board wiring.
pub type BoardHardware = HardwareAdapter<GpioPin, GpioPin, GpioPin, GpioPin, PlatformDelay>;

impl BoardHardware {
    /// Bind every pad from [`pins`].  Call after
    /// [`hw_init::init_peripherals`].
    pub fn board(scale_calibration: f32) -> Self {
        Self::new(
            hw_init::ACTUATOR_GPIOS.map(GpioPin::new),
            GpioPin::new(pins::LEVEL_SWITCH_GPIO),
            GpioPin::new(pins::WATER_SENSOR_GPIO),
            Hx711::new(
                GpioPin::new(pins::HX711_SCK_GPIO),
                GpioPin::new(pins::HX711_DT_GPIO),
                hw_init::platform_delay(),
                scale_calibration,
            ),
        )
    }
}

impl<O, I, SCK, DT, D> HardwareAdapter<O, I, SCK, DT, D>
where
    O: OutputPin + InputPin,
    I: InputPin,
    SCK: OutputPin,
    DT: InputPin,
    D: DelayNs,
{
    /// `actuator_pins` in [`ActuatorId`] index order.  Every output starts
    /// de-energised.
    pub fn new(
        actuator_pins: [O; ActuatorId::COUNT],
        level_switch: I,
        water_sensor: I,
        scale: Hx711<SCK, DT, D>,
    ) -> Self {
        let mut next = 0;
        let actuators = actuator_pins.map(|pin| {
            let actuator = BinaryActuator::new(ActuatorId::ALL[next], pin);
            next += 1;
            actuator
        });
        Self {
            actuators,
            level_switch,
            water_sensor,
            scale,
        }
    }

    /// Zero the load cell.  `false` when the HX711 never became ready.
    pub fn tare_scale(&mut self, samples: u8, max_polls: u32) -> bool {
        self.scale.tare(samples, max_polls)
    }

    /// Level last written to `id`.
    pub fn commanded(&self, id: ActuatorId) -> bool {
        self.actuators[id.index()].commanded()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<O, I, SCK, DT, D> SensorPort for HardwareAdapter<O, I, SCK, DT, D>
where
    O: OutputPin + InputPin,
    I: InputPin,
    SCK: OutputPin,
    DT: InputPin,
    D: DelayNs,
{
    // Both switches pull their line low when active.
    fn level_reached(&mut self) -> bool {
        self.level_switch.is_low().unwrap_or(false)
    }

    fn water_detected(&mut self) -> bool {
        self.water_sensor.is_low().unwrap_or(false)
    }

    fn read_weight_sample(&mut self) -> Option<f32> {
        self.scale.read_grams()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<O, I, SCK, DT, D> ActuatorPort for HardwareAdapter<O, I, SCK, DT, D>
where
    O: OutputPin + InputPin,
    I: InputPin,
    SCK: OutputPin,
    DT: InputPin,
    D: DelayNs,
{
    fn write(&mut self, id: ActuatorId, on: bool) {
        self.actuators[id.index()].set(on);
    }

    fn read_back(&mut self, id: ActuatorId) -> bool {
        self.actuators[id.index()].read_back()
    }
}
