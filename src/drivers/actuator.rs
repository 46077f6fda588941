//! Binary actuator driver: one relay-switched valve or pump.
//!
//! Every output on the pod is wired the same way (relay coil on a GPIO,
//! HIGH = energised), so a single type covers all six.  The driver keeps
//! the last commanded level and can read the pad back independently; the
//! two disagree when a relay sticks or a pin is overridden.
//!
//! ## Dual-target design
//!
//! Generic over `embedded-hal` pins: [`GpioPin`](super::hw_init::GpioPin)
//! on the board, mock pins in tests.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::action::routing::ActuatorId;

pub struct BinaryActuator<P> {
    id: ActuatorId,
    pin: P,
    commanded: bool,
}

impl<P: OutputPin + InputPin> BinaryActuator<P> {
    /// Wrap `pin` and drive it low.
    pub fn new(id: ActuatorId, pin: P) -> Self {
        let mut actuator = Self {
            id,
            pin,
            commanded: true,
        };
        actuator.set(false);
        actuator
    }

    pub fn set(&mut self, on: bool) {
        let result = if on { self.pin.set_high() } else { self.pin.set_low() };
        if result.is_err() {
            warn!("actuator {}: pin write failed", self.id.label());
        }
        self.commanded = on;
    }

    pub fn commanded(&self) -> bool {
        self.commanded
    }

    /// Sensed pad level.  A read error reports "off".
    pub fn read_back(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }

    pub fn id(&self) -> ActuatorId {
        self.id
    }
}
