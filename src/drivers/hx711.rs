//! HX711 load-cell amplifier (bit-banged, channel A, gain 128).
//!
//! DT goes low when a conversion is ready.  The 24-bit two's-complement
//! sample is clocked out MSB first on 24 SCK pulses; a 25th pulse selects
//! channel A / gain 128 for the next conversion.
//!
//! Grams = (raw − tare offset) / calibration factor.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{info, warn};

/// SCK high/low time.  The part needs ≥0.2 µs; SCK high for >60 µs powers
/// it down, so keep the pulses short.
const CLOCK_HALF_PERIOD_US: u32 = 1;

/// Gain-128 selection: one extra pulse after the data bits.
const GAIN_128_PULSES: u8 = 1;

/// Poll spacing while waiting for a conversion during tare.
const TARE_POLL_MS: u32 = 1;

pub struct Hx711<SCK, DT, D> {
    sck: SCK,
    dt: DT,
    delay: D,
    offset: i32,
    calibration: f32,
}

impl<SCK: OutputPin, DT: InputPin, D: DelayNs> Hx711<SCK, DT, D> {
    pub fn new(mut sck: SCK, dt: DT, delay: D, calibration: f32) -> Self {
        let _ = sck.set_low();
        Self {
            sck,
            dt,
            delay,
            offset: 0,
            calibration,
        }
    }

    /// A conversion is waiting.
    pub fn is_ready(&mut self) -> bool {
        self.dt.is_low().unwrap_or(false)
    }

    /// Clock out one conversion.  `None` when none is ready.
    pub fn read_raw(&mut self) -> Option<i32> {
        if !self.is_ready() {
            return None;
        }

        let mut value: u32 = 0;
        for _ in 0..24 {
            self.pulse();
            let bit = self.dt.is_high().unwrap_or(false);
            value = (value << 1) | u32::from(bit);
        }
        for _ in 0..GAIN_128_PULSES {
            self.pulse();
        }

        // Sign-extend from 24 bits.
        Some(((value << 8) as i32) >> 8)
    }

    /// Average `samples` conversions into the zero offset.  Gives up after
    /// `max_polls` not-ready polls; the offset is then left unchanged.
    pub fn tare(&mut self, samples: u8, max_polls: u32) -> bool {
        let wanted = samples.max(1);
        let mut sum: i64 = 0;
        let mut taken: u8 = 0;
        let mut polls: u32 = 0;

        while taken < wanted {
            match self.read_raw() {
                Some(raw) => {
                    sum += i64::from(raw);
                    taken += 1;
                }
                None => {
                    polls += 1;
                    if polls >= max_polls {
                        warn!("hx711: tare timed out after {} of {} samples", taken, wanted);
                        return false;
                    }
                    self.delay.delay_ms(TARE_POLL_MS);
                }
            }
        }

        self.offset = (sum / i64::from(wanted)) as i32;
        info!("hx711: tared, offset {}", self.offset);
        true
    }

    /// Grams relative to the tare point, if a conversion is ready.
    pub fn read_grams(&mut self) -> Option<f32> {
        let raw = self.read_raw()?;
        Some(raw.wrapping_sub(self.offset) as f32 / self.calibration)
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    fn pulse(&mut self) {
        let _ = self.sck.set_high();
        self.delay.delay_us(CLOCK_HALF_PERIOD_US);
        let _ = self.sck.set_low();
        self.delay.delay_us(CLOCK_HALF_PERIOD_US);
    }
}
