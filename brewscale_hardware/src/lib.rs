//! Device collaborators for the brew scale: always-available simulations,
//! plus real HX711/GPIO implementations behind the `hardware` feature.

pub mod error;
#[cfg(feature = "hardware")]
pub mod hx711;

use brewscale_traits::{Buzzer, DisplaySink, Frame, LoadCell};

/// Simulated load cell driven by a pre-built profile of gram readings.
/// The profile advances one entry per `read_units` call and sticks on the
/// last entry, so one entry corresponds to one control-loop tick.
pub struct SimulatedLoadCell {
    profile: Vec<f32>,
    idx: usize,
    offset_g: f32,
    scale_factor: f32,
    /// Report not-ready on every nth poll (0 = always ready).
    not_ready_every: usize,
    polls: usize,
}

impl SimulatedLoadCell {
    pub fn from_profile(profile: impl Into<Vec<f32>>) -> Self {
        Self {
            profile: profile.into(),
            idx: 0,
            offset_g: 0.0,
            scale_factor: 1000.0,
            not_ready_every: 0,
            polls: 0,
        }
    }

    /// Canonical brew session: empty platform, cup placed, steady pour,
    /// then a flat tail long enough to stop the timer.
    pub fn pour(cup_g: f32, per_tick_g: f32, pour_ticks: usize, tail_ticks: usize) -> Self {
        let mut profile = vec![0.0; 4];
        let mut level = cup_g;
        profile.push(level);
        for _ in 0..pour_ticks {
            level += per_tick_g;
            profile.push(level);
        }
        for _ in 0..tail_ticks {
            profile.push(level);
        }
        Self::from_profile(profile)
    }

    /// Drop readiness on every nth `is_ready` poll to exercise the
    /// stale-sample path of the control loop.
    pub fn with_not_ready_every(mut self, n: usize) -> Self {
        self.not_ready_every = n;
        self
    }

    fn current(&self) -> f32 {
        self.profile
            .get(self.idx)
            .or_else(|| self.profile.last())
            .copied()
            .unwrap_or(0.0)
    }
}

impl LoadCell for SimulatedLoadCell {
    fn is_ready(&mut self) -> bool {
        self.polls += 1;
        !(self.not_ready_every > 0 && self.polls % self.not_ready_every == 0)
    }

    fn read_raw(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        Ok((self.current() * self.scale_factor) as i32)
    }

    fn read_units(
        &mut self,
        _samples: u8,
    ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
        let v = self.current() - self.offset_g;
        if self.idx < self.profile.len() {
            self.idx += 1;
        }
        Ok(v)
    }

    fn tare(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.offset_g = self.current();
        tracing::debug!(offset_g = self.offset_g, "simulated load cell tared");
        Ok(())
    }
}

/// Console display: one line per tick, same four scalars a real panel shows.
#[derive(Debug, Default)]
pub struct ConsoleDisplay {
    frames: usize,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> usize {
        self.frames
    }
}

impl DisplaySink for ConsoleDisplay {
    fn splash(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("brewscale ready");
        Ok(())
    }

    fn render(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.frames += 1;
        let state = if frame.running { "*" } else { " " };
        println!(
            "raw {:>8}  inst {:>7.2} g  weight {:>6.1} g  timer {:>5.1} s {}",
            frame.raw, frame.units, frame.stable_g, frame.elapsed_s, state
        );
        Ok(())
    }
}

/// Buzzer stand-in that just logs the beep request.
#[derive(Debug, Default)]
pub struct ConsoleBuzzer;

impl Buzzer for ConsoleBuzzer {
    fn beep_ms(&mut self, ms: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(ms, "beep");
        Ok(())
    }
}

#[cfg(feature = "hardware")]
pub use hardware_impl::{HardwareLoadCell, GpioBuzzer, make_tare_button_checker};

#[cfg(feature = "hardware")]
mod hardware_impl {
    use super::*;
    use crate::error::HwError;
    use crate::hx711::Hx711;
    use std::time::Duration;

    /// HX711-backed load cell. Raw counts convert to grams through the
    /// manual calibration factor; tare captures an averaged zero offset.
    pub struct HardwareLoadCell {
        hx711: Hx711,
        offset_counts: i64,
        scale_factor: f32,
        read_timeout: Duration,
    }

    impl HardwareLoadCell {
        pub fn new(
            dt_pin: u8,
            sck_pin: u8,
            scale_factor: f32,
            read_timeout: Duration,
        ) -> Result<Self, HwError> {
            let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let dt = gpio
                .get(dt_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_input();
            let sck = gpio
                .get(sck_pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            Ok(Self {
                hx711: Hx711::new(dt, sck, 25)?,
                offset_counts: 0,
                scale_factor,
                read_timeout,
            })
        }

        fn read_avg_counts(&mut self, samples: u8) -> Result<i64, HwError> {
            let n = samples.max(1);
            let mut sum: i64 = 0;
            for _ in 0..n {
                sum += i64::from(self.hx711.read_with_timeout(self.read_timeout)?);
            }
            Ok(sum / i64::from(n))
        }
    }

    impl LoadCell for HardwareLoadCell {
        fn is_ready(&mut self) -> bool {
            self.hx711.is_ready()
        }

        fn read_raw(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.hx711.read_with_timeout(self.read_timeout)?)
        }

        fn read_units(
            &mut self,
            samples: u8,
        ) -> Result<f32, Box<dyn std::error::Error + Send + Sync>> {
            let avg = self.read_avg_counts(samples)?;
            Ok(((avg - self.offset_counts) as f32) / self.scale_factor)
        }

        fn tare(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            // Deeper average than a display read; the zero baseline should
            // not inherit single-sample noise.
            self.offset_counts = self.read_avg_counts(10)?;
            tracing::info!(offset_counts = self.offset_counts, "load cell tared");
            Ok(())
        }
    }

    /// Active buzzer on a GPIO pin; blocks for the beep duration.
    pub struct GpioBuzzer {
        pin: rppal::gpio::OutputPin,
    }

    impl GpioBuzzer {
        pub fn new(pin: u8) -> Result<Self, HwError> {
            let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(e.to_string()))?
                .into_output();
            Ok(Self { pin })
        }
    }

    impl Buzzer for GpioBuzzer {
        fn beep_ms(&mut self, ms: u32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.pin.set_high();
            std::thread::sleep(Duration::from_millis(u64::from(ms)));
            self.pin.set_low();
            Ok(())
        }
    }

    /// Edge-level tare button checker: the control loop polls this closure
    /// once per tick and handles debounce itself.
    pub fn make_tare_button_checker(
        pin: u8,
        active_low: bool,
    ) -> Result<Box<dyn Fn() -> bool + Send + Sync>, HwError> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let input = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        Ok(Box::new(move || {
            if active_low {
                input.is_low()
            } else {
                input.is_high()
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_cell_advances_one_entry_per_units_read() {
        let mut cell = SimulatedLoadCell::from_profile([1.0, 2.0, 3.0]);
        assert!((cell.read_units(3).unwrap() - 1.0).abs() < 1e-6);
        assert!((cell.read_units(3).unwrap() - 2.0).abs() < 1e-6);
        assert!((cell.read_units(3).unwrap() - 3.0).abs() < 1e-6);
        // sticks on the last entry
        assert!((cell.read_units(3).unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn tare_zeroes_subsequent_reads() {
        let mut cell = SimulatedLoadCell::from_profile([10.0, 10.0, 12.5]);
        cell.tare().unwrap();
        assert!((cell.read_units(1).unwrap()).abs() < 1e-6);
        let _ = cell.read_units(1).unwrap();
        assert!((cell.read_units(1).unwrap() - 2.5).abs() < 1e-6);
    }
}
