#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the brew scale controller.
//!
//! `Config` and its sub-structs are deserialized from TOML and validated.
//! Every tuning constant of the signal pipeline and the flow-gated timer is
//! exposed here; the shipped defaults are the reference tuning.

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Pins {
    /// HX711 data pin (DT).
    pub hx711_dt: u8,
    /// HX711 clock pin (SCK).
    pub hx711_sck: u8,
    /// Tare button input; None disables the hardware tare trigger.
    pub tare_button: Option<u8>,
    /// Active buzzer output; None falls back to the console buzzer.
    pub buzzer: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            hx711_dt: 5,
            hx711_sck: 6,
            tare_button: Some(17),
            buzzer: None,
        }
    }
}

/// Adaptive filter tuning. The three (threshold, alpha) bands trade
/// responsiveness for noise rejection as motion magnitude shrinks; alpha is
/// the weight retained on the previous output, so higher alpha = slower.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FilterCfg {
    /// Jumps larger than this are treated as real events and snap the filter.
    pub snap_g: f32,
    /// Fast-tracking band threshold.
    pub fast_g: f32,
    pub fast_alpha: f32,
    /// Medium band threshold.
    pub medium_g: f32,
    pub medium_alpha: f32,
    /// Heavy smoothing for near-static noise.
    pub settle_alpha: f32,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            snap_g: 1.0,
            fast_g: 0.3,
            fast_alpha: 0.4,
            medium_g: 0.1,
            medium_alpha: 0.7,
            settle_alpha: 0.95,
        }
    }
}

/// Display conditioning: hysteresis, zero clamp bands, quantization step.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DisplayCfg {
    /// Suppress shown-weight updates until drift reaches this band.
    pub hysteresis_g: f32,
    /// Negative-side zero clamp band (magnitude). Wider than the positive
    /// band because tare drift skews negative.
    pub zero_band_neg_g: f32,
    /// Positive-side zero clamp band.
    pub zero_band_pos_g: f32,
    /// Display resolution; shown weight is a multiple of this.
    pub resolution_g: f32,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            hysteresis_g: 0.08,
            zero_band_neg_g: 0.3,
            zero_band_pos_g: 0.2,
            resolution_g: 0.1,
        }
    }
}

/// Flow-gated brew timer tuning.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TimerCfg {
    /// Stable weight that starts the timer from idle.
    pub start_g: f32,
    /// Per-tick weight delta below which flow counts as stalled.
    pub min_flow_g: f32,
    /// Stall must persist this long before the timer stops.
    pub min_flow_ms: u64,
}

impl Default for TimerCfg {
    fn default() -> Self {
        Self {
            start_g: 2.0,
            min_flow_g: 0.2,
            min_flow_ms: 800,
        }
    }
}

/// Control loop pacing and input debounce.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct LoopCfg {
    /// Nominal tick period in milliseconds.
    pub tick_ms: u64,
    /// Raw reads averaged per units sample.
    pub sample_average: u8,
    /// Tare button confirm/release poll delay.
    pub debounce_ms: u64,
    /// HX711 data-ready wait budget per raw read.
    pub sensor_timeout_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            sample_average: 3,
            debounce_ms: 20,
            sensor_timeout_ms: 100,
        }
    }
}

/// Manual single-factor calibration: units = (raw - tare offset) / scale_factor.
/// Tuned by hand; not persisted and not multi-point.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Calibration {
    pub scale_factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self { scale_factor: 1.0 }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub filter: FilterCfg,
    pub display: DisplayCfg,
    pub timer: TimerCfg,
    #[serde(rename = "loop")]
    pub pacing: LoopCfg,
    pub calibration: Calibration,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> eyre::Result<()> {
        let f = &self.filter;
        for (name, v) in [
            ("filter.snap_g", f.snap_g),
            ("filter.fast_g", f.fast_g),
            ("filter.medium_g", f.medium_g),
            ("filter.fast_alpha", f.fast_alpha),
            ("filter.medium_alpha", f.medium_alpha),
            ("filter.settle_alpha", f.settle_alpha),
        ] {
            if !v.is_finite() {
                eyre::bail!("{name} must be finite");
            }
        }
        if !(f.snap_g > f.fast_g && f.fast_g > f.medium_g && f.medium_g > 0.0) {
            eyre::bail!("filter bands must satisfy snap_g > fast_g > medium_g > 0");
        }
        for (name, a) in [
            ("filter.fast_alpha", f.fast_alpha),
            ("filter.medium_alpha", f.medium_alpha),
            ("filter.settle_alpha", f.settle_alpha),
        ] {
            if !(a > 0.0 && a <= 1.0) {
                eyre::bail!("{name} must be in (0, 1]");
            }
        }

        let d = &self.display;
        if !(d.hysteresis_g.is_finite() && d.hysteresis_g >= 0.0) {
            eyre::bail!("display.hysteresis_g must be >= 0");
        }
        if !(d.zero_band_neg_g.is_finite() && d.zero_band_neg_g >= 0.0) {
            eyre::bail!("display.zero_band_neg_g must be >= 0");
        }
        if !(d.zero_band_pos_g.is_finite() && d.zero_band_pos_g >= 0.0) {
            eyre::bail!("display.zero_band_pos_g must be >= 0");
        }
        if !(d.resolution_g.is_finite() && d.resolution_g > 0.0) {
            eyre::bail!("display.resolution_g must be > 0");
        }

        let t = &self.timer;
        if !(t.start_g.is_finite() && t.start_g > 0.0) {
            eyre::bail!("timer.start_g must be > 0");
        }
        if !(t.min_flow_g.is_finite() && t.min_flow_g > 0.0) {
            eyre::bail!("timer.min_flow_g must be > 0");
        }
        if t.min_flow_ms == 0 {
            eyre::bail!("timer.min_flow_ms must be >= 1");
        }

        if self.pacing.tick_ms == 0 {
            eyre::bail!("loop.tick_ms must be >= 1");
        }
        if self.pacing.sample_average == 0 {
            eyre::bail!("loop.sample_average must be >= 1");
        }
        if self.pacing.sensor_timeout_ms == 0 {
            eyre::bail!("loop.sensor_timeout_ms must be >= 1");
        }

        let sf = self.calibration.scale_factor;
        if !sf.is_finite() || sf == 0.0 {
            eyre::bail!("calibration.scale_factor must be finite and non-zero");
        }

        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_reference_defaults() {
        let cfg = load_toml("").expect("empty config parses");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.pacing.tick_ms, 30);
        assert!((cfg.filter.settle_alpha - 0.95).abs() < 1e-6);
        assert!((cfg.display.hysteresis_g - 0.08).abs() < 1e-6);
        assert_eq!(cfg.timer.min_flow_ms, 800);
    }

    #[test]
    fn partial_section_merges_with_defaults() {
        let cfg = load_toml("[timer]\nstart_g = 5.0\n").expect("parses");
        assert!((cfg.timer.start_g - 5.0).abs() < 1e-6);
        assert!((cfg.timer.min_flow_g - 0.2).abs() < 1e-6);
    }
}
