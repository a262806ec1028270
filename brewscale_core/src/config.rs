//! Runtime configuration for the scale engine.
//!
//! These are the structs `ScaleCore` consumes at build time. They are
//! separate from the TOML-deserialized schema in `brewscale_config`; see
//! `conversions` for the bridge.

/// Adaptive filter tuning: three magnitude bands plus a snap threshold.
///
/// Alpha is the weight retained on the *previous* output, so a higher alpha
/// means a slower, smoother response. The bands must be strictly ordered:
/// `snap_g > fast_g > medium_g > 0`.
#[derive(Debug, Clone, Copy)]
pub struct FilterCfg {
    /// Jumps larger than this bypass smoothing entirely; an object landing
    /// on the platform is an event, not noise.
    pub snap_g: f32,
    /// Above this delta the filter tracks quickly.
    pub fast_g: f32,
    pub fast_alpha: f32,
    /// Above this delta the filter tracks at medium speed.
    pub medium_g: f32,
    pub medium_alpha: f32,
    /// Near-static readings get heavy smoothing.
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

/// Display conditioning applied after the adaptive filter.
#[derive(Debug, Clone, Copy)]
pub struct DisplayCfg {
    /// Shown weight only moves once drift since the last update reaches
    /// this band. Default: 0.08 g.
    pub hysteresis_g: f32,
    /// Negative readings with magnitude below this clamp to exactly zero.
    /// Wider than the positive band because tare drift skews negative.
    pub zero_band_neg_g: f32,
    /// Positive readings below this clamp to exactly zero.
    pub zero_band_pos_g: f32,
    /// Quantization step for the shown weight. Default: 0.1 g.
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
#[derive(Debug, Clone, Copy)]
pub struct TimerCfg {
    /// Stable weight that starts the timer from idle. Measured on the
    /// absolute weight; tare is expected to zero the baseline first.
    pub start_g: f32,
    /// Per-tick delta below which flow counts as stalled. Negative deltas
    /// are below this too: removing weight also ends the brew.
    pub min_flow_g: f32,
    /// A stall must persist this long (wall clock) to stop the timer.
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

/// Control loop pacing and tare-input debounce.
#[derive(Debug, Clone, Copy)]
pub struct LoopCfg {
    /// Nominal tick period in milliseconds. Default: 30 ms.
    pub tick_ms: u64,
    /// Raw reads averaged per units sample.
    pub sample_average: u8,
    /// Fixed confirm/release poll delay for the tare input.
    pub debounce_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            tick_ms: 30,
            sample_average: 3,
            debounce_ms: 20,
        }
    }
}
