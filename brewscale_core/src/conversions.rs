//! `From` implementations bridging `brewscale_config` types to
//! `brewscale_core` types.
//!
//! These eliminate manual field-by-field mapping in the CLI.

use crate::config::{DisplayCfg, FilterCfg, LoopCfg, TimerCfg};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&brewscale_config::FilterCfg> for FilterCfg {
    fn from(c: &brewscale_config::FilterCfg) -> Self {
        Self {
            snap_g: c.snap_g,
            fast_g: c.fast_g,
            fast_alpha: c.fast_alpha,
            medium_g: c.medium_g,
            medium_alpha: c.medium_alpha,
            settle_alpha: c.settle_alpha,
        }
    }
}

// ── DisplayCfg ───────────────────────────────────────────────────────────────

impl From<&brewscale_config::DisplayCfg> for DisplayCfg {
    fn from(c: &brewscale_config::DisplayCfg) -> Self {
        Self {
            hysteresis_g: c.hysteresis_g,
            zero_band_neg_g: c.zero_band_neg_g,
            zero_band_pos_g: c.zero_band_pos_g,
            resolution_g: c.resolution_g,
        }
    }
}

// ── TimerCfg ─────────────────────────────────────────────────────────────────

impl From<&brewscale_config::TimerCfg> for TimerCfg {
    fn from(c: &brewscale_config::TimerCfg) -> Self {
        Self {
            start_g: c.start_g,
            min_flow_g: c.min_flow_g,
            min_flow_ms: c.min_flow_ms,
        }
    }
}

// ── LoopCfg ──────────────────────────────────────────────────────────────────

impl From<&brewscale_config::LoopCfg> for LoopCfg {
    fn from(c: &brewscale_config::LoopCfg) -> Self {
        Self {
            tick_ms: c.tick_ms,
            sample_average: c.sample_average,
            debounce_ms: c.debounce_ms,
        }
    }
}
