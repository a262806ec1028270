//! Per-tick signal chain: adaptive filter → hysteresis gate → zero clamp →
//! quantizer. Exactly one stable weight is derived per tick.

use crate::config::{DisplayCfg, FilterCfg};
use crate::display::{HysteresisGate, quantize, zero_clamp};
use crate::filter::AdaptiveFilter;

#[derive(Debug, Clone)]
pub struct WeightPipeline {
    filter: AdaptiveFilter,
    gate: HysteresisGate,
    display: DisplayCfg,
}

impl WeightPipeline {
    pub fn new(filter: FilterCfg, display: DisplayCfg) -> Self {
        Self {
            filter: AdaptiveFilter::new(filter),
            gate: HysteresisGate::new(display.hysteresis_g),
            display,
        }
    }

    /// Run one raw units sample through the full chain and return the
    /// display-ready stable weight.
    pub fn update(&mut self, raw_units: f32) -> f32 {
        let filtered = self.filter.update(raw_units);
        let gated = self.gate.update(filtered);
        let clamped = zero_clamp(gated, self.display.zero_band_neg_g, self.display.zero_band_pos_g);
        quantize(clamped, self.display.resolution_g)
    }

    /// Tare: the filter's persistent output returns to zero. The hysteresis
    /// gate's retained value is intentionally left alone so the display
    /// transitions smoothly through the reset.
    pub fn tare(&mut self) {
        self.filter.reset();
    }

    /// Current filter output, before display conditioning.
    pub fn filtered(&self) -> f32 {
        self.filter.output()
    }
}
