//! Adaptive exponential smoothing, the main noise-rejection stage.

use crate::config::FilterCfg;

/// EMA whose responsiveness adapts to the magnitude of change: large jumps
/// snap through unfiltered, small wobbles get heavy smoothing.
///
/// The output persists across ticks and is reset to 0 only by tare.
#[derive(Debug, Clone)]
pub struct AdaptiveFilter {
    cfg: FilterCfg,
    out: f32,
}

impl AdaptiveFilter {
    pub fn new(cfg: FilterCfg) -> Self {
        Self { cfg, out: 0.0 }
    }

    /// Feed one raw sample; returns the new filtered output.
    ///
    /// Non-finite samples are a recoverable sensor fault: the sample is
    /// dropped and the previous output is returned unchanged.
    pub fn update(&mut self, raw: f32) -> f32 {
        if !raw.is_finite() {
            tracing::warn!(raw, "non-finite sample dropped before filter");
            return self.out;
        }
        let err = (raw - self.out).abs();
        if err > self.cfg.snap_g {
            // Large jump: a real event (object placed/removed), not noise.
            self.out = raw;
        } else {
            let alpha = if err > self.cfg.fast_g {
                self.cfg.fast_alpha
            } else if err > self.cfg.medium_g {
                self.cfg.medium_alpha
            } else {
                self.cfg.settle_alpha
            };
            self.out = alpha * self.out + (1.0 - alpha) * raw;
        }
        self.out
    }

    pub fn output(&self) -> f32 {
        self.out
    }

    /// Tare semantics: the persistent output returns to zero.
    pub fn reset(&mut self) {
        self.out = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> AdaptiveFilter {
        AdaptiveFilter::new(FilterCfg::default())
    }

    #[test]
    fn large_jump_snaps_to_raw() {
        let mut f = filter();
        assert_eq!(f.update(18.0), 18.0);
        // and back down
        assert_eq!(f.update(0.0), 0.0);
    }

    #[test]
    fn fast_band_blends_with_alpha_0_4() {
        let mut f = filter();
        f.update(10.0); // snap to 10
        // err = 0.5, in (0.3, 1.0] -> out = 0.4*10 + 0.6*10.5
        let out = f.update(10.5);
        assert!((out - 10.3).abs() < 1e-5);
    }

    #[test]
    fn medium_band_blends_with_alpha_0_7() {
        let mut f = filter();
        f.update(10.0);
        // err = 0.2, in (0.1, 0.3] -> out = 0.7*10 + 0.3*10.2
        let out = f.update(10.2);
        assert!((out - 10.06).abs() < 1e-5);
    }

    #[test]
    fn settle_band_barely_moves() {
        let mut f = filter();
        f.update(10.0);
        // err = 0.05 -> out = 0.95*10 + 0.05*10.05
        let out = f.update(10.05);
        assert!((out - 10.0025).abs() < 1e-5);
    }

    #[test]
    fn non_finite_samples_leave_output_untouched() {
        let mut f = filter();
        f.update(5.0);
        assert_eq!(f.update(f32::NAN), 5.0);
        assert_eq!(f.update(f32::INFINITY), 5.0);
        assert_eq!(f.update(f32::NEG_INFINITY), 5.0);
        assert_eq!(f.output(), 5.0);
    }

    #[test]
    fn reset_returns_output_to_zero() {
        let mut f = filter();
        f.update(42.0);
        f.reset();
        assert_eq!(f.output(), 0.0);
    }
}
