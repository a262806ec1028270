//! Display conditioning: hysteresis gate, zero clamp, and quantizer.

/// Suppresses small back-and-forth display updates: the shown value only
/// moves once the input has drifted at least `threshold_g` from it.
///
/// The retained value deliberately survives tare, so the display transitions
/// smoothly through a reset instead of flickering.
#[derive(Debug, Clone)]
pub struct HysteresisGate {
    threshold_g: f32,
    shown: Option<f32>,
}

impl HysteresisGate {
    pub fn new(threshold_g: f32) -> Self {
        Self {
            threshold_g,
            shown: None,
        }
    }

    pub fn update(&mut self, value: f32) -> f32 {
        match self.shown {
            None => {
                self.shown = Some(value);
                value
            }
            Some(shown) if (value - shown).abs() >= self.threshold_g => {
                self.shown = Some(value);
                value
            }
            Some(shown) => shown,
        }
    }

    /// Last value that crossed the threshold, if any input was seen yet.
    pub fn shown(&self) -> Option<f32> {
        self.shown
    }
}

/// Snap near-zero noise to an exact zero. The bands are asymmetric because
/// container/tare drift skews negative more than positive.
#[inline]
pub fn zero_clamp(value: f32, neg_band_g: f32, pos_band_g: f32) -> f32 {
    if value < 0.0 {
        if value > -neg_band_g { 0.0 } else { value }
    } else if value < pos_band_g {
        0.0
    } else {
        value
    }
}

/// Round to the nearest display step, ties away from zero. Applied last so
/// a clamped exact zero stays exactly zero.
#[inline]
pub fn quantize(value: f32, resolution_g: f32) -> f32 {
    (value / resolution_g).round() * resolution_g
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn gate_adopts_first_value() {
        let mut gate = HysteresisGate::new(0.08);
        assert_eq!(gate.update(3.2), 3.2);
        assert_eq!(gate.shown(), Some(3.2));
    }

    #[test]
    fn gate_holds_below_threshold_and_releases_at_it() {
        let mut gate = HysteresisGate::new(0.08);
        gate.update(10.0);
        assert_eq!(gate.update(10.05), 10.0);
        assert_eq!(gate.update(9.95), 10.0);
        // past the threshold: adopt
        assert_eq!(gate.update(10.09), 10.09);
        // retained value moved with it
        assert_eq!(gate.update(10.1), 10.09);
    }

    #[rstest]
    // negative band is (-0.3, 0): clamp
    #[case(-0.29, 0.0)]
    #[case(-0.01, 0.0)]
    // at or beyond -0.3: pass through
    #[case(-0.3, -0.3)]
    #[case(-5.0, -5.0)]
    // positive band is [0, 0.2): clamp
    #[case(0.0, 0.0)]
    #[case(0.19, 0.0)]
    // at or beyond 0.2: pass through
    #[case(0.2, 0.2)]
    #[case(17.3, 17.3)]
    fn clamp_bands_are_asymmetric(#[case] input: f32, #[case] expected: f32) {
        assert_eq!(zero_clamp(input, 0.3, 0.2), expected);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.04, 0.0)]
    #[case(0.05, 0.1)] // ties away from zero
    #[case(-0.05, -0.1)]
    #[case(18.04, 18.0)]
    #[case(18.06, 18.1)]
    fn quantize_rounds_to_tenths(#[case] input: f32, #[case] expected: f32) {
        assert!((quantize(input, 0.1) - expected).abs() < 1e-6);
    }
}
