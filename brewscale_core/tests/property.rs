use brewscale_core::{AdaptiveFilter, FilterCfg, HysteresisGate, quantize};
use proptest::prelude::*;

proptest! {
    /// Quantization lands on the display grid and is a fixed point.
    #[test]
    fn quantize_is_on_grid_and_idempotent(value in -1000.0f32..1000.0, res in prop::sample::select(vec![0.05f32, 0.1, 0.5, 1.0])) {
        let q = quantize(value, res);
        prop_assert!((q - value).abs() <= res / 2.0 + 1e-3);
        prop_assert_eq!(quantize(q, res), q);
    }

    /// Consecutive distinct gate outputs always differ by at least the
    /// hysteresis band; anything smaller is flicker and must be held back.
    #[test]
    fn gate_outputs_never_move_by_less_than_the_band(inputs in prop::collection::vec(-50.0f32..50.0, 1..200)) {
        let threshold = 0.08f32;
        let mut gate = HysteresisGate::new(threshold);
        let mut prev: Option<f32> = None;
        for v in inputs {
            let out = gate.update(v);
            if let Some(p) = prev
                && out != p
            {
                prop_assert!((out - p).abs() >= threshold, "moved {p} -> {out}");
            }
            prev = Some(out);
        }
    }

    /// The filter never escapes the envelope of what it has seen (its
    /// output starts at zero, so zero is part of the envelope).
    #[test]
    fn filter_output_stays_inside_the_input_envelope(inputs in prop::collection::vec(-100.0f32..100.0, 1..200)) {
        let mut f = AdaptiveFilter::new(FilterCfg::default());
        let mut lo = 0.0f32;
        let mut hi = 0.0f32;
        for v in inputs {
            lo = lo.min(v);
            hi = hi.max(v);
            let out = f.update(v);
            prop_assert!(out >= lo - 1e-3 && out <= hi + 1e-3, "out {out} outside [{lo}, {hi}]");
        }
    }
}
