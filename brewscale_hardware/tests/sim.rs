use brewscale_hardware::SimulatedLoadCell;
use brewscale_traits::LoadCell;
use rstest::rstest;

#[test]
fn pour_profile_rises_then_plateaus() {
    let mut cell = SimulatedLoadCell::pour(18.0, 0.3, 10, 5);
    let mut readings = Vec::new();
    for _ in 0..25 {
        readings.push(cell.read_units(3).unwrap());
    }
    // leading zeros, cup jump, ramp, then flat
    assert!(readings[0].abs() < 1e-6);
    assert!((readings[4] - 18.0).abs() < 1e-6);
    let peak = *readings.last().unwrap();
    assert!((peak - 21.0).abs() < 1e-4);
    assert!(readings.windows(2).all(|w| w[1] >= w[0]));
}

#[rstest]
#[case(2)]
#[case(3)]
#[case(5)]
fn not_ready_pattern_drops_every_nth_poll(#[case] n: usize) {
    let mut cell = SimulatedLoadCell::from_profile([0.0]).with_not_ready_every(n);
    let misses = (0..n * 4).filter(|_| !cell.is_ready()).count();
    assert_eq!(misses, 4);
}

#[test]
fn raw_reading_tracks_profile_without_advancing_it() {
    let mut cell = SimulatedLoadCell::from_profile([1.5, 9.0]);
    assert_eq!(cell.read_raw().unwrap(), 1500);
    assert_eq!(cell.read_raw().unwrap(), 1500);
    let _ = cell.read_units(1).unwrap();
    assert_eq!(cell.read_raw().unwrap(), 9000);
}
