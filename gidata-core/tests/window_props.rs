use gidata_core::window::{prepare_fetch, resolve_window};
use gidata_core::{GiDataError, SourceId, TimeWindow, VariableSelector, validate_selectors};
use gidata_mock::FixedClock;
use gidata_mock::fixtures::{NOW_MS, SID, SID_2, VID, VID_2};
use proptest::prelude::*;

#[test]
fn last_ten_seconds_resolves_against_now() {
    let (from, to) = resolve_window(-10_000.0, 0.0, NOW_MS);
    assert_eq!(to, NOW_MS);
    assert_eq!(from, NOW_MS - 10_000.0);
}

#[test]
fn negative_end_is_relative_to_now() {
    let (from, to) = resolve_window(-1_000.0, -500.0, NOW_MS);
    assert_eq!(to, NOW_MS - 500.0);
    assert_eq!(from, NOW_MS - 1_500.0);
}

#[test]
fn absolute_bounds_pass_through() {
    let (from, to) = resolve_window(1_000.0, 2_000.0, NOW_MS);
    assert_eq!((from, to), (1_000.0, 2_000.0));
}

#[test]
fn inverted_window_is_clamped() {
    let (from, to) = resolve_window(5_000.0, 2_000.0, NOW_MS);
    assert_eq!(to, 2_000.0);
    assert_eq!(from, 1_999.0);

    let (from, to) = resolve_window(0.0, 0.0, NOW_MS);
    assert_eq!(from, NOW_MS - 1.0);
    assert_eq!(to, NOW_MS);
}

#[test]
fn malformed_bounds_are_rejected() {
    let clock = FixedClock::new(NOW_MS);
    let sel = [VariableSelector::new(SID, VID)];
    for w in [
        TimeWindow::new(f64::NAN, 0.0),
        TimeWindow::new(-1.0, f64::INFINITY),
        TimeWindow::new(-2e15, 0.0),
    ] {
        match prepare_fetch(&sel, &w, 10, &clock) {
            Err(GiDataError::InvalidArg(_)) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }
}

#[test]
fn zero_points_are_rejected() {
    let clock = FixedClock::new(NOW_MS);
    let sel = [VariableSelector::new(SID, VID)];
    let err = prepare_fetch(&sel, &TimeWindow::default(), 0, &clock).unwrap_err();
    assert!(matches!(err, GiDataError::InvalidArg(_)));
}

#[test]
fn selector_collisions_are_rejected() {
    match validate_selectors(&[]) {
        Err(GiDataError::InvalidArg(msg)) => assert!(msg.contains("empty")),
        other => panic!("unexpected: {other:?}"),
    }

    let dup = [
        VariableSelector::new(SID, VID),
        VariableSelector::new(SID, VID),
    ];
    match validate_selectors(&dup) {
        Err(GiDataError::InvalidArg(msg)) => assert!(msg.contains("duplicate")),
        other => panic!("unexpected: {other:?}"),
    }

    let shared = [
        VariableSelector::new(SID, VID),
        VariableSelector::new(SID_2, VID),
    ];
    assert!(validate_selectors(&shared).is_err());

    let ok = [
        VariableSelector::new(SID, VID),
        VariableSelector::new(SID, VID_2),
        VariableSelector::new(SourceId::Int(7), uuid::Uuid::nil()),
    ];
    assert!(validate_selectors(&ok).is_ok());
}

#[test]
fn prepare_fetch_uses_the_injected_clock() {
    let clock = FixedClock::new(NOW_MS);
    let sel = [VariableSelector::new(SID, VID)];
    let (from, to) = prepare_fetch(&sel, &TimeWindow::last(20_000.0), 5, &clock).unwrap();
    assert_eq!((from, to), (NOW_MS - 20_000.0, NOW_MS));

    clock.advance(1_000.0);
    let (_, to) = prepare_fetch(&sel, &TimeWindow::last(20_000.0), 5, &clock).unwrap();
    assert_eq!(to, NOW_MS + 1_000.0);
}

proptest! {
    #[test]
    fn resolved_window_is_never_empty(
        start in -1e12f64..1e12,
        end in -1e12f64..1e12,
        now in 1e12f64..2e12,
    ) {
        let (from, to) = resolve_window(start, end, now);
        prop_assert!(from < to);
        if end <= 0.0 {
            prop_assert_eq!(to, now + end);
        } else {
            prop_assert_eq!(to, end);
        }
    }

    #[test]
    fn resolution_is_deterministic(start in -1e9f64..0.0, now in 1e12f64..2e12) {
        prop_assert_eq!(resolve_window(start, 0.0, now), resolve_window(start, 0.0, now));
    }
}
