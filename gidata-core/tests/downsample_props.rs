use gidata_core::timeseries::ms_to_datetime;
use gidata_core::{Column, TabularFrame};
use proptest::prelude::*;

#[allow(clippy::cast_precision_loss)]
fn ramp(len: usize) -> TabularFrame {
    let index = (0..len).map(|i| ms_to_datetime(i as f64).unwrap()).collect();
    let values = (0..len).map(|i| Some(i as f64)).collect();
    TabularFrame::new(index, vec![Column::new("v", values)]).unwrap()
}

#[test]
fn ten_thousand_rows_to_one_thousand() {
    let out = ramp(10_000).downsample(1_000);
    assert_eq!(out.len(), 1_000);
    let col = &out.columns()[0].values;
    assert_eq!(col[0], Some(0.0));
    assert_eq!(col[1], Some(10.0));
    assert_eq!(col[999], Some(9_990.0));
    assert_eq!(out, ramp(10_000).downsample(1_000));
}

#[test]
fn small_frames_are_untouched() {
    assert_eq!(ramp(10).downsample(10), ramp(10));
    assert_eq!(ramp(10).downsample(2_048), ramp(10));
}

proptest! {
    #[test]
    fn downsample_never_exceeds_budget(len in 0usize..5_000, points in 1usize..600) {
        let out = ramp(len).downsample(points);
        prop_assert!(out.len() <= points);
        if len > 0 {
            prop_assert_eq!(out.columns()[0].values[0], Some(0.0));
        }
        if len > points {
            let stride = len.div_ceil(points);
            #[allow(clippy::cast_precision_loss)]
            let second = stride as f64;
            if out.len() > 1 {
                prop_assert_eq!(out.columns()[0].values[1], Some(second));
            }
        } else {
            prop_assert_eq!(out.len(), len);
        }
    }
}
