//! End-to-end runs through the detector.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ctprobe::{BankTag, Class, Detector, StopCondition, Verdict, Workload};

#[test]
fn left_pad_rounds_accumulate() {
    let mut driver = Detector::quick()
        .seed(21)
        .t_threshold_bananas(1e12)
        .left_pad();

    let mut reports = Vec::new();
    let last = driver
        .run(&StopCondition::Rounds(4), |report| reports.push(*report))
        .unwrap()
        .unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(reports[3], last);

    let raw = driver.engine().bank(BankTag::Raw).unwrap().accumulator();
    assert_eq!(raw.total(), 4 * 500);
    assert!(raw.count(Class::Zero) > 0 && raw.count(Class::One) > 0);
    assert!(!driver.engine().needs_percentiles());
    assert!(!matches!(last.verdict, Verdict::NotEnoughMeasurements { .. }));
}

#[test]
fn manger_round_labels_both_classes() {
    let mut driver = Detector::quick()
        .seed(5)
        .measurements_per_round(20)
        .percentile_count(10)
        .manger_test_key()
        .unwrap();

    let report = driver.run_round().unwrap();
    assert_eq!(driver.rounds(), 1);
    assert_eq!(report.measurements, 20);
    assert_eq!(driver.workload().relabeled(), 0);
    assert!(matches!(report.verdict, Verdict::NotEnoughMeasurements { .. }));
}

#[test]
fn signal_stops_between_rounds() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut driver = Detector::quick()
        .seed(8)
        .t_threshold_bananas(1e12)
        .measurements_per_round(50)
        .left_pad();

    let stop = StopCondition::Signal(Arc::clone(&flag));
    let mut seen = 0;
    driver
        .run(&stop, |_| {
            seen += 1;
            if seen == 2 {
                flag.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();

    assert_eq!(seen, 2);
    assert_eq!(driver.rounds(), 2);
}

#[test]
fn left_pad_const_rounds_accumulate() {
    let mut driver = Detector::quick()
        .seed(22)
        .t_threshold_bananas(1e12)
        .left_pad_const();

    driver.run(&StopCondition::Rounds(2), |_| {}).unwrap();

    let raw = driver.engine().bank(BankTag::Raw).unwrap().accumulator();
    assert_eq!(raw.total(), 2 * 500);
    assert_eq!(driver.workload().name(), "left-pad-const");
}
