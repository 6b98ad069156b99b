use fda_signal::{
    error::{Cell, SignalError, Statistic},
    signals::{proportional_reporting_ratio, ContingencyTable},
};
use proptest::prelude::*;

#[test]
fn prr_reference_scenario() {
    // (10/100) / (5/9900)
    let result = proportional_reporting_ratio(&ContingencyTable::new(10, 90, 5, 9895)).unwrap();
    assert_eq!(result.statistic, Statistic::Prr);
    assert!((result.estimate - 198.0).abs() < 1e-3);
    assert!((result.lower - 68.9208).abs() < 1e-3);
    assert!((result.upper - 568.8265).abs() < 1e-3);
}

#[test]
fn prr_uses_subtractive_variance() {
    let result = proportional_reporting_ratio(&ContingencyTable::new(12, 30, 8, 90)).unwrap();
    assert!((result.estimate - 3.5).abs() < 1e-9);
    assert!((result.lower - 1.5441).abs() < 1e-3);
    assert!((result.upper - 7.9335).abs() < 1e-3);
}

#[test]
fn prr_rejects_zero_a_or_c_only() {
    for (table, expected) in [
        (ContingencyTable::new(0, 5, 5, 5), Cell::A),
        (ContingencyTable::new(5, 5, 0, 5), Cell::C),
    ] {
        assert!(matches!(
            proportional_reporting_ratio(&table),
            Err(SignalError::DivisionInvalid { statistic: Statistic::Prr, cell }) if cell == expected
        ));
    }

    assert!(proportional_reporting_ratio(&ContingencyTable::new(5, 0, 5, 5)).is_ok());
    assert!(proportional_reporting_ratio(&ContingencyTable::new(5, 5, 5, 0)).is_ok());
}

proptest! {
    #[test]
    fn prr_is_positive_and_bracketed(
        a in 1u64..50_000,
        b in 0u64..50_000,
        c in 1u64..50_000,
        d in 0u64..5_000_000,
    ) {
        let table = ContingencyTable::new(a, b, c, d);
        let first = proportional_reporting_ratio(&table).unwrap();
        prop_assert!(first.estimate > 0.0);
        prop_assert!(first.lower <= first.estimate);
        prop_assert!(first.estimate <= first.upper);

        let second = proportional_reporting_ratio(&table).unwrap();
        prop_assert_eq!(first, second);
    }
}
