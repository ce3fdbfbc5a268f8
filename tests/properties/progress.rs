//! Property tests for progress calculation.

use proptest::prelude::*;

use pactline::domain::services::ProgressCalculator;
use pactline::Progress;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: progress always lands in [0, 100].
    #[test]
    fn property_progress_is_bounded(active in 0usize..500, completed_share in 0.0f64..=1.0) {
        let completed = (active as f64 * completed_share).floor() as usize;
        let progress = ProgressCalculator::compute(completed, active);

        prop_assert!((0.0..=100.0).contains(&progress.value()));
        prop_assert!(progress.rounded() <= 100);
    }

    /// PROPERTY: completing one more milestone never lowers progress.
    #[test]
    fn property_progress_is_monotonic_in_completed(active in 1usize..500, completed in 0usize..500) {
        let completed = completed.min(active - 1);
        let before = ProgressCalculator::compute(completed, active);
        let after = ProgressCalculator::compute(completed + 1, active);

        prop_assert!(after.value() >= before.value());
    }

    /// PROPERTY: every completed milestone means full progress.
    #[test]
    fn property_all_completed_is_complete(active in 1usize..500) {
        prop_assert_eq!(ProgressCalculator::compute(active, active), Progress::COMPLETE);
    }

    /// PROPERTY: construction clamps any input.
    #[test]
    fn property_progress_new_clamps(raw in proptest::num::f64::ANY) {
        let value = Progress::new(raw).value();
        prop_assert!((0.0..=100.0).contains(&value), "{raw} became {value}");
    }
}
