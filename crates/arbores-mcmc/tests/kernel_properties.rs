mod common;

use arbores_mcmc::{run, MoveKind, RunContext};
use proptest::prelude::*;

use common::{config, conflicting, expected_full_scans};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn chains_stay_valid_for_any_seed(seed in any::<u64>(), length in 1usize..80, bridge in 1usize..4) {
        let mut cfg = config(length, seed);
        cfg.bridge_length = bridge;
        let mut ctx = RunContext::new(cfg).unwrap();
        let outcome = run(&mut ctx, conflicting(), None).unwrap();
        let entries = outcome.chain.entries();
        prop_assert_eq!(entries.len(), length);
        prop_assert_eq!(entries[0].diagnostics.move_kind, MoveKind::Init);

        let flags: Vec<bool> = entries.iter().map(|entry| entry.full_scan).collect();
        prop_assert_eq!(flags, expected_full_scans(entries, outcome.segmentation.segment_count()));

        for entry in entries {
            prop_assert!(entry.path.check_complete().is_ok());
            prop_assert!(entry.path.check_compatible(&outcome.data).is_ok());
            let d = &entry.diagnostics;
            prop_assert!(d.log_posterior.is_finite());
            prop_assert!(d.alpha >= 0.0);
            prop_assert!(d.accept_indicator <= 1);
            if d.move_kind == MoveKind::Invalid {
                prop_assert_eq!(d.accept_indicator, 0);
                prop_assert_eq!(d.alpha, 0.0);
            }
        }
    }
}
