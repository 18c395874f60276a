// tests/property_invariants.rs

//! Property tests for the small pure/stateful pieces: duration parsing and
//! the running-firings registry bookkeeping.

use std::time::Duration;

use proptest::prelude::*;
use uuid::Uuid;

use cronrun::config::parse_duration;
use cronrun::engine::RunningJobs;

proptest! {
    #[test]
    fn parse_duration_accepts_all_supported_units(value in 0u64..86_400) {
        prop_assert_eq!(
            parse_duration(&format!("{value}ms")).unwrap(),
            Duration::from_millis(value)
        );
        prop_assert_eq!(
            parse_duration(&format!("{value}s")).unwrap(),
            Duration::from_secs(value)
        );
        prop_assert_eq!(
            parse_duration(&format!("{value}m")).unwrap(),
            Duration::from_secs(value * 60)
        );
        prop_assert_eq!(
            parse_duration(&format!("{value}h")).unwrap(),
            Duration::from_secs(value * 60 * 60)
        );
    }

    #[test]
    fn parse_duration_rejects_unknown_units(value in 0u64..1000, unit in "[a-z]{1,3}") {
        prop_assume!(!matches!(unit.as_str(), "ms" | "s" | "m" | "h"));
        let input = format!("{value}{unit}");
        prop_assert!(parse_duration(&input).is_err());
    }

    #[test]
    fn parse_duration_rejects_missing_units(value in 0u64..1000) {
        prop_assert!(parse_duration(&value.to_string()).is_err());
    }

    /// Guards keep the registry's view consistent with a model under any
    /// interleaving of begins and ends across jobs.
    #[test]
    fn running_registry_matches_model(ops in proptest::collection::vec((0usize..4, any::<bool>()), 0..64)) {
        let registry = RunningJobs::new();
        let jobs: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut guards: Vec<Vec<_>> = vec![Vec::new(), Vec::new(), Vec::new(), Vec::new()];

        for (job_idx, begin) in ops {
            if begin {
                guards[job_idx].push(registry.begin(jobs[job_idx], Uuid::new_v4()));
            } else {
                guards[job_idx].pop();
            }

            for (idx, job) in jobs.iter().enumerate() {
                prop_assert_eq!(registry.executing(*job).len(), guards[idx].len());
            }
            prop_assert_eq!(registry.total(), guards.iter().map(Vec::len).sum::<usize>());
        }

        guards.clear();
        prop_assert_eq!(registry.total(), 0);
    }
}
