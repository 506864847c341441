//! Integration tests for types

#[cfg(test)]
mod tests {
    use mlprobe_types::*;
    use proptest::prelude::*;

    #[test]
    fn test_host_derived_pin_matches_installed_build() {
        let host = HostVersion::parse("9.14.0.2206163 (R2023a)").unwrap();
        let pin = VersionConstraint::wildcard_from_host(&host.version).unwrap();
        let spec = PackageSpec::pinned("matlabengine", pin.clone());

        assert_eq!(spec.requirement(), "matlabengine==9.14.*");
        assert!(spec.check_against_host(&host.version).is_ok());
        assert!(pin.matches("9.14.3"));
        assert!(!pin.matches("9.15.1"));
    }

    #[test]
    fn test_report_serialization() {
        let mut report = ScenarioReport::new(ScenarioKind::NoVersion, CleanupPolicy::Guaranteed);
        report.outcome = ScenarioOutcome::Skipped {
            reason: "host is R2023b".into(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "no-version");
        assert_eq!(json["outcome"]["status"], "skipped");
        assert_eq!(json["phases"][0], "start");
    }

    #[test]
    fn test_summary_counts() {
        let mut failed =
            ScenarioReport::new(ScenarioKind::MatchingEngine, CleanupPolicy::Guaranteed);
        failed.outcome = ScenarioOutcome::Failed;
        let passed = ScenarioReport::new(ScenarioKind::NoVersion, CleanupPolicy::Guaranteed);
        let summary = RunSummary::from_reports(vec![passed, failed]);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_ok());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Tty);
    }

    proptest! {
        #[test]
        fn wildcard_from_host_is_prefix_of_host(
            major in 1u32..100,
            minor in 0u32..100,
            patch in 0u32..100,
            build in 0u32..10_000_000,
        ) {
            let host = format!("{major}.{minor}.{patch}.{build}");
            let pin = VersionConstraint::wildcard_from_host(&host).unwrap();
            let spec = PackageSpec::pinned("matlabengine", pin.clone());
            prop_assert!(spec.check_against_host(&host).is_ok());
            let same_patch = format!("{major}.{minor}.{patch}");
            prop_assert!(pin.matches(&same_patch));
            let next_minor = format!("{major}.{}.0", minor + 1);
            prop_assert!(!pin.matches(&next_minor));
        }

        #[test]
        fn constraint_display_round_trips(major in 0u32..50, minor in 0u32..50, wildcard: bool) {
            let text = if wildcard {
                format!("=={major}.{minor}.*")
            } else {
                format!("=={major}.{minor}.1")
            };
            let parsed: VersionConstraint = text.parse().unwrap();
            prop_assert_eq!(parsed.to_string(), text);
        }
    }
}
