//! Property-based tests for the time-passage analyzer.

use proptest::prelude::*;

use crate::core::time_passage::TimePassageAnalyzer;

proptest! {
    /// Property: analysis is total and its outputs stay in range.
    #[test]
    fn prop_analysis_total_and_bounded(text in ".{0,400}") {
        let analyzer = TimePassageAnalyzer::new();
        let analysis = analyzer.analyze(&text);

        prop_assert!(analysis.days_elapsed >= 0.0);
        prop_assert!((0.0..=1.0).contains(&analysis.confidence));
        for m in &analysis.matches {
            prop_assert!((0.0..=1.0).contains(&m.confidence));
        }
    }

    /// Property: an explicit numeric day duration is recovered exactly at
    /// confidence 0.95.
    #[test]
    fn prop_explicit_days_recovered(n in 1u32..3650) {
        let analyzer = TimePassageAnalyzer::new();
        let text = format!("The expedition took {} days to complete.", n);
        let analysis = analyzer.analyze(&text);

        prop_assert_eq!(analysis.days_elapsed, n as f64);
        prop_assert_eq!(analysis.confidence, 0.95);
    }

    /// Property: week durations convert at 7 days per week.
    #[test]
    fn prop_week_conversion(n in 1u32..200) {
        let analyzer = TimePassageAnalyzer::new();
        let text = format!("{} weeks later the fleet returned.", n);
        let analysis = analyzer.analyze(&text);

        prop_assert_eq!(analysis.days_elapsed, (n * 7) as f64);
    }

    /// Property: suggestion is internally consistent with its own analysis.
    #[test]
    fn prop_suggestion_consistent(text in ".{0,400}") {
        let analyzer = TimePassageAnalyzer::new();
        let suggestion = analyzer.suggest(&text);

        if suggestion.suggested {
            prop_assert!(suggestion.confidence >= 0.5);
            prop_assert!(suggestion.days > 0.0);
        }
        prop_assert!(!suggestion.explanation.is_empty());
    }

    /// Property: analysis is deterministic.
    #[test]
    fn prop_deterministic(text in ".{0,200}") {
        let analyzer = TimePassageAnalyzer::new();
        prop_assert_eq!(analyzer.analyze(&text), analyzer.analyze(&text));
    }
}
