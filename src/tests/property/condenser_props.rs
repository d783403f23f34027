//! Property-based tests for the context condenser.

use proptest::prelude::*;

use crate::core::condenser::{ContextCondenser, HeuristicTokenCounter, TokenCounter};

fn arb_field_text() -> impl Strategy<Value = String> {
    prop_oneof![
        // Prose-like
        "[a-zA-Z ,]{0,400}\\.( [a-zA-Z ,]{0,100}\\.){0,6}",
        // Structured stat-block-like
        "([A-Za-z]{2,10}: [a-zA-Z0-9 ]{0,30}\n){0,12}",
        // Arbitrary
        ".{0,300}",
    ]
}

proptest! {
    /// Property: the condensed result always fits the budget.
    #[test]
    fn prop_budget_guarantee(text in arb_field_text(), budget in 1usize..200) {
        let condenser = ContextCondenser::new();
        let counter = HeuristicTokenCounter::new();
        let out = condenser.condense(&text, budget, &counter);
        prop_assert!(
            counter.count(&out) <= budget,
            "budget {} exceeded by {:?}",
            budget,
            out
        );
    }

    /// Property: input already within budget is returned exactly unchanged.
    #[test]
    fn prop_idempotence_for_short_input(text in ".{0,80}") {
        let condenser = ContextCondenser::new();
        let counter = HeuristicTokenCounter::new();
        let budget = counter.count(&text).max(1);
        prop_assert_eq!(condenser.condense(&text, budget, &counter), text);
    }

    /// Property: condensing twice with the same budget is stable.
    #[test]
    fn prop_condense_is_stable(text in arb_field_text(), budget in 1usize..200) {
        let condenser = ContextCondenser::new();
        let counter = HeuristicTokenCounter::new();
        let once = condenser.condense(&text, budget, &counter);
        let twice = condenser.condense(&once, budget, &counter);
        prop_assert_eq!(once, twice);
    }
}
