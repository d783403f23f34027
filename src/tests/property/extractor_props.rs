//! Property-based tests for the NPC extractor.

use proptest::prelude::*;

use crate::core::extractor::EntityExtractor;

proptest! {
    /// Property: extraction is total on arbitrary text.
    #[test]
    fn prop_extraction_total(narrative in ".{0,400}", roster in ".{0,200}") {
        let extractor = EntityExtractor::new();
        let _ = extractor.extract_new_npcs(&narrative, &roster);
    }

    /// Property: adding the first pass's results to the roster makes the
    /// second pass empty for the same text.
    #[test]
    fn prop_second_pass_finds_nothing(narrative in ".{0,400}") {
        let extractor = EntityExtractor::new();
        let first = extractor.extract_new_npcs(&narrative, "");

        let roster: String = first
            .iter()
            .map(|n| n.to_line())
            .collect::<Vec<_>>()
            .join("\n");
        let second = extractor.extract_new_npcs(&narrative, &roster);
        prop_assert!(
            second.is_empty(),
            "second pass re-detected: {:?}",
            second
        );
    }

    /// Property: candidate names are never empty, never deny-listed noise,
    /// and appear at most once per pass.
    #[test]
    fn prop_candidates_well_formed(narrative in ".{0,400}") {
        let extractor = EntityExtractor::new();
        let npcs = extractor.extract_new_npcs(&narrative, "");

        let mut seen = Vec::new();
        for npc in &npcs {
            prop_assert!(npc.name.len() >= 2);
            prop_assert!(!npc.descriptor.is_empty());
            let key = npc.name.to_lowercase();
            prop_assert!(!seen.contains(&key), "duplicate candidate {}", npc.name);
            seen.push(key);
        }
    }
}
