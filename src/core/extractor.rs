//! Entity Extractor Module
//!
//! Detects probable new NPC names and short descriptions in narrative text,
//! deduplicated against an existing roster. Pipeline:
//! 1. Clean: strip auto-generated markers and bracketed tags, drop very
//!    short lines, collapse whitespace
//! 2. Detect: run an ordered battery of name-shaped regex strategies over
//!    each sentence, collecting every non-overlapping match
//! 3. Validate: reject short, all-caps, mis-shaped, or deny-listed names
//! 4. Enrich: find an embedded title, nearby role keywords, and the best
//!    descriptive sentence for each surviving name
//! 5. Deduplicate: against roster entries by the name segment before the
//!    first ':' or '-', case-insensitively
//!
//! Never fails; no surviving candidate yields an empty list.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// Types
// ============================================================================

/// A probable new NPC. Ephemeral: merged into the roster as a text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcCandidate {
    pub name: String,
    pub descriptor: String,
}

impl NpcCandidate {
    /// Roster line form: `"Name - descriptor"`.
    pub fn to_line(&self) -> String {
        format!("{} - {}", self.name, self.descriptor)
    }
}

/// Fallback descriptor when enrichment finds nothing.
const DEFAULT_DESCRIPTOR: &str = "Important character encountered in the story";

/// Minimum line length kept by the cleaning pass.
const MIN_LINE_LEN: usize = 5;

/// Mentions shorter than this say nothing beyond the name and are not used
/// as descriptions.
const MIN_DESCRIPTION_LEN: usize = 20;

// ============================================================================
// Cleaning Patterns
// ============================================================================

/// Auto-generated fragments that must never reach name detection.
static TECHNICAL_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)auto-detected:[^\n]*",
        r"(?i)estimated\s+\d+(?:\.\d+)?\s+day(?:s)?\s+elapsed[^.\n]*\.?",
        r"(?i)time\s+advanced\s+(?:by|to)[^.\n]*\.?",
        r"\[[^\]]*\]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Failed to compile technical marker regex"))
    .collect()
});

static REPEATED_SPACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("Failed to compile whitespace regex"));

// ============================================================================
// Name Detection Strategies
// ============================================================================

const TITLES: &[&str] = &[
    "Sir", "Lady", "Lord", "Dame", "Captain", "Commander", "Sergeant", "General", "Duke",
    "Duchess", "Baron", "Baroness", "Count", "Countess", "Master", "Mistress", "King", "Queen",
    "Prince", "Princess", "Elder", "Father", "Mother", "Brother", "Sister", "Doctor", "Reverend",
];

const ROLE_KEYWORDS: &[&str] = &[
    "councilor", "merchant", "warrior", "guard", "priest", "priestess", "scholar", "healer",
    "smith", "innkeeper", "noble", "soldier", "spy", "assassin", "trader", "steward", "advisor",
    "emissary", "captain", "commander", "swordmaster", "mentat", "herald", "duelist", "navigator",
];

/// Words suggesting authority or physical presence; sentences containing them
/// make better descriptors.
const DESCRIPTOR_WORDS: &[&str] = &[
    "tall", "old", "young", "elderly", "mysterious", "imposing", "stern", "grizzled",
    "commanding", "powerful", "respected", "feared", "renowned", "veteran", "weathered",
    "leads", "commands", "rules", "presence", "authority",
];

/// Setting-specific and generic capitalized nouns that are never NPC names.
const NAME_DENYLIST: &[&str] = &[
    // Sentence-position and generic words
    "The", "They", "This", "That", "These", "Those", "There", "Then", "When", "While", "After",
    "Before", "Perhaps", "Meanwhile", "Suddenly", "However", "Although", "Everyone", "Someone",
    "Nobody", "Here", "Now", "Today", "Tomorrow", "Yesterday", "Chapter", "Session",
    // Directions and places
    "North", "South", "East", "West", "City", "Town", "Village", "Castle", "Keep", "Temple",
    "Palace", "Mountain", "River", "Desert", "Forest",
    // Setting proper nouns: worlds, factions, institutions
    "Arrakis", "Caladan", "Kaitain", "Salusa", "Imperium", "Empire", "Guild", "Landsraad",
    "Sietch", "Fremen", "Sardaukar", "Harkonnen", "Atreides", "Spice", "Melange", "Shai",
    "Hulud", "Muad", "Dib",
];

struct NameStrategy {
    name: &'static str,
    pattern: Regex,
}

fn strategy(name: &'static str, pattern: String) -> NameStrategy {
    NameStrategy {
        name,
        pattern: Regex::new(&pattern).expect("Failed to compile name strategy regex"),
    }
}

fn titles_alternation() -> String {
    TITLES.join("|")
}

fn roles_alternation() -> String {
    ROLE_KEYWORDS.join("|")
}

/// Ordered battery of name-shaped patterns. Every strategy is applied
/// exhaustively per sentence; a capture group `name` carries the candidate.
static NAME_STRATEGIES: Lazy<Vec<NameStrategy>> = Lazy::new(|| {
    let cap = r"[A-Z][a-z]+";
    vec![
        strategy(
            "title_name",
            format!(r"\b(?P<name>(?:{})\s+{cap}(?:\s+{cap})?)\b", titles_alternation()),
        ),
        strategy(
            "capitalized_verb",
            format!(
                r"\b(?P<name>{cap}(?:\s+{cap}){{0,2}})\s+(?:said|says|replied|asked|answered|whispered|shouted|exclaimed|walked|strode|entered|arrived|approached|stood|sat|nodded|smiled|frowned|laughed|turned|spoke|greeted|bowed|gestured|waited)\b"
            ),
        ),
        strategy(
            "dialogue_attribution",
            format!(
                r#"["”,']\s*(?P<name>{cap}(?:\s+{cap})?)\s+(?:said|replied|asked|answered|whispered|shouted|muttered|called|added|continued)\b"#
            ),
        ),
        strategy(
            "possessive",
            format!(
                r"\b(?P<name>{cap}(?:\s+{cap})?)'s\s+(?:voice|face|eyes|hands?|words|expression|gaze|tone|presence|manner)\b"
            ),
        ),
        strategy(
            "named_called",
            format!(r"\b(?:named|called|known\s+as)\s+(?P<name>{cap}(?:\s+{cap}){{0,2}})"),
        ),
        strategy(
            "as_enters",
            format!(
                r"\bAs\s+(?P<name>{cap}(?:\s+{cap})?)\s+(?:enters?|entered|speaks?|spoke|approaches?|approached|arrives?|arrived)\b"
            ),
        ),
        strategy(
            "introduction",
            format!(
                r"\bintroduc(?:ed|es|ing)\s+(?:himself|herself|themselves)?\s*as\s+(?P<name>{cap}(?:\s+{cap}){{0,2}})"
            ),
        ),
        strategy(
            "meeting",
            format!(
                r"\b(?:meets?|met|encounters?|encountered|greeted\s+by|approached\s+by)\s+(?P<name>{cap}(?:\s+{cap}){{0,2}})"
            ),
        ),
        strategy(
            "role_apposition",
            format!(
                r"\b(?P<name>{cap}(?:\s+{cap})?),\s+(?:the|a|an)\s+(?:\w+\s+)?(?:{})\b",
                roles_alternation()
            ),
        ),
        strategy(
            "role_before_name",
            format!(
                r"\b(?:the|a|an)\s+(?:{})\s+(?P<name>{cap}(?:\s+{cap})?)\b",
                roles_alternation()
            ),
        ),
        strategy(
            "self_introduction",
            format!(
                r"\b(?:I\s+am|I'm|[Mm]y\s+name\s+is|[Cc]all\s+me)\s+(?P<name>{cap}(?:\s+{cap}){{0,2}})"
            ),
        ),
    ]
});

static CAP_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+$").expect("Failed to compile cap-word regex"));

// ============================================================================
// Extractor
// ============================================================================

/// Heuristic NPC name extractor. Stateless; inputs are never mutated.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract probable new NPCs from `narrative`, skipping any whose name
    /// already appears in `roster` (one entry per line, `"Name - desc"` or
    /// `"Name: desc"`). First-appearance order is preserved.
    pub fn extract_new_npcs(&self, narrative: &str, roster: &str) -> Vec<NpcCandidate> {
        let cleaned = self.clean(narrative);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let sentences = self.split_sentences(&cleaned);
        let known = self.roster_names(roster);

        let mut seen: Vec<String> = Vec::new();
        let mut candidates = Vec::new();

        for sentence in &sentences {
            for strat in NAME_STRATEGIES.iter() {
                for caps in strat.pattern.captures_iter(sentence) {
                    let raw = match caps.name("name") {
                        Some(m) => m.as_str().trim(),
                        None => continue,
                    };
                    if !self.is_valid_name(raw) {
                        continue;
                    }
                    let key = raw.to_lowercase();
                    if known.contains(&key) || seen.contains(&key) {
                        continue;
                    }
                    seen.push(key);
                    debug!(strategy = strat.name, name = raw, "npc candidate accepted");
                    let descriptor = self.enrich(raw, sentence, &sentences);
                    candidates.push(NpcCandidate {
                        name: raw.to_string(),
                        descriptor,
                    });
                }
            }
        }

        candidates
    }

    // ------------------------------------------------------------------
    // Cleaning
    // ------------------------------------------------------------------

    fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for marker in TECHNICAL_MARKERS.iter() {
            cleaned = marker.replace_all(&cleaned, " ").into_owned();
        }

        let lines: Vec<String> = cleaned
            .lines()
            .map(|l| REPEATED_SPACES.replace_all(l.trim(), " ").into_owned())
            .filter(|l| l.len() >= MIN_LINE_LEN)
            .collect();

        lines.join("\n")
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        text.split(['.', '!', '?', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn is_valid_name(&self, name: &str) -> bool {
        if name.len() < 2 {
            return false;
        }

        let tokens: Vec<&str> = name.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }

        for token in &tokens {
            if NAME_DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(token)) {
                return false;
            }
            // Likely an acronym
            if token.len() > 3 && token.chars().all(|c| c.is_ascii_uppercase()) {
                return false;
            }
        }

        if tokens.len() > 1 {
            tokens.iter().all(|t| CAP_WORD.is_match(t))
        } else {
            let token = tokens[0];
            token.len() >= 4 && CAP_WORD.is_match(token)
        }
    }

    // ------------------------------------------------------------------
    // Enrichment
    // ------------------------------------------------------------------

    fn enrich(&self, name: &str, sentence: &str, sentences: &[String]) -> String {
        let title_role = self.embedded_title(name);
        let keyword_role = self
            .role_near_name(name, sentence)
            .or_else(|| {
                sentences
                    .iter()
                    .filter(|s| s.contains(name))
                    .find_map(|s| self.role_near_name(name, s))
            });
        let description = self.best_description(name, sentences);

        let role = keyword_role
            .map(|r| capitalize(&r))
            .or(title_role);

        match (role, description) {
            (Some(role), Some(desc)) => format!("{}. {}", role, desc),
            (Some(role), None) => role,
            (None, Some(desc)) => desc,
            (None, None) => DEFAULT_DESCRIPTOR.to_string(),
        }
    }

    /// A title embedded in the name itself ("Sir Aldric" -> "Sir").
    fn embedded_title(&self, name: &str) -> Option<String> {
        name.split_whitespace()
            .find(|token| TITLES.contains(token))
            .map(|t| t.to_string())
    }

    /// A role keyword co-occurring with the name in the same sentence.
    fn role_near_name(&self, name: &str, sentence: &str) -> Option<String> {
        if !sentence.contains(name) {
            return None;
        }
        let lower = sentence.to_lowercase();
        ROLE_KEYWORDS
            .iter()
            .find(|role| lower.contains(*role))
            .map(|r| r.to_string())
    }

    /// Among sentences mentioning the name, prefer the longest one between
    /// 30 and 250 characters that carries a descriptor word, else the
    /// longest mention that says more than the name itself.
    fn best_description(&self, name: &str, sentences: &[String]) -> Option<String> {
        let mentions: Vec<&str> = sentences
            .iter()
            .map(String::as_str)
            .filter(|s| s.contains(name))
            .collect();

        let descriptive = mentions
            .iter()
            .copied()
            .filter(|s| (30..=250).contains(&s.len()))
            .filter(|s| {
                let lower = s.to_lowercase();
                DESCRIPTOR_WORDS.iter().any(|w| lower.contains(w))
            })
            .max_by_key(|s| s.len());

        descriptive
            .or_else(|| {
                mentions
                    .iter()
                    .copied()
                    .filter(|s| s.len() >= MIN_DESCRIPTION_LEN)
                    .max_by_key(|s| s.len())
            })
            .map(|s| s.trim().to_string())
    }

    // ------------------------------------------------------------------
    // Deduplication
    // ------------------------------------------------------------------

    /// Lowercased name segments (text before the first ':' or '-') of every
    /// roster line.
    fn roster_names(&self, roster: &str) -> Vec<String> {
        roster
            .lines()
            .map(|line| {
                line.split([':', '-'])
                    .next()
                    .unwrap_or(line)
                    .trim()
                    .to_lowercase()
            })
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(narrative: &str, roster: &str) -> Vec<NpcCandidate> {
        EntityExtractor::new().extract_new_npcs(narrative, roster)
    }

    #[test]
    fn test_detects_title_name() {
        let npcs = extract("Captain Yelchin saluted the assembled troops.", "");
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].name, "Captain Yelchin");
    }

    #[test]
    fn test_detects_name_before_verb() {
        let npcs = extract("Gurney Halleck entered the hall with his baliset.", "");
        assert!(npcs.iter().any(|n| n.name == "Gurney Halleck"));
    }

    #[test]
    fn test_detects_dialogue_attribution() {
        let npcs = extract(r#""The water is ours," Stilgar said flatly."#, "");
        assert!(npcs.iter().any(|n| n.name == "Stilgar"));
    }

    #[test]
    fn test_detects_named_construction() {
        let npcs = extract("They were led by a guide named Korba into the deep desert.", "");
        assert!(npcs.iter().any(|n| n.name == "Korba"));
    }

    #[test]
    fn test_rejects_denylisted_words() {
        let npcs = extract("The Guild said nothing. Arrakis waited. North entered the map.", "");
        assert!(npcs.is_empty());
    }

    #[test]
    fn test_rejects_short_single_names() {
        let npcs = extract("Bo said hello to everyone at the table.", "");
        assert!(npcs.is_empty());
    }

    #[test]
    fn test_rejects_acronyms() {
        let npcs = extract("CHOAM approved the shipment without comment.", "");
        assert!(npcs.is_empty());
    }

    #[test]
    fn test_strips_technical_markers() {
        let text = "Auto-detected: travel activity\n\
                    Estimated 3 days elapsed during the crossing.\n\
                    [internal tag]\n\
                    Jessica Atreides smiled at the gathered household staff.";
        let npcs = extract(text, "");
        // "Atreides" is deny-listed, so the two-word form is rejected outright
        assert!(npcs.iter().all(|n| !n.name.contains("Auto")));
    }

    #[test]
    fn test_enrichment_finds_role_keyword() {
        let npcs = extract(
            "Thufir Hawat, the old mentat advisor, studied the board in silence.",
            "",
        );
        let hawat = npcs
            .iter()
            .find(|n| n.name == "Thufir Hawat")
            .expect("Thufir Hawat should be detected");
        assert!(hawat.descriptor.to_lowercase().contains("mentat"));
    }

    #[test]
    fn test_enrichment_falls_back_to_default() {
        let npcs = extract("Korba waited.", "");
        assert_eq!(npcs.len(), 1);
        assert_eq!(npcs[0].descriptor, DEFAULT_DESCRIPTOR);
    }

    #[test]
    fn test_dedup_against_roster() {
        let roster = "Stilgar - Fremen naib of Sietch Tabr\nChani: guide";
        let npcs = extract(r#""Follow me," Stilgar said."#, roster);
        assert!(npcs.is_empty());
    }

    #[test]
    fn test_dedup_is_case_insensitive() {
        let roster = "STILGAR - naib";
        let npcs = extract(r#""Follow me," Stilgar said."#, roster);
        assert!(npcs.is_empty());
    }

    #[test]
    fn test_dedup_within_single_pass() {
        let npcs = extract(
            r#"Korba entered the chamber. "We are ready," Korba said."#,
            "",
        );
        assert_eq!(npcs.iter().filter(|n| n.name == "Korba").count(), 1);
    }

    #[test]
    fn test_second_run_with_updated_roster_is_empty() {
        let extractor = EntityExtractor::new();
        let text = "Gurney Halleck entered the hall and bowed.";

        let first = extractor.extract_new_npcs(text, "");
        assert!(!first.is_empty());

        let roster: String = first
            .iter()
            .map(|n| n.to_line())
            .collect::<Vec<_>>()
            .join("\n");
        let second = extractor.extract_new_npcs(text, &roster);
        assert!(second.is_empty());
    }

    #[test]
    fn test_empty_input_yields_empty_list() {
        assert!(extract("", "").is_empty());
        assert!(extract("   \n  \n", "").is_empty());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let narrative = String::from("Korba entered the chamber.");
        let roster = String::from("Chani: guide");
        let _ = extract(&narrative, &roster);
        assert_eq!(narrative, "Korba entered the chamber.");
        assert_eq!(roster, "Chani: guide");
    }

    #[test]
    fn test_to_line_format() {
        let npc = NpcCandidate {
            name: "Korba".to_string(),
            descriptor: "Fedaykin lieutenant".to_string(),
        };
        assert_eq!(npc.to_line(), "Korba - Fedaykin lieutenant");
    }
}
