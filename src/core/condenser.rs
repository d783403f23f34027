//! Context Condenser Module
//!
//! Shrinks free-text campaign fields to fit a language-model token budget
//! while keeping the highest-priority content. Token counting is an injected
//! pure capability ([`TokenCounter`]), never a network call.
//!
//! Input is classified as structured (line-oriented stat blocks) or prose,
//! split into units (lines or sentences), scored by a fixed keyword
//! heuristic, and greedily reassembled highest-score-first without ever
//! splitting a unit. The result always fits the budget.

use serde::{Deserialize, Serialize};

// ============================================================================
// Token Counting
// ============================================================================

/// Injected, pure token-counting capability.
pub trait TokenCounter {
    fn count(&self, text: &str) -> usize;
}

/// Estimates token count at roughly 4 characters per token (the usual LLM
/// rule of thumb). Non-empty text always counts as at least 1 token.
#[derive(Debug, Clone)]
pub struct HeuristicTokenCounter {
    chars_per_token: f64,
}

impl HeuristicTokenCounter {
    pub fn new() -> Self {
        Self {
            chars_per_token: 4.0,
        }
    }

    pub fn with_ratio(chars_per_token: f64) -> Self {
        Self {
            chars_per_token: chars_per_token.max(0.1),
        }
    }
}

impl Default for HeuristicTokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let chars = text.chars().count();
        ((chars as f64 / self.chars_per_token).ceil() as usize).max(1)
    }
}

// ============================================================================
// Budgets
// ============================================================================

/// Named token ceilings, one per free-text field kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CondensationBudgets {
    pub character_info: usize,
    pub npc_roster: usize,
    pub notes: usize,
    pub ai_context: usize,
}

impl Default for CondensationBudgets {
    fn default() -> Self {
        Self {
            character_info: 800,
            npc_roster: 600,
            notes: 500,
            ai_context: 1500,
        }
    }
}

// ============================================================================
// Keyword Weights
// ============================================================================

/// Structured mode: identity and stat lines first, then relationships and
/// goals, then background.
const STRUCTURED_WEIGHTS: &[(&str, i32)] = &[
    ("name", 10),
    ("level", 10),
    ("class", 10),
    ("race", 10),
    ("hp", 10),
    ("hit points", 10),
    ("armor", 10),
    ("ally", 6),
    ("enemy", 6),
    ("friend", 6),
    ("rival", 6),
    ("goal", 6),
    ("quest", 6),
    ("mission", 6),
    ("background", 3),
    ("history", 3),
    ("origin", 3),
    ("homeland", 3),
];

/// Prose mode: identity markers first, then abilities and equipment, then
/// goals and relationships, then background.
const PROSE_WEIGHTS: &[(&str, i32)] = &[
    ("name", 10),
    ("important", 10),
    ("key", 10),
    ("primary", 10),
    ("ability", 6),
    ("spell", 6),
    ("weapon", 6),
    ("equipment", 6),
    ("skill", 6),
    ("goal", 4),
    ("quest", 4),
    ("ally", 4),
    ("enemy", 4),
    ("friend", 4),
    ("relationship", 4),
    ("background", 2),
    ("history", 2),
    ("past", 2),
    ("origin", 2),
];

// ============================================================================
// Condenser
// ============================================================================

/// Token-budget-aware text condenser. Stateless; never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextCondenser;

impl ContextCondenser {
    pub fn new() -> Self {
        Self
    }

    /// Condense `text` so the counter reports at most `max_tokens`.
    ///
    /// Already-short input is returned byte-for-byte unchanged. Otherwise
    /// units are kept highest-score-first (stable on ties) while the running
    /// count stays within budget; a unit is never split. The result is empty
    /// only if every unit individually exceeds the budget.
    pub fn condense(&self, text: &str, max_tokens: usize, counter: &dyn TokenCounter) -> String {
        if counter.count(text) <= max_tokens {
            return text.to_string();
        }

        let structured = self.is_structured(text);
        let units = if structured {
            self.split_lines(text)
        } else {
            self.split_sentences(text)
        };

        let mut scored: Vec<(i32, &str)> = units
            .iter()
            .map(|u| (self.score_unit(u, structured), u.as_str()))
            .collect();
        // Stable sort: ties keep original order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let mut kept: Vec<&str> = Vec::new();
        for (_, unit) in scored {
            kept.push(unit);
            if counter.count(&self.join(&kept, structured)) > max_tokens {
                kept.pop();
            }
        }

        if kept.is_empty() {
            return String::new();
        }
        self.join(&kept, structured)
    }

    /// Structured when splitting on newlines yields more non-empty lines
    /// than splitting on sentence terminators yields sentences.
    fn is_structured(&self, text: &str) -> bool {
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        let sentences = text
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();
        lines > sentences
    }

    fn split_lines(&self, text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn split_sentences(&self, text: &str) -> Vec<String> {
        text.split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn score_unit(&self, unit: &str, structured: bool) -> i32 {
        let lower = unit.to_lowercase();
        let weights = if structured {
            STRUCTURED_WEIGHTS
        } else {
            PROSE_WEIGHTS
        };

        let mut score: i32 = weights
            .iter()
            .filter(|(keyword, _)| lower.contains(keyword))
            .map(|(_, weight)| weight)
            .sum();

        if structured && unit.chars().any(|c| c.is_ascii_digit()) {
            score += 1;
        }
        score
    }

    fn join(&self, units: &[&str], structured: bool) -> String {
        if units.is_empty() {
            return String::new();
        }
        if structured {
            units.join("\n")
        } else {
            format!("{}.", units.join(". "))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
