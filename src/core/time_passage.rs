//! Time Passage Analyzer Module
//!
//! Scans narrative text and estimates how many in-game days have elapsed,
//! with a confidence score. Two tiers of evidence:
//! - Explicit duration phrases ("the trip took 10 days", "3 weeks later")
//!   always win at confidence 0.95
//! - Activity categories (travel, rest, training, ...) with default day
//!   estimates and intensity modifiers, confidence 0.7-0.9
//!
//! The category table is declarative: rows are built once at startup and may
//! be extended at runtime with user-supplied keyword-to-days mappings. Rules
//! carry explicit priority fields so tie-breaking does not depend on
//! collection order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// One detected time-passage indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMatch {
    /// Category name, or "explicit" for literal duration phrases
    pub category: String,
    /// The text fragment that triggered the match
    pub matched_text: String,
    /// Estimated elapsed days for this indicator
    pub days: f64,
    /// Heuristic reliability in [0, 1]
    pub confidence: f64,
}

/// Result of analyzing a narrative message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePassageAnalysis {
    /// Estimated elapsed days, rounded to one decimal place
    pub days_elapsed: f64,
    /// Maximum confidence across all matches
    pub confidence: f64,
    /// Every indicator found, in evaluation order
    pub matches: Vec<AnalysisMatch>,
}

/// A yes/no recommendation derived from an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePassageSuggestion {
    pub suggested: bool,
    pub days: f64,
    pub confidence: f64,
    pub explanation: String,
}

/// An intensity/speed modifier row: the first pattern (by priority) that also
/// matches the text multiplies the category's default days.
#[derive(Debug, Clone)]
pub struct ActivityModifier {
    pub pattern: Regex,
    pub multiplier: f64,
    pub priority: u32,
}

/// A named class of narrative action with a default elapsed-time estimate.
#[derive(Debug, Clone)]
pub struct ActivityCategory {
    pub name: String,
    pub triggers: Vec<Regex>,
    pub default_days: f64,
    pub modifiers: Vec<ActivityModifier>,
}

/// A literal duration phrase with its unit-to-days multiplier.
#[derive(Debug, Clone)]
struct DurationRule {
    pattern: Regex,
    days_per_unit: f64,
    priority: u32,
}

// ============================================================================
// Duration Rules
// ============================================================================

/// Confidence assigned to any explicit duration match.
const EXPLICIT_CONFIDENCE: f64 = 0.95;

/// Base confidence for a category trigger match.
const CATEGORY_CONFIDENCE: f64 = 0.7;

/// Confidence bonus when a modifier also matched, capped at 0.9.
const MODIFIER_BONUS: f64 = 0.1;

fn duration_rule(pattern: &str, days_per_unit: f64, priority: u32) -> DurationRule {
    DurationRule {
        pattern: Regex::new(pattern).expect("Failed to compile duration rule regex"),
        days_per_unit,
        priority,
    }
}

/// Explicit duration phrases, evaluated before any category. The optional
/// `n` capture holds the count; absent means one unit (e.g. "a week later").
static DURATION_RULES: Lazy<Vec<DurationRule>> = Lazy::new(|| {
    let mut rules = vec![
        duration_rule(
            r"(?i)\b(?:after|for|over|took|takes|lasted|spent|waited)\s+(?P<n>\d+(?:\.\d+)?)\s+days?\b",
            1.0,
            1,
        ),
        duration_rule(
            r"(?i)\b(?P<n>\d+(?:\.\d+)?)\s+days?\s+(?:later|passed|pass|went\s+by|elapsed|of\s+travel)\b",
            1.0,
            2,
        ),
        duration_rule(
            r"(?i)\b(?:after|for|over|took|takes|lasted|spent|waited)\s+(?P<n>\d+(?:\.\d+)?)\s+weeks?\b",
            7.0,
            3,
        ),
        duration_rule(
            r"(?i)\b(?P<n>\d+(?:\.\d+)?)\s+weeks?\s+(?:later|passed|pass|went\s+by|elapsed)\b",
            7.0,
            4,
        ),
        duration_rule(
            r"(?i)\b(?:after|for|over|took|takes|lasted|spent|waited)\s+(?P<n>\d+(?:\.\d+)?)\s+months?\b",
            30.0,
            5,
        ),
        duration_rule(
            r"(?i)\b(?P<n>\d+(?:\.\d+)?)\s+months?\s+(?:later|passed|pass|went\s+by|elapsed)\b",
            30.0,
            6,
        ),
        duration_rule(
            r"(?i)\b(?:after|for|over|took|takes|lasted|spent|waited)\s+(?P<n>\d+(?:\.\d+)?)\s+years?\b",
            365.0,
            7,
        ),
        duration_rule(
            r"(?i)\b(?P<n>\d+(?:\.\d+)?)\s+years?\s+(?:later|passed|pass|went\s+by|elapsed)\b",
            365.0,
            8,
        ),
        // Single-unit phrasings without a number
        duration_rule(r"(?i)\ba\s+day\s+(?:later|passed)\b", 1.0, 9),
        duration_rule(r"(?i)\ba\s+week\s+(?:later|passed)\b", 7.0, 10),
        duration_rule(r"(?i)\ba\s+month\s+(?:later|passed)\b", 30.0, 11),
        duration_rule(r"(?i)\ba\s+year\s+(?:later|passed)\b", 365.0, 12),
        // Generic hours fallback: a fraction of a day per hour
        duration_rule(
            r"(?i)\b(?:after|for|took|spent)\s+(?P<n>\d+(?:\.\d+)?)\s+hours?\b",
            0.1,
            13,
        ),
        duration_rule(r"(?i)\b(?:a\s+few|several|some)\s+hours\s+later\b", 0.1, 14),
    ];
    rules.sort_by_key(|r| r.priority);
    rules
});

// ============================================================================
// Default Activity Categories
// ============================================================================

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Failed to compile activity category regex")
}

fn category(
    name: &str,
    triggers: &[&str],
    default_days: f64,
    modifiers: &[(&str, f64)],
) -> ActivityCategory {
    ActivityCategory {
        name: name.to_string(),
        triggers: triggers.iter().map(|t| compile(t)).collect(),
        default_days,
        modifiers: modifiers
            .iter()
            .enumerate()
            .map(|(i, (pattern, multiplier))| ActivityModifier {
                pattern: compile(pattern),
                multiplier: *multiplier,
                priority: i as u32 + 1,
            })
            .collect(),
    }
}

fn default_categories() -> Vec<ActivityCategory> {
    vec![
        category(
            "travel",
            &[
                r"(?i)\btravel(?:ed|led|ling|ing)?\b",
                r"(?i)\bjourney(?:ed|ing)?\b",
                r"(?i)\brode\s+(?:to|toward|across)\b",
                r"(?i)\bmarch(?:ed|ing)?\b",
                r"(?i)\bset\s+(?:out|off)\b",
                r"(?i)\bcrossed\s+the\b",
            ],
            3.0,
            &[
                (r"(?i)\b(?:quick(?:ly)?|swift(?:ly)?|hurried(?:ly)?|brief(?:ly)?|short)\b", 0.5),
                (r"(?i)\b(?:long|slow(?:ly)?|arduous|grueling|endless|far)\b", 2.0),
            ],
        ),
        category(
            "rest",
            &[
                r"(?i)\brest(?:ed|ing)?\b",
                r"(?i)\bslept\b",
                r"(?i)\bcamp(?:ed|ing)?\b",
                r"(?i)\bspent\s+the\s+night\b",
                r"(?i)\brecuperat(?:ed|ing)\b",
            ],
            1.0,
            &[
                (r"(?i)\b(?:short|brief(?:ly)?|quick(?:ly)?)\b", 0.5),
                (r"(?i)\b(?:long|extended|full|deep)\b", 3.0),
            ],
        ),
        category(
            "training",
            &[
                r"(?i)\btrain(?:ed|ing)?\b",
                r"(?i)\bpractic(?:ed|ing)\b",
                r"(?i)\bdrill(?:ed|ing)?\b",
                r"(?i)\bsparr(?:ed|ing)\b",
                r"(?i)\bstudied\s+under\b",
            ],
            7.0,
            &[
                (r"(?i)\b(?:brief(?:ly)?|quick(?:ly)?|light)\b", 0.5),
                (r"(?i)\b(?:intensive(?:ly)?|rigorous(?:ly)?|relentless(?:ly)?)\b", 2.0),
            ],
        ),
        category(
            "research",
            &[
                r"(?i)\bresearch(?:ed|ing)?\b",
                r"(?i)\bpored?\s+over\b",
                r"(?i)\bstudied\s+the\b",
                r"(?i)\bdeciphered?\b",
                r"(?i)\bin\s+the\s+(?:archives?|library)\b",
            ],
            5.0,
            &[
                (r"(?i)\b(?:brief(?:ly)?|quick(?:ly)?)\b", 0.5),
                (r"(?i)\b(?:exhaustive(?:ly)?|thorough(?:ly)?|painstaking)\b", 2.0),
            ],
        ),
        category(
            "recovery",
            &[
                r"(?i)\bheal(?:ed|ing)?\b",
                r"(?i)\brecover(?:ed|ing|y)?\b",
                r"(?i)\bconvalesc(?:ed|ing|ence)\b",
                r"(?i)\btend(?:ed|ing)\s+(?:to\s+)?(?:his|her|their)\s+wounds?\b",
            ],
            7.0,
            &[
                (r"(?i)\b(?:minor|light(?:ly)?|slight(?:ly)?)\b", 0.5),
                (r"(?i)\b(?:grievous(?:ly)?|grave(?:ly)?|severe(?:ly)?|near[-\s]?fatal)\b", 2.0),
            ],
        ),
        category(
            "shopping",
            &[
                r"(?i)\b(?:browsed|haggl(?:ed|ing)|bartered)\b",
                r"(?i)\bbought\s+(?:supplies|provisions|gear)\b",
                r"(?i)\bvisited\s+the\s+(?:market|bazaar|merchant)\b",
                r"(?i)\brestock(?:ed|ing)?\b",
            ],
            0.2,
            &[],
        ),
        category(
            "construction",
            &[
                r"(?i)\bbuilt\b",
                r"(?i)\bconstruct(?:ed|ing)\b",
                r"(?i)\brebuil(?:t|ding)\b",
                r"(?i)\bfortif(?:ied|ying)\b",
                r"(?i)\berect(?:ed|ing)\b",
            ],
            30.0,
            &[
                (r"(?i)\b(?:small|modest|simple|crude)\b", 0.5),
                (r"(?i)\b(?:grand|massive|great|sprawling)\b", 2.0),
            ],
        ),
        category(
            "waiting",
            &[
                r"(?i)\bwait(?:ed|ing)?\s+(?:for|until|out)\b",
                r"(?i)\bbided?\s+(?:his|her|their)\s+time\b",
                r"(?i)\blaid\s+low\b",
            ],
            2.0,
            &[
                (r"(?i)\b(?:patient(?:ly)?|long|weeks?)\b", 2.0),
            ],
        ),
    ]
}

// ============================================================================
// Analyzer
// ============================================================================

/// Heuristic narrative time-passage classifier. Construct once at startup;
/// the category table is read-only afterward apart from explicit
/// registrations. Never fails: no signal yields zeros, not an error.
#[derive(Debug, Clone)]
pub struct TimePassageAnalyzer {
    categories: Vec<ActivityCategory>,
}

impl TimePassageAnalyzer {
    /// Analyzer with the built-in category table.
    pub fn new() -> Self {
        Self {
            categories: default_categories(),
        }
    }

    /// Analyzer with no categories (explicit durations still detected).
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// Register a user-defined keyword-to-days mapping as a new category row
    /// with a single trigger and no modifiers.
    pub fn register_category(&mut self, name: &str, keyword: &str, days: f64) {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
        self.categories.push(ActivityCategory {
            name: name.to_string(),
            triggers: vec![compile(&pattern)],
            default_days: days,
            modifiers: Vec::new(),
        });
    }

    pub fn categories(&self) -> &[ActivityCategory] {
        &self.categories
    }

    /// Estimate elapsed days for a narrative message.
    pub fn analyze(&self, text: &str) -> TimePassageAnalysis {
        let explicit = self.match_explicit(text);
        let matches = if explicit.is_empty() {
            self.match_categories(text)
        } else {
            explicit
        };

        let days_elapsed = matches.iter().map(|m| m.days).fold(0.0, f64::max);
        let confidence = matches.iter().map(|m| m.confidence).fold(0.0, f64::max);

        TimePassageAnalysis {
            days_elapsed: round_tenths(days_elapsed),
            confidence,
            matches,
        }
    }

    /// Analyze and wrap the result in an accept/reject recommendation.
    pub fn suggest(&self, text: &str) -> TimePassageSuggestion {
        let analysis = self.analyze(text);
        let suggested = analysis.confidence >= 0.5 && analysis.days_elapsed > 0.0;

        let explanation = match analysis.matches.first() {
            None => "No time-passage indicators detected".to_string(),
            Some(first) => {
                let mut summary = if first.category == "explicit" {
                    format!("Detected explicit duration \"{}\"", first.matched_text)
                } else {
                    format!(
                        "Detected {} activity (\"{}\")",
                        first.category, first.matched_text
                    )
                };
                if analysis.matches.len() > 1 {
                    summary.push_str(&format!(
                        ", plus {} additional indicator(s)",
                        analysis.matches.len() - 1
                    ));
                }
                summary
            }
        };

        TimePassageSuggestion {
            suggested,
            days: analysis.days_elapsed,
            confidence: analysis.confidence,
            explanation,
        }
    }

    /// All explicit duration matches, in rule-priority order.
    fn match_explicit(&self, text: &str) -> Vec<AnalysisMatch> {
        let mut matches = Vec::new();
        for rule in DURATION_RULES.iter() {
            for caps in rule.pattern.captures_iter(text) {
                let count = caps
                    .name("n")
                    .and_then(|n| n.as_str().parse::<f64>().ok())
                    .unwrap_or(1.0);
                let matched = caps
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                matches.push(AnalysisMatch {
                    category: "explicit".to_string(),
                    matched_text: matched,
                    days: count * rule.days_per_unit,
                    confidence: EXPLICIT_CONFIDENCE,
                });
            }
        }
        matches
    }

    /// One match per trigger pattern that fires; the first modifier row (by
    /// priority) that also matches scales the default.
    fn match_categories(&self, text: &str) -> Vec<AnalysisMatch> {
        let mut matches = Vec::new();
        for cat in &self.categories {
            let modifier = cat
                .modifiers
                .iter()
                .filter(|m| m.pattern.is_match(text))
                .min_by_key(|m| m.priority);

            for trigger in &cat.triggers {
                if let Some(hit) = trigger.find(text) {
                    let (days, confidence) = match modifier {
                        Some(m) => (
                            cat.default_days * m.multiplier,
                            round_tenths((CATEGORY_CONFIDENCE + MODIFIER_BONUS).min(0.9)),
                        ),
                        None => (cat.default_days, CATEGORY_CONFIDENCE),
                    };
                    matches.push(AnalysisMatch {
                        category: cat.name.clone(),
                        matched_text: hit.as_str().to_string(),
                        days,
                        confidence,
                    });
                }
            }
        }
        matches
    }
}

impl Default for TimePassageAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ============================================================================
// Tests
// ============================================================================
