//! Game-Time Engine Core
//!
//! Four pure, deterministic services over strings and small records, plus
//! the orchestrator that wires them to a storage collaborator:
//! - `calendar`: multi-calendar date parsing, formatting, and arithmetic
//! - `time_passage`: heuristic narrative time-passage classification
//! - `condenser`: token-budget-aware text condensation
//! - `extractor`: heuristic NPC name extraction
//! - `tracker`: per-message orchestration over stored campaign state

pub mod calendar;
pub mod condenser;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod time_passage;
pub mod tracker;

pub use calendar::{CalendarDate, CalendarDefinition, CalendarEngine, CalendarError, CalendarSystem};
pub use condenser::{CondensationBudgets, ContextCondenser, HeuristicTokenCounter, TokenCounter};
pub use extractor::{EntityExtractor, NpcCandidate};
pub use models::{CampaignTimeState, TimePassageEvent};
pub use time_passage::{
    AnalysisMatch, TimePassageAnalysis, TimePassageAnalyzer, TimePassageSuggestion,
};
pub use tracker::{CampaignStore, GameTimeTracker, MessageOutcome, StoreError, TrackerError};
