//! Game Time Tracker Module
//!
//! Orchestrates the four engine services over a campaign's stored state:
//! a message is analyzed for time passage, the calendar advances the stored
//! date, new NPCs are merged into the roster, and updated free-text fields
//! are condensed to budget before being saved.
//!
//! The services carry no hidden state: each is constructed explicitly and
//! injected. Persistence goes through the [`CampaignStore`] collaborator;
//! concurrent writers race with last-write-wins semantics.

use thiserror::Error;
use tracing::{debug, info};

use super::calendar::{CalendarEngine, CalendarError, CalendarSystem};
use super::condenser::{CondensationBudgets, ContextCondenser, TokenCounter};
use super::extractor::{EntityExtractor, NpcCandidate};
use super::models::{CampaignTimeState, TimePassageEvent};
use super::time_passage::{TimePassageAnalyzer, TimePassageSuggestion};

// ============================================================================
// Error Types
// ============================================================================

/// Error surfaced by a storage backend.
#[derive(Error, Debug, Clone)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

// ============================================================================
// Storage Collaborator
// ============================================================================

/// External persistence seam. The engine never performs I/O itself; an
/// implementation of this trait (key-value store, file, database) is
/// supplied by the host application.
pub trait CampaignStore {
    fn load_state(&self) -> std::result::Result<Option<CampaignTimeState>, StoreError>;
    fn save_state(&mut self, state: &CampaignTimeState) -> std::result::Result<(), StoreError>;
}

// ============================================================================
// Outcome
// ============================================================================

/// What processing one message did to the campaign state.
#[derive(Debug, Clone)]
pub struct MessageOutcome {
    /// The recorded advancement, if the analyzer's suggestion was accepted
    pub time_advanced: Option<TimePassageEvent>,
    /// The analyzer's raw recommendation
    pub suggestion: TimePassageSuggestion,
    /// NPCs newly added to the roster
    pub new_npcs: Vec<NpcCandidate>,
    /// The state as saved
    pub state: CampaignTimeState,
}

// ============================================================================
// Tracker
// ============================================================================

/// Campaign game-time orchestrator. All four services are injected; the
/// tracker itself holds no mutable state.
pub struct GameTimeTracker {
    calendar: CalendarEngine,
    analyzer: TimePassageAnalyzer,
    extractor: EntityExtractor,
    condenser: ContextCondenser,
    budgets: CondensationBudgets,
}

impl GameTimeTracker {
    pub fn new(
        calendar: CalendarEngine,
        analyzer: TimePassageAnalyzer,
        extractor: EntityExtractor,
        condenser: ContextCondenser,
        budgets: CondensationBudgets,
    ) -> Self {
        Self {
            calendar,
            analyzer,
            extractor,
            condenser,
            budgets,
        }
    }

    /// Tracker with default-constructed services and budgets.
    pub fn with_defaults() -> Self {
        Self::new(
            CalendarEngine::new(),
            TimePassageAnalyzer::new(),
            EntityExtractor::new(),
            ContextCondenser::new(),
            CondensationBudgets::default(),
        )
    }

    /// Process one narrative message against the stored campaign state:
    /// load, advance time if suggested, merge new NPCs, condense updated
    /// fields, save. Read-modify-write; last writer wins.
    pub fn process_message(
        &self,
        store: &mut dyn CampaignStore,
        counter: &dyn TokenCounter,
        system: &CalendarSystem,
        message: &str,
    ) -> Result<MessageOutcome> {
        let mut state = match store.load_state()? {
            Some(state) => state,
            None => CampaignTimeState::new(
                system.clone(),
                self.calendar.default_start_date(system),
            ),
        };

        let suggestion = self.analyzer.suggest(message);
        let time_advanced = if suggestion.suggested {
            Some(self.advance_time(&mut state, &suggestion)?)
        } else {
            debug!(days = suggestion.days, "no time advancement suggested");
            None
        };

        let new_npcs = self
            .extractor
            .extract_new_npcs(message, &state.npc_roster);
        if !new_npcs.is_empty() {
            info!(count = new_npcs.len(), "adding newly detected NPCs to roster");
            let mut roster = state.npc_roster.trim_end().to_string();
            for npc in &new_npcs {
                if !roster.is_empty() {
                    roster.push('\n');
                }
                roster.push_str(&npc.to_line());
            }
            state.npc_roster = roster;
        }

        self.condense_fields(&mut state, counter);
        store.save_state(&state)?;

        Ok(MessageOutcome {
            time_advanced,
            suggestion,
            new_npcs,
            state,
        })
    }

    /// Advance the stored date and append a history record. Fractional day
    /// estimates accumulate in `total_days_elapsed`; the calendar date moves
    /// by the nearest whole day.
    fn advance_time(
        &self,
        state: &mut CampaignTimeState,
        suggestion: &TimePassageSuggestion,
    ) -> Result<TimePassageEvent> {
        let whole_days = suggestion.days.round() as i64;
        let previous_date = state.current_date.clone();
        let new_date = if whole_days != 0 {
            self.calendar
                .add_days(&previous_date, whole_days, &state.calendar_system)?
        } else {
            previous_date.clone()
        };

        info!(
            days = suggestion.days,
            from = %previous_date,
            to = %new_date,
            "advancing campaign time"
        );

        let event = TimePassageEvent {
            description: suggestion.explanation.clone(),
            days_elapsed: suggestion.days,
            previous_date,
            new_date: new_date.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        state.current_date = new_date;
        state.total_days_elapsed += suggestion.days;
        state.history.push(event.clone());
        Ok(event)
    }

    /// Trim every free-text field to its budget before persisting.
    fn condense_fields(&self, state: &mut CampaignTimeState, counter: &dyn TokenCounter) {
        state.character_info =
            self.condenser
                .condense(&state.character_info, self.budgets.character_info, counter);
        state.npc_roster =
            self.condenser
                .condense(&state.npc_roster, self.budgets.npc_roster, counter);
        state.notes = self
            .condenser
            .condense(&state.notes, self.budgets.notes, counter);
    }

    /// Bounded context block for an external model, condensed to the
    /// AI-context budget.
    pub fn build_ai_context(
        &self,
        state: &CampaignTimeState,
        counter: &dyn TokenCounter,
    ) -> String {
        let full = format!(
            "Current date: {}\nDays elapsed since campaign start: {}\n\n\
             CHARACTER:\n{}\n\nNPCS:\n{}\n\nNOTES:\n{}",
            state.current_date,
            state.total_days_elapsed,
            state.character_info,
            state.npc_roster,
            state.notes,
        );
        self.condenser
            .condense(&full, self.budgets.ai_context, counter)
    }
}

// ============================================================================
// Tests
// ============================================================================
