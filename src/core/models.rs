//! Campaign Time Data Models
//!
//! The externally visible shapes of the game-time engine: the per-campaign
//! time state owned by the storage collaborator, and the append-only time
//! passage history records.

use serde::{Deserialize, Serialize};

use super::calendar::CalendarSystem;

// ============================================================================
// Types
// ============================================================================

/// One accepted time advancement. Immutable once created; appended to the
/// campaign's history log and persisted verbatim by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePassageEvent {
    /// Human-readable account of why time advanced
    pub description: String,
    /// Estimated elapsed days (may be fractional)
    pub days_elapsed: f64,
    /// Formatted date before the advancement
    pub previous_date: String,
    /// Formatted date after the advancement
    pub new_date: String,
    /// Wall-clock timestamp (RFC 3339) of when the event was recorded
    pub timestamp: String,
}

/// Per-campaign time state, loaded and saved through the storage
/// collaborator. Dates are stored in their formatted string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignTimeState {
    /// Current in-game date, canonical formatted form
    pub current_date: String,
    /// Calendar the campaign runs on
    pub calendar_system: CalendarSystem,
    /// Date the campaign started on
    pub start_date: String,
    /// Running total of elapsed days since the start date
    pub total_days_elapsed: f64,
    /// Free-text character sheet
    pub character_info: String,
    /// Free-text NPC roster, one entry per line
    pub npc_roster: String,
    /// Free-text campaign notes
    pub notes: String,
    /// Append-only log of accepted time advancements
    pub history: Vec<TimePassageEvent>,
}

impl CampaignTimeState {
    /// Fresh state starting at `start_date` on the given calendar.
    pub fn new(calendar_system: CalendarSystem, start_date: String) -> Self {
        Self {
            current_date: start_date.clone(),
            calendar_system,
            start_date,
            total_days_elapsed: 0.0,
            character_info: String::new(),
            npc_roster: String::new(),
            notes: String::new(),
            history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_at_start_date() {
        let state = CampaignTimeState::new(
            CalendarSystem::Imperial,
            "1 Primus 10191 A.G.".to_string(),
        );
        assert_eq!(state.current_date, state.start_date);
        assert_eq!(state.total_days_elapsed, 0.0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_state_round_trips_through_json() {
        let state = CampaignTimeState::new(
            CalendarSystem::Imperial,
            "1 Primus 10191 A.G.".to_string(),
        );
        let json = serde_json::to_string(&state).unwrap();
        let back: CampaignTimeState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
