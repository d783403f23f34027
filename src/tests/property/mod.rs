//! Property-based tests for the game-time engine.
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Test Modules
//!
//! - `calendar_props`: Imperial calendar invariants
//!   - render/parse round trip for every valid date
//!   - `add_days`/`days_between` are mutually inverse
//!   - adding a full 360-day year changes only the year
//! - `analyzer_props`: time-passage analysis invariants
//!   - never panics, confidence stays in [0, 1]
//!   - explicit numeric durations are recovered exactly
//! - `condenser_props`: condensation invariants
//!   - output always fits the token budget
//!   - already-short input is returned unchanged
//! - `extractor_props`: extraction invariants
//!   - never panics on arbitrary text
//!   - a second pass against the updated roster finds nothing new

pub mod analyzer_props;
pub mod calendar_props;
pub mod condenser_props;
pub mod extractor_props;
