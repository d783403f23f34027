//! Test suites that span modules.
//!
//! Unit tests live next to the code they cover; this tree holds the
//! property-based suites.

pub mod property;
