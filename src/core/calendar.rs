//! Calendar Engine Module
//!
//! Parses, formats, and performs arithmetic on campaign dates under multiple
//! calendar systems:
//! - The Imperial calendar: 12 fixed months of 30 days (360-day year) with a
//!   6-day week and the "A.G." epoch suffix
//! - The standard (real-world) calendar, backed by chrono
//! - Custom calendars described by a [`CalendarDefinition`]
//!
//! All fixed-calendar arithmetic routes through a linear day-count
//! (`year * 360 + (month - 1) * 30 + (day - 1)` for the Imperial calendar) so
//! `add_days` and `days_between` stay mutually inverse and O(1).

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    #[error(
        "Unrecognized date '{input}' for the {system} calendar. \
         Accepted formats: {formats}. Month names: {months}"
    )]
    InvalidFormat {
        input: String,
        system: String,
        formats: String,
        months: String,
    },

    #[error("Day {day} is out of range 1-{max} in '{input}'")]
    DayOutOfRange { day: u32, max: u32, input: String },

    #[error("Unknown month '{month}' in '{input}'. Month names: {names}")]
    UnknownMonth {
        month: String,
        names: String,
        input: String,
    },

    #[error("Month {month} is out of range 1-{max} in '{input}'")]
    MonthOutOfRange { month: u32, max: u32, input: String },

    #[error("Year '{year}' is out of range in '{input}'")]
    YearOutOfRange { year: String, input: String },
}

pub type Result<T> = std::result::Result<T, CalendarError>;

// ============================================================================
// Types
// ============================================================================

/// A date under a fixed (Imperial or custom) calendar.
///
/// Invariant: `month` and `day` are always in range for the calendar that
/// produced them. Values are created by parsing and consumed immediately by
/// arithmetic; the canonical stored representation is the formatted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    /// 1-based month index
    pub month: u32,
    /// 1-based day of month
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

/// Describes a fixed calendar: ordered month names, uniform month length,
/// an epoch year for the default start date, an optional epoch suffix
/// rendered after the year, and optional weekday names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDefinition {
    pub month_names: Vec<String>,
    pub days_per_month: u32,
    pub epoch_year: i32,
    /// Suffix rendered after the year (e.g. "A.G."). Empty = none.
    pub epoch_suffix: String,
    /// Weekday cycle over the linear day-count. Empty = no weekday support.
    pub weekday_names: Vec<String>,
}

impl CalendarDefinition {
    pub fn days_per_year(&self) -> i64 {
        self.month_names.len() as i64 * self.days_per_month as i64
    }

    fn month_index(&self, name: &str) -> Option<u32> {
        self.month_names
            .iter()
            .position(|m| m.eq_ignore_ascii_case(name))
            .map(|i| i as u32 + 1)
    }

    fn month_list(&self) -> String {
        self.month_names.join(", ")
    }
}

/// Which calendar a campaign runs on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSystem {
    Imperial,
    Standard,
    Custom(CalendarDefinition),
}

impl CalendarSystem {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Imperial => "imperial",
            Self::Standard => "standard",
            Self::Custom(_) => "custom",
        }
    }
}

impl std::fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Imperial Calendar Definition
// ============================================================================

/// The twelve Imperial month names, in calendar order.
pub const IMPERIAL_MONTHS: [&str; 12] = [
    "Primus",
    "Secundus",
    "Tertius",
    "Quartus",
    "Quintus",
    "Sextus",
    "Septimus",
    "Octavus",
    "Nonus",
    "Decimus",
    "Undecimus",
    "Duodecimus",
];

/// The six Imperial weekday names, cycling over the linear day-count.
pub const IMPERIAL_WEEKDAYS: [&str; 6] = ["Solis", "Lunae", "Ignis", "Aquae", "Terrae", "Caeli"];

/// Epoch year used for the Imperial default start date.
pub const IMPERIAL_EPOCH_YEAR: i32 = 10191;

static IMPERIAL_DEFINITION: Lazy<CalendarDefinition> = Lazy::new(|| CalendarDefinition {
    month_names: IMPERIAL_MONTHS.iter().map(|m| m.to_string()).collect(),
    days_per_month: 30,
    epoch_year: IMPERIAL_EPOCH_YEAR,
    epoch_suffix: "A.G.".to_string(),
    weekday_names: IMPERIAL_WEEKDAYS.iter().map(|d| d.to_string()).collect(),
});

// ============================================================================
// Regex Patterns
// ============================================================================

/// "D Month Y" (the epoch suffix is stripped before matching)
static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<day>\d{1,2})\s+(?P<month>[A-Za-z]+)\s+(?P<year>-?\d+)$")
        .expect("Failed to compile day-month-year regex")
});

/// "Month D, Y"
static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<month>[A-Za-z]+)\s+(?P<day>\d{1,2}),\s*(?P<year>-?\d+)$")
        .expect("Failed to compile month-day-year regex")
});

/// "D/M/Y"
static SLASH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<day>\d{1,2})/(?P<month>\d{1,2})/(?P<year>-?\d+)$")
        .expect("Failed to compile slash date regex")
});

/// Formats tried for the standard calendar, most specific first.
const STANDARD_FORMATS: &[&str] = &["%B %d, %Y", "%d %B %Y", "%Y-%m-%d", "%d/%m/%Y"];

const STANDARD_FORMAT_LIST: &str = "\"Month D, Y\", \"D Month Y\", \"Y-M-D\", \"D/M/Y\"";

// ============================================================================
// Calendar Engine
// ============================================================================

/// Stateless date parsing, formatting, and arithmetic over calendar systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarEngine;

impl CalendarEngine {
    pub fn new() -> Self {
        Self
    }

    /// Parse a date string under the given calendar system. Strict: fails
    /// with a descriptive error naming the accepted formats and month names.
    pub fn parse(&self, text: &str, system: &CalendarSystem) -> Result<CalendarDate> {
        match system {
            CalendarSystem::Standard => self.parse_standard(text),
            CalendarSystem::Imperial => self.parse_fixed(text, system, &IMPERIAL_DEFINITION),
            CalendarSystem::Custom(def) => self.parse_fixed(text, system, def),
        }
    }

    /// Re-render a stored date string in canonical form. Lenient: on parse
    /// failure this logs and returns the input unchanged rather than failing.
    pub fn format(&self, text: &str, system: &CalendarSystem) -> String {
        match self.parse(text, system) {
            Ok(date) => self.render(&date, system),
            Err(err) => {
                warn!(input = text, %err, "date could not be re-rendered; passing through");
                text.to_string()
            }
        }
    }

    /// Render a parsed date in the canonical form for its calendar system.
    pub fn render(&self, date: &CalendarDate, system: &CalendarSystem) -> String {
        match system {
            CalendarSystem::Standard => self.render_standard(date),
            CalendarSystem::Imperial => self.render_fixed(date, &IMPERIAL_DEFINITION),
            CalendarSystem::Custom(def) => self.render_fixed(date, def),
        }
    }

    /// Add (or subtract, for negative `days`) whole days to a date string.
    /// Day rolls into month and month rolls into year for any integer.
    pub fn add_days(&self, text: &str, days: i64, system: &CalendarSystem) -> Result<String> {
        match system {
            CalendarSystem::Standard => {
                let date = self.parse(text, system)?;
                let naive = self.to_naive(&date, text, system)?;
                let shifted = naive + chrono::Duration::days(days);
                Ok(self.render_naive(&shifted))
            }
            CalendarSystem::Imperial => self.add_days_fixed(text, days, system, &IMPERIAL_DEFINITION),
            CalendarSystem::Custom(def) => self.add_days_fixed(text, days, system, def),
        }
    }

    /// Number of days separating two date strings. Magnitude-only: the result
    /// is non-negative regardless of argument order, for every system.
    pub fn days_between(&self, a: &str, b: &str, system: &CalendarSystem) -> Result<i64> {
        match system {
            CalendarSystem::Standard => {
                let first = self.to_naive(&self.parse(a, system)?, a, system)?;
                let second = self.to_naive(&self.parse(b, system)?, b, system)?;
                Ok((second - first).num_days().abs())
            }
            CalendarSystem::Imperial => self.days_between_fixed(a, b, system, &IMPERIAL_DEFINITION),
            CalendarSystem::Custom(def) => self.days_between_fixed(a, b, system, def),
        }
    }

    /// Whether `text` parses under the given system. Never panics.
    pub fn is_valid_date(&self, text: &str, system: &CalendarSystem) -> bool {
        self.parse(text, system).is_ok()
    }

    /// Canonical seed date for a fresh campaign on the given system.
    pub fn default_start_date(&self, system: &CalendarSystem) -> String {
        match system {
            CalendarSystem::Standard => self.render_naive(&Utc::now().date_naive()),
            CalendarSystem::Imperial => self.render_fixed(
                &CalendarDate::new(IMPERIAL_EPOCH_YEAR, 1, 1),
                &IMPERIAL_DEFINITION,
            ),
            CalendarSystem::Custom(def) => {
                self.render_fixed(&CalendarDate::new(def.epoch_year, 1, 1), def)
            }
        }
    }

    /// Weekday name for a date string, where the calendar defines a week.
    pub fn weekday(&self, text: &str, system: &CalendarSystem) -> Result<Option<String>> {
        match system {
            CalendarSystem::Standard => {
                let naive = self.to_naive(&self.parse(text, system)?, text, system)?;
                Ok(Some(naive.format("%A").to_string()))
            }
            CalendarSystem::Imperial => self.weekday_fixed(text, system, &IMPERIAL_DEFINITION),
            CalendarSystem::Custom(def) => self.weekday_fixed(text, system, def),
        }
    }

    // ------------------------------------------------------------------
    // Fixed-calendar internals
    // ------------------------------------------------------------------

    fn parse_fixed(
        &self,
        text: &str,
        system: &CalendarSystem,
        def: &CalendarDefinition,
    ) -> Result<CalendarDate> {
        let trimmed = self.strip_suffix(text.trim(), def);

        if let Some(caps) = DAY_MONTH_YEAR.captures(trimmed) {
            let day: u32 = caps["day"].parse().unwrap_or(0);
            let month = def.month_index(&caps["month"]).ok_or_else(|| {
                CalendarError::UnknownMonth {
                    month: caps["month"].to_string(),
                    names: def.month_list(),
                    input: text.to_string(),
                }
            })?;
            let year = self.checked_year(&caps["year"], text)?;
            return self.checked_date(year, month, day, text, def);
        }

        if let Some(caps) = MONTH_DAY_YEAR.captures(trimmed) {
            let month = def.month_index(&caps["month"]).ok_or_else(|| {
                CalendarError::UnknownMonth {
                    month: caps["month"].to_string(),
                    names: def.month_list(),
                    input: text.to_string(),
                }
            })?;
            let day: u32 = caps["day"].parse().unwrap_or(0);
            let year = self.checked_year(&caps["year"], text)?;
            return self.checked_date(year, month, day, text, def);
        }

        if let Some(caps) = SLASH_DATE.captures(trimmed) {
            let day: u32 = caps["day"].parse().unwrap_or(0);
            let month: u32 = caps["month"].parse().unwrap_or(0);
            let year = self.checked_year(&caps["year"], text)?;
            if month < 1 || month > def.month_names.len() as u32 {
                return Err(CalendarError::MonthOutOfRange {
                    month,
                    max: def.month_names.len() as u32,
                    input: text.to_string(),
                });
            }
            return self.checked_date(year, month, day, text, def);
        }

        Err(self.invalid_format(text, system, def))
    }

    fn checked_date(
        &self,
        year: i32,
        month: u32,
        day: u32,
        input: &str,
        def: &CalendarDefinition,
    ) -> Result<CalendarDate> {
        if day < 1 || day > def.days_per_month {
            return Err(CalendarError::DayOutOfRange {
                day,
                max: def.days_per_month,
                input: input.to_string(),
            });
        }
        Ok(CalendarDate::new(year, month, day))
    }

    /// A numeric year that does not fit in `i32` is rejected, not clamped.
    fn checked_year(&self, raw: &str, input: &str) -> Result<i32> {
        raw.parse().map_err(|_| CalendarError::YearOutOfRange {
            year: raw.to_string(),
            input: input.to_string(),
        })
    }

    fn invalid_format(
        &self,
        input: &str,
        system: &CalendarSystem,
        def: &CalendarDefinition,
    ) -> CalendarError {
        let suffix = if def.epoch_suffix.is_empty() {
            String::new()
        } else {
            format!(" [{}]", def.epoch_suffix)
        };
        CalendarError::InvalidFormat {
            input: input.to_string(),
            system: system.to_string(),
            formats: format!("\"D Month Y{}\", \"Month D, Y\", \"D/M/Y\"", suffix),
            months: def.month_list(),
        }
    }

    /// Drop a trailing epoch suffix ("A.G.", with or without dots) if present.
    fn strip_suffix<'a>(&self, text: &'a str, def: &CalendarDefinition) -> &'a str {
        if def.epoch_suffix.is_empty() {
            return text;
        }
        let bare: String = def
            .epoch_suffix
            .chars()
            .filter(|c| *c != '.')
            .collect::<String>()
            .to_ascii_lowercase();
        let lower = text.to_ascii_lowercase();
        for candidate in [def.epoch_suffix.to_ascii_lowercase(), bare] {
            if candidate.is_empty() {
                continue;
            }
            if let Some(stem) = lower.strip_suffix(&candidate) {
                if stem.ends_with(' ') {
                    return text[..stem.len()].trim_end();
                }
            }
        }
        text
    }

    fn render_fixed(&self, date: &CalendarDate, def: &CalendarDefinition) -> String {
        let month_name = def
            .month_names
            .get(date.month.saturating_sub(1) as usize)
            .map(String::as_str)
            .unwrap_or("?");
        if def.epoch_suffix.is_empty() {
            format!("{} {} {}", date.day, month_name, date.year)
        } else {
            format!("{} {} {} {}", date.day, month_name, date.year, def.epoch_suffix)
        }
    }

    /// Offset from the epoch as a single integer. All fixed-calendar
    /// arithmetic goes through this conversion.
    fn to_linear(&self, date: &CalendarDate, def: &CalendarDefinition) -> i64 {
        let dpm = def.days_per_month as i64;
        date.year as i64 * def.days_per_year()
            + (date.month as i64 - 1) * dpm
            + (date.day as i64 - 1)
    }

    fn from_linear(&self, linear: i64, def: &CalendarDefinition) -> CalendarDate {
        let dpy = def.days_per_year();
        let dpm = def.days_per_month as i64;
        let year = linear.div_euclid(dpy);
        let within_year = linear.rem_euclid(dpy);
        CalendarDate::new(
            year as i32,
            (within_year / dpm + 1) as u32,
            (within_year % dpm + 1) as u32,
        )
    }

    fn add_days_fixed(
        &self,
        text: &str,
        days: i64,
        system: &CalendarSystem,
        def: &CalendarDefinition,
    ) -> Result<String> {
        let date = self.parse_fixed(text, system, def)?;
        let shifted = self.from_linear(self.to_linear(&date, def) + days, def);
        Ok(self.render_fixed(&shifted, def))
    }

    fn days_between_fixed(
        &self,
        a: &str,
        b: &str,
        system: &CalendarSystem,
        def: &CalendarDefinition,
    ) -> Result<i64> {
        let first = self.to_linear(&self.parse_fixed(a, system, def)?, def);
        let second = self.to_linear(&self.parse_fixed(b, system, def)?, def);
        Ok((second - first).abs())
    }

    fn weekday_fixed(
        &self,
        text: &str,
        system: &CalendarSystem,
        def: &CalendarDefinition,
    ) -> Result<Option<String>> {
        if def.weekday_names.is_empty() {
            return Ok(None);
        }
        let date = self.parse_fixed(text, system, def)?;
        let index = self
            .to_linear(&date, def)
            .rem_euclid(def.weekday_names.len() as i64) as usize;
        Ok(Some(def.weekday_names[index].clone()))
    }

    // ------------------------------------------------------------------
    // Standard-calendar internals
    // ------------------------------------------------------------------

    fn parse_standard(&self, text: &str) -> Result<CalendarDate> {
        let trimmed = text.trim();
        for fmt in STANDARD_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
                return Ok(CalendarDate::new(date.year(), date.month(), date.day()));
            }
        }
        Err(CalendarError::InvalidFormat {
            input: text.to_string(),
            system: "standard".to_string(),
            formats: STANDARD_FORMAT_LIST.to_string(),
            months: "January through December".to_string(),
        })
    }

    fn to_naive(
        &self,
        date: &CalendarDate,
        input: &str,
        system: &CalendarSystem,
    ) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(date.year, date.month, date.day).ok_or_else(|| {
            CalendarError::InvalidFormat {
                input: input.to_string(),
                system: system.to_string(),
                formats: STANDARD_FORMAT_LIST.to_string(),
                months: "January through December".to_string(),
            }
        })
    }

    fn render_standard(&self, date: &CalendarDate) -> String {
        match NaiveDate::from_ymd_opt(date.year, date.month, date.day) {
            Some(naive) => self.render_naive(&naive),
            None => format!("{}/{}/{}", date.day, date.month, date.year),
        }
    }

    fn render_naive(&self, date: &NaiveDate) -> String {
        format!("{} {}, {}", date.format("%B"), date.day(), date.year())
    }
}

// ============================================================================
// Tests
// ============================================================================
