//! # Report Types
//!
//! Values produced by the reporting queries, plus the month arithmetic they
//! are keyed by. The queries themselves live in `cantina-db`.
//!
//! ## Report Periods
//! ```text
//! ReportMonth "2024-03"
//!      │
//!      ├── start_bound() = "2024-03-01"   (inclusive)
//!      └── end_bound()   = "2024-04-01"   (exclusive)
//!
//! SQL: sold_at >= start AND sold_at < end
//! ```
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text, so the half-open
//! range compares correctly as strings and can use the `sold_at` index.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Category;

// =============================================================================
// Report Month
// =============================================================================

/// A calendar month, written `YYYY-MM`.
///
/// ## Example
/// ```rust
/// use cantina_core::ReportMonth;
///
/// let month: ReportMonth = "2024-12".parse().unwrap();
/// assert_eq!(month.next().to_string(), "2025-01");
/// assert_eq!(month.end_bound(), "2025-01-01");
/// assert!("2024-13".parse::<ReportMonth>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportMonth {
    year: i32,
    month: u32,
}

impl ReportMonth {
    /// Earliest representable month.
    pub const MIN: ReportMonth = ReportMonth { year: 1, month: 1 };
    /// Latest representable month. Its `end_bound` is still a four-digit
    /// year, so text comparison on `sold_at` stays ordered.
    pub const MAX: ReportMonth = ReportMonth {
        year: 9998,
        month: 12,
    };

    /// Returns `None` unless `1 <= month <= 12` and `1 <= year <= 9998`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (Self::MIN.year..=Self::MAX.year).contains(&year) && (1..=12).contains(&month) {
            Some(ReportMonth { year, month })
        } else {
            None
        }
    }

    /// The month a date falls in, clamped to `MIN..=MAX`.
    pub fn of(date: NaiveDate) -> Self {
        let month = ReportMonth {
            year: date.year(),
            month: date.month(),
        };
        month.clamp(Self::MIN, Self::MAX)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month. Saturates at `MAX`.
    pub fn next(&self) -> Self {
        if *self >= Self::MAX {
            Self::MAX
        } else if self.month == 12 {
            ReportMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            ReportMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding calendar month. Saturates at `MIN`.
    pub fn previous(&self) -> Self {
        if *self <= Self::MIN {
            Self::MIN
        } else if self.month == 1 {
            ReportMonth {
                year: self.year - 1,
                month: 12,
            }
        } else {
            ReportMonth {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Inclusive lower bound for `sold_at`, `YYYY-MM-01`.
    pub fn start_bound(&self) -> String {
        format!("{:04}-{:02}-01", self.year, self.month)
    }

    /// Exclusive upper bound for `sold_at`, the first day of the next month.
    pub fn end_bound(&self) -> String {
        if *self == Self::MAX {
            return format!("{:04}-01-01", self.year + 1);
        }
        self.next().start_bound()
    }
}

impl fmt::Display for ReportMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReportMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: "expected YYYY-MM".to_string(),
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        ReportMonth::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ReportMonth {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportMonth> for String {
    fn from(month: ReportMonth) -> Self {
        month.to_string()
    }
}

// =============================================================================
// Report Rows
// =============================================================================

/// Total sold on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DayTotal {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub total_cents: i64,
}

impl DayTotal {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One entry of the best-sellers list. Keyed by product *name*, so two
/// products sharing a name are counted together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ProductRanking {
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Units and revenue for one category in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CategorySales {
    pub category: Category,
    pub quantity: i64,
    pub revenue_cents: i64,
}

impl CategorySales {
    pub fn revenue(&self) -> Money {
        Money::from_cents(self.revenue_cents)
    }
}

/// Sale count and total for one day of the daily breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DailySales {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub sale_count: i64,
    pub total_cents: i64,
}

impl DailySales {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// `total / count` rounded to the cent, zero on a day without sales.
    pub fn average_ticket(&self) -> Money {
        self.total().split_evenly(self.sale_count)
    }

    /// Unrounded average ticket in whole currency units.
    pub fn average_ticket_raw(&self) -> f64 {
        self.total().split_evenly_raw(self.sale_count)
    }
}

/// Headline numbers for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyOverview {
    #[ts(as = "String")]
    pub month: ReportMonth,
    pub total_cents: i64,
    pub sale_count: i64,
}

impl MonthlyOverview {
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// `total / count` rounded to the cent, zero for a month without sales.
    pub fn average_ticket(&self) -> Money {
        self.total().split_evenly(self.sale_count)
    }
}

/// A month's total against the month before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthComparison {
    #[ts(as = "String")]
    pub month: ReportMonth,
    pub current_cents: i64,
    pub previous_cents: i64,
}

impl MonthComparison {
    /// `current - previous`.
    pub fn difference(&self) -> Money {
        Money::from_cents(self.current_cents - self.previous_cents)
    }

    /// Change relative to the previous month, in percent. Zero when the
    /// previous month sold nothing.
    pub fn percent_change(&self) -> f64 {
        if self.previous_cents == 0 {
            return 0.0;
        }
        (self.current_cents - self.previous_cents) as f64 / self.previous_cents as f64 * 100.0
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
