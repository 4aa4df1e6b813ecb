//! Calendar month addressing for the store tree.

use std::fmt;

use chrono::{Datelike, NaiveDate};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, addressed the way the store keys it.
///
/// Store keys are the unpadded decimal forms, so May 2025 lives under
/// `energy_data/2025/5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// Month number, `1..=12`.
    pub month: u32,
}

impl YearMonth {
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The month before this one; January rolls back to December of the previous year.
    pub fn previous(self) -> Self {
        if self.month <= 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The month after this one; December rolls over to January of the next year.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// Key of the year node, e.g. `"2025"`.
    pub fn year_key(&self) -> String {
        self.year.to_string()
    }

    /// Key of the month node, e.g. `"5"`.
    pub fn month_key(&self) -> String {
        self.month.to_string()
    }

    /// Short English month name (`"Jan"`..`"Dec"`), or `"?"` for an out-of-range month.
    pub fn label(&self) -> &'static str {
        month_label(self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.year)
    }
}

/// Short English name for month number `month` (`1..=12`).
fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_LABELS.get(i as usize))
        .copied()
        .unwrap_or("?")
}
