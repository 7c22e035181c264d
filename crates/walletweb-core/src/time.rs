//! Date range control for filtering transactions

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use walletweb_config::DateRange;

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;

/// Today's date on the local clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Selected date range plus the explicit bounds a custom range needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeContext {
    /// Current time range
    pub range: DateRange,
    /// Custom start date (when range is Custom)
    pub custom_start: Option<NaiveDate>,
    /// Custom end date (when range is Custom)
    pub custom_end: Option<NaiveDate>,
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::new(DateRange::All)
    }
}

impl TimeContext {
    /// Create a new time context
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            custom_start: None,
            custom_end: None,
        }
    }

    /// Create with custom date range
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: DateRange::Custom,
            custom_start: Some(start),
            custom_end: Some(end),
        }
    }

    /// A custom range needs both bounds, in order
    pub fn validate(&self) -> CoreResult<()> {
        if self.range != DateRange::Custom {
            return Ok(());
        }
        match (self.custom_start, self.custom_end) {
            (Some(start), Some(end)) if start > end => Err(CoreError::validation(format!(
                "custom range start {} is after end {}",
                start, end
            ))),
            (Some(_), Some(_)) => Ok(()),
            _ => Err(CoreError::validation(
                "custom range requires both a start and an end date",
            )),
        }
    }

    /// Inclusive lower bound for the range, relative to `today`
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self.range {
            DateRange::All => None,
            DateRange::CurrentYear => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            DateRange::LastThreeMonths => Some(months_back(today, 3)),
            DateRange::LastMonth => Some(months_back(today, 1)),
            DateRange::Custom => self.custom_start,
        }
    }

    /// Inclusive upper bound. Only custom ranges have one; future-dated
    /// records pass the preset ranges.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.range {
            DateRange::Custom => self.custom_end,
            _ => None,
        }
    }

    /// Check if a date is within the range
    pub fn contains(&self, date: &NaiveDate, today: NaiveDate) -> bool {
        let start = self.start_date(today);
        let end = self.end_date();

        match (start, end) {
            (None, None) => true,
            (Some(s), None) => *date >= s,
            (None, Some(e)) => *date <= e,
            (Some(s), Some(e)) => *date >= s && *date <= e,
        }
    }

    /// Get a human-readable description of the time range
    pub fn description(&self) -> String {
        match self.range {
            DateRange::Custom => {
                if let (Some(start), Some(end)) = (self.custom_start, self.custom_end) {
                    format!("{} to {}", start, end)
                } else {
                    DateRange::Custom.label().to_string()
                }
            }
            other => other.label().to_string(),
        }
    }
}

/// Calendar-month subtraction; day clamps to the end of shorter months
fn months_back(today: NaiveDate, n: u32) -> NaiveDate {
    today.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN)
}

/// Time filtering trait
pub trait TimeFilter {
    /// Whether the item falls inside the context
    fn filter_by_time(&self, context: &TimeContext, today: NaiveDate) -> bool;
}

impl TimeFilter for Transaction {
    fn filter_by_time(&self, context: &TimeContext, today: NaiveDate) -> bool {
        context.contains(&self.date, today)
    }
}

/// Subset of `transactions` inside the range, in input order.
///
/// An incomplete custom range is a validation error rather than a silent
/// pass-through.
pub fn filter_by_date_range(
    transactions: &[Transaction],
    context: &TimeContext,
    today: NaiveDate,
) -> CoreResult<Vec<Transaction>> {
    context.validate()?;

    if context.range == DateRange::All {
        return Ok(transactions.to_vec());
    }

    Ok(transactions
        .iter()
        .filter(|t| t.filter_by_time(context, today))
        .cloned()
        .collect())
}
