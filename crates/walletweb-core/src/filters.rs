//! Criteria filter shared by the list, charts, summary and export views

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use walletweb_config::DateRange;

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::time::{TimeContext, TimeFilter};
use crate::types::{TransactionStatus, TransactionType};

/// Selection criteria over the transaction store.
///
/// Empty `categories`, `types` and `statuses` mean "any". Amount bounds are
/// inclusive and compare against the non-negative magnitude.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFilter {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub types: Vec<TransactionType>,
    #[serde(default)]
    pub statuses: Vec<TransactionStatus>,
    /// Date range plus custom bounds
    #[serde(flatten)]
    pub time: TimeContext,
    #[serde(default)]
    pub amount_min: Option<Decimal>,
    #[serde(default)]
    pub amount_max: Option<Decimal>,
    /// Free-text search; blank matches everything
    #[serde(default)]
    pub search: String,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.time = TimeContext::new(range);
        self
    }

    pub fn with_custom_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.time = TimeContext::custom(start, end);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_types(mut self, types: impl IntoIterator<Item = TransactionType>) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = TransactionStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_amount_range(mut self, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        self.amount_min = min;
        self.amount_max = max;
        self
    }

    /// Reject contradictory criteria
    pub fn validate(&self) -> CoreResult<()> {
        self.time.validate()?;
        if let (Some(min), Some(max)) = (self.amount_min, self.amount_max) {
            if min > max {
                return Err(CoreError::validation(format!(
                    "minimum amount {} is greater than maximum amount {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Number of criteria narrowing the selection, for the filter badge
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        if !self.categories.is_empty() {
            count += 1;
        }
        if !self.types.is_empty() {
            count += 1;
        }
        if !self.statuses.is_empty() {
            count += 1;
        }
        if self.time.range != DateRange::All {
            count += 1;
        }
        if self.amount_min.is_some() || self.amount_max.is_some() {
            count += 1;
        }
        if !self.search.trim().is_empty() {
            count += 1;
        }
        count
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }

    /// Whether a single transaction satisfies every criterion
    pub fn matches(&self, tx: &Transaction, today: NaiveDate) -> bool {
        let needle = self.search.trim().to_lowercase();
        self.matches_with(tx, today, &needle)
    }

    fn matches_with(&self, tx: &Transaction, today: NaiveDate, needle: &str) -> bool {
        if !self.types.is_empty() && !self.types.contains(&tx.kind) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&tx.status) {
            return false;
        }
        if !self.categories.is_empty()
            && !self
                .categories
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(tx.category.trim()))
        {
            return false;
        }
        if let Some(min) = self.amount_min {
            if tx.amount() < min {
                return false;
            }
        }
        if let Some(max) = self.amount_max {
            if tx.amount() > max {
                return false;
            }
        }
        tx.filter_by_time(&self.time, today) && tx.matches_search(needle)
    }

    /// Matching subset in input order
    pub fn apply(&self, transactions: &[Transaction], today: NaiveDate) -> CoreResult<Vec<Transaction>> {
        self.validate()?;
        let needle = self.search.trim().to_lowercase();
        Ok(transactions
            .iter()
            .filter(|t| self.matches_with(t, today, &needle))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Transaction> {
        vec![
            Transaction::new("1", TransactionType::Income, Decimal::from(3000), date(2024, 5, 1))
                .unwrap()
                .with_description("Salary")
                .with_category("Income"),
            Transaction::new("2", TransactionType::Expense, Decimal::from(120), date(2024, 5, 3))
                .unwrap()
                .with_description("Weekly groceries")
                .with_category("Food")
                .with_tags(["household"]),
            Transaction::new("3", TransactionType::Expense, Decimal::from(45), date(2023, 11, 20))
                .unwrap()
                .with_description("Cinema")
                .with_category("Entertainment")
                .with_status(TransactionStatus::Pending),
            Transaction::new("4", TransactionType::Transfer, Decimal::from(500), date(2024, 5, 10))
                .unwrap()
                .with_description("To savings")
                .with_category("Transfer"),
        ]
    }

    fn ids(list: &[Transaction]) -> Vec<&str> {
        list.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let data = sample();
        let out = TransactionFilter::new().apply(&data, date(2024, 6, 1)).unwrap();
        assert_eq!(out, data);
        assert!(!TransactionFilter::new().is_active());
    }

    #[test]
    fn test_type_and_status() {
        let data = sample();
        let filter = TransactionFilter::new().with_types([TransactionType::Expense]);
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["2", "3"]);

        let filter = filter.with_statuses([TransactionStatus::Pending]);
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["3"]);
        assert_eq!(filter.active_count(), 2);
    }

    #[test]
    fn test_category_case_insensitive() {
        let data = sample();
        let filter = TransactionFilter::new().with_categories(["food", "ENTERTAINMENT"]);
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["2", "3"]);
    }

    #[test]
    fn test_amount_bounds_inclusive() {
        let data = sample();
        let filter = TransactionFilter::new().with_amount_range(Some(Decimal::from(120)), Some(Decimal::from(500)));
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["2", "4"]);
    }

    #[test]
    fn test_amount_bounds_reversed() {
        let filter = TransactionFilter::new().with_amount_range(Some(Decimal::from(10)), Some(Decimal::from(5)));
        let err = filter.apply(&sample(), date(2024, 6, 1)).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_search_covers_tags_and_description() {
        let data = sample();
        let filter = TransactionFilter::new().with_search("  HOUSE ");
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["2"]);
        let filter = TransactionFilter::new().with_search("sav");
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["4"]);
    }

    #[test]
    fn test_date_range_combined() {
        let data = sample();
        let filter = TransactionFilter::new()
            .with_range(DateRange::CurrentYear)
            .with_types([TransactionType::Expense]);
        assert_eq!(ids(&filter.apply(&data, date(2024, 6, 1)).unwrap()), vec!["2"]);
    }

    #[test]
    fn test_deserialize_flattened_time() {
        let json = r#"{"types":["expense"],"range":"custom","custom_start":"2024-01-01","custom_end":"2024-12-31"}"#;
        let filter: TransactionFilter = serde_json::from_str(json).unwrap();
        assert_eq!(filter.time.range, DateRange::Custom);
        assert_eq!(filter.time.custom_end, Some(date(2024, 12, 31)));
        assert!(filter.search.is_empty());
    }
}
