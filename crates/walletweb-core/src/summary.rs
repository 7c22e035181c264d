//! Aggregate totals over a transaction selection

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Transaction;
use crate::types::TransactionType;

/// Totals and counts for a selection. Transfers are counted but never enter
/// the income, expense or net figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_count: usize,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    /// `total_income - total_expense`
    pub net_flow: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    pub transfer_count: usize,
    /// Distinct category values
    pub category_count: usize,
    /// Earliest and latest date; `None` when there is no data
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Share of income kept, as a percentage. `None` without income.
    pub fn savings_rate(&self) -> Option<f64> {
        if self.total_income.is_zero() {
            return None;
        }
        (self.net_flow / self.total_income * Decimal::ONE_HUNDRED).to_f64()
    }

    /// Mean expense amount. `None` without expenses.
    pub fn average_expense(&self) -> Option<Decimal> {
        if self.expense_count == 0 {
            return None;
        }
        Some(self.total_expense / Decimal::from(self.expense_count))
    }

    /// `"2024-01-01 to 2024-03-31"` style label, or "No data"
    pub fn period_label(&self) -> String {
        match self.date_bounds {
            Some((start, end)) if start == end => start.to_string(),
            Some((start, end)) => format!("{} to {}", start, end),
            None => "No data".to_string(),
        }
    }
}

/// Compute the summary for `transactions`
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();
    let mut categories: HashSet<&str> = HashSet::new();

    for tx in transactions {
        summary.total_count += 1;
        match tx.kind {
            TransactionType::Income => {
                summary.income_count += 1;
                summary.total_income += tx.amount();
            }
            TransactionType::Expense => {
                summary.expense_count += 1;
                summary.total_expense += tx.amount();
            }
            TransactionType::Transfer => summary.transfer_count += 1,
        }
        categories.insert(tx.category.as_str());

        summary.date_bounds = Some(match summary.date_bounds {
            None => (tx.date, tx.date),
            Some((min, max)) => (min.min(tx.date), max.max(tx.date)),
        });
    }

    summary.net_flow = summary.total_income - summary.total_expense;
    summary.category_count = categories.len();
    summary
}
