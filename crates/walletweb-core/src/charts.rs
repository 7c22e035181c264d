//! Chart breakdowns derived from live transaction data

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::Transaction;
use crate::types::TransactionType;

const PALETTE: [&str; 10] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF",
    "#FF9F40", "#7BC225", "#C9CBCF", "#E7E9ED", "#8E5EA2",
];

const UNCATEGORIZED: &str = "Uncategorized";

/// Per-category share of one transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub amount: Decimal,
    pub count: usize,
    /// Share of the type total, 0-100
    pub percentage: f64,
}

/// Income and expense for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub count: usize,
}

/// Chart data point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub label: String,
    pub value: f64,
    pub color: Option<String>,
}

/// Chart data for visualization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub chart_type: String,
    pub title: String,
    pub data_points: Vec<ChartDataPoint>,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub currency: String,
}

/// Chart dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Option<String>,
    pub border_color: Option<String>,
}

/// Colour for the n-th series entry
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

fn percent_of(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (part / total * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

/// Amount per category for transactions of `kind`, largest first
pub fn category_breakdown(transactions: &[Transaction], kind: TransactionType) -> Vec<CategoryBreakdown> {
    let mut buckets: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    let mut total = Decimal::ZERO;

    for tx in transactions.iter().filter(|t| t.kind == kind) {
        let category = match tx.category.trim() {
            "" => UNCATEGORIZED,
            c => c,
        };
        let entry = buckets.entry(category).or_insert((Decimal::ZERO, 0));
        entry.0 += tx.amount();
        entry.1 += 1;
        total += tx.amount();
    }

    let mut breakdowns: Vec<CategoryBreakdown> = buckets
        .into_iter()
        .map(|(category, (amount, count))| CategoryBreakdown {
            category: category.to_string(),
            amount,
            count,
            percentage: percent_of(amount, total),
        })
        .collect();

    // BTreeMap order keeps ties alphabetical
    breakdowns.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdowns
}

/// Income, expense and net per calendar month, oldest first
pub fn monthly_series(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<String, MonthlySummary> = BTreeMap::new();

    for tx in transactions {
        let key = tx.date.format("%Y-%m").to_string();
        let entry = months.entry(key.clone()).or_insert_with(|| MonthlySummary {
            month: key,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            net: Decimal::ZERO,
            count: 0,
        });
        match tx.kind {
            TransactionType::Income => entry.income += tx.amount(),
            TransactionType::Expense => entry.expense += tx.amount(),
            TransactionType::Transfer => {}
        }
        entry.count += 1;
    }

    months
        .into_values()
        .map(|mut m| {
            m.net = m.income - m.expense;
            m
        })
        .collect()
}

/// Pie chart of the top `top_n` categories for `kind`; the rest fold into "Other"
pub fn category_chart(
    transactions: &[Transaction],
    kind: TransactionType,
    top_n: usize,
    currency: &str,
) -> ChartData {
    let breakdowns = category_breakdown(transactions, kind);
    let top_n = top_n.max(1);

    let mut data_points: Vec<ChartDataPoint> = breakdowns
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, b)| ChartDataPoint {
            label: b.category.clone(),
            value: b.amount.to_f64().unwrap_or(0.0),
            color: Some(palette_color(i).to_string()),
        })
        .collect();

    if breakdowns.len() > top_n {
        let rest: Decimal = breakdowns[top_n..].iter().map(|b| b.amount).sum();
        data_points.push(ChartDataPoint {
            label: "Other".to_string(),
            value: rest.to_f64().unwrap_or(0.0),
            color: Some(palette_color(top_n).to_string()),
        });
    }

    let labels: Vec<String> = data_points.iter().map(|dp| dp.label.clone()).collect();
    let values: Vec<f64> = data_points.iter().map(|dp| dp.value).collect();
    let title = format!("{} by Category", kind.label());

    ChartData {
        chart_type: "pie".to_string(),
        title,
        datasets: vec![ChartDataset {
            label: kind.label().to_string(),
            data: values,
            background_color: Some(palette_color(0).to_string()),
            border_color: Some(palette_color(0).to_string()),
        }],
        data_points,
        labels,
        currency: currency.to_string(),
    }
}

/// Bar chart of monthly income against expense
pub fn monthly_chart(transactions: &[Transaction], currency: &str) -> ChartData {
    let series = monthly_series(transactions);
    let labels: Vec<String> = series.iter().map(|m| m.month.clone()).collect();
    let income: Vec<f64> = series.iter().map(|m| m.income.to_f64().unwrap_or(0.0)).collect();
    let expense: Vec<f64> = series.iter().map(|m| m.expense.to_f64().unwrap_or(0.0)).collect();

    let data_points = series
        .iter()
        .map(|m| ChartDataPoint {
            label: m.month.clone(),
            value: m.net.to_f64().unwrap_or(0.0),
            color: None,
        })
        .collect();

    ChartData {
        chart_type: "bar".to_string(),
        title: "Monthly Cash Flow".to_string(),
        data_points,
        labels,
        datasets: vec![
            ChartDataset {
                label: "Income".to_string(),
                data: income,
                background_color: Some("#4BC0C0".to_string()),
                border_color: Some("#4BC0C0".to_string()),
            },
            ChartDataset {
                label: "Expenses".to_string(),
                data: expense,
                background_color: Some("#FF6384".to_string()),
                border_color: Some("#FF6384".to_string()),
            },
        ],
        currency: currency.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(id: &str, kind: TransactionType, amount: i64, ymd: (i32, u32, u32), category: &str) -> Transaction {
        let date = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap();
        Transaction::new(id, kind, Decimal::from(amount), date)
            .unwrap()
            .with_category(category)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("1", TransactionType::Expense, 30, (2024, 1, 3), "Food"),
            tx("2", TransactionType::Expense, 50, (2024, 1, 9), "Rent"),
            tx("3", TransactionType::Expense, 20, (2024, 2, 1), "Food"),
            tx("4", TransactionType::Income, 200, (2024, 2, 15), "Salary"),
            tx("5", TransactionType::Transfer, 75, (2024, 2, 20), "Transfer"),
            tx("6", TransactionType::Expense, 0, (2024, 3, 1), ""),
        ]
    }

    #[test]
    fn test_category_breakdown() {
        let breakdown = category_breakdown(&sample(), TransactionType::Expense);
        let names: Vec<&str> = breakdown.iter().map(|b| b.category.as_str()).collect();
        // Food and Rent tie at 50; alphabetical among equals
        assert_eq!(names, vec!["Food", "Rent", "Uncategorized"]);
        assert_eq!(breakdown[0].count, 2);
        assert_eq!(breakdown[0].percentage, 50.0);
        let total: f64 = breakdown.iter().map(|b| b.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_breakdown_zero_total() {
        let data = vec![tx("1", TransactionType::Income, 0, (2024, 1, 1), "Gift")];
        let breakdown = category_breakdown(&data, TransactionType::Income);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].percentage, 0.0);
        assert!(category_breakdown(&[], TransactionType::Expense).is_empty());
    }

    #[test]
    fn test_monthly_series() {
        let series = monthly_series(&sample());
        let months: Vec<&str> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(series[1].income, Decimal::from(200));
        assert_eq!(series[1].expense, Decimal::from(20));
        assert_eq!(series[1].net, Decimal::from(180));
        assert_eq!(series[1].count, 3);
    }

    #[test]
    fn test_category_chart_folds_other() {
        let chart = category_chart(&sample(), TransactionType::Expense, 1, "USD");
        assert_eq!(chart.labels, vec!["Food", "Other"]);
        assert_eq!(chart.datasets[0].data, vec![50.0, 50.0]);
        assert_eq!(chart.title, "Expense by Category");
    }

    #[test]
    fn test_monthly_chart() {
        let chart = monthly_chart(&sample(), "USD");
        assert_eq!(chart.chart_type, "bar");
        assert_eq!(chart.datasets.len(), 2);
        assert_eq!(chart.datasets[0].data, vec![0.0, 200.0, 0.0]);
    }
}
