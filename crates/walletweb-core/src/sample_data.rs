//! Built-in demo dataset, used when no dataset file exists

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::models::Transaction;
use crate::types::TransactionType::{Expense, Income, Transfer};
use crate::types::{TransactionStatus, TransactionType};

struct Row {
    days_ago: u64,
    kind: TransactionType,
    cents: i64,
    description: &'static str,
    category: &'static str,
    account: &'static str,
    tags: &'static [&'static str],
    auto: bool,
    status: TransactionStatus,
}

const fn row(
    days_ago: u64,
    kind: TransactionType,
    cents: i64,
    description: &'static str,
    category: &'static str,
    account: &'static str,
    tags: &'static [&'static str],
) -> Row {
    Row {
        days_ago,
        kind,
        cents,
        description,
        category,
        account,
        tags,
        auto: true,
        status: TransactionStatus::Completed,
    }
}

const ROWS: &[Row] = &[
    row(2, Expense, 8_45, "Morning coffee", "Food & Dining", "Credit Card", &["coffee"]),
    row(3, Expense, 126_30, "Weekly groceries", "Groceries", "Credit Card", &["household", "weekly"]),
    Row { status: TransactionStatus::Pending, ..row(4, Expense, 64_99, "Online order", "Shopping", "Credit Card", &["online"]) },
    row(6, Transfer, 500_00, "Move to savings", "Transfer", "Savings", &[]),
    row(9, Expense, 90_25, "Electricity bill", "Utilities", "Checking", &["bills"]),
    row(12, Expense, 45_50, "Dinner with friends", "Food & Dining", "Credit Card", &["social"]),
    row(15, Income, 5_000_00, "Monthly salary", "Salary", "Checking", &["payroll"]),
    row(16, Expense, 1_800_00, "Rent", "Housing", "Checking", &["bills", "monthly"]),
    Row { auto: false, ..row(20, Expense, 120_00, "Concert tickets", "Entertainment", "Credit Card", &["music"]) },
    row(27, Expense, 58_40, "Fuel", "Transportation", "Credit Card", &["car"]),
    row(34, Income, 650_00, "Freelance design work", "Freelance", "Checking", &["side-project"]),
    row(38, Expense, 131_75, "Weekly groceries", "Groceries", "Credit Card", &["household", "weekly"]),
    Row { status: TransactionStatus::Cancelled, ..row(41, Expense, 299_00, "Gym annual plan", "Health", "Credit Card", &[]) },
    row(45, Income, 5_000_00, "Monthly salary", "Salary", "Checking", &["payroll"]),
    row(46, Expense, 1_800_00, "Rent", "Housing", "Checking", &["bills", "monthly"]),
    row(52, Expense, 72_10, "Internet and phone", "Utilities", "Checking", &["bills"]),
    row(60, Expense, 240_00, "Car service", "Transportation", "Checking", &["car"]),
    row(75, Income, 5_000_00, "Monthly salary", "Salary", "Checking", &["payroll"]),
    row(76, Expense, 1_800_00, "Rent", "Housing", "Checking", &["bills", "monthly"]),
    row(88, Expense, 410_00, "Weekend trip", "Travel", "Credit Card", &["vacation"]),
    row(105, Income, 5_000_00, "Monthly salary", "Salary", "Checking", &["payroll"]),
    row(106, Expense, 1_800_00, "Rent", "Housing", "Checking", &["bills", "monthly"]),
    row(130, Income, 42_18, "Interest", "Interest", "Savings", &[]),
    row(200, Expense, 980_00, "New laptop", "Shopping", "Credit Card", &["work"]),
    row(400, Income, 1_200_00, "Tax refund", "Refunds", "Checking", &[]),
];

/// Demo transactions dated relative to `today`, newest first
pub fn sample_transactions(today: NaiveDate) -> CoreResult<Vec<Transaction>> {
    ROWS.iter()
        .enumerate()
        .map(|(i, r)| {
            let date = today.checked_sub_days(Days::new(r.days_ago)).unwrap_or(today);
            Ok(Transaction::new(format!("demo-{:03}", i + 1), r.kind, Decimal::new(r.cents, 2), date)?
                .with_description(r.description)
                .with_category(r.category)
                .with_account(r.account)
                .with_tags(r.tags.iter().copied())
                .with_status(r.status)
                .auto_categorized(r.auto))
        })
        .collect()
}
