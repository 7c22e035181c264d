//! Core data models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use walletweb_config::CurrencyConfig;
use walletweb_parser::SpannedRecord;

use crate::error::{CoreError, CoreResult};
use crate::format::format_money;
use crate::types::{TransactionStatus, TransactionType};

/// Transaction information.
///
/// `amount` is always a non-negative magnitude; direction comes from `kind`.
/// The field is private so every instance goes through [`Transaction::new`]
/// (deserialization included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransactionData")]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: String,
    /// Income, expense or transfer
    #[serde(rename = "type")]
    pub kind: TransactionType,
    amount: Decimal,
    /// Calendar date
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    pub account: String,
    /// Ordered labels
    pub tags: Vec<String>,
    /// Category was assigned by a rule rather than the user
    pub is_auto_categorized: bool,
    pub status: TransactionStatus,
}

/// Unvalidated mirror of [`Transaction`] used for deserialization
#[derive(Deserialize)]
struct TransactionData {
    id: String,
    #[serde(rename = "type")]
    kind: TransactionType,
    amount: Decimal,
    date: NaiveDate,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    account: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    is_auto_categorized: bool,
    #[serde(default)]
    status: TransactionStatus,
}

impl TryFrom<TransactionData> for Transaction {
    type Error = CoreError;

    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        let mut tx = Transaction::new(data.id, data.kind, data.amount, data.date)?;
        tx.description = data.description;
        tx.category = data.category;
        tx.account = data.account;
        tx.tags = data.tags;
        tx.is_auto_categorized = data.is_auto_categorized;
        tx.status = data.status;
        Ok(tx)
    }
}

impl Transaction {
    /// Create a transaction, rejecting negative amounts and blank ids
    pub fn new(
        id: impl Into<String>,
        kind: TransactionType,
        amount: Decimal,
        date: NaiveDate,
    ) -> CoreResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::validation("transaction id must not be empty"));
        }
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::validation(format!(
                "amount must be non-negative (got {}); direction comes from the type",
                amount
            )));
        }

        Ok(Self {
            id,
            kind,
            amount: amount.abs(),
            date,
            description: String::new(),
            category: String::new(),
            account: String::new(),
            tags: Vec::new(),
            is_auto_categorized: false,
            status: TransactionStatus::Completed,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn auto_categorized(mut self, flag: bool) -> Self {
        self.is_auto_categorized = flag;
        self
    }

    /// Build from a parsed dataset record; `fallback_id` is used when the
    /// record carries none
    pub fn from_record(record: &SpannedRecord, fallback_id: impl Into<String>) -> CoreResult<Self> {
        let raw = &record.data;
        let at = |message: String| CoreError::ParseError {
            message: format!("{}: {}", record.location(), message),
        };

        let kind = TransactionType::from_str(&raw.kind).map_err(at)?;
        let status = TransactionStatus::from_str(&raw.status).map_err(at)?;
        let id = match raw.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => fallback_id.into(),
        };

        let tx = Transaction::new(id, kind, raw.amount, record.date).map_err(|e| at(e.to_string()))?;
        Ok(tx
            .with_description(raw.description.trim())
            .with_category(raw.category.trim())
            .with_account(raw.account.trim())
            .with_tags(raw.tags.iter().cloned())
            .with_status(status)
            .auto_categorized(raw.is_auto_categorized))
    }

    /// Non-negative magnitude
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Amount with direction applied: positive income, negative expense,
    /// bare magnitude for transfers
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Expense => -self.amount,
            TransactionType::Income | TransactionType::Transfer => self.amount,
        }
    }

    /// Rendered amount with the type's sign prefix (`+$100.00`, `-$40.00`)
    pub fn display_amount(&self, currency: &CurrencyConfig) -> String {
        format!("{}{}", self.kind.sign_prefix(), format_money(self.amount, currency))
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Case-insensitive substring match over description, category, account
    /// and tags. `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
            || self.account.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }

    /// First `n` tags plus the number left out, for truncated display
    pub fn tags_preview(&self, n: usize) -> (&[String], usize) {
        let shown = n.min(self.tags.len());
        (&self.tags[..shown], self.tags.len() - shown)
    }
}

/// Raw fields of the new-transaction form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub account: String,
    /// Comma separated
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub status: String,
}

impl TransactionDraft {
    /// Validate the form and build a transaction with the given id
    pub fn into_transaction(self, id: impl Into<String>) -> CoreResult<Transaction> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(CoreError::validation("description is required"));
        }

        let amount_text = self.amount.trim().replace(',', "");
        let amount = Decimal::from_str(&amount_text)
            .map_err(|_| CoreError::validation(format!("'{}' is not a valid amount", self.amount.trim())))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::validation("amount must be non-negative; pick expense for money going out"));
        }
        if amount.is_zero() {
            return Err(CoreError::validation("amount must be greater than zero"));
        }

        let date = walletweb_parser::normalize_date(&self.date)
            .ok_or_else(|| CoreError::validation(format!("'{}' is not a valid date (YYYY-MM-DD)", self.date.trim())))?;
        let kind = TransactionType::from_str(&self.kind).map_err(CoreError::validation)?;
        let status = TransactionStatus::from_str(&self.status).map_err(CoreError::validation)?;

        let tags: Vec<String> = self
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let category = match self.category.trim() {
            "" => "Uncategorized",
            c => c,
        };

        Ok(Transaction::new(id, kind, amount, date)?
            .with_description(description)
            .with_category(category)
            .with_account(self.account.trim())
            .with_tags(tags)
            .with_status(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletweb_parser::{DatasetFormat, SimpleDatasetParser};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = Transaction::new("t1", TransactionType::Expense, Decimal::new(-500, 2), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
    }

    #[test]
    fn test_blank_id_rejected() {
        assert!(Transaction::new("  ", TransactionType::Income, Decimal::ONE, date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_signed_amount_follows_type() {
        let amount = Decimal::new(4000, 2);
        let expense = Transaction::new("e", TransactionType::Expense, amount, date(2024, 1, 1)).unwrap();
        let income = Transaction::new("i", TransactionType::Income, amount, date(2024, 1, 1)).unwrap();
        let transfer = Transaction::new("t", TransactionType::Transfer, amount, date(2024, 1, 1)).unwrap();
        assert_eq!(expense.signed_amount(), Decimal::new(-4000, 2));
        assert_eq!(income.signed_amount(), amount);
        assert_eq!(transfer.signed_amount(), amount);
        assert_eq!(expense.amount(), amount);
    }

    #[test]
    fn test_display_amount() {
        let currency = CurrencyConfig::default();
        let tx = Transaction::new("e", TransactionType::Expense, Decimal::new(123456, 2), date(2024, 1, 1)).unwrap();
        assert_eq!(tx.display_amount(&currency), "-$1,234.56");
        let tx = Transaction::new("i", TransactionType::Income, Decimal::from(100), date(2024, 1, 1)).unwrap();
        assert_eq!(tx.display_amount(&currency), "+$100.00");
    }

    #[test]
    fn test_deserialize_enforces_invariant() {
        let ok = r#"{"id":"t1","type":"expense","amount":"12.50","date":"2024-01-02","tags":["a"]}"#;
        let tx: Transaction = serde_json::from_str(ok).unwrap();
        assert_eq!(tx.amount(), Decimal::new(1250, 2));
        assert_eq!(tx.status, TransactionStatus::Completed);

        let bad = r#"{"id":"t1","type":"expense","amount":"-12.50","date":"2024-01-02"}"#;
        assert!(serde_json::from_str::<Transaction>(bad).is_err());
    }

    #[test]
    fn test_from_record() {
        let records = SimpleDatasetParser::parse_with_source(
            r#"[{"type": "Expense", "amount": 9.5, "date": "2024-05-06", "category": " Food ", "status": "pending"}]"#,
            DatasetFormat::Json,
            Some("tx.json"),
        ).unwrap();
        let tx = Transaction::from_record(&records[0], "gen-1").unwrap();
        assert_eq!(tx.id, "gen-1");
        assert_eq!(tx.kind, TransactionType::Expense);
        assert_eq!(tx.category, "Food");
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_from_record_reports_location() {
        let records = SimpleDatasetParser::parse_with_source(
            r#"[{"type": "refund", "amount": 1, "date": "2024-05-06"}]"#,
            DatasetFormat::Json,
            Some("tx.json"),
        ).unwrap();
        let err = Transaction::from_record(&records[0], "gen-1").unwrap_err();
        assert!(err.to_string().contains("tx.json:1"));

        let records = SimpleDatasetParser::parse(
            r#"[{"type": "income", "amount": -1, "date": "2024-05-06"}]"#,
            DatasetFormat::Json,
        ).unwrap();
        assert!(Transaction::from_record(&records[0], "gen-2").is_err());
    }

    #[test]
    fn test_matches_search() {
        let tx = Transaction::new("t", TransactionType::Expense, Decimal::ONE, date(2024, 1, 1))
            .unwrap()
            .with_description("Weekly Groceries")
            .with_account("Credit Card")
            .with_tags(["household"]);
        assert!(tx.matches_search("grocer"));
        assert!(tx.matches_search("credit"));
        assert!(tx.matches_search("house"));
        assert!(tx.matches_search(""));
        assert!(!tx.matches_search("rent"));
    }

    #[test]
    fn test_tags_preview() {
        let tx = Transaction::new("t", TransactionType::Expense, Decimal::ONE, date(2024, 1, 1))
            .unwrap()
            .with_tags(["a", "b", "c"]);
        let (shown, rest) = tx.tags_preview(2);
        assert_eq!(shown.len(), 2);
        assert_eq!(rest, 1);
    }

    #[test]
    fn test_draft_into_transaction() {
        let draft = TransactionDraft {
            description: "Coffee".to_string(),
            amount: "1,204.50".to_string(),
            date: "2024-06-01".to_string(),
            kind: "expense".to_string(),
            category: "".to_string(),
            account: "Cash".to_string(),
            tags: "morning, , treat".to_string(),
            status: "".to_string(),
        };
        let tx = draft.into_transaction("new-1").unwrap();
        assert_eq!(tx.amount(), Decimal::new(120450, 2));
        assert_eq!(tx.category, "Uncategorized");
        assert_eq!(tx.tags, vec!["morning", "treat"]);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert!(!tx.is_auto_categorized);
    }

    #[test]
    fn test_draft_validation_errors() {
        let base = TransactionDraft {
            description: "Coffee".to_string(),
            amount: "3".to_string(),
            date: "2024-06-01".to_string(),
            kind: "expense".to_string(),
            ..Default::default()
        };

        let mut d = base.clone();
        d.description = " ".to_string();
        assert!(d.into_transaction("x").unwrap_err().to_string().contains("description"));

        let mut d = base.clone();
        d.amount = "abc".to_string();
        assert!(d.into_transaction("x").unwrap_err().to_string().contains("amount"));

        let mut d = base.clone();
        d.amount = "-3".to_string();
        assert!(d.into_transaction("x").is_err());

        let mut d = base.clone();
        d.date = "06/01/2024".to_string();
        assert!(d.into_transaction("x").unwrap_err().to_string().contains("date"));

        let mut d = base;
        d.kind = "gift".to_string();
        assert!(d.into_transaction("x").is_err());
    }
}
