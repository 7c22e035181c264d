//! Basic categorical types for transactions and exports

use serde::{Deserialize, Serialize};

/// Transaction type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
    /// Movement between own accounts
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::Transfer,
    ];

    /// Sign prefix used wherever an amount of this type is rendered
    pub fn sign_prefix(&self) -> &'static str {
        match self {
            TransactionType::Income => "+",
            TransactionType::Expense => "-",
            TransactionType::Transfer => "",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
            TransactionType::Transfer => "Transfer",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(TransactionType::Income),
            "expense" | "expenses" | "debit" => Ok(TransactionType::Expense),
            "transfer" => Ok(TransactionType::Transfer),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
            TransactionType::Transfer => write!(f, "transfer"),
        }
    }
}

/// Transaction status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Settled
    Completed,
    /// Awaiting settlement
    Pending,
    /// Voided
    Cancelled,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Completed,
        TransactionStatus::Pending,
        TransactionStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "cleared" | "" => Ok(TransactionStatus::Completed),
            "pending" => Ok(TransactionStatus::Pending),
            "cancelled" | "canceled" => Ok(TransactionStatus::Cancelled),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Completed => write!(f, "completed"),
            TransactionStatus::Pending => write!(f, "pending"),
            TransactionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Export output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
    Csv,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Pdf
    }
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Pdf, ExportFormat::Excel, ExportFormat::Csv];

    /// File extension for downloads
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "PDF",
            ExportFormat::Excel => "Excel",
            ExportFormat::Csv => "CSV",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unsupported export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_from_str() {
        assert_eq!("income".parse::<TransactionType>().unwrap(), TransactionType::Income);
        assert_eq!("Expense".parse::<TransactionType>().unwrap(), TransactionType::Expense);
        assert_eq!("transfer".parse::<TransactionType>().unwrap(), TransactionType::Transfer);
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<TransactionStatus>().unwrap(), TransactionStatus::Pending);
        assert_eq!("canceled".parse::<TransactionStatus>().unwrap(), TransactionStatus::Cancelled);
        assert_eq!("".parse::<TransactionStatus>().unwrap(), TransactionStatus::Completed);
        assert!("lost".parse::<TransactionStatus>().is_err());
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert_eq!(ExportFormat::Excel.extension(), "xlsx");
        assert!("docx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_sign_prefix() {
        assert_eq!(TransactionType::Income.sign_prefix(), "+");
        assert_eq!(TransactionType::Expense.sign_prefix(), "-");
        assert_eq!(TransactionType::Transfer.sign_prefix(), "");
    }
}
