//! Walletweb core: transaction store, filters, summaries, charts and report export

pub mod charts;
pub mod error;
pub mod export;
pub mod filters;
pub mod format;
pub mod models;
pub mod sample_data;
pub mod search;
pub mod session;
pub mod summary;
pub mod support;
pub mod time;
pub mod types;

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use walletweb_config::Config;
use walletweb_parser::ParserRef;

pub use charts::{category_breakdown, monthly_series, CategoryBreakdown, ChartData, ChartDataset, MonthlySummary};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity};
pub use export::{build_report, render_csv, render_report, share_link, ExportHistory, ExportOptions, ReportBody, ReportDescriptor};
pub use filters::TransactionFilter;
pub use models::{Transaction, TransactionDraft};
pub use search::RecentSearches;
pub use session::{start_export, ExportSession, ExportState, SessionRef};
pub use summary::{summarize, Summary};
pub use support::SupportRequest;
pub use time::{filter_by_date_range, today, TimeContext};
pub use types::{ExportFormat, TransactionStatus, TransactionType};
pub use walletweb_config::DateRange;

/// Where the current transactions came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// Nothing loaded yet
    Empty,
    /// Dataset files matching a path or glob pattern
    Dataset(PathBuf),
    /// Built-in demo data
    Demo,
}

/// Single owned store for transactions, recent searches and the export session
pub struct Ledger {
    config: Config,
    parser: ParserRef,
    transactions: Vec<Transaction>,
    source: DataSource,
    /// Why the configured dataset could not be used, if it failed
    load_error: Option<String>,
    current_filter: TransactionFilter,
    searches: RecentSearches,
    session: SessionRef,
}

impl Ledger {
    /// Create an empty ledger with config and parser
    pub fn new(config: Config, parser: ParserRef) -> Self {
        let searches = RecentSearches::new(config.search.recent_capacity);
        let session = ExportSession::new(
            Duration::from_millis(config.export.generation_delay_ms),
            config.export.history_capacity,
        )
        .shared();
        let current_filter = TransactionFilter::new().with_range(config.time_range.default_range);

        Self {
            config,
            parser,
            transactions: Vec::new(),
            source: DataSource::Empty,
            load_error: None,
            current_filter,
            searches,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn is_demo(&self) -> bool {
        self.source == DataSource::Demo
    }

    /// Error from the last attempt to load the configured dataset
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Load every dataset file matching `pattern`, replacing current data.
    /// Returns the number of transactions loaded.
    pub async fn load(&mut self, pattern: PathBuf) -> CoreResult<usize> {
        let records = self.parser.parse_pattern(pattern.clone()).await?;

        let mut seen = HashSet::new();
        let mut transactions = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let tx = Transaction::from_record(record, format!("tx-{:05}", index + 1))?;
            if !seen.insert(tx.id.clone()) {
                return Err(CoreError::DuplicateEntry {
                    entry: format!("{} ({})", tx.id, record.location()),
                });
            }
            transactions.push(tx);
        }

        log::info!(
            "Loaded {} transactions from {}",
            transactions.len(),
            pattern.display()
        );
        self.transactions = transactions;
        self.source = DataSource::Dataset(pattern);
        Ok(self.transactions.len())
    }

    /// Replace current data with the demo dataset dated relative to `today`
    pub fn load_demo(&mut self, today: NaiveDate) -> CoreResult<usize> {
        self.transactions = sample_data::sample_transactions(today)?;
        self.source = DataSource::Demo;
        log::info!("Loaded {} demo transactions", self.transactions.len());
        Ok(self.transactions.len())
    }

    /// Load the configured dataset, falling back to demo data when it is
    /// empty or unreadable and the config allows it. Also restores recent searches.
    pub async fn load_configured(&mut self, today: NaiveDate) -> CoreResult<usize> {
        let path = self.config.dataset_path();
        match self.load(path.clone()).await {
            Ok(0) if self.config.data.demo_when_empty => {
                log::warn!("No transactions found at {}, showing demo data", path.display());
                self.load_error = None;
                self.load_demo(today)?;
            }
            Ok(_) => self.load_error = None,
            Err(e) if self.config.data.demo_when_empty => {
                let context = ErrorContext::new("load_dataset".to_string())
                    .with_data("path", serde_json::json!(path.display().to_string()));
                DefaultErrorLogger.log_error(&e, &context);
                log::warn!("Showing demo data until {} loads", path.display());
                self.load_error = Some(e.to_string());
                self.load_demo(today)?;
            }
            Err(e) => {
                self.load_error = Some(e.to_string());
                return Err(e);
            }
        }

        if let Err(e) = self.load_searches().await {
            let context = ErrorContext::new("load_searches".to_string())
                .with_data("path", serde_json::json!(self.state_path().display().to_string()));
            DefaultErrorLogger.log_error(&e, &context);
        }
        Ok(self.transactions.len())
    }

    /// Reload from the same source
    pub async fn reload(&mut self) -> CoreResult<usize> {
        match self.source.clone() {
            DataSource::Dataset(pattern) => self.load(pattern).await,
            DataSource::Demo if self.load_error.is_some() => self.load_configured(time::today()).await,
            DataSource::Demo => self.load_demo(time::today()),
            DataSource::Empty => Err(CoreError::NotLoaded),
        }
    }

    // ==================== Transactions ====================

    /// All transactions in store order
    pub fn all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn transaction(&self, id: &str) -> CoreResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::TransactionNotFound { id: id.to_string() })
    }

    /// Validate a form draft and append it. In memory only.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> CoreResult<Transaction> {
        let tx = draft.into_transaction(walletweb_utils::generate_id())?;
        log::info!("Added transaction {} ({} {})", tx.id, tx.kind, tx.amount());
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    /// Transactions matching `filter`, in store order
    pub fn query(&self, filter: &TransactionFilter, today: NaiveDate) -> CoreResult<Vec<Transaction>> {
        filter.apply(&self.transactions, today)
    }

    /// Summary of the transactions matching `filter`
    pub fn summary(&self, filter: &TransactionFilter, today: NaiveDate) -> CoreResult<Summary> {
        Ok(summarize(&self.query(filter, today)?))
    }

    /// Filter shared by the list and the export dialog
    pub fn current_filter(&self) -> &TransactionFilter {
        &self.current_filter
    }

    /// Replace the shared filter; an invalid filter leaves the old one in place
    pub fn set_current_filter(&mut self, filter: TransactionFilter) -> CoreResult<()> {
        filter.validate()?;
        self.current_filter = filter;
        Ok(())
    }

    /// Most recent `count` transactions, newest first
    pub fn recent_transactions(&self, count: usize) -> Vec<Transaction> {
        let mut transactions = self.transactions.clone();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        transactions.truncate(count);
        transactions
    }

    /// Distinct non-empty categories, sorted
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|t| t.category.as_str())
    }

    /// Distinct non-empty accounts, sorted
    pub fn accounts(&self) -> Vec<String> {
        self.distinct(|t| t.account.as_str())
    }

    fn distinct<'a>(&'a self, field: impl Fn(&'a Transaction) -> &'a str) -> Vec<String> {
        self.transactions
            .iter()
            .map(field)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ==================== Recent searches ====================

    fn state_path(&self) -> PathBuf {
        self.config.state_path()
    }

    /// Restore recent searches from the state file
    pub async fn load_searches(&mut self) -> CoreResult<()> {
        self.searches = RecentSearches::load(&self.state_path(), self.config.search.recent_capacity).await?;
        Ok(())
    }

    /// Remember a search term and persist the list
    pub async fn record_search(&mut self, term: &str) -> CoreResult<()> {
        if self.searches.record(term) {
            self.searches.save(&self.state_path()).await?;
        }
        Ok(())
    }

    pub fn recent_searches(&self) -> &[String] {
        self.searches.terms()
    }

    pub async fn clear_searches(&mut self) -> CoreResult<()> {
        self.searches.clear();
        self.searches.save(&self.state_path()).await
    }

    // ==================== Export ====================

    /// Shared handle to the export session
    pub fn export_session(&self) -> SessionRef {
        self.session.clone()
    }

    /// Generated reports, newest first
    pub async fn export_history(&self) -> Vec<ReportDescriptor> {
        self.session.lock().await.history().to_vec()
    }

    pub async fn report(&self, id: &str) -> CoreResult<ReportDescriptor> {
        self.session
            .lock()
            .await
            .report(id)
            .cloned()
            .ok_or_else(|| CoreError::ReportNotFound { id: id.to_string() })
    }

    /// Share URL for a report in the history
    pub async fn share_report(&self, id: &str) -> CoreResult<String> {
        let report = self.report(id).await?;
        Ok(share_link(&self.config.export.share_base_url, &report.id))
    }
}
