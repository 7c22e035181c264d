//! Report construction, export history and export bodies

use chrono::NaiveDateTime;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use walletweb_utils::{format_bytes, generate_id, random_suffix};

use crate::error::{CoreError, CoreResult};
use crate::models::Transaction;
use crate::summary::Summary;
use crate::types::ExportFormat;

fn default_true() -> bool {
    true
}

/// Toggles chosen in the export dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default = "default_true")]
    pub include_charts: bool,
    #[serde(default = "default_true")]
    pub include_details: bool,
    #[serde(default)]
    pub include_insights: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            include_charts: true,
            include_details: true,
            include_insights: false,
        }
    }
}

/// A generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDescriptor {
    pub id: String,
    pub name: String,
    pub format: ExportFormat,
    pub created_at: NaiveDateTime,
    pub options: ExportOptions,
    pub stats: Summary,
    pub transaction_count: usize,
    /// Human-readable, e.g. `"12.3 KB"`
    pub size_estimate: String,
    /// Rows the report was built from
    #[serde(skip)]
    pub transactions: Vec<Transaction>,
}

impl ReportDescriptor {
    /// Download file name (`financial-report-2024-06-01.csv`)
    pub fn file_name(&self) -> String {
        format!(
            "financial-report-{}.{}",
            self.created_at.format("%Y-%m-%d"),
            self.format.extension()
        )
    }
}

/// Estimated size in bytes of a rendered report
pub fn estimate_size(format: ExportFormat, rows: usize, options: &ExportOptions) -> u64 {
    let (base, per_row, charts, insights) = match format {
        ExportFormat::Pdf => (24_000, 120, 150_000, 4_000),
        ExportFormat::Excel => (8_000, 90, 20_000, 2_000),
        ExportFormat::Csv => (200, 80, 0, 300),
    };

    let mut size = base;
    if options.include_details {
        size += per_row * rows as u64;
    }
    if options.include_charts {
        size += charts;
    }
    if options.include_insights {
        size += insights;
    }
    size
}

/// Build a report descriptor from a selection and its summary.
///
/// An empty selection fails with [`CoreError::EmptySelection`].
pub fn build_report(
    transactions: &[Transaction],
    summary: &Summary,
    options: &ExportOptions,
    now: NaiveDateTime,
) -> CoreResult<ReportDescriptor> {
    if transactions.is_empty() {
        return Err(CoreError::EmptySelection);
    }

    let bytes = estimate_size(options.format, transactions.len(), options);

    Ok(ReportDescriptor {
        id: generate_id(),
        name: format!("Financial Report {}", now.format("%Y-%m-%d")),
        format: options.format,
        created_at: now,
        options: options.clone(),
        stats: summary.clone(),
        transaction_count: transactions.len(),
        size_estimate: format_bytes(bytes),
        transactions: transactions.to_vec(),
    })
}

/// Bounded newest-first list of generated reports
#[derive(Debug, Clone)]
pub struct ExportHistory {
    entries: VecDeque<ReportDescriptor>,
    capacity: usize,
}

impl ExportHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a report, evicting the oldest past capacity
    pub fn push(&mut self, report: ReportDescriptor) {
        self.entries.push_front(report);
        self.entries.truncate(self.capacity);
    }

    pub fn get(&self, id: &str) -> Option<&ReportDescriptor> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &ReportDescriptor> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ReportDescriptor> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn csv_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::InternalError {
        message: format!("failed to write CSV: {}", e),
    }
}

/// CSV document for a selection; insight rows follow when requested
pub fn render_csv(
    transactions: &[Transaction],
    summary: &Summary,
    options: &ExportOptions,
) -> CoreResult<String> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer
        .write_record(["date", "description", "category", "account", "type", "amount", "status", "tags"])
        .map_err(csv_error)?;

    for tx in transactions {
        writer
            .write_record([
                tx.date.to_string(),
                tx.description.clone(),
                tx.category.clone(),
                tx.account.clone(),
                tx.kind.to_string(),
                tx.signed_amount().to_string(),
                tx.status.to_string(),
                tx.tags.join(";"),
            ])
            .map_err(csv_error)?;
    }

    if options.include_insights {
        writer.write_record([""]).map_err(csv_error)?;
        let rows = [
            ("total_income", summary.total_income.to_string()),
            ("total_expense", summary.total_expense.to_string()),
            ("net_flow", summary.net_flow.to_string()),
            ("transaction_count", summary.total_count.to_string()),
            ("period", summary.period_label()),
        ];
        for (key, value) in rows {
            writer.write_record([key, value.as_str()]).map_err(csv_error)?;
        }
        if let Some(rate) = summary.savings_rate() {
            writer
                .write_record(["savings_rate", format!("{:.1}%", rate).as_str()])
                .map_err(csv_error)?;
        }
    }

    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// Downloadable report body
#[derive(Debug, Clone)]
pub struct ReportBody {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render a report for download. Only CSV has a renderer.
pub fn render_report(report: &ReportDescriptor) -> CoreResult<ReportBody> {
    match report.format {
        ExportFormat::Csv => {
            let body = render_csv(&report.transactions, &report.stats, &report.options)?;
            Ok(ReportBody {
                content_type: "text/csv; charset=utf-8",
                file_name: report.file_name(),
                bytes: body.into_bytes(),
            })
        }
        other => Err(CoreError::NotSupported {
            operation: format!("{} download", other.label()),
        }),
    }
}

/// Placeholder share URL: `{base}/share/{id}-{8 hex chars}`
pub fn share_link(base_url: &str, report_id: &str) -> String {
    format!("{}/share/{}-{}", base_url.trim_end_matches('/'), report_id, random_suffix(8))
}

/// Report id from a share token produced by [`share_link`]
pub fn share_token_report_id(token: &str) -> Option<&str> {
    token
        .rsplit_once('-')
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
}
