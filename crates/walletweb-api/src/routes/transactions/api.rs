//! Transactions API endpoints - JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_transactions: Filtered, paginated transactions (JSON)
//! - api_transaction_detail: Single transaction (JSON)
//! - htmx_transactions_list: Transaction list (HTML fragment)
//! - htmx_transaction_store: Store new transaction (HTMX)

use crate::error::ApiResult;
use crate::routes::query::{filter_from_params, filter_query_string};
use crate::{alert_html, AppState};
use axum::extract::{Form, Path, Query, State};
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use walletweb_config::CurrencyConfig;
use walletweb_core::{Summary, Transaction, TransactionDraft, TransactionStatus, TransactionType, TransactionFilter};
use walletweb_utils::escape_html;

/// Page of transactions plus the summary of the whole selection
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub summary: Summary,
}

fn page_params(params: &HashMap<String, String>, default_limit: usize) -> (usize, usize) {
    let limit = params
        .get("limit")
        .and_then(|s| s.parse().ok())
        .filter(|l: &usize| *l > 0)
        .unwrap_or(default_limit);
    let offset = params.get("offset").and_then(|s| s.parse().ok()).unwrap_or(0);
    (limit, offset)
}

/// Filtered selection, newest first
async fn select(state: &AppState, filter: &TransactionFilter) -> ApiResult<Vec<Transaction>> {
    let ledger = state.ledger.read().await;
    let mut transactions = ledger.query(filter, walletweb_core::today())?;
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(transactions)
}

/// Get transactions with filters and pagination (JSON API)
pub async fn api_transactions(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<TransactionsResponse>> {
    let filter = filter_from_params(&params, state.config.time_range.default_range)?;
    let (limit, offset) = page_params(&params, state.config.pagination.records_per_page);

    let selected = select(&state, &filter).await?;
    let summary = walletweb_core::summarize(&selected);
    let total_count = selected.len();

    Ok(Json(TransactionsResponse {
        transactions: selected.into_iter().skip(offset).take(limit).collect(),
        total_count,
        page: offset / limit + 1,
        page_size: limit,
        summary,
    }))
}

/// Get single transaction detail (JSON API)
pub async fn api_transaction_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let ledger = state.ledger.read().await;
    Ok(Json(ledger.transaction(&id)?.clone()))
}

/// Tailwind text color for an amount of this type
pub fn amount_color(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "text-green-600",
        TransactionType::Expense => "text-red-600",
        TransactionType::Transfer => "text-gray-600",
    }
}

fn status_badge(status: TransactionStatus) -> String {
    let class = match status {
        TransactionStatus::Completed => "bg-green-100 text-green-700",
        TransactionStatus::Pending => "bg-yellow-100 text-yellow-700",
        TransactionStatus::Cancelled => "bg-gray-100 text-gray-500 line-through",
    };
    format!("<span class='px-2 py-0.5 rounded text-xs {}'>{}</span>", class, status.label())
}

/// One list row
pub fn render_transaction_row(tx: &Transaction, currency: &CurrencyConfig) -> String {
    let (tags, hidden) = tx.tags_preview(2);
    let mut tags_html: String = tags
        .iter()
        .map(|t| format!("<span class='px-2 py-0.5 bg-blue-100 text-blue-700 rounded text-xs'>#{}</span>", escape_html(t)))
        .collect();
    if hidden > 0 {
        tags_html.push_str(&format!("<span class='text-xs text-gray-400'>+{}</span>", hidden));
    }

    let category = if tx.category.is_empty() { "Uncategorized" } else { tx.category.as_str() };
    let auto_marker = if tx.is_auto_categorized {
        "<span class='text-xs text-indigo-400' title='Auto-categorized'>auto</span>"
    } else {
        ""
    };

    format!(
        r#"<div class='border rounded-lg p-3 hover:bg-gray-50 transition' id='tx-{}'>
            <div class='flex items-center justify-between gap-2'>
                <div class='flex-1 min-w-0'>
                    <div class='text-sm text-gray-500'>{} · {}</div>
                    <div class='font-medium truncate'>{}</div>
                    <div class='flex items-center gap-2 mt-1'>
                        <span class='px-2 py-0.5 bg-indigo-50 text-indigo-700 rounded text-xs'>{}</span>{}{}
                    </div>
                </div>
                <div class='flex flex-col items-end gap-1 flex-shrink-0'>
                    <span class='font-medium {}'>{}</span>
                    {}
                </div>
            </div>
        </div>"#,
        escape_html(&tx.id),
        tx.date,
        escape_html(&tx.account),
        escape_html(&tx.description),
        escape_html(category),
        auto_marker,
        tags_html,
        amount_color(tx.kind),
        tx.display_amount(currency),
        status_badge(tx.status)
    )
}

/// HTMX: Transactions list - Partial page update
///
/// Applies every filter criterion, then paginates newest first.
pub async fn htmx_transactions_list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let filter = filter_from_params(&params, state.config.time_range.default_range)?;
    state.ledger.write().await.set_current_filter(filter.clone())?;
    let (limit, offset) = page_params(&params, state.config.pagination.records_per_page);
    let currency = &state.config.currency;

    let selected = select(&state, &filter).await?;
    let summary = walletweb_core::summarize(&selected);
    let total_count = selected.len();

    if total_count == 0 {
        let message = if filter.is_active() {
            "No transactions match the current filters"
        } else {
            "No transactions yet"
        };
        return Ok(Html(format!(
            "<div class='text-center py-12 text-gray-500'><p>{}</p></div>",
            message
        )));
    }

    let mut html = format!(
        "<div class='flex flex-wrap gap-4 text-sm mb-4'><span>{} transactions</span>\
         <span class='text-green-600'>Income {}</span><span class='text-red-600'>Expenses {}</span>\
         <span>Net {}</span></div><div id='tx-list-container' class='space-y-2'>",
        total_count,
        walletweb_core::format::format_money(summary.total_income, currency),
        walletweb_core::format::format_money(summary.total_expense, currency),
        walletweb_core::format::format_money(summary.net_flow, currency),
    );
    for tx in selected.iter().skip(offset).take(limit) {
        html.push_str(&render_transaction_row(tx, currency));
    }
    html.push_str("</div>");

    let current_page = offset / limit + 1;
    let total_pages = (total_count + limit - 1) / limit;
    let base = format!("/transactions/list?{}&limit={}", filter_query_string(&filter), limit);
    let nav_button = |label: &str, target_offset: usize, disabled: bool| {
        if disabled {
            format!("<button disabled class='px-3 py-1 border rounded opacity-50 cursor-not-allowed'>{}</button>", label)
        } else {
            format!(
                "<button hx-get='{}&offset={}' hx-target='#transactions-content' class='px-3 py-1 border rounded hover:bg-gray-100'>{}</button>",
                base, target_offset, label
            )
        }
    };

    html.push_str(&format!(
        "<div class='mt-6 flex items-center justify-between flex-wrap gap-4'>\
         <span class='text-sm text-gray-500'>{} records, page {} of {}</span>\
         <div class='flex items-center gap-2'>{}{}{}{}</div></div>",
        total_count,
        current_page,
        total_pages,
        nav_button("First", 0, current_page == 1),
        nav_button("Previous", offset.saturating_sub(limit), current_page == 1),
        nav_button("Next", offset + limit, current_page >= total_pages),
        nav_button("Last", total_pages.saturating_sub(1) * limit, current_page >= total_pages),
    ));

    Ok(Html(html))
}

/// HTMX: Store a new transaction from the create form
///
/// Responds with an inline alert. On success the list is asked to refresh.
pub async fn htmx_transaction_store(
    State(state): State<AppState>,
    Form(draft): Form<TransactionDraft>,
) -> Html<String> {
    let mut ledger = state.ledger.write().await;
    match ledger.add_transaction(draft) {
        Ok(tx) => Html(format!(
            "{}<script>setTimeout(function() {{ closeCreateModal(); htmx.trigger('#transactions-content', 'refresh'); }}, 800);</script>",
            alert_html("success", &format!("Saved \"{}\" ({})", tx.description, tx.display_amount(&state.config.currency)))
        )),
        Err(e) => {
            log::debug!("Rejected new transaction: {}", e);
            Html(alert_html("error", &e.to_string()))
        }
    }
}
