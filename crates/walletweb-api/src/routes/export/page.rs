//! Export page rendering - Full page endpoints
//!
//! Endpoints:
//! - page_export: Export dialog for the current filters
//! - page_export_history: Generated reports
//! - page_report: Report detail
//! - page_shared_report: Read-only report view behind a share link

use super::api::{render_status, report_card};
use crate::error::{ApiError, ApiResult};
use crate::routes::query::{filter_from_params, filter_query_string};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use walletweb_config::CurrencyConfig;
use walletweb_core::export::share_token_report_id;
use walletweb_core::format::{format_money, format_percent};
use walletweb_core::{DateRange, ExportFormat, ExportOptions, ReportDescriptor, TransactionFilter};
use walletweb_utils::escape_html;

/// Filter keys carried through the dialog as hidden fields
/// Hidden inputs for the filter criteria the form has no visible field for
fn carried_inputs(filter: &TransactionFilter) -> String {
    filter_query_string(filter)
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter(|(key, _)| !matches!(*key, "range" | "start" | "end"))
        .map(|(key, value)| {
            let value = urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_else(|_| value.to_string());
            format!("<input type='hidden' name='{}' value='{}'>", key, escape_html(&value))
        })
        .collect()
}

/// Export dialog
pub async fn page_export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let (filter, selected, history) = {
        let ledger = state.ledger.read().await;
        // Without a query the dialog picks up the filter last used on the list
        let filter = if params.is_empty() {
            ledger.current_filter().clone()
        } else {
            filter_from_params(&params, state.config.time_range.default_range)?
        };
        let selected = ledger.query(&filter, walletweb_core::today())?.len();
        let history = ledger.export_history().await;
        (filter, selected, history)
    };
    let status = {
        let session = state.session.lock().await;
        render_status(session.state(), &state.config.currency, None)
    };

    let defaults = ExportOptions::default();
    let format_options: String = ExportFormat::ALL
        .iter()
        .map(|f| {
            format!(
                "<label class='flex items-center gap-2 border rounded-lg px-4 py-3 cursor-pointer hover:bg-gray-50'>\
                 <input type='radio' name='format' value='{}'{}><span class='font-medium'>{}</span></label>",
                f,
                if *f == defaults.format { " checked" } else { "" },
                f.label()
            )
        })
        .collect();

    let toggle = |name: &str, label: &str, checked: bool| {
        format!(
            "<label class='flex items-center gap-2'><input type='checkbox' name='{}'{}>{}</label>",
            name,
            if checked { " checked" } else { "" },
            label
        )
    };

    let range_options: String = DateRange::ALL
        .iter()
        .map(|r| {
            format!(
                "<option value='{}'{}>{}</option>",
                r,
                if *r == filter.time.range { " selected" } else { "" },
                r.label()
            )
        })
        .collect();

    let hidden = carried_inputs(&filter);

    let recent: String = if history.is_empty() {
        "<p class='text-sm text-gray-500'>No reports generated yet</p>".to_string()
    } else {
        history
            .iter()
            .take(5)
            .map(|r| report_card(r, &state.config.currency))
            .collect()
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Export Report</h2>
            <p class='text-sm text-gray-500'>{} transactions selected · {}</p></div>
        <div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
            <div class='lg:col-span-2 bg-white rounded-xl shadow-sm p-6'>
                <form hx-post='/export/generate' hx-target='#export-status' hx-swap='outerHTML' class='space-y-6'>
                    {}
                    <div>
                        <h3 class='text-sm font-semibold text-gray-700 mb-2'>Format</h3>
                        <div class='grid grid-cols-3 gap-3'>{}</div>
                    </div>
                    <div>
                        <h3 class='text-sm font-semibold text-gray-700 mb-2'>Date Range</h3>
                        <div class='flex flex-wrap items-center gap-2'>
                            <select name='range' class='px-3 py-2 border rounded-lg'>{}</select>
                            <input type='date' name='start' value='{}' class='px-3 py-2 border rounded-lg'>
                            <span class='text-gray-400 text-sm'>to</span>
                            <input type='date' name='end' value='{}' class='px-3 py-2 border rounded-lg'>
                        </div>
                        <p class='text-xs text-gray-400 mt-1'>Dates apply to the custom range only</p>
                    </div>
                    <div>
                        <h3 class='text-sm font-semibold text-gray-700 mb-2'>Include</h3>
                        <div class='space-y-2'>{}{}{}</div>
                    </div>
                    <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Generate Report</button>
                </form>
                <div class='mt-6 pt-6 border-t'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <div class='flex items-center justify-between mb-4'>
                    <h3 class='text-lg font-semibold'>Recent Reports</h3>
                    <a href='/export/history' class='text-sm text-indigo-600'>View all</a>
                </div>
                <div class='space-y-2'>{}</div>
            </div>
        </div>"#,
        selected,
        filter.time.description(),
        hidden,
        format_options,
        range_options,
        filter.time.custom_start.map(|d| d.to_string()).unwrap_or_default(),
        filter.time.custom_end.map(|d| d.to_string()).unwrap_or_default(),
        toggle("include_charts", "Charts and visualizations", defaults.include_charts),
        toggle("include_details", "Transaction details", defaults.include_details),
        toggle("include_insights", "Summary insights", defaults.include_insights),
        status,
        recent
    );

    Ok(Html(crate::page_response(&headers, "Export", "/export", &inner_content)))
}

/// Report history page
pub async fn page_export_history(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let history = state.ledger.read().await.export_history().await;
    let rows: String = if history.is_empty() {
        "<tr><td colspan='6' class='py-6 text-center text-gray-500'>No reports generated yet</td></tr>".to_string()
    } else {
        history
            .iter()
            .map(|r| {
                format!(
                    "<tr class='border-b'><td class='py-2'><a href='/reports/{}' class='text-indigo-600 hover:underline'>{}</a></td>\
                     <td class='py-2'>{}</td><td class='py-2'>{}</td><td class='py-2 text-right'>{}</td><td class='py-2 text-right'>{}</td>\
                     <td class='py-2 text-right'><a href='/reports/{}/download' class='text-sm text-indigo-600'>Download</a></td></tr>",
                    escape_html(&r.id),
                    escape_html(&r.name),
                    r.format.label(),
                    r.created_at.format("%Y-%m-%d %H:%M"),
                    r.transaction_count,
                    r.size_estimate,
                    escape_html(&r.id)
                )
            })
            .collect()
    };

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'><h2 class='text-2xl font-bold'>Report History</h2>
            <a href='/export' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>New Report</a></div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <table class='w-full text-sm'>
                <thead><tr class='text-gray-500 border-b'><th class='text-left py-2'>Name</th><th class='text-left py-2'>Format</th>
                <th class='text-left py-2'>Created</th><th class='text-right py-2'>Transactions</th><th class='text-right py-2'>Size</th><th></th></tr></thead>
                <tbody>{}</tbody>
            </table>
            <p class='text-xs text-gray-400 mt-4'>Keeps the latest {} reports</p>
        </div>"#,
        rows, state.config.export.history_capacity
    );

    Html(crate::page_response(&headers, "Report History", "/export", &inner_content))
}

fn report_detail(report: &ReportDescriptor, currency: &CurrencyConfig, actions: &str) -> String {
    let stats = &report.stats;
    let included: Vec<&str> = [
        (report.options.include_charts, "charts"),
        (report.options.include_details, "details"),
        (report.options.include_insights, "insights"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, label)| *label)
    .collect();

    let preview: String = report
        .transactions
        .iter()
        .take(10)
        .map(|tx| crate::routes::transactions::render_transaction_row(tx, currency))
        .collect();
    let more = report.transaction_count.saturating_sub(10);
    let more_note = if more > 0 {
        format!("<p class='text-sm text-gray-500 mt-2'>and {} more</p>", more)
    } else {
        String::new()
    };

    format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>{}</h2>
            <p class='text-sm text-gray-500'>{} · created {} · {} · includes {}</p></div>
        <div class='grid grid-cols-2 md:grid-cols-4 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Income</p><p class='text-xl font-bold'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Expenses</p><p class='text-xl font-bold'>{}</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Net Flow</p><p class='text-xl font-bold'>{}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Savings Rate</p><p class='text-xl font-bold'>{}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <div class='flex items-center justify-between mb-4'>
                <h3 class='text-lg font-semibold'>{} transactions · {}</h3>
                <div class='flex gap-2'>{}</div>
            </div>
            <div id='share-link' class='mb-4'></div>
            <div class='space-y-2'>{}</div>{}
        </div>"#,
        escape_html(&report.name),
        report.format.label(),
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.size_estimate,
        if included.is_empty() { "summary only".to_string() } else { included.join(", ") },
        format_money(stats.total_income, currency),
        format_money(stats.total_expense, currency),
        format_money(stats.net_flow, currency),
        stats.savings_rate().map(format_percent).unwrap_or_else(|| "-".to_string()),
        report.transaction_count,
        stats.period_label(),
        actions,
        preview,
        more_note
    )
}

/// Report detail page
pub async fn page_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let report = state.ledger.read().await.report(&id).await?;
    let id = escape_html(&report.id);
    let actions = format!(
        "<a href='/reports/{}/download' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Download</a>\
         <button hx-post='/reports/{}/share' hx-target='#share-link' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Share</button>",
        id, id
    );
    let inner_content = report_detail(&report, &state.config.currency, &actions);
    Ok(Html(crate::page_response(&headers, &report.name, "/export", &inner_content)))
}

/// Read-only report view for a share token
pub async fn page_shared_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> ApiResult<Html<String>> {
    let id = share_token_report_id(&token).ok_or_else(|| ApiError::NotFound {
        resource: format!("share link {}", token),
    })?;
    let report = state.ledger.read().await.report(id).await?;
    let inner_content = report_detail(&report, &state.config.currency, "<span class='text-sm text-gray-400'>Shared report</span>");
    Ok(Html(crate::page_response(&headers, &report.name, "/export", &inner_content)))
}

#[cfg(test)]
mod tests {
    use super::super::api::tests::generate;
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_export_dialog_carries_filters() {
        let (app, _, _dir) = app_with_state().await;
        let html = body_string(send(&app, Method::GET, "/export?range=last-month&types=expense&q=coffee", None).await).await;
        assert!(html.contains("<input type='hidden' name='types' value='expense'>"));
        assert!(html.contains("<input type='hidden' name='q' value='coffee'>"));
        assert!(html.contains("<option value='last-month' selected>"));
        assert!(html.contains("<input type='radio' name='format' value='pdf' checked>"));
        assert!(html.contains("name='include_details' checked"));
        assert!(!html.contains("name='include_insights' checked"));
        assert!(html.contains("No reports generated yet"));
    }

    #[tokio::test]
    async fn test_export_dialog_uses_list_filter() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/transactions/list?range=last-month&categories=Food%20%26%20Dining&q=cafe", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(send(&app, Method::GET, "/export", None).await).await;
        assert!(html.contains("<option value='last-month' selected>"));
        assert!(html.contains("<input type='hidden' name='categories' value='Food &amp; Dining'>"));
        assert!(html.contains("<input type='hidden' name='q' value='cafe'>"));
    }

    #[tokio::test]
    async fn test_report_pages() {
        let (app, state, _dir) = app_with_state().await;
        let id = generate(&app, &state, "format=excel&include_details=on").await;

        let html = body_string(send(&app, Method::GET, "/export/history", None).await).await;
        assert!(html.contains(&format!("/reports/{}", id)));
        assert!(html.contains("Excel"));

        let html = body_string(send(&app, Method::GET, &format!("/reports/{}", id), None).await).await;
        assert!(html.contains("Savings Rate"));
        assert!(html.contains("includes details"));

        let response = send(&app, Method::GET, "/reports/unknown", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_shared_report() {
        let (app, state, _dir) = app_with_state().await;
        let id = generate(&app, &state, "format=csv").await;
        let link = state.ledger.read().await.share_report(&id).await.unwrap();
        let path = &link[link.find("/share/").unwrap()..];

        let response = send(&app, Method::GET, path, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Shared report"));

        let response = send(&app, Method::GET, "/share/nodash", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
