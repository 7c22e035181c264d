//! Transactions page rendering - Full page endpoints
//!
//! Endpoints:
//! - page_transactions: Main transactions page with the filter panel
//! - page_transaction_create: Transaction create modal

use crate::error::ApiResult;
use crate::routes::query::{filter_from_params, filter_query_string};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use walletweb_core::{TransactionFilter, TransactionStatus, TransactionType};
use walletweb_utils::escape_html;

fn checkbox_group<T: ToString>(name: &str, options: &[(T, &str)], selected: &dyn Fn(&T) -> bool) -> String {
    options
        .iter()
        .map(|(value, label)| {
            format!(
                "<label class='flex items-center gap-1 text-sm'><input type='checkbox' class='filter-{}' value='{}'{}>{}</label>",
                name,
                escape_html(&value.to_string()),
                if selected(value) { " checked" } else { "" },
                escape_html(label)
            )
        })
        .collect()
}

fn filter_panel(filter: &TransactionFilter, categories: &[String], recent: &[String]) -> String {
    let types: Vec<(TransactionType, &str)> = TransactionType::ALL.iter().map(|t| (*t, t.label())).collect();
    let statuses: Vec<(TransactionStatus, &str)> = TransactionStatus::ALL.iter().map(|s| (*s, s.label())).collect();
    let category_options: Vec<(String, &str)> = categories.iter().map(|c| (c.clone(), c.as_str())).collect();

    let recent_html: String = if recent.is_empty() {
        String::new()
    } else {
        let chips: String = recent
            .iter()
            .map(|term| {
                format!(
                    "<button type='button' onclick='useSearch(this.dataset.term)' data-term='{}' class='px-2 py-0.5 bg-gray-100 rounded text-xs hover:bg-gray-200'>{}</button>",
                    escape_html(term),
                    escape_html(term)
                )
            })
            .collect();
        format!(
            "<div class='flex flex-wrap items-center gap-2 mt-2'><span class='text-xs text-gray-500'>Recent:</span>{}\
             <button type='button' onclick='clearSearches()' class='text-xs text-gray-400 hover:text-red-500'>Clear</button></div>",
            chips
        )
    };

    format!(
        r#"<form id='filter-form' class='bg-white rounded-xl shadow-sm p-4 mb-4 space-y-3' onsubmit='event.preventDefault(); applyFilters(true)'>
            <div class='flex flex-wrap gap-3 items-center'>
                <input type='text' name='q' id='search-input' value='{}' placeholder='Search description, category, account or tag...'
                    class='px-4 py-2 border rounded-lg flex-1 min-w-[16rem]' onkeyup='debouncedApply()'>
                <input type='number' step='0.01' min='0' name='min' value='{}' placeholder='Min' class='px-3 py-2 border rounded-lg w-28' onchange='applyFilters(false)'>
                <input type='number' step='0.01' min='0' name='max' value='{}' placeholder='Max' class='px-3 py-2 border rounded-lg w-28' onchange='applyFilters(false)'>
                <span class='px-2 py-1 bg-indigo-100 text-indigo-700 rounded text-xs' id='active-filters'>{} active</span>
                <a href='/transactions' class='text-sm text-gray-500 hover:text-gray-700'>Reset</a>
            </div>
            <div class='flex flex-wrap gap-6' onchange='applyFilters(false)'>
                <div><p class='text-xs text-gray-500 mb-1'>Type</p><div class='flex gap-3'>{}</div></div>
                <div><p class='text-xs text-gray-500 mb-1'>Status</p><div class='flex gap-3'>{}</div></div>
                <div><p class='text-xs text-gray-500 mb-1'>Category</p><div class='flex flex-wrap gap-3 max-w-xl'>{}</div></div>
            </div>
            {}
        </form>"#,
        escape_html(&filter.search),
        filter.amount_min.map(|d| d.to_string()).unwrap_or_default(),
        filter.amount_max.map(|d| d.to_string()).unwrap_or_default(),
        filter.active_count(),
        checkbox_group("types", &types, &|t| filter.types.contains(t)),
        checkbox_group("statuses", &statuses, &|s| filter.statuses.contains(s)),
        checkbox_group("categories", &category_options, &|c| {
            filter.categories.iter().any(|f| f.eq_ignore_ascii_case(c))
        }),
        recent_html
    )
}

/// Transactions page - Filters, search and paginated list
pub async fn page_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let filter = filter_from_params(&params, state.config.time_range.default_range)?;
    let ledger = state.ledger.read().await;
    let categories = ledger.categories();
    let recent = ledger.recent_searches().to_vec();
    let total = ledger.transaction_count();
    drop(ledger);

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-4'>
            <h2 class='text-2xl font-bold'>Transactions <span class='text-sm font-normal text-gray-400'>{} total</span></h2>
            <div class='flex gap-2'>
                <button onclick='reloadLedger()' class='px-4 py-2 bg-gray-100 text-gray-700 rounded-lg hover:bg-gray-200' title='Reload data'>Reload</button>
                <button hx-get='/transactions/create' hx-swap='beforeend' hx-target='body'
                    class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>New</button>
                <a href='/export?{}' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Export</a>
            </div>
        </div>
        <div class='mb-4' id='range-selector'>{}</div>
        {}
        <div id='transactions-content' hx-get='/transactions/list?{}' hx-trigger='load, refresh' class='bg-white rounded-xl shadow-sm p-6'>
            <p class='text-gray-500 text-center'>Loading...</p>
        </div>
        <script>
        const currentRange = {};
        function collectFilters() {{
            const form = document.getElementById('filter-form');
            const params = new URLSearchParams(currentRange);
            for (const name of ['q', 'min', 'max']) {{
                const value = form.elements[name].value.trim();
                if (value) params.set(name, value);
            }}
            for (const group of ['types', 'statuses', 'categories']) {{
                const values = Array.from(form.querySelectorAll('.filter-' + group + ':checked')).map(c => c.value);
                if (values.length) params.set(group, values.join(','));
            }}
            return params;
        }}
        function applyFilters(record) {{
            const params = collectFilters();
            const term = params.get('q');
            if (record && term) {{
                fetch('/api/searches', {{method: 'POST', headers: {{'Content-Type': 'application/json'}}, body: JSON.stringify({{term: term}})}});
            }}
            htmx.ajax('GET', '/transactions/list?' + params.toString(), '#transactions-content');
        }}
        let applyTimer = null;
        function debouncedApply() {{
            clearTimeout(applyTimer);
            applyTimer = setTimeout(() => applyFilters(false), 400);
        }}
        function useSearch(term) {{
            document.getElementById('search-input').value = term;
            applyFilters(true);
        }}
        function clearSearches() {{
            fetch('/api/searches', {{method: 'DELETE'}}).then(() => window.location.reload());
        }}
        function reloadLedger() {{
            fetch('/api/reload', {{method: 'POST'}})
                .then(r => r.json())
                .then(data => {{
                    if (data.success) {{
                        window.location.reload();
                    }} else {{
                        alert('Reload failed: ' + data.message);
                    }}
                }})
                .catch(e => alert('Reload failed: ' + e));
        }}
        </script>"#,
        total,
        filter_query_string(&filter),
        crate::routes::time::date_range_selector("/transactions", "main", &filter),
        filter_panel(&filter, &categories, &recent),
        filter_query_string(&filter),
        range_params_json(&filter),
    );

    Ok(Html(crate::page_response(&headers, "Transactions", "/transactions", &inner_content)))
}

/// Range part of the filter as a JS object literal
fn range_params_json(filter: &TransactionFilter) -> String {
    let mut range = serde_json::Map::new();
    range.insert("range".to_string(), filter.time.range.to_string().into());
    if let Some(start) = filter.time.custom_start {
        range.insert("start".to_string(), start.to_string().into());
    }
    if let Some(end) = filter.time.custom_end {
        range.insert("end".to_string(), end.to_string().into());
    }
    serde_json::Value::Object(range).to_string()
}

/// Transaction create modal
pub async fn page_transaction_create(State(state): State<AppState>) -> Html<String> {
    let today = walletweb_core::today();
    let ledger = state.ledger.read().await;
    let category_options: String = ledger
        .categories()
        .iter()
        .map(|c| format!("<option value='{}'>", escape_html(c)))
        .collect();
    let account_options: String = ledger
        .accounts()
        .iter()
        .map(|a| format!("<option value='{}'>", escape_html(a)))
        .collect();
    drop(ledger);

    let type_options: String = TransactionType::ALL
        .iter()
        .map(|t| {
            format!(
                "<option value='{}'{}>{}</option>",
                t,
                if *t == TransactionType::Expense { " selected" } else { "" },
                t.label()
            )
        })
        .collect();
    let status_options: String = TransactionStatus::ALL
        .iter()
        .map(|s| format!("<option value='{}'>{}</option>", s, s.label()))
        .collect();

    Html(format!(
        r#"<div id='create-modal' class='fixed inset-0 bg-black bg-opacity-50 z-50 flex items-center justify-center' onclick='if(event.target.id === "create-modal") closeCreateModal()'>
    <div class='bg-white rounded-xl shadow-2xl w-full max-w-2xl max-h-[90vh] overflow-y-auto p-6'>
        <div class='flex items-center justify-between mb-4'>
            <h2 class='text-xl font-bold'>New Transaction</h2>
            <button onclick='closeCreateModal()' class='text-gray-500 hover:text-gray-700'>✕</button>
        </div>
        <form hx-post='/transactions' hx-target='#create-result' hx-swap='innerHTML' class='space-y-4'>
            <div class='grid grid-cols-3 gap-4'>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Date</label>
                    <input type='date' name='date' value='{}' required class='w-full px-3 py-2 border rounded-lg'></div>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Type</label>
                    <select name='type' class='w-full px-3 py-2 border rounded-lg'>{}</select></div>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Status</label>
                    <select name='status' class='w-full px-3 py-2 border rounded-lg'>{}</select></div>
            </div>
            <div><label class='block text-sm font-medium text-gray-700 mb-1'>Description</label>
                <input type='text' name='description' required class='w-full px-3 py-2 border rounded-lg' placeholder='What was it for?'></div>
            <div class='grid grid-cols-3 gap-4'>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Amount</label>
                    <input type='text' name='amount' inputmode='decimal' required class='w-full px-3 py-2 border rounded-lg' placeholder='0.00'></div>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Category</label>
                    <input type='text' name='category' list='category-options' class='w-full px-3 py-2 border rounded-lg'>
                    <datalist id='category-options'>{}</datalist></div>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Account</label>
                    <input type='text' name='account' list='account-options' class='w-full px-3 py-2 border rounded-lg'>
                    <datalist id='account-options'>{}</datalist></div>
            </div>
            <div><label class='block text-sm font-medium text-gray-700 mb-1'>Tags</label>
                <input type='text' name='tags' class='w-full px-3 py-2 border rounded-lg' placeholder='comma, separated'></div>
            <div class='flex items-center gap-4'>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Save</button>
                <button type='button' onclick='closeCreateModal()' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</button>
            </div>
        </form>
        <div id='create-result' class='mt-4'></div>
    </div>
</div>
<script>
function closeCreateModal() {{
    const modal = document.getElementById('create-modal');
    if (modal) {{ modal.remove(); }}
}}
document.addEventListener('keydown', function(e) {{
    if (e.key === 'Escape') closeCreateModal();
}});
</script>"#,
        today, type_options, status_options, category_options, account_options
    ))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_page_keeps_filters() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/transactions?types=expense&q=rent", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("value='rent'"));
        assert!(html.contains("value='expense' checked"));
        assert!(html.contains("2 active"));
        assert!(html.contains("hx-get='/transactions/list?range=all&types=expense&q=rent'"));
    }

    #[tokio::test]
    async fn test_page_shows_recent_searches() {
        let (app, state, _dir) = app_with_state().await;
        state.ledger.write().await.record_search("coffee").await.unwrap();
        let html = body_string(send(&app, Method::GET, "/transactions", None).await).await;
        assert!(html.contains("data-term='coffee'"));
    }

    #[tokio::test]
    async fn test_create_modal() {
        let (app, _, _dir) = app_with_state().await;
        let html = body_string(send(&app, Method::GET, "/transactions/create", None).await).await;
        assert!(html.contains("New Transaction"));
        assert!(html.contains("<option value='Groceries'>"));
        assert!(html.contains("<option value='expense' selected>"));
    }
}
