//! Charts page rendering

use crate::error::ApiResult;
use crate::routes::query::{filter_from_params, filter_query_string};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use walletweb_config::CurrencyConfig;
use walletweb_core::charts::palette_color;
use walletweb_core::format::{format_money, format_percent};
use walletweb_core::{category_breakdown, monthly_series, Transaction, TransactionType};
use walletweb_utils::escape_html;

fn breakdown_table(transactions: &[Transaction], kind: TransactionType, currency: &CurrencyConfig) -> String {
    let rows = category_breakdown(transactions, kind);
    if rows.is_empty() {
        return "<p class='text-gray-500 text-center py-6'>No data for this period</p>".to_string();
    }
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, b)| {
            format!(
                "<tr class='border-b'><td class='py-2'><span class='inline-block w-3 h-3 rounded-full mr-2' style='background:{}'></span>{}</td>\
                 <td class='py-2 text-right'>{}</td><td class='py-2 text-right'>{}</td><td class='py-2 text-right text-gray-500'>{}</td></tr>",
                palette_color(i),
                escape_html(&b.category),
                b.count,
                format_money(b.amount, currency),
                format_percent(b.percentage)
            )
        })
        .collect();
    format!(
        "<table class='w-full text-sm'><thead><tr class='text-gray-500 border-b'><th class='text-left py-2'>Category</th>\
         <th class='text-right py-2'>Count</th><th class='text-right py-2'>Amount</th><th class='text-right py-2'>Share</th></tr></thead><tbody>{}</tbody></table>",
        body
    )
}

fn monthly_table(transactions: &[Transaction], currency: &CurrencyConfig) -> String {
    let series = monthly_series(transactions);
    if series.is_empty() {
        return "<p class='text-gray-500 text-center py-6'>No data for this period</p>".to_string();
    }
    let body: String = series
        .iter()
        .rev()
        .map(|m| {
            format!(
                "<tr class='border-b'><td class='py-2'>{}</td><td class='py-2 text-right text-green-600'>{}</td>\
                 <td class='py-2 text-right text-red-600'>{}</td><td class='py-2 text-right font-medium'>{}</td></tr>",
                m.month,
                format_money(m.income, currency),
                format_money(m.expense, currency),
                format_money(m.net, currency)
            )
        })
        .collect();
    format!(
        "<table class='w-full text-sm'><thead><tr class='text-gray-500 border-b'><th class='text-left py-2'>Month</th>\
         <th class='text-right py-2'>Income</th><th class='text-right py-2'>Expenses</th><th class='text-right py-2'>Net</th></tr></thead><tbody>{}</tbody></table>",
        body
    )
}

/// Charts page - category pies and monthly cash flow for the selected range
pub async fn page_charts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    let filter = filter_from_params(&params, state.config.time_range.default_range)?;
    let transactions = super::api::selection(&state, &params).await?;
    let currency = &state.config.currency;
    let query = filter_query_string(&filter);

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'><h2 class='text-2xl font-bold'>Charts</h2>{}</div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6 mb-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Expenses by Category</h3>
                <canvas id='expense-chart' height='220'></canvas>
                <div class='mt-4'>{}</div>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Income by Category</h3>
                <canvas id='income-chart' height='220'></canvas>
                <div class='mt-4'>{}</div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Monthly Cash Flow</h3>
            <canvas id='monthly-chart' height='120'></canvas>
            <div class='mt-4'>{}</div>
        </div>
        <script>
        (function() {{
            if (typeof Chart === 'undefined') return;
            const legend = {};
            function render(id, url) {{
                fetch(url).then(r => r.json()).then(data => {{
                    const el = document.getElementById(id);
                    if (!el || !data.labels.length) return;
                    const pie = data.chart_type === 'pie';
                    new Chart(el, {{
                        type: data.chart_type,
                        data: {{
                            labels: data.labels,
                            datasets: pie
                                ? [{{ label: data.title, data: data.data_points.map(p => p.value), backgroundColor: data.data_points.map(p => p.color) }}]
                                : data.datasets.map(d => ({{ label: d.label, data: d.data, backgroundColor: d.background_color }}))
                        }},
                        options: {{ plugins: {{ legend: {{ display: legend }} }} }}
                    }});
                }});
            }}
            render('expense-chart', '/api/charts/categories?kind=expense&{}');
            render('income-chart', '/api/charts/categories?kind=income&{}');
            render('monthly-chart', '/api/charts/monthly?{}');
        }})();
        </script>"#,
        crate::routes::time::date_range_selector("/charts", "main", &filter),
        breakdown_table(&transactions, TransactionType::Expense, currency),
        breakdown_table(&transactions, TransactionType::Income, currency),
        monthly_table(&transactions, currency),
        state.config.charts.show_legend,
        query,
        query,
        query,
    );

    Ok(Html(crate::page_response(&headers, "Charts", "/charts", &inner_content)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_charts_page() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/charts?range=current-year", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("Expenses by Category"));
        assert!(html.contains("/api/charts/monthly?range=current-year"));
    }

    #[tokio::test]
    async fn test_charts_page_empty_period() {
        let (app, _, _dir) = app_with_state().await;
        let html = body_string(
            send(&app, Method::GET, "/charts?range=custom&start=1990-01-01&end=1990-01-31", None).await,
        )
        .await;
        assert!(html.contains("No data for this period"));
    }
}
