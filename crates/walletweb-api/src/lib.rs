//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::transactions: Transaction list, filters, create form
//! - routes::charts: Category and monthly breakdowns
//! - routes::export: Export dialog, report history, downloads and share links
//! - routes::help: Help center and support contact form
//! - routes::searches: Recent search terms
//! - routes::settings: Configuration display
//! - routes::time: Date range selector and header clock

pub mod error;
pub mod routes;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use walletweb_config::Config;
use walletweb_core::format::format_money;
use walletweb_core::{category_breakdown, Ledger, SessionRef, TransactionType};
use walletweb_utils::escape_html;

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<Ledger>>,
    pub session: SessionRef,
    pub config: Config,
}

impl AppState {
    /// Build state around a ledger; the export session handle is taken from it
    pub async fn new(config: Config, ledger: Arc<RwLock<Ledger>>) -> Self {
        let session = ledger.read().await.export_session();
        Self { ledger, session, config }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::charts::{api_category_chart, api_monthly_chart, page_charts};
    use routes::export::{
        api_export_status, api_reports, htmx_export_cancel, htmx_export_dismiss, htmx_export_generate, htmx_export_status,
        htmx_report_share, page_export, page_export_history, page_report, page_shared_report, report_download,
    };
    use routes::help::{htmx_contact_submit, page_help};
    use routes::searches::{api_searches, api_searches_clear, api_searches_record};
    use routes::settings::{api_settings, page_settings};
    use routes::time::{api_date_ranges, htmx_clock};
    use routes::transactions::{
        api_transaction_detail, api_transactions, htmx_transaction_store, htmx_transactions_list,
        page_transaction_create, page_transactions,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/transactions", get(api_transactions))
        .route("/api/transactions/:id", get(api_transaction_detail))
        .route("/api/summary", get(api_summary))
        .route("/api/charts/categories", get(api_category_chart))
        .route("/api/charts/monthly", get(api_monthly_chart))
        .route("/api/searches", get(api_searches).post(api_searches_record).delete(api_searches_clear))
        .route("/api/reports", get(api_reports))
        .route("/api/export/status", get(api_export_status))
        .route("/api/date-ranges", get(api_date_ranges))
        .route("/api/reload", post(api_reload))
        .route("/api/settings", get(api_settings))
        // HTML pages
        .route("/", get(index_page))
        .route("/dashboard", get(page_dashboard))
        .route("/transactions", get(page_transactions).post(htmx_transaction_store))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/create", get(page_transaction_create))
        .route("/charts", get(page_charts))
        .route("/export", get(page_export))
        .route("/export/generate", post(htmx_export_generate))
        .route("/export/status", get(htmx_export_status))
        .route("/export/cancel", post(htmx_export_cancel))
        .route("/export/dismiss", post(htmx_export_dismiss))
        .route("/export/history", get(page_export_history))
        .route("/reports/:id", get(page_report))
        .route("/reports/:id/download", get(report_download))
        .route("/reports/:id/share", post(htmx_report_share))
        .route("/share/:token", get(page_shared_report))
        .route("/help", get(page_help))
        .route("/help/contact", post(htmx_contact_submit))
        .route("/settings", get(page_settings))
        .route("/clock", get(htmx_clock))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Summary of the filtered selection (JSON API)
async fn api_summary(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<walletweb_core::Summary>> {
    let filter = routes::query::filter_from_params(&params, state.config.time_range.default_range)?;
    let ledger = state.ledger.read().await;
    Ok(Json(ledger.summary(&filter, walletweb_core::today())?))
}

/// Reload ledger API endpoint
async fn api_reload(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let mut ledger = state.ledger.write().await;
    let count = ledger.reload().await?;
    log::info!("Reloaded {} transactions", count);
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Reloaded {} transactions", count),
        "count": count
    })))
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Walletweb</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Dashboard", "dashboard"),
        ("/transactions", "Transactions", "transactions"),
        ("/charts", "Charts", "charts"),
        ("/export", "Export", "export"),
        ("/help", "Help", "help"),
        ("/settings", "Settings", "settings"),
    ];

    let mut nav = String::from(
        "<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>Walletweb</h1>\
         <p class='text-xs text-gray-400' hx-get='/clock' hx-trigger='load, every 60s'></p></div><ul class='flex-1 py-2 space-y-1 px-2'>",
    );

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/" || current_path == "/dashboard"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "transactions" => "📋",
            "charts" => "📈",
            "export" => "📤",
            "help" => "❓",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#, inner_content)
    } else {
        base_html(
            title,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Inline alert box
pub fn alert_html(kind: &str, message: &str) -> String {
    let classes = match kind {
        "success" => "bg-green-50 border-green-200 text-green-700",
        "warning" => "bg-yellow-50 border-yellow-200 text-yellow-700",
        _ => "bg-red-50 border-red-200 text-red-700",
    };
    format!(
        "<div class='p-3 rounded-lg border {}'>{}</div>",
        classes,
        escape_html(message)
    )
}

/// Dashboard
async fn index_page(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    render_dashboard(state, headers, params, "/").await
}

/// Dashboard page (alias for index)
async fn page_dashboard(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> ApiResult<Html<String>> {
    render_dashboard(state, headers, params, "/dashboard").await
}

async fn render_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    path: &str,
) -> ApiResult<Html<String>> {
    let filter = routes::query::filter_from_params(&params, state.config.time_range.default_range)?;
    let currency = &state.config.currency;
    let today = walletweb_core::today();

    let ledger = state.ledger.read().await;
    let selected = ledger.query(&filter, today)?;
    let summary = walletweb_core::summarize(&selected);

    let mut recent = selected.clone();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    let recent_rows: String = recent
        .iter()
        .take(5)
        .map(|tx| {
            format!(
                "<div class='flex justify-between py-2 border-b'><div><p class='font-medium'>{}</p><p class='text-xs text-gray-500'>{} · {}</p></div><span class='font-medium {}'>{}</span></div>",
                escape_html(&tx.description),
                tx.date,
                escape_html(&tx.category),
                routes::transactions::amount_color(tx.kind),
                tx.display_amount(currency)
            )
        })
        .collect();

    let top_categories: String = category_breakdown(&selected, TransactionType::Expense)
        .iter()
        .take(state.config.charts.top_items_count)
        .map(|b| {
            format!(
                "<div class='py-1'><div class='flex justify-between text-sm'><span>{}</span><span>{} ({:.1}%)</span></div>\
                 <div class='h-2 bg-gray-100 rounded'><div class='h-2 bg-indigo-500 rounded' style='width:{:.1}%'></div></div></div>",
                escape_html(&b.category),
                format_money(b.amount, currency),
                b.percentage,
                b.percentage
            )
        })
        .collect();

    let empty_note = if selected.is_empty() {
        "<p class='text-gray-500 text-center py-6'>No transactions in this period</p>"
    } else {
        ""
    };
    let demo_note = match (ledger.load_error(), ledger.is_demo()) {
        (Some(error), _) => alert_html(
            "error",
            &format!("Could not load {}: {}. Fix the file and use Reload.", state.config.dataset_path().display(), error),
        ),
        (None, true) => alert_html(
            "warning",
            "Showing demo data. Add a dataset file to the data directory to see your own transactions.",
        ),
        (None, false) => String::new(),
    };

    let inner_content = format!(
        r#"<div class='flex items-center justify-between mb-6'><h2 class='text-2xl font-bold'>Dashboard</h2>{}</div>
        <div class='mb-4'>{}</div>
        <div class='grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Income</p><p class='text-2xl font-bold text-green-700'>{}</p><p class='text-xs text-green-600'>{} transactions</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Expenses</p><p class='text-2xl font-bold text-red-700'>{}</p><p class='text-xs text-red-600'>{} transactions</p></div>
            <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Net Flow</p><p class='text-2xl font-bold {}'>{}</p></div>
            <div class='bg-yellow-50 p-4 rounded-lg border border-yellow-200'><p class='text-sm text-yellow-600'>Transactions</p><p class='text-2xl font-bold text-yellow-700'>{}</p><p class='text-xs text-yellow-600'>{} categories · {}</p></div>
        </div>
        <div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Recent Transactions</h3>
                <div class='space-y-1'>{}{}</div>
                <a href='/transactions' class='block mt-4 text-sm text-indigo-600'>View all</a>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Spending by Category</h3>
                <div class='space-y-2'>{}{}</div>
            </div>
        </div>"#,
        routes::time::date_range_selector(path, "main", &filter),
        demo_note,
        format_money(summary.total_income, currency),
        summary.income_count,
        format_money(summary.total_expense, currency),
        summary.expense_count,
        if summary.net_flow.is_sign_negative() { "text-red-600" } else { "text-green-600" },
        format_money(summary.net_flow, currency),
        summary.total_count,
        summary.category_count,
        summary.period_label(),
        recent_rows,
        empty_note,
        top_categories,
        empty_note
    );

    Ok(Html(page_response(&headers, "Dashboard", path, &inner_content)))
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
pub async fn start_server(config: Config, ledger: Arc<RwLock<Ledger>>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, ledger).await;
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Walletweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /transactions (Transaction list)");
    log::info!("  - /charts (Charts)");
    log::info!("  - /export (Report export)");
    log::info!("  - /help (Help center)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request, Response};
    use tower::util::ServiceExt;
    use walletweb_parser::DefaultDatasetParser;

    /// App over demo data dated relative to `today`, with instant export
    pub async fn app_with_state() -> (Router, AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data.path = dir.path().to_path_buf();
        config.export.generation_delay_ms = 0;

        let mut ledger = Ledger::new(config.clone(), Arc::new(DefaultDatasetParser));
        ledger.load_demo(walletweb_core::today()).unwrap();
        let state = AppState::new(config, Arc::new(RwLock::new(ledger))).await;
        (create_router(state.clone()), state, dir)
    }

    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<(&str, String)>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some((content_type, content)) => {
                builder = builder.header("content-type", content_type);
                Body::from(content)
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn test_dashboard_full_and_partial() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_string(response).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Net Flow"));
        assert!(html.contains("demo data"));

        let request = axum::http::Request::builder()
            .uri("/dashboard?range=last-month")
            .header("hx-request", "true")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = tower::util::ServiceExt::oneshot(app, request).await.unwrap();
        let html = body_string(response).await;
        assert!(!html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Recent Transactions"));
    }

    #[tokio::test]
    async fn test_summary_api() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/api/summary?types=expense", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["income_count"], 0);
        assert!(json["expense_count"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_summary_rejects_reversed_custom_range() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(
            &app,
            Method::GET,
            "/api/summary?range=custom&start=2024-02-01&end=2024-01-01",
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_reload_demo() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::POST, "/api/reload", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["success"], true);
    }

    #[tokio::test]
    async fn test_dashboard_reports_broken_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("transactions.json"), "{not json").unwrap();
        let mut config = walletweb_config::Config::default();
        config.data.path = dir.path().to_path_buf();

        let mut ledger = walletweb_core::Ledger::new(config.clone(), std::sync::Arc::new(walletweb_parser::DefaultDatasetParser));
        ledger.load_configured(walletweb_core::today()).await.unwrap();
        let state = crate::AppState::new(config, std::sync::Arc::new(tokio::sync::RwLock::new(ledger))).await;
        let app = crate::create_router(state);

        let html = body_string(send(&app, Method::GET, "/dashboard", None).await).await;
        assert!(html.contains("Could not load"));
        assert!(html.contains("Recent Transactions"));
    }

    #[tokio::test]
    async fn test_clock() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/clock", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!body_string(response).await.is_empty());
    }
}
