//! Export API endpoints - generation control and report delivery
//!
//! Endpoints:
//! - htmx_export_generate: Start generating (HTML fragment)
//! - htmx_export_status: Current dialog state (HTML fragment, polled)
//! - htmx_export_cancel / htmx_export_dismiss: Leave the running or finished state
//! - htmx_report_share: Share link for a report (HTML fragment)
//! - report_download: Rendered report file
//! - api_reports / api_export_status: JSON views of history and state

use crate::error::{ApiError, ApiResult};
use crate::routes::query::filter_from_params;
use crate::{alert_html, AppState};
use axum::extract::{Form, Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::str::FromStr;
use walletweb_config::CurrencyConfig;
use walletweb_core::format::format_money;
use walletweb_core::{render_report, start_export, CoreError, ExportFormat, ExportOptions, ExportState, ReportDescriptor};
use walletweb_utils::escape_html;

/// Dialog toggles from the submitted form. Unchecked boxes are absent.
pub fn options_from_form(form: &HashMap<String, String>) -> ApiResult<ExportOptions> {
    let format = match form.get("format").map(|f| f.trim()).filter(|f| !f.is_empty()) {
        Some(f) => ExportFormat::from_str(f).map_err(ApiError::bad_request)?,
        None => ExportFormat::default(),
    };
    Ok(ExportOptions {
        format,
        include_charts: form.contains_key("include_charts"),
        include_details: form.contains_key("include_details"),
        include_insights: form.contains_key("include_insights"),
    })
}

/// Compact report card used by the dialog and the history page
pub fn report_card(report: &ReportDescriptor, currency: &CurrencyConfig) -> String {
    format!(
        r#"<div class='border rounded-lg p-4'>
            <div class='flex items-center justify-between'>
                <div>
                    <a href='/reports/{}' class='font-medium text-indigo-600 hover:underline'>{}</a>
                    <p class='text-xs text-gray-500'>{} · {} · {} transactions · {}</p>
                </div>
                <span class='text-sm {}'>{}</span>
            </div>
        </div>"#,
        escape_html(&report.id),
        escape_html(&report.name),
        report.format.label(),
        report.created_at.format("%Y-%m-%d %H:%M"),
        report.transaction_count,
        report.size_estimate,
        if report.stats.net_flow.is_sign_negative() { "text-red-600" } else { "text-green-600" },
        format_money(report.stats.net_flow, currency)
    )
}

/// Status fragment for the export dialog
///
/// While generating it polls itself every second; the settled states stop
/// polling by leaving the trigger out.
pub fn render_status(state: &ExportState, currency: &CurrencyConfig, notice: Option<String>) -> String {
    let notice = notice.unwrap_or_default();
    match state {
        ExportState::Idle => format!(
            "<div id='export-status'>{}<p class='text-sm text-gray-500'>Choose a format and options, then generate the report.</p></div>",
            notice
        ),
        ExportState::Generating { options, .. } => format!(
            r#"<div id='export-status' hx-get='/export/status' hx-trigger='every 1s' hx-swap='outerHTML'>{}
                <div class='flex items-center gap-3'>
                    <div class='animate-spin rounded-full h-5 w-5 border-b-2 border-indigo-600'></div>
                    <span>Generating {} report...</span>
                    <button hx-post='/export/cancel' hx-target='#export-status' hx-swap='outerHTML'
                        class='ml-auto px-3 py-1 text-sm border rounded-lg hover:bg-gray-50'>Cancel</button>
                </div>
            </div>"#,
            notice,
            options.format.label()
        ),
        ExportState::Ready { report } => format!(
            r#"<div id='export-status' class='space-y-3'>{}
                {}
                <div class='flex flex-wrap gap-2'>
                    <a href='/reports/{}/download' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Download</a>
                    <button hx-post='/reports/{}/share' hx-target='#share-link' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Share</button>
                    <button hx-post='/export/dismiss' hx-target='#export-status' hx-swap='outerHTML' class='px-4 py-2 text-gray-500 hover:text-gray-700'>Dismiss</button>
                </div>
                <div id='share-link'></div>
            </div>"#,
            notice,
            report_card(report, currency),
            escape_html(&report.id),
            escape_html(&report.id)
        ),
        ExportState::Failed { message } => format!(
            r#"<div id='export-status' class='space-y-3'>{}{}
                <button hx-post='/export/dismiss' hx-target='#export-status' hx-swap='outerHTML' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Dismiss</button>
            </div>"#,
            notice,
            alert_html("error", &format!("Report generation failed: {}", message))
        ),
    }
}

async fn status_html(state: &AppState, notice: Option<String>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_status(session.state(), &state.config.currency, notice))
}

/// HTMX: Start generating a report for the submitted filters and options
pub async fn htmx_export_generate(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let prepared = options_from_form(&form).and_then(|options| {
        let filter = filter_from_params(&form, state.config.time_range.default_range)?;
        Ok((options, filter))
    });
    let (options, filter) = match prepared {
        Ok(p) => p,
        Err(e) => return status_html(&state, Some(alert_html("error", &e.to_string()))).await,
    };

    let transactions = {
        let ledger = state.ledger.read().await;
        match ledger.query(&filter, walletweb_core::today()) {
            Ok(t) => t,
            Err(e) => return status_html(&state, Some(alert_html("error", &e.to_string()))).await,
        }
    };

    log::info!(
        "Export requested: {} transactions as {} ({})",
        transactions.len(),
        options.format,
        filter.time.description()
    );

    let notice = match start_export(&state.session, transactions, options).await {
        Ok(_) => None,
        Err(CoreError::AlreadyGenerating) => Some(alert_html("warning", "A report is already being generated")),
        Err(e) => Some(alert_html("error", &e.to_string())),
    };
    status_html(&state, notice).await
}

/// HTMX: Current export state
pub async fn htmx_export_status(State(state): State<AppState>) -> Html<String> {
    status_html(&state, None).await
}

/// HTMX: Cancel the run in flight
pub async fn htmx_export_cancel(State(state): State<AppState>) -> Html<String> {
    let cancelled = state.session.lock().await.cancel();
    let notice = cancelled.then(|| alert_html("warning", "Report generation cancelled"));
    status_html(&state, notice).await
}

/// HTMX: Close a finished dialog
pub async fn htmx_export_dismiss(State(state): State<AppState>) -> Html<String> {
    state.session.lock().await.dismiss();
    status_html(&state, None).await
}

/// HTMX: Share link for a report
pub async fn htmx_report_share(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let link = state.ledger.read().await.share_report(&id).await?;
    log::info!("Shared report {}", id);
    Ok(Html(format!(
        r#"<div class='flex items-center gap-2'>
            <input type='text' readonly value='{}' id='share-input' class='flex-1 px-3 py-2 border rounded-lg text-sm bg-gray-50'>
            <button onclick='navigator.clipboard.writeText(document.getElementById("share-input").value)' class='px-3 py-2 text-sm border rounded-lg hover:bg-gray-50'>Copy</button>
        </div>"#,
        escape_html(&link)
    )))
}

/// Download a rendered report
pub async fn report_download(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let report = state.ledger.read().await.report(&id).await?;
    let body = render_report(&report)?;
    log::info!("Downloading report {} ({} bytes)", report.id, body.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, body.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", body.file_name),
            ),
        ],
        body.bytes,
    )
        .into_response())
}

/// Report history, newest first (JSON API)
pub async fn api_reports(State(state): State<AppState>) -> Json<Vec<ReportDescriptor>> {
    Json(state.ledger.read().await.export_history().await)
}

/// Export session state (JSON API)
pub async fn api_export_status(State(state): State<AppState>) -> Json<ExportState> {
    Json(state.session.lock().await.state().clone())
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::test_support::*;
    use crate::AppState;
    use axum::http::{Method, StatusCode};
    use axum::Router;

    const FORM: &str = "application/x-www-form-urlencoded";

    /// Poll the status fragment until the run settles
    pub(crate) async fn wait_for_settle(app: &Router) -> String {
        for _ in 0..200 {
            let html = body_string(send(app, Method::GET, "/export/status", None).await).await;
            if !html.contains("hx-trigger='every 1s'") {
                return html;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("export did not settle");
    }

    pub(crate) async fn generate(app: &Router, state: &AppState, body: &str) -> String {
        let response = send(app, Method::POST, "/export/generate", Some((FORM, body.to_string()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        wait_for_settle(app).await;
        state.session.lock().await.history().iter().next().unwrap().id.clone()
    }

    #[tokio::test]
    async fn test_generate_and_download_csv() {
        let (app, state, _dir) = app_with_state().await;
        let id = generate(&app, &state, "format=csv&include_details=on&include_insights=on&types=expense").await;

        let html = body_string(send(&app, Method::GET, "/export/status", None).await).await;
        assert!(html.contains("Download"));
        assert!(html.contains(&format!("/reports/{}/download", id)));

        let response = send(&app, Method::GET, &format!("/reports/{}/download", id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");
        assert!(response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"financial-report-"));
        let csv = body_string(response).await;
        assert!(csv.starts_with("date,description,category,account,type,amount,status,tags"));
        assert!(csv.contains("total_expense"));
        assert!(!csv.contains(",income,"));
    }

    #[tokio::test]
    async fn test_pdf_download_not_supported() {
        let (app, state, _dir) = app_with_state().await;
        let id = generate(&app, &state, "format=pdf&include_charts=on").await;
        let response = send(&app, Method::GET, &format!("/reports/{}/download", id), None).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_empty_selection_fails() {
        let (app, _, _dir) = app_with_state().await;
        let body = "format=csv&range=custom&start=1990-01-01&end=1990-01-02".to_string();
        send(&app, Method::POST, "/export/generate", Some((FORM, body))).await;
        let html = wait_for_settle(&app).await;
        assert!(html.contains("Report generation failed"));

        let html = body_string(send(&app, Method::POST, "/export/dismiss", None).await).await;
        assert!(html.contains("Choose a format"));
    }

    #[tokio::test]
    async fn test_invalid_format_is_reported_inline() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::POST, "/export/generate", Some((FORM, "format=docx".to_string()))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("Unsupported export format"));
    }

    #[tokio::test]
    async fn test_cancel_and_double_start() {
        let (app, mut state, _dir) = app_with_state().await;
        // Slow session so the run is still in flight
        state.session = walletweb_core::ExportSession::new(std::time::Duration::from_secs(60), 5).shared();
        let app_slow = crate::create_router(state.clone());
        drop(app);

        let html = body_string(send(&app_slow, Method::POST, "/export/generate", Some((FORM, "format=csv".to_string()))).await).await;
        assert!(html.contains("Generating CSV report"));

        let html = body_string(send(&app_slow, Method::POST, "/export/generate", Some((FORM, "format=pdf".to_string()))).await).await;
        assert!(html.contains("already being generated"));

        let html = body_string(send(&app_slow, Method::POST, "/export/cancel", None).await).await;
        assert!(html.contains("cancelled"));
        assert!(html.contains("Choose a format"));
        assert!(state.session.lock().await.history().is_empty());
    }

    #[tokio::test]
    async fn test_share_and_history() {
        let (app, state, _dir) = app_with_state().await;
        let id = generate(&app, &state, "format=csv").await;

        let html = body_string(send(&app, Method::POST, &format!("/reports/{}/share", id), None).await).await;
        assert!(html.contains(&format!("/share/{}-", id)));

        let response = send(&app, Method::POST, "/reports/nope/share", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, Method::GET, "/api/reports", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json[0]["id"], id.as_str());
        assert_eq!(json[0]["format"], "csv");

        let response = send(&app, Method::GET, "/api/export/status", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["state"], "ready");
    }
}
