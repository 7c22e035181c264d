//! Settings page rendering - Full page endpoints

use crate::AppState;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use walletweb_core::DataSource;
use walletweb_utils::escape_html;

fn setting(label: &str, value: &str) -> String {
    format!(
        "<div><p class='text-sm text-gray-500'>{}</p><p class='font-medium'>{}</p></div>",
        label,
        escape_html(value)
    )
}

pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = &state.config;
    let (source, count) = {
        let ledger = state.ledger.read().await;
        let source = match ledger.source() {
            DataSource::Empty => "Nothing loaded".to_string(),
            DataSource::Demo => "Demo data".to_string(),
            DataSource::Dataset(path) => path.display().to_string(),
        };
        (source, ledger.transaction_count())
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Data</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Export</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}</div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Display</h3>
            <div class='grid grid-cols-2 gap-4'>{}{}{}{}{}</div>
        </div>"#,
        setting("Host", &config.server.host),
        setting("Port", &config.server.port.to_string()),
        setting("Data directory", &config.data.path.display().to_string()),
        setting("Dataset", &config.data.dataset),
        setting("Loaded from", &source),
        setting("Transactions", &count.to_string()),
        setting("Generation delay", &format!("{} ms", config.export.generation_delay_ms)),
        setting("History size", &config.export.history_capacity.to_string()),
        setting("Share base URL", &config.export.share_base_url),
        setting("Currency", &format!("{} ({})", config.currency.code, config.currency.symbol)),
        setting("Default date range", config.time_range.default_range.label()),
        setting("Records per page", &config.pagination.records_per_page.to_string()),
        setting("Recent searches kept", &config.search.recent_capacity.to_string()),
        setting("Log level", &config.logging.level),
    );

    Html(crate::page_response(&headers, "Settings", "/settings", &inner_content))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::Method;

    #[tokio::test]
    async fn test_settings_page() {
        let (app, _, _dir) = app_with_state().await;
        let html = body_string(send(&app, Method::GET, "/settings", None).await).await;
        assert!(html.contains("Demo data"));
        assert!(html.contains("All Time"));
    }
}
