//! Time range control routes
//!
//! Date range options, the range selector widget and the header clock.

use crate::routes::query::filter_query_string;
use axum::response::Html;
use axum::Json;
use chrono::Local;
use walletweb_core::{DateRange, TransactionFilter};

/// Available date range options (JSON API)
pub async fn api_date_ranges() -> Json<serde_json::Value> {
    let options: Vec<serde_json::Value> = DateRange::ALL
        .iter()
        .map(|r| serde_json::json!({ "value": r.to_string(), "label": r.label() }))
        .collect();
    Json(serde_json::Value::Array(options))
}

/// Current local time for the sidebar, refreshed by HTMX
pub async fn htmx_clock() -> Html<String> {
    Html(Local::now().format("%a %b %-d, %H:%M").to_string())
}

/// Date range selector that re-requests `path` into `#target`
///
/// Preset buttons keep the other filter criteria. The custom range form
/// submits start and end dates.
pub fn date_range_selector(path: &str, target: &str, filter: &TransactionFilter) -> String {
    let mut html = String::from("<div class='flex flex-wrap items-center gap-2'>");

    for range in DateRange::ALL.iter().filter(|r| **r != DateRange::Custom) {
        let mut preset = filter.clone();
        preset.time.range = *range;
        preset.time.custom_start = None;
        preset.time.custom_end = None;

        let class = if filter.time.range == *range {
            "bg-indigo-600 text-white"
        } else {
            "bg-white text-gray-600 hover:bg-gray-100"
        };
        html.push_str(&format!(
            "<button class='px-3 py-1 text-sm rounded-lg border {}' hx-get='{}?{}' hx-target='{}' hx-push-url='true'>{}</button>",
            class,
            path,
            filter_query_string(&preset),
            target,
            range.label()
        ));
    }

    let custom_class = if filter.time.range == DateRange::Custom {
        "border-indigo-600"
    } else {
        "border-gray-200"
    };
    html.push_str(&format!(
        "<form class='flex items-center gap-1 border rounded-lg px-2 py-1 {}' hx-get='{}' hx-target='{}' hx-push-url='true'>\
         <input type='hidden' name='range' value='custom'>\
         <input type='date' name='start' value='{}' class='text-sm' required>\
         <span class='text-gray-400 text-sm'>to</span>\
         <input type='date' name='end' value='{}' class='text-sm' required>\
         <button type='submit' class='text-sm text-indigo-600 px-2'>Apply</button></form>",
        custom_class,
        path,
        target,
        filter.time.custom_start.map(|d| d.to_string()).unwrap_or_default(),
        filter.time.custom_end.map(|d| d.to_string()).unwrap_or_default(),
    ));

    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_selector_marks_active_range() {
        let filter = TransactionFilter::new().with_range(DateRange::LastMonth);
        let html = date_range_selector("/charts", "main", &filter);
        assert!(html.contains("bg-indigo-600 text-white' hx-get='/charts?range=last-month'"));
        assert!(html.contains("Current Year"));
        assert!(!html.contains("range=custom&"));
    }

    #[test]
    fn test_selector_keeps_custom_dates() {
        let filter = TransactionFilter::new().with_custom_range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let html = date_range_selector("/", "main", &filter);
        assert!(html.contains("value='2024-01-01'"));
        assert!(html.contains("border-indigo-600"));
    }

    #[tokio::test]
    async fn test_date_ranges_api() {
        let Json(value) = api_date_ranges().await;
        let options = value.as_array().unwrap();
        assert_eq!(options.len(), 5);
        assert_eq!(options[2]["value"], "last-3-months");
    }
}
