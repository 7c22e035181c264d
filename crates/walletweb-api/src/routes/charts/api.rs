//! Chart API endpoints

use crate::error::{ApiError, ApiResult};
use crate::routes::query::filter_from_params;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;
use std::collections::HashMap;
use std::str::FromStr;
use walletweb_core::charts::{category_chart, monthly_chart};
use walletweb_core::{ChartData, Transaction, TransactionType};

pub(crate) async fn selection(state: &AppState, params: &HashMap<String, String>) -> ApiResult<Vec<Transaction>> {
    let filter = filter_from_params(params, state.config.time_range.default_range)?;
    let ledger = state.ledger.read().await;
    Ok(ledger.query(&filter, walletweb_core::today())?)
}

/// Category pie chart; `kind` picks income or expense (default expense)
pub async fn api_category_chart(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ChartData>> {
    let kind = match params.get("kind") {
        Some(k) => TransactionType::from_str(k).map_err(ApiError::bad_request)?,
        None => TransactionType::Expense,
    };
    if kind == TransactionType::Transfer {
        return Err(ApiError::bad_request("Transfers have no category breakdown"));
    }
    let top_n = params
        .get("top")
        .and_then(|s| s.parse().ok())
        .unwrap_or(state.config.charts.top_items_count);

    let transactions = selection(&state, &params).await?;
    Ok(Json(category_chart(&transactions, kind, top_n, &state.config.currency.code)))
}

/// Monthly income against expense bar chart
pub async fn api_monthly_chart(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ChartData>> {
    let transactions = selection(&state, &params).await?;
    Ok(Json(monthly_chart(&transactions, &state.config.currency.code)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_category_chart() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/api/charts/categories?kind=income&top=2", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["title"], "Income by Category");
        assert_eq!(json["chart_type"], "pie");
        let labels = json["labels"].as_array().unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0], "Salary");
        assert_eq!(labels[2], "Other");
    }

    #[tokio::test]
    async fn test_category_chart_rejects_transfer() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/api/charts/categories?kind=transfer", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_monthly_chart() {
        let (app, _, _dir) = app_with_state().await;
        let response = send(&app, Method::GET, "/api/charts/monthly", None).await;
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["title"], "Monthly Cash Flow");
        assert_eq!(json["datasets"].as_array().unwrap().len(), 2);
        assert!(!json["labels"].as_array().unwrap().is_empty());
    }
}
