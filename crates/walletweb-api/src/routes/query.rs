//! Filter query strings
//!
//! Lists are comma separated (`types=income,expense`). Dates use
//! `YYYY-MM-DD`. Unknown keys are ignored.

use crate::error::ApiError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use walletweb_core::{DateRange, TransactionFilter, TransactionStatus, TransactionType};

fn param<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| params.get(*k))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
}

fn list<'a>(params: &'a HashMap<String, String>, keys: &[&str]) -> Vec<&'a str> {
    param(params, keys)
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

fn parse_list<T: FromStr<Err = String>>(params: &HashMap<String, String>, keys: &[&str]) -> Result<Vec<T>, ApiError> {
    list(params, keys)
        .into_iter()
        .map(|s| T::from_str(s).map_err(ApiError::bad_request))
        .collect()
}

fn parse_date(params: &HashMap<String, String>, keys: &[&str]) -> Result<Option<NaiveDate>, ApiError> {
    param(params, keys)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", v)))
        })
        .transpose()
}

fn parse_amount(params: &HashMap<String, String>, keys: &[&str]) -> Result<Option<Decimal>, ApiError> {
    param(params, keys)
        .map(|v| Decimal::from_str(v).map_err(|_| ApiError::bad_request(format!("Invalid amount '{}'", v))))
        .transpose()
}

/// Build a validated filter from query parameters
///
/// `range` falls back to `default_range`. A custom range needs `start`
/// and `end`.
pub fn filter_from_params(
    params: &HashMap<String, String>,
    default_range: DateRange,
) -> Result<TransactionFilter, ApiError> {
    let range = match param(params, &["range"]) {
        Some(r) => DateRange::from_str(r).map_err(ApiError::bad_request)?,
        None => default_range,
    };

    let mut filter = TransactionFilter::new()
        .with_range(range)
        .with_types(parse_list::<TransactionType>(params, &["types", "type"])?)
        .with_statuses(parse_list::<TransactionStatus>(params, &["statuses", "status"])?)
        .with_categories(list(params, &["categories", "category"]))
        .with_amount_range(
            parse_amount(params, &["min", "amount_min"])?,
            parse_amount(params, &["max", "amount_max"])?,
        )
        .with_search(param(params, &["q", "search"]).unwrap_or_default());

    filter.time.custom_start = parse_date(params, &["start", "custom_start"])?;
    filter.time.custom_end = parse_date(params, &["end", "custom_end"])?;

    filter.validate()?;
    Ok(filter)
}

/// Serialize a filter back to a query string (without the leading `?`)
pub fn filter_query_string(filter: &TransactionFilter) -> String {
    let mut parts = vec![format!("range={}", filter.time.range)];
    if filter.time.range == DateRange::Custom {
        if let Some(start) = filter.time.custom_start {
            parts.push(format!("start={}", start));
        }
        if let Some(end) = filter.time.custom_end {
            parts.push(format!("end={}", end));
        }
    }
    if !filter.types.is_empty() {
        let types: Vec<String> = filter.types.iter().map(|t| t.to_string()).collect();
        parts.push(format!("types={}", types.join(",")));
    }
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter.statuses.iter().map(|s| s.to_string()).collect();
        parts.push(format!("statuses={}", statuses.join(",")));
    }
    if !filter.categories.is_empty() {
        parts.push(format!("categories={}", urlencoding::encode(&filter.categories.join(","))));
    }
    if let Some(min) = filter.amount_min {
        parts.push(format!("min={}", min));
    }
    if let Some(max) = filter.amount_max {
        parts.push(format!("max={}", max));
    }
    if !filter.search.is_empty() {
        parts.push(format!("q={}", urlencoding::encode(&filter.search)));
    }
    parts.join("&")
}
