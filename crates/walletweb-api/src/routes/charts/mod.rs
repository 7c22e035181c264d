//! Chart routes - Category and monthly breakdowns
//!
//! Structure:
//! - api.rs: Chart data as JSON (consumed by Chart.js)
//! - page.rs: Charts page with tables as a fallback

pub mod api;
pub mod page;

pub use api::{api_category_chart, api_monthly_chart};
pub use page::page_charts;
