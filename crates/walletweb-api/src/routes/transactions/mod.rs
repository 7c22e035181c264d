//! Transaction routes - Transaction list, filters, search, create form
//!
//! Structure:
//! - api.rs: JSON API and HTMX endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{
    amount_color,
    api_transaction_detail,
    api_transactions,
    htmx_transaction_store,
    htmx_transactions_list,
    render_transaction_row,
};

pub use page::{page_transaction_create, page_transactions};
