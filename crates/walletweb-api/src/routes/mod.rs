//! Route modules for the API server
//!
//! Each feature module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering
//!
//! `query` holds the shared filter query-string handling.

pub mod charts;
pub mod export;
pub mod help;
pub mod query;
pub mod searches;
pub mod settings;
pub mod time;
pub mod transactions;
