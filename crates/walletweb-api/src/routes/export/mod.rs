//! Export routes - Report dialog, generation, history, downloads and sharing
//!
//! The dialog is driven by the export session: generating starts a
//! background run and the status fragment polls until it settles.
//!
//! Structure:
//! - api.rs: Generation control, downloads, share links, JSON history
//! - page.rs: Export dialog, history and report pages

pub mod api;
pub mod page;

pub use api::{
    api_export_status, api_reports, htmx_export_cancel, htmx_export_dismiss, htmx_export_generate,
    htmx_export_status, htmx_report_share, report_download,
};
pub use page::{page_export, page_export_history, page_report, page_shared_report};
