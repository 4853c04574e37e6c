//! Dashboard module
//!
//! Provides an overview page with counts and totals per status, upcoming and overdue
//! cheques, the clients with the most rejections and a chart of amounts per due month.

mod charts;
mod handlers;
mod stats;
mod tables;

pub use handlers::get_dashboard_page;
