//! Dashboard module
//!
//! Provides an overview page showing the user's balance, a summary of the
//! selected period, charts and the latest transactions.

mod aggregation;
mod cards;
mod charts;
mod handlers;
mod queries;
mod tables;

pub use handlers::get_dashboard_page;
