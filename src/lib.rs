//! Expense tracking for a fixed set of college cost centers.
//!
//! Each college owns an append-only expense feed; a dashboard view per
//! session mirrors the feed, filters it by date, month, or year, and
//! accepts new entries with an optional hosted receipt image. An admin
//! rollup sums every college's feed. Access runs through short-lived
//! bearer sessions issued against a pluggable credential check.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod filter;
pub mod http;
pub mod image;
pub mod model;
pub mod rollup;
pub mod session;
pub mod store;

pub use config::Config;
pub use http::{router, spawn_session_sweeper, AppState};
