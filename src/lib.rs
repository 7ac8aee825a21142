//! Command-line client over the books database.
//!
//! Readers search, rate and shelve books and get naive content-based
//! recommendations; retailers inspect per-user and per-timeframe ratings.
//! The services in [`services`] take the catalog as an explicit
//! [`db::CatalogStore`] so they run the same against MySQL or the in-memory
//! fixture store.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use error::{AppError, AppResult};
