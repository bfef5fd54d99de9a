#![forbid(unsafe_code)]

//! Core domain model and business logic for the lift log.
//!
//! This crate provides:
//! - Domain types (log entries, lifts, day groups, selection policy)
//! - Strength-index estimation
//! - Per-day aggregation, ranking and date-range filtering
//! - CSV / XLSX export projection
//! - Exercise catalog
//! - Persistence (JSONL entry store) and history loading

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod estimate;
pub mod aggregate;
pub mod export;
pub mod store;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{get_default_catalog, Catalog};
pub use config::Config;
pub use estimate::estimate;
pub use aggregate::{aggregate, filter_by_range, AggregateOptions, DayRange};
pub use export::{export, ExportFormat, ExportTable};
pub use store::{EntryStore, JsonlStore};
pub use history::load_history;
