//! # UniData
//!
//! Aggregation pipeline behind the claims dashboard: normalize the uploaded
//! claims table, then derive summary facts, categorical breakdowns,
//! gap-filled monthly series and per-profile comparisons from it.
//!
//! ## Key Components
//! - [`loader`] - CSV ingestion and normalization
//! - [`summary`] - headline statistics
//! - [`aggregate`] - group-by-and-count with top-K truncation
//! - [`series`] - month-bucketed series over a fixed window
//! - [`profiles`] - cluster profile comparison
//! - [`render`] - one pure render pass per view

pub mod aggregate;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod profiles;
pub mod render;
pub mod series;
pub mod summary;
pub mod types;
pub mod util;

pub use error::{DashboardError, Result};
