//! Database layer for mockprep
//!
//! This module provides the storage layer using SQLite with:
//! - Schema migrations
//! - Repository pattern for queries

pub mod repo;
pub mod schema;

pub use repo::{AttemptFilter, Database};
