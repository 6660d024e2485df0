//! # mockprep-core
//!
//! Core library for mockprep - a mock interview practice backend.
//!
//! This library provides:
//! - Domain types for users, attempts and difficulty tiers
//! - The interviewer/profession catalog
//! - Database storage layer with SQLite
//! - Recommendation and statistics analytics over attempt history
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use mockprep_core::{analytics, Catalog, Config, Database, UserId};
//!
//! let config = Config::load().expect("failed to load config");
//! let catalog = Catalog::load(&config.catalog).expect("failed to load catalog");
//!
//! let db = Database::open(&config.resolved_database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! let user = UserId::parse("alice").expect("invalid user id");
//! let next = analytics::recommend(&db, &catalog, &user).expect("recommendation failed");
//! println!("{}", next.message);
//! ```

// Re-export commonly used items at the crate root
pub use catalog::Catalog;
pub use config::Config;
pub use db::{AttemptFilter, Database};
pub use error::{Error, ErrorKind, Result};
pub use store::AttemptStore;
pub use types::*;

// Public modules
pub mod analytics;
pub mod attempts;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod store;
pub mod types;
