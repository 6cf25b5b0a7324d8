//! Storeloom Core - Shared domain types.
//!
//! This crate provides the types shared by every Storeloom component:
//! - `import` - Bulk product CSV import pipeline
//! - `cli` - Command-line tools for previewing and running imports
//!
//! # Architecture
//!
//! Plain data with serde support. Nothing here does I/O, so both the import
//! library and the CLI can depend on it without pulling in a runtime.
//!
//! # Modules
//!
//! - [`types`] - Product ids, currency-aware prices, and product statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
