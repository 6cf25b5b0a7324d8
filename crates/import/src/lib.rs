//! Storeloom Import - bulk product CSV import pipeline.
//!
//! Turns an uploaded spreadsheet into validated product records and submits
//! them one at a time to a product store.
//!
//! # Pipeline
//!
//! ```text
//! text ─► reader::parse ─► format selection ─┬─► mapping + standard transform
//!                                            └─► platform grouping + reconstruction
//!                                                        │
//!                                    ImportReport ◄──────┘ ─► ImportRunner
//! ```
//!
//! Parsing and transformation are synchronous and never fail: problems are
//! collected as [`ImportError`] values next to whatever products could be
//! built. Only submission is async, behind the [`ProductRepository`] trait.
//!
//! # Modules
//!
//! - [`reader`] - Tokenizing CSV reader
//! - [`mapping`] - Column-mapping inference for generic spreadsheets
//! - [`standard`] - Row transformer and validator for generic spreadsheets
//! - [`platform`] - Shopify, WooCommerce and BigCommerce export dialects
//! - [`pipeline`] - Format selection and the [`prepare_import`] entry point
//! - [`runner`] - Sequential submission through a [`ProductRepository`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod coerce;
pub mod error;
pub mod mapping;
pub mod pipeline;
pub mod platform;
pub mod reader;
pub mod record;
pub mod runner;
pub mod standard;

pub use error::{ErrorLevel, ImportError, RepositoryError};
pub use mapping::{CanonicalField, ColumnMapping, detect_mapping};
pub use pipeline::{
    FileInspection, ImportBatch, ImportFormat, ImportOptions, ImportReport, inspect,
    prepare_import,
};
pub use platform::{Platform, detect_platform};
pub use reader::{RawTable, parse};
pub use record::{
    ImportRecord, PlatformImportBatch, PlatformProductRecord, StandardProductRecord,
    VariantOptionDefinition, VariantRecord,
};
pub use runner::{
    CreateAck, ImportProgress, ImportRunner, ImportSummary, ProductRepository, SubmissionFailure,
};
pub use standard::{StandardBatch, validate_and_transform};
