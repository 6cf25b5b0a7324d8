//! Shared fixtures for the import integration tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storeloom-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `import_pipeline` - File to records, one test group per format
//! - `import_runner` - Records to repository, failures and cancellation

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use storeloom_core::ProductId;
use storeloom_import::{
    CreateAck, ImportOptions, ImportRecord, ImportReport, ProductRepository, RepositoryError,
    prepare_import,
};

/// Generic spreadsheet with one bad row and two bad values.
pub const STANDARD_CSV: &str = include_str!("../fixtures/standard_products.csv");

/// Shopify export: a three-variant tee, a gift card and an archived hat.
pub const SHOPIFY_CSV: &str = include_str!("../fixtures/shopify_products.csv");

/// WooCommerce export: two variable products, two simple ones and a keyless row.
pub const WOOCOMMERCE_CSV: &str = include_str!("../fixtures/woocommerce_products.csv");

/// BigCommerce export: a product with SKU rows, a digital guide and a bottle.
pub const BIGCOMMERCE_CSV: &str = include_str!("../fixtures/bigcommerce_products.csv");

/// Prepare `content` with default options (auto-detect, USD).
#[must_use]
pub fn prepare(content: &str) -> ImportReport {
    prepare_import(content, &ImportOptions::default())
}

/// Find a prepared record by product name.
#[must_use]
pub fn record_named<'a>(report: &'a ImportReport, name: &str) -> Option<&'a ImportRecord> {
    report.products.iter().find(|record| record.name() == name)
}

/// In-memory product store that records every create call.
///
/// Products named in `reject` fail with [`RepositoryError::Rejected`];
/// everything else is stored and acknowledged with a sequential id.
#[derive(Debug, Default)]
pub struct RecordingRepository {
    reject: Vec<String>,
    created: Mutex<Vec<String>>,
}

impl RecordingRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse the named products.
    #[must_use]
    pub fn rejecting(names: &[&str]) -> Self {
        Self {
            reject: names.iter().map(ToString::to_string).collect(),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Names of the products created so far, in call order.
    #[must_use]
    pub fn created(&self) -> Vec<String> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }
}

impl ProductRepository for RecordingRepository {
    async fn create(&self, record: &ImportRecord) -> Result<CreateAck, RepositoryError> {
        let name = record.name();
        if self.reject.iter().any(|rejected| rejected == name) {
            return Err(RepositoryError::Rejected(format!("{name} already exists")));
        }

        let mut created = self
            .created
            .lock()
            .map_err(|e| RepositoryError::Transport(e.to_string()))?;
        created.push(name.to_string());
        let id = i64::try_from(created.len()).unwrap_or(i64::MAX);

        Ok(CreateAck {
            product_id: Some(ProductId::new(id)),
            variants_created: None,
        })
    }
}
