//! Validated product records produced by the import pipeline.
//!
//! These are transient: built in one pass over an uploaded file and handed to
//! the [`ImportRunner`](crate::ImportRunner) one at a time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storeloom_core::ProductStatus;

use crate::platform::Platform;

/// A product built from one row of a generic spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardProductRecord {
    /// Display name (never empty).
    pub name: String,
    /// Free-form description, possibly HTML.
    pub description: String,
    /// Base price in the smallest currency unit.
    pub price: i64,
    /// Absolute image URLs, in file order.
    pub images: Vec<String>,
    /// Category or product type label.
    pub category: String,
    /// Digital goods are never stock-tracked.
    pub is_digital: bool,
    /// Whether stock is tracked for the product.
    pub track_inventory: bool,
    /// Units on hand, when tracked.
    pub inventory_count: Option<u32>,
}

impl StandardProductRecord {
    /// Apply the digital-goods rule: no stock tracking, no count.
    pub fn enforce_digital_rule(&mut self) {
        if self.is_digital {
            self.track_inventory = false;
            self.inventory_count = None;
        }
    }
}

/// An option axis (e.g. "Size") and the distinct values seen for it.
///
/// Used for display grouping only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantOptionDefinition {
    /// Option name.
    pub name: String,
    /// Distinct values in first-seen order.
    pub values: Vec<String>,
}

/// One purchasable SKU under a multi-row product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    /// Non-empty option values joined with `" / "`, or `"Variant N"`.
    pub name: String,
    /// Stock keeping unit; may be empty.
    pub sku: String,
    /// Difference from the product's base price, smallest currency unit.
    pub price_adjustment: i64,
    /// Units on hand.
    pub inventory_count: u32,
    /// Always true once a product has variants.
    pub track_inventory: bool,
    /// Option name to option value.
    pub options: BTreeMap<String, String>,
    /// Whether the variant can be purchased.
    pub is_active: bool,
    /// Original price before a sale, smallest currency unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<i64>,
}

/// A product rebuilt from a platform export, possibly with variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProductRecord {
    /// Fields shared with the standard path.
    #[serde(flatten)]
    pub product: StandardProductRecord,
    /// True when the product has more than one purchasable combination.
    pub has_variants: bool,
    /// Option names that carry at least one value.
    pub variant_options: Vec<String>,
    /// Per-SKU records; stock lives here when `has_variants` is set.
    pub variants: Vec<VariantRecord>,
    /// Publication status from the export.
    #[serde(default)]
    pub status: ProductStatus,
}

impl PlatformProductRecord {
    /// Number of variants that will be created alongside the product.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        if self.has_variants {
            self.variants.len()
        } else {
            0
        }
    }

    /// Option axes with their distinct values, for display grouping.
    #[must_use]
    pub fn option_definitions(&self) -> Vec<VariantOptionDefinition> {
        self.variant_options
            .iter()
            .map(|name| {
                let mut values: Vec<String> = Vec::new();
                for value in self.variants.iter().filter_map(|v| v.options.get(name)) {
                    if !values.contains(value) {
                        values.push(value.clone());
                    }
                }
                VariantOptionDefinition {
                    name: name.clone(),
                    values,
                }
            })
            .collect()
    }
}

/// Platform records tagged with the dialect they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformImportBatch {
    /// Source platform.
    pub vendor: Platform,
    /// Reconstructed products.
    pub products: Vec<PlatformProductRecord>,
}

/// A record ready for submission, from either path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportRecord {
    /// Variant-bearing record from a platform export.
    Platform(PlatformProductRecord),
    /// Single-row record from a generic spreadsheet.
    Standard(StandardProductRecord),
}

impl ImportRecord {
    /// Product display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Standard(record) => &record.name,
            Self::Platform(record) => &record.product.name,
        }
    }

    /// Number of variants this record carries.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        match self {
            Self::Standard(_) => 0,
            Self::Platform(record) => record.variant_count(),
        }
    }
}

impl From<StandardProductRecord> for ImportRecord {
    fn from(record: StandardProductRecord) -> Self {
        Self::Standard(record)
    }
}

impl From<PlatformProductRecord> for ImportRecord {
    fn from(record: PlatformProductRecord) -> Self {
        Self::Platform(record)
    }
}
