//! Column-mapping inference for generic spreadsheets.
//!
//! Headers are matched against a fixed, ordered pattern table. The result is
//! only a best-effort default: callers may override any entry before the rows
//! are transformed.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ImportError;

/// Product fields a generic spreadsheet column can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Name,
    Description,
    Price,
    Images,
    Category,
    IsDigital,
    TrackInventory,
    InventoryCount,
}

impl CanonicalField {
    /// Every field, in inference order.
    pub const ALL: [Self; 8] = [
        Self::Name,
        Self::Description,
        Self::Price,
        Self::Images,
        Self::Category,
        Self::IsDigital,
        Self::TrackInventory,
        Self::InventoryCount,
    ];

    /// The field's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Price => "price",
            Self::Images => "images",
            Self::Category => "category",
            Self::IsDigital => "is_digital",
            Self::TrackInventory => "track_inventory",
            Self::InventoryCount => "inventory_count",
        }
    }

    /// Header fragments that suggest this field, most specific first.
    const fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name", "title", "product name", "product_name", "product"],
            Self::Description => &["description", "desc", "details", "body", "summary"],
            Self::Price => &["price", "cost", "amount", "unit price", "unit_price"],
            Self::Images => &["image", "images", "image_url", "photo", "picture", "img"],
            Self::Category => &["category", "type", "collection", "group"],
            Self::IsDigital => &["is_digital", "digital", "downloadable", "virtual"],
            Self::TrackInventory => &[
                "track_inventory",
                "track inventory",
                "track stock",
                "manage stock",
                "track",
            ],
            Self::InventoryCount => &[
                "inventory_count",
                "inventory count",
                "stock",
                "quantity",
                "qty",
                "inventory",
            ],
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("unknown product field: {s}"))
    }
}

/// Canonical field to zero-based column index.
///
/// Deserializes from an object keyed by field name; absent fields are unmapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnMapping {
    pub name: Option<usize>,
    pub description: Option<usize>,
    pub price: Option<usize>,
    pub images: Option<usize>,
    pub category: Option<usize>,
    pub is_digital: Option<usize>,
    pub track_inventory: Option<usize>,
    pub inventory_count: Option<usize>,
}

impl ColumnMapping {
    /// Column mapped to `field`, if any.
    #[must_use]
    pub const fn get(&self, field: CanonicalField) -> Option<usize> {
        match field {
            CanonicalField::Name => self.name,
            CanonicalField::Description => self.description,
            CanonicalField::Price => self.price,
            CanonicalField::Images => self.images,
            CanonicalField::Category => self.category,
            CanonicalField::IsDigital => self.is_digital,
            CanonicalField::TrackInventory => self.track_inventory,
            CanonicalField::InventoryCount => self.inventory_count,
        }
    }

    /// Map `field` to `column` (or unmap it with `None`).
    pub fn set(&mut self, field: CanonicalField, column: Option<usize>) {
        let slot = match field {
            CanonicalField::Name => &mut self.name,
            CanonicalField::Description => &mut self.description,
            CanonicalField::Price => &mut self.price,
            CanonicalField::Images => &mut self.images,
            CanonicalField::Category => &mut self.category,
            CanonicalField::IsDigital => &mut self.is_digital,
            CanonicalField::TrackInventory => &mut self.track_inventory,
            CanonicalField::InventoryCount => &mut self.inventory_count,
        };
        *slot = column;
    }

    /// Report every mapped index outside `[0, column_count)`.
    #[must_use]
    pub fn validate(&self, column_count: usize) -> Vec<ImportError> {
        CanonicalField::ALL
            .into_iter()
            .filter_map(|field| {
                let index = self.get(field)?;
                (index >= column_count).then(|| {
                    ImportError::schema(
                        field.as_str(),
                        format!(
                            "Column {index} is out of range (file has {column_count} columns)"
                        ),
                    )
                })
            })
            .collect()
    }
}

/// Guess which column holds each canonical field.
///
/// For each field, candidates are tried in pattern order and, for each
/// candidate, headers in file order; the first header that equals or contains
/// the candidate wins. Fields are inferred independently, so one column may
/// serve more than one field.
#[must_use]
pub fn detect_mapping(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut mapping = ColumnMapping::default();

    for field in CanonicalField::ALL {
        // Equality is the degenerate case of containment.
        let found = field
            .patterns()
            .iter()
            .find_map(|pattern| normalized.iter().position(|header| header.contains(pattern)));

        if let Some(index) = found {
            debug!(field = %field, column = index, "Inferred column mapping");
        }
        mapping.set(field, found);
    }

    mapping
}

/// Lower-case and trim a header for comparison.
pub(crate) fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}
