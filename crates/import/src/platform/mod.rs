//! Platform export dialects.
//!
//! Shopify, WooCommerce and BigCommerce all denormalize a product into several
//! rows that share a parent key. They differ only in header names and in how
//! images are laid out, so each dialect is a static [`DialectSpec`] and the
//! grouping/reconstruction in [`group`] is written once.
//!
//! ## Detection
//!
//! A dialect matches when all of its mandatory columns are present *and* at
//! least `min_distinctive` of its characteristic columns are. Exports share
//! generic names like `Type` or `Published`, so mandatory columns alone are not
//! enough to tell them apart. When several dialects match, the first in
//! [`Platform::PRIORITY`] wins.

mod bigcommerce;
pub mod group;
mod shopify;
mod woocommerce;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mapping::normalize_header;

pub use group::{
    VendorParse, VendorProduct, VendorVariant, parse_rows, transform_to_import_products,
};

/// A supported platform export dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopify,
    WooCommerce,
    BigCommerce,
}

impl Platform {
    /// Auto-detection order; the first matching dialect wins.
    pub const PRIORITY: [Self; 3] = [Self::Shopify, Self::BigCommerce, Self::WooCommerce];

    /// The dialect's column table.
    #[must_use]
    pub const fn dialect(self) -> &'static DialectSpec {
        match self {
            Self::Shopify => &shopify::DIALECT,
            Self::WooCommerce => &woocommerce::DIALECT,
            Self::BigCommerce => &bigcommerce::DIALECT,
        }
    }

    /// Lower-case identifier used on the command line and in JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shopify => "shopify",
            Self::WooCommerce => "woocommerce",
            Self::BigCommerce => "bigcommerce",
        }
    }

    /// Whether `headers` look like an export from this platform.
    #[must_use]
    pub fn detect(self, headers: &[String]) -> bool {
        let normalized = normalize_all(headers);
        self.dialect().matches(&normalized)
    }

    /// Resolve this dialect's columns against `headers`.
    #[must_use]
    pub fn locate(self, headers: &[String]) -> ColumnLocatorTable {
        ColumnLocatorTable::locate(self.dialect(), &normalize_all(headers))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shopify" => Ok(Self::Shopify),
            "woocommerce" | "woo" => Ok(Self::WooCommerce),
            "bigcommerce" => Ok(Self::BigCommerce),
            _ => Err(format!("unknown platform: {s}")),
        }
    }
}

/// Detect the platform that produced `headers`, in priority order.
#[must_use]
pub fn detect_platform(headers: &[String]) -> Option<Platform> {
    let normalized = normalize_all(headers);
    let found = Platform::PRIORITY
        .into_iter()
        .find(|platform| platform.dialect().matches(&normalized));
    debug!(platform = ?found, "Platform detection finished");
    found
}

fn normalize_all(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_header(h)).collect()
}

/// How a dialect marks shipping on a row.
#[derive(Debug, Clone, Copy)]
pub enum ShippingRule {
    /// A truthy cell means the row ships (Shopify).
    Requires(&'static [&'static str]),
    /// A cell equal to one of `values` (or truthy) means the row is digital.
    Digital {
        columns: &'static [&'static str],
        values: &'static [&'static str],
    },
}

/// Static description of one dialect's headers.
///
/// Every header list holds lower-case candidates; the first one present in the
/// file is used.
#[derive(Debug)]
pub struct DialectSpec {
    /// Label used in error messages for the grouping key.
    pub key_label: &'static str,
    /// Column naming the parent product.
    pub parent_key: &'static [&'static str],
    /// Prefix stripped from parent references (`id:` in WooCommerce).
    pub parent_key_prefix: Option<&'static str>,
    /// Columns identifying a parent row itself; used as fallback key and aliases.
    pub own_keys: &'static [&'static str],
    pub title: &'static [&'static str],
    pub description: &'static [&'static str],
    pub category: &'static [&'static str],
    /// Column distinguishing parent-only rows, and the values that mark them.
    pub row_kind: &'static [&'static str],
    pub parent_kinds: &'static [&'static str],
    pub published: &'static [&'static str],
    pub status: &'static [&'static str],
    /// `(name, value)` header candidates for option slots 1..3.
    pub options: [(&'static [&'static str], &'static [&'static str]); 3],
    /// Option values that mean "no option" (Shopify's `Default Title`).
    pub placeholder_option_values: &'static [&'static str],
    pub sku: &'static [&'static str],
    pub price: &'static [&'static str],
    pub sale_price: &'static [&'static str],
    pub compare_at_price: &'static [&'static str],
    pub inventory: &'static [&'static str],
    pub shipping: ShippingRule,
    /// Columns holding one image URL each.
    pub image_single: &'static [&'static str],
    /// Columns holding a comma-separated list of image URLs.
    pub image_list: &'static [&'static str],
    /// Prefixes of numbered image columns (`product image url - 1`, ...).
    pub image_numbered: &'static [&'static str],
    /// Column groups that must be present; any header in a group satisfies it.
    pub required: &'static [&'static [&'static str]],
    /// Columns characteristic of this dialect.
    pub distinctive: &'static [&'static str],
    /// Minimum number of distinctive columns (numbered images count once).
    pub min_distinctive: usize,
}

impl DialectSpec {
    fn matches(&self, headers: &[String]) -> bool {
        let has = |name: &&str| headers.iter().any(|h| h == name);

        if !self.required.iter().all(|group| group.iter().any(has)) {
            return false;
        }

        let mut distinctive = self.distinctive.iter().filter(|name| has(*name)).count();
        if !numbered_columns(self.image_numbered, headers).is_empty() {
            distinctive += 1;
        }
        distinctive >= self.min_distinctive
    }
}

/// One option slot's resolved name and value columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSlot {
    pub name: Option<usize>,
    pub value: Option<usize>,
}

/// Resolved shipping column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingColumn {
    Requires(usize),
    Digital {
        column: usize,
        values: &'static [&'static str],
    },
}

/// A dialect's columns resolved to indices for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLocatorTable {
    pub key_label: &'static str,
    pub parent_key: Option<usize>,
    pub parent_key_prefix: Option<&'static str>,
    pub own_keys: Vec<usize>,
    pub title: Option<usize>,
    pub description: Vec<usize>,
    pub category: Vec<usize>,
    pub row_kind: Option<usize>,
    pub parent_kinds: &'static [&'static str],
    pub published: Option<usize>,
    pub status: Option<usize>,
    pub options: [OptionSlot; 3],
    pub placeholder_option_values: &'static [&'static str],
    pub sku: Option<usize>,
    pub price: Option<usize>,
    pub sale_price: Option<usize>,
    pub compare_at_price: Option<usize>,
    pub inventory: Option<usize>,
    pub shipping: Option<ShippingColumn>,
    pub image_single: Vec<usize>,
    pub image_list: Vec<usize>,
}

impl ColumnLocatorTable {
    fn locate(dialect: &DialectSpec, headers: &[String]) -> Self {
        let first = |candidates: &[&str]| find_first(candidates, headers);
        let all = |candidates: &[&str]| find_all(candidates, headers);

        let mut image_single = all(dialect.image_single);
        image_single.extend(numbered_columns(dialect.image_numbered, headers));

        let shipping = match dialect.shipping {
            ShippingRule::Requires(columns) => first(columns).map(ShippingColumn::Requires),
            ShippingRule::Digital { columns, values } => {
                first(columns).map(|column| ShippingColumn::Digital { column, values })
            }
        };

        Self {
            key_label: dialect.key_label,
            parent_key: first(dialect.parent_key),
            parent_key_prefix: dialect.parent_key_prefix,
            own_keys: all(dialect.own_keys),
            title: first(dialect.title),
            description: all(dialect.description),
            category: all(dialect.category),
            row_kind: first(dialect.row_kind),
            parent_kinds: dialect.parent_kinds,
            published: first(dialect.published),
            status: first(dialect.status),
            options: dialect.options.map(|(name, value)| OptionSlot {
                name: first(name),
                value: first(value),
            }),
            placeholder_option_values: dialect.placeholder_option_values,
            sku: first(dialect.sku),
            price: first(dialect.price),
            sale_price: first(dialect.sale_price),
            compare_at_price: first(dialect.compare_at_price),
            inventory: first(dialect.inventory),
            shipping,
            image_single,
            image_list: all(dialect.image_list),
        }
    }

    /// Whether a grouping key can be read from this file.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.parent_key.is_some() || !self.own_keys.is_empty()
    }
}

/// Index of the first candidate present in `headers`.
fn find_first(candidates: &[&str], headers: &[String]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
}

/// Indices of every present candidate, in candidate order.
fn find_all(candidates: &[&str], headers: &[String]) -> Vec<usize> {
    candidates
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == name))
        .collect()
}

/// Columns of the first numbered series present, ordered by their number.
fn numbered_columns(prefixes: &[&str], headers: &[String]) -> Vec<usize> {
    for prefix in prefixes {
        let mut series: Vec<(u32, usize)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, header)| {
                let number = header.strip_prefix(prefix)?.trim().parse::<u32>().ok()?;
                Some((number, i))
            })
            .collect();
        if !series.is_empty() {
            series.sort_unstable();
            return series.into_iter().map(|(_, i)| i).collect();
        }
    }
    Vec::new()
}
