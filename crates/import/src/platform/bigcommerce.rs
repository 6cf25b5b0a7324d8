//! BigCommerce bulk product export.
//!
//! A `Product` row carries the product's scalar fields and image series;
//! `SKU` rows under the same `Product ID` carry one option combination each.

use super::{DialectSpec, ShippingRule};

pub(super) static DIALECT: DialectSpec = DialectSpec {
    key_label: "product id",
    parent_key: &["product id"],
    parent_key_prefix: None,
    own_keys: &[],
    title: &["product name"],
    description: &["product description"],
    category: &["category"],
    row_kind: &["item type"],
    parent_kinds: &["product"],
    published: &["product visible?"],
    status: &[],
    options: [
        (&["option name 1"], &["option value 1"]),
        (&["option name 2"], &["option value 2"]),
        (&["option name 3"], &["option value 3"]),
    ],
    placeholder_option_values: &[],
    sku: &["product code/sku"],
    price: &["price"],
    sale_price: &[],
    compare_at_price: &["retail price"],
    inventory: &["current stock level"],
    shipping: ShippingRule::Digital {
        columns: &["product type"],
        values: &["d", "digital"],
    },
    image_single: &[],
    image_list: &[],
    image_numbered: &["product image url - ", "product image file - "],
    required: &[&["product id"], &["product name"]],
    distinctive: &[
        "item type",
        "product code/sku",
        "current stock level",
        "retail price",
    ],
    min_distinctive: 2,
};
