//! WooCommerce product export.
//!
//! Variable products are written as a `variable` parent row followed by one
//! `variation` row per combination whose `Parent` column references the parent
//! either as `id:123` or by the parent's SKU. Images are a single
//! comma-separated `Images` cell.

use super::{DialectSpec, ShippingRule};

pub(super) static DIALECT: DialectSpec = DialectSpec {
    key_label: "parent",
    parent_key: &["parent"],
    parent_key_prefix: Some("id:"),
    own_keys: &["id", "sku"],
    title: &["name"],
    description: &["description", "short description"],
    category: &["categories"],
    row_kind: &["type"],
    parent_kinds: &["variable"],
    published: &["published"],
    status: &[],
    options: [
        (&["attribute 1 name"], &["attribute 1 value(s)"]),
        (&["attribute 2 name"], &["attribute 2 value(s)"]),
        (&["attribute 3 name"], &["attribute 3 value(s)"]),
    ],
    placeholder_option_values: &[],
    sku: &["sku"],
    price: &["regular price"],
    sale_price: &["sale price"],
    compare_at_price: &[],
    inventory: &["stock"],
    shipping: ShippingRule::Digital {
        columns: &["virtual?"],
        values: &[],
    },
    image_single: &[],
    image_list: &["images"],
    image_numbered: &[],
    required: &[&["name"], &["parent", "id", "sku"]],
    // Generic names such as `type`, `stock` or `images` show up in ordinary
    // spreadsheets and are not counted.
    distinctive: &[
        "regular price",
        "sale price",
        "attribute 1 name",
        "attribute 1 value(s)",
        "in stock?",
        "tax status",
        "short description",
    ],
    min_distinctive: 2,
};
