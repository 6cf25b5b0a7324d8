//! Shopify product export (`products_export.csv`).
//!
//! One row per variant, grouped by `Handle`. Only the first row of a product
//! carries `Title`, `Body (HTML)` and the option names; extra rows may carry
//! nothing but an `Image Src`. Single-variant products are exported with the
//! option pair `Title` / `Default Title`.

use super::{DialectSpec, ShippingRule};

pub(super) static DIALECT: DialectSpec = DialectSpec {
    key_label: "handle",
    parent_key: &["handle"],
    parent_key_prefix: None,
    own_keys: &[],
    title: &["title"],
    description: &["body (html)"],
    category: &["type", "product category"],
    row_kind: &[],
    parent_kinds: &[],
    published: &["published"],
    status: &["status"],
    options: [
        (&["option1 name"], &["option1 value"]),
        (&["option2 name"], &["option2 value"]),
        (&["option3 name"], &["option3 value"]),
    ],
    placeholder_option_values: &["default title"],
    sku: &["variant sku"],
    price: &["variant price"],
    sale_price: &[],
    compare_at_price: &["variant compare at price"],
    inventory: &["variant inventory qty"],
    shipping: ShippingRule::Requires(&["variant requires shipping"]),
    image_single: &["image src", "variant image"],
    image_list: &[],
    image_numbered: &[],
    required: &[&["handle"], &["title"]],
    distinctive: &[
        "body (html)",
        "variant sku",
        "variant price",
        "option1 name",
        "option1 value",
        "variant inventory qty",
        "image src",
        "variant requires shipping",
    ],
    min_distinctive: 2,
};
