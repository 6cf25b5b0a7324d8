//! End-to-end tests for file preparation.
//!
//! Each fixture goes through `prepare_import` exactly as the CLI sends it:
//! auto-detected format, store currency USD.

#![allow(clippy::unwrap_used)]

use storeloom_core::{CurrencyCode, ProductStatus};
use storeloom_import::{
    CanonicalField, ErrorLevel, ImportFormat, ImportOptions, ImportRecord, ImportReport, Platform,
    PlatformProductRecord, StandardProductRecord, inspect, prepare_import,
};
use storeloom_integration_tests::{
    BIGCOMMERCE_CSV, SHOPIFY_CSV, STANDARD_CSV, WOOCOMMERCE_CSV, prepare, record_named,
};

fn platform<'a>(report: &'a ImportReport, name: &str) -> &'a PlatformProductRecord {
    match record_named(report, name) {
        Some(ImportRecord::Platform(record)) => record,
        other => panic!("expected platform record {name}, got {other:?}"),
    }
}

fn standard<'a>(report: &'a ImportReport, name: &str) -> &'a StandardProductRecord {
    match record_named(report, name) {
        Some(ImportRecord::Standard(record)) => record,
        other => panic!("expected standard record {name}, got {other:?}"),
    }
}

fn adjustments(record: &PlatformProductRecord) -> Vec<i64> {
    record.variants.iter().map(|v| v.price_adjustment).collect()
}

fn variant_names(record: &PlatformProductRecord) -> Vec<&str> {
    record.variants.iter().map(|v| v.name.as_str()).collect()
}

/// Digital products never track stock, whatever path they came from.
fn assert_digital_rule(report: &ImportReport) {
    for record in &report.products {
        let product = match record {
            ImportRecord::Standard(product) => product,
            ImportRecord::Platform(record) => &record.product,
        };
        if product.is_digital {
            assert!(!product.track_inventory, "{} tracks stock", product.name);
            assert_eq!(product.inventory_count, None, "{} has stock", product.name);
        }
    }
}

// =============================================================================
// Standard spreadsheets
// =============================================================================

#[test]
fn test_standard_file_is_not_a_platform_export() {
    let report = prepare(STANDARD_CSV);
    assert_eq!(report.format, ImportFormat::Standard);

    let mapping = report.mapping.unwrap();
    assert_eq!(mapping.get(CanonicalField::Name), Some(0));
    assert_eq!(mapping.get(CanonicalField::Description), Some(1));
    assert_eq!(mapping.get(CanonicalField::Price), Some(2));
    assert_eq!(mapping.get(CanonicalField::Images), Some(3));
    assert_eq!(mapping.get(CanonicalField::Category), Some(4));
    assert_eq!(mapping.get(CanonicalField::IsDigital), Some(5));
    assert_eq!(mapping.get(CanonicalField::TrackInventory), Some(6));
    assert_eq!(mapping.get(CanonicalField::InventoryCount), Some(7));
}

#[test]
fn test_standard_rows_become_records() {
    let report = prepare(STANDARD_CSV);
    assert_eq!(report.product_count, 4);
    assert_eq!(report.variant_count, 0);
    assert_eq!(report.source_rows, vec![1, 2, 3, 5]);

    let lamp = standard(&report, "Desk Lamp");
    assert_eq!(lamp.description, "Brass lamp, 40W");
    assert_eq!(lamp.price, 4999);
    assert_eq!(
        lamp.images,
        vec!["https://cdn.test/lamp-1.jpg", "https://cdn.test/lamp-2.jpg"]
    );
    assert_eq!(lamp.category, "Lighting");
    assert!(!lamp.is_digital);
    assert!(lamp.track_inventory);
    assert_eq!(lamp.inventory_count, Some(12));

    let poster = standard(&report, "Wall Poster");
    assert_eq!(poster.description, r#"A2 print with "matte" finish"#);
    assert_eq!(poster.price, 1500);
    assert!(!poster.track_inventory);
    assert_eq!(poster.inventory_count, None);
}

#[test]
fn test_standard_digital_row_drops_stock() {
    let report = prepare(STANDARD_CSV);
    let ebook = standard(&report, "E-Book: Rust Basics");
    assert!(ebook.is_digital);
    assert_eq!(ebook.price, 950);
    assert!(!ebook.track_inventory);
    assert_eq!(ebook.inventory_count, None);
    assert_digital_rule(&report);
}

#[test]
fn test_standard_bad_values_are_defaulted_and_reported() {
    let report = prepare(STANDARD_CSV);
    assert!(!report.is_rejected());

    let mug = standard(&report, "Coffee Mug");
    assert_eq!(mug.price, 0);
    assert!(mug.images.is_empty());
    assert!(mug.track_inventory);
    assert_eq!(mug.inventory_count, Some(3));

    let summary: Vec<(usize, &str, ErrorLevel)> = report
        .errors
        .iter()
        .map(|e| (e.row, e.field.as_str(), e.level))
        .collect();
    assert_eq!(
        summary,
        vec![
            (4, "name", ErrorLevel::Row),
            (5, "price", ErrorLevel::Field),
            (5, "images", ErrorLevel::Field),
        ]
    );
}

#[test]
fn test_standard_override_beats_inference() {
    let options = ImportOptions {
        overrides: vec![(CanonicalField::Category, 1)],
        ..ImportOptions::default()
    };
    let report = prepare_import(STANDARD_CSV, &options);
    assert_eq!(
        report.mapping.unwrap().get(CanonicalField::Category),
        Some(1)
    );
    assert_eq!(standard(&report, "Desk Lamp").category, "Brass lamp, 40W");
}

#[test]
fn test_standard_override_out_of_range_rejects_file() {
    let options = ImportOptions {
        overrides: vec![(CanonicalField::Price, 42)],
        ..ImportOptions::default()
    };
    let report = prepare_import(STANDARD_CSV, &options);
    assert!(report.is_rejected());
    assert!(report.products.is_empty());
    assert_eq!(report.product_count, 0);
}

#[test]
fn test_zero_decimal_currency() {
    let options = ImportOptions {
        currency: CurrencyCode::JPY,
        ..ImportOptions::default()
    };
    let report = prepare_import(STANDARD_CSV, &options);
    assert_eq!(standard(&report, "Wall Poster").price, 15);
}

// =============================================================================
// Shopify
// =============================================================================

#[test]
fn test_shopify_export_is_detected() {
    let report = prepare(SHOPIFY_CSV);
    assert_eq!(report.format, ImportFormat::Platform(Platform::Shopify));
    assert!(report.mapping.is_none());
    assert_eq!(report.product_count, 3);
    assert_eq!(report.variant_count, 3);
    assert_eq!(report.source_rows, vec![1, 5, 6]);
}

#[test]
fn test_shopify_variants_are_grouped_by_handle() {
    let report = prepare(SHOPIFY_CSV);
    let tee = platform(&report, "Classic Tee");

    assert!(tee.has_variants);
    assert_eq!(tee.variant_options, vec!["Size", "Color"]);
    assert_eq!(variant_names(tee), vec!["S / Black", "M / Black", "L / White"]);
    assert_eq!(adjustments(tee), vec![0, 0, 200]);
    assert_eq!(tee.product.price, 2000);
    assert_eq!(tee.product.description, "<p>Soft cotton tee</p>");
    assert_eq!(tee.product.category, "Shirts");
    assert_eq!(tee.status, ProductStatus::Active);

    // Oversold stock is clamped.
    let stock: Vec<u32> = tee.variants.iter().map(|v| v.inventory_count).collect();
    assert_eq!(stock, vec![10, 8, 0]);
    assert_eq!(tee.variants[0].compare_at_price, Some(2500));
    assert_eq!(tee.variants[2].compare_at_price, None);
    assert_eq!(tee.variants[0].sku, "TEE-S-BLK");
    assert_eq!(tee.variants[2].options.get("Color").unwrap(), "White");

    // Variant-bearing products keep stock on the variants.
    assert!(!tee.product.track_inventory);
    assert_eq!(tee.product.inventory_count, None);
}

#[test]
fn test_shopify_image_rows_are_deduplicated() {
    let report = prepare(SHOPIFY_CSV);
    let tee = platform(&report, "Classic Tee");
    assert_eq!(
        tee.product.images,
        vec!["https://cdn.test/tee-front.jpg", "https://cdn.test/tee-back.jpg"]
    );
    assert_eq!(tee.variants.len(), 3);
}

#[test]
fn test_shopify_default_title_is_a_single_product() {
    let report = prepare(SHOPIFY_CSV);

    let card = platform(&report, "Gift Card");
    assert!(!card.has_variants);
    assert!(card.variant_options.is_empty());
    assert_eq!(card.product.price, 2500);
    assert!(card.product.is_digital);
    assert_digital_rule(&report);

    let hat = platform(&report, "Old Hat");
    assert!(!hat.has_variants);
    assert_eq!(hat.status, ProductStatus::Archived);
    assert!(!hat.product.is_digital);
    assert!(hat.product.track_inventory);
    assert_eq!(hat.product.inventory_count, Some(4));
}

#[test]
fn test_shopify_forced_as_standard() {
    let options = ImportOptions {
        format: ImportFormat::Standard,
        ..ImportOptions::default()
    };
    let report = prepare_import(SHOPIFY_CSV, &options);
    assert_eq!(report.format, ImportFormat::Standard);
    assert!(
        report
            .products
            .iter()
            .all(|record| matches!(record, ImportRecord::Standard(_)))
    );
}

// =============================================================================
// WooCommerce
// =============================================================================

#[test]
fn test_woocommerce_export_is_detected() {
    let report = prepare(WOOCOMMERCE_CSV);
    assert_eq!(report.format, ImportFormat::Platform(Platform::WooCommerce));
    assert_eq!(report.product_count, 4);
    assert_eq!(report.variant_count, 4);
    assert_eq!(report.source_rows, vec![1, 4, 5, 6]);
}

#[test]
fn test_woocommerce_variations_join_their_parent() {
    let report = prepare(WOOCOMMERCE_CSV);
    let hoodie = platform(&report, "Logo Hoodie");

    assert!(hoodie.has_variants);
    assert_eq!(hoodie.variant_options, vec!["Size", "Color"]);
    assert_eq!(variant_names(hoodie), vec!["S / Grey", "M / Grey"]);
    assert_eq!(hoodie.product.price, 4500);
    // The sale price is what customers pay; the regular price becomes compare-at.
    assert_eq!(adjustments(hoodie), vec![0, -500]);
    assert_eq!(hoodie.variants[1].compare_at_price, Some(4800));
    assert_eq!(hoodie.variants[1].inventory_count, 0);
    assert_eq!(hoodie.product.description, "<p>Heavyweight fleece</p>");
    assert_eq!(hoodie.product.category, "Clothing > Hoodies");
    assert_eq!(
        hoodie.product.images,
        vec!["https://cdn.test/hoodie-1.jpg", "https://cdn.test/hoodie-2.jpg"]
    );
}

#[test]
fn test_woocommerce_parent_by_sku() {
    let report = prepare(WOOCOMMERCE_CSV);
    let tote = platform(&report, "Canvas Tote");

    assert_eq!(variant_names(tote), vec!["Natural", "Black"]);
    assert_eq!(adjustments(tote), vec![0, 0]);
    assert_eq!(tote.product.price, 1800);
    assert_eq!(tote.status, ProductStatus::Draft);
}

#[test]
fn test_woocommerce_simple_products() {
    let report = prepare(WOOCOMMERCE_CSV);

    let socks = platform(&report, "Wool Socks");
    assert!(!socks.has_variants);
    assert_eq!(socks.product.price, 1250);
    assert_eq!(socks.product.description, "Cozy socks");
    assert!(socks.product.track_inventory);
    assert_eq!(socks.product.inventory_count, Some(30));

    let presets = platform(&report, "Lightroom Presets");
    assert!(presets.product.is_digital);
    assert_eq!(presets.product.price, 1900);
    assert_digital_rule(&report);
}

#[test]
fn test_woocommerce_keyless_row_is_skipped() {
    let report = prepare(WOOCOMMERCE_CSV);
    assert!(record_named(&report, "Mystery Item").is_none());

    let keyless: Vec<_> = report
        .errors
        .iter()
        .filter(|e| e.level == ErrorLevel::Row)
        .collect();
    assert_eq!(keyless.len(), 1);
    assert_eq!(keyless[0].row, 9);
    assert!(!report.is_rejected());
}

// =============================================================================
// BigCommerce
// =============================================================================

#[test]
fn test_bigcommerce_export_is_detected() {
    let report = prepare(BIGCOMMERCE_CSV);
    assert_eq!(report.format, ImportFormat::Platform(Platform::BigCommerce));
    assert_eq!(report.product_count, 3);
    assert_eq!(report.variant_count, 2);
    assert!(report.errors.is_empty());
}

#[test]
fn test_bigcommerce_sku_rows_are_variants() {
    let report = prepare(BIGCOMMERCE_CSV);
    let runner = platform(&report, "Trail Runner");

    assert!(runner.has_variants);
    assert_eq!(runner.variant_options, vec!["Size"]);
    assert_eq!(variant_names(runner), vec!["9", "10"]);
    assert_eq!(adjustments(runner), vec![0, 300]);
    assert_eq!(runner.product.price, 8900);
    assert_eq!(runner.product.category, "Shoes/Running");
    assert_eq!(
        runner.product.images,
        vec!["https://cdn.test/trail-1.jpg", "https://cdn.test/trail-2.jpg"]
    );
    let stock: Vec<u32> = runner.variants.iter().map(|v| v.inventory_count).collect();
    assert_eq!(stock, vec![6, 0]);
}

#[test]
fn test_bigcommerce_download_product() {
    let report = prepare(BIGCOMMERCE_CSV);
    let guide = platform(&report, "Sizing Guide");

    assert!(guide.product.is_digital);
    assert_eq!(guide.status, ProductStatus::Draft);
    assert_eq!(guide.product.price, 499);
    // File names without a URL column entry are not images.
    assert!(guide.product.images.is_empty());
    assert_digital_rule(&report);

    let bottle = platform(&report, "Water Bottle");
    assert_eq!(bottle.product.inventory_count, Some(40));
    assert_eq!(bottle.status, ProductStatus::Active);
}

// =============================================================================
// Generic files with vendor-like headers
// =============================================================================

#[test]
fn test_common_headers_stay_standard() {
    let report = prepare(
        "name,sku,price,stock,images\n\
         Widget,,19.99,5,http://x.com/a.jpg\n\
         Gadget,G-1,5.00,2,\n",
    );
    assert_eq!(report.format, ImportFormat::Standard);
    assert!(report.errors.is_empty());
    assert_eq!(report.product_count, 2);

    let widget = standard(&report, "Widget");
    assert_eq!(widget.price, 1999);
    assert_eq!(widget.images, vec!["http://x.com/a.jpg"]);
    assert_eq!(widget.inventory_count, Some(5));
    assert!(widget.track_inventory);

    let gadget = standard(&report, "Gadget");
    assert_eq!(gadget.price, 500);
    assert!(gadget.images.is_empty());
}

#[test]
fn test_handle_and_title_alone_are_not_shopify() {
    let report = prepare(
        "handle,title,description,price,image src,sku\n\
         mug,Mug,Stoneware,12.00,https://cdn.test/mug.jpg,MUG-1\n",
    );
    assert_eq!(report.format, ImportFormat::Standard);
    assert!(report.errors.is_empty());

    let mug = standard(&report, "Mug");
    assert_eq!(mug.description, "Stoneware");
    assert_eq!(mug.price, 1200);
    assert_eq!(mug.images, vec!["https://cdn.test/mug.jpg"]);
}

#[test]
fn test_product_prefixed_headers_are_not_bigcommerce() {
    let report = prepare(
        "product id,product name,product type,product description,price,category\n\
         7,Kettle,physical,Electric,30.00,Kitchen\n",
    );
    assert_eq!(report.format, ImportFormat::Standard);

    let mapping = report.mapping.unwrap();
    assert_eq!(mapping.get(CanonicalField::Name), Some(1));
    assert_eq!(mapping.get(CanonicalField::Description), Some(3));
    assert_eq!(mapping.get(CanonicalField::Price), Some(4));
    assert_eq!(mapping.get(CanonicalField::Category), Some(5));

    let kettle = standard(&report, "Kettle");
    assert_eq!(kettle.price, 3000);
    assert_eq!(kettle.category, "Kitchen");
}

#[test]
fn test_type_and_stock_columns_are_not_woocommerce() {
    let report = prepare(
        "name,sku,type,price,stock,images\n\
         Widget,W-1,simple,4.50,3,\n",
    );
    assert_eq!(report.format, ImportFormat::Standard);
    assert_eq!(inspect("name,sku,type,price,stock,images\n").detected, None);

    let widget = standard(&report, "Widget");
    assert_eq!(widget.price, 450);
    assert_eq!(widget.inventory_count, Some(3));
}

// =============================================================================
// Whole-file behavior
// =============================================================================

#[test]
fn test_every_fixture_yields_records_and_errors() {
    for content in [STANDARD_CSV, SHOPIFY_CSV, WOOCOMMERCE_CSV, BIGCOMMERCE_CSV] {
        let report = prepare(content);
        assert!(!report.is_rejected());
        assert_eq!(report.product_count, report.products.len());
        assert_eq!(report.source_rows.len(), report.products.len());
        assert!(report.products.iter().all(|record| !record.name().is_empty()));
    }
}

#[test]
fn test_empty_file_is_rejected() {
    let report = prepare("");
    assert!(report.is_rejected());
    assert_eq!(report.errors[0].level, ErrorLevel::Schema);
    assert_eq!(report.errors[0].row, 0);
}

#[test]
fn test_report_json_shape() {
    let report = prepare(SHOPIFY_CSV);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["format"], "shopify");
    assert_eq!(json["productCount"], 3);
    assert_eq!(json["variantCount"], 3);
    assert!(json.get("mapping").is_none());
    assert!(json.get("sourceRows").is_none());

    let tee = &json["products"][0];
    assert_eq!(tee["name"], "Classic Tee");
    assert_eq!(tee["has_variants"], true);
    assert_eq!(tee["status"], "active");
    assert_eq!(tee["variants"][2]["price_adjustment"], 200);
}

#[test]
fn test_inspect_fixtures() {
    assert_eq!(inspect(SHOPIFY_CSV).detected, Some(Platform::Shopify));
    assert_eq!(inspect(WOOCOMMERCE_CSV).detected, Some(Platform::WooCommerce));
    assert_eq!(inspect(BIGCOMMERCE_CSV).detected, Some(Platform::BigCommerce));

    let standard = inspect(STANDARD_CSV);
    assert_eq!(standard.detected, None);
    assert_eq!(standard.row_count, 5);
    assert_eq!(standard.headers.len(), 8);
}
