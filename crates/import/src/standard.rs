//! Standard-row transformer and validator.
//!
//! One row becomes one [`StandardProductRecord`]. Bad values are reported as
//! field-level errors and defaulted; only a missing name drops the row.

use storeloom_core::CurrencyCode;
use tracing::{debug, instrument, warn};

use crate::coerce::{parse_bool, parse_count, parse_price, split_list, validate_url};
use crate::error::ImportError;
use crate::mapping::{CanonicalField, ColumnMapping};
use crate::reader::opt_cell;
use crate::record::StandardProductRecord;

/// Outcome of transforming a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    /// The record, unless the row had no name.
    pub record: Option<StandardProductRecord>,
    /// Every problem found in the row.
    pub errors: Vec<ImportError>,
}

/// Outcome of transforming a whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardBatch {
    /// Records for every row that had a name.
    pub products: Vec<StandardProductRecord>,
    /// 1-based source row of each record in `products`.
    pub rows: Vec<usize>,
    /// Schema, row and field errors for the whole file.
    pub errors: Vec<ImportError>,
}

/// Transform one data row.
///
/// `row_number` is the 1-based data row number used in error reports.
#[must_use]
pub fn transform_row(
    row: &[String],
    mapping: &ColumnMapping,
    row_number: usize,
    currency: CurrencyCode,
) -> RowOutcome {
    let mut errors = Vec::new();
    let read = |field: CanonicalField| opt_cell(row, mapping.get(field)).trim();

    let name = read(CanonicalField::Name).to_string();
    if name.is_empty() {
        errors.push(ImportError::row(
            row_number,
            CanonicalField::Name.as_str(),
            "Product name is required",
        ));
    }

    let price = parse_price(read(CanonicalField::Price), currency).unwrap_or_else(|message| {
        errors.push(ImportError::field(
            row_number,
            CanonicalField::Price.as_str(),
            message,
        ));
        0
    });

    let mut images = Vec::new();
    for candidate in split_list(read(CanonicalField::Images)) {
        match validate_url(candidate) {
            Ok(url) => images.push(url),
            Err(message) => errors.push(ImportError::field(
                row_number,
                CanonicalField::Images.as_str(),
                message,
            )),
        }
    }

    let is_digital = parse_bool(read(CanonicalField::IsDigital));
    let mut track_inventory = parse_bool(read(CanonicalField::TrackInventory));

    let inventory_count = parse_count(read(CanonicalField::InventoryCount)).unwrap_or_else(
        |message| {
            errors.push(ImportError::field(
                row_number,
                CanonicalField::InventoryCount.as_str(),
                message,
            ));
            None
        },
    );
    // A supplied count implies tracking, even over an explicit "false".
    if inventory_count.is_some() {
        track_inventory = true;
    }

    if name.is_empty() {
        debug!(row = row_number, "Skipping row without a product name");
        return RowOutcome {
            record: None,
            errors,
        };
    }

    let mut record = StandardProductRecord {
        name,
        description: read(CanonicalField::Description).to_string(),
        price,
        images,
        category: read(CanonicalField::Category).to_string(),
        is_digital,
        track_inventory,
        inventory_count,
    };
    record.enforce_digital_rule();

    RowOutcome {
        record: Some(record),
        errors,
    }
}

/// Transform every row of a generic spreadsheet.
///
/// Without a `name` column nothing can be imported, so the batch stops at a
/// single schema-level error. Otherwise every row is attempted and partial
/// success is returned.
#[must_use]
#[instrument(skip(rows, mapping), fields(rows = rows.len()))]
pub fn validate_and_transform(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    currency: CurrencyCode,
) -> StandardBatch {
    if mapping.name.is_none() {
        warn!("No column mapped to product name");
        return StandardBatch {
            products: Vec::new(),
            rows: Vec::new(),
            errors: vec![ImportError::schema(
                CanonicalField::Name.as_str(),
                "A column must be mapped to the product name",
            )],
        };
    }

    let mut batch = StandardBatch::default();
    for (index, row) in rows.iter().enumerate() {
        let outcome = transform_row(row, mapping, index + 1, currency);
        batch.errors.extend(outcome.errors);
        if let Some(record) = outcome.record {
            batch.products.push(record);
            batch.rows.push(index + 1);
        }
    }

    debug!(
        products = batch.products.len(),
        errors = batch.errors.len(),
        "Transformed standard rows"
    );

    batch
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorLevel;
    use crate::mapping::detect_mapping;
    use crate::reader::parse;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn full_mapping() -> ColumnMapping {
        ColumnMapping {
            name: Some(0),
            description: Some(1),
            price: Some(2),
            images: Some(3),
            category: Some(4),
            is_digital: Some(5),
            track_inventory: Some(6),
            inventory_count: Some(7),
        }
    }

    #[test]
    fn test_widget_scenario() {
        let table = parse("name,price,images\nWidget,19.99,\"http://x.com/a.jpg,http://x.com/b.jpg\"");
        let mapping = detect_mapping(&table.headers);
        let batch = validate_and_transform(&table.rows, &mapping, CurrencyCode::USD);

        assert!(batch.errors.is_empty());
        assert_eq!(batch.products.len(), 1);
        let record = &batch.products[0];
        assert_eq!(record.name, "Widget");
        assert_eq!(record.price, 1999);
        assert_eq!(
            record.images,
            vec!["http://x.com/a.jpg", "http://x.com/b.jpg"]
        );
    }

    #[test]
    fn test_missing_name_scenario() {
        let table = parse("name,price\n,9.99");
        let mapping = detect_mapping(&table.headers);
        let batch = validate_and_transform(&table.rows, &mapping, CurrencyCode::USD);

        assert!(batch.products.is_empty());
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].row, 1);
        assert_eq!(batch.errors[0].field, "name");
        assert_eq!(batch.errors[0].level, ErrorLevel::Row);
    }

    #[test]
    fn test_unmapped_name_is_schema_error() {
        let rows = vec![row(&["x", "1"]), row(&["y", "2"])];
        let mapping = ColumnMapping {
            price: Some(1),
            ..ColumnMapping::default()
        };
        let batch = validate_and_transform(&rows, &mapping, CurrencyCode::USD);
        assert!(batch.products.is_empty());
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(batch.errors[0].row, 0);
        assert!(batch.errors[0].is_schema());
    }

    #[test]
    fn test_bad_price_defaults_to_zero() {
        let outcome = transform_row(
            &row(&["Lamp", "", "cheap"]),
            &full_mapping(),
            4,
            CurrencyCode::USD,
        );
        let record = outcome.record.unwrap();
        assert_eq!(record.price, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "price");
        assert_eq!(outcome.errors[0].row, 4);
        assert_eq!(outcome.errors[0].level, ErrorLevel::Field);
    }

    #[test]
    fn test_zero_decimal_currency() {
        let outcome = transform_row(&row(&["Tea", "", "1500"]), &full_mapping(), 1, CurrencyCode::JPY);
        assert_eq!(outcome.record.unwrap().price, 1500);
    }

    #[test]
    fn test_invalid_image_dropped_not_fatal() {
        let outcome = transform_row(
            &row(&["Lamp", "", "5", "https://cdn.test/a.png, nope ,"]),
            &full_mapping(),
            2,
            CurrencyCode::USD,
        );
        let record = outcome.record.unwrap();
        assert_eq!(record.images, vec!["https://cdn.test/a.png"]);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "images");
    }

    #[test]
    fn test_inventory_count_forces_tracking() {
        let outcome = transform_row(
            &row(&["Lamp", "", "5", "", "", "no", "no", "12"]),
            &full_mapping(),
            1,
            CurrencyCode::USD,
        );
        let record = outcome.record.unwrap();
        assert!(record.track_inventory);
        assert_eq!(record.inventory_count, Some(12));
    }

    #[test]
    fn test_bad_inventory_count() {
        let outcome = transform_row(
            &row(&["Lamp", "", "5", "", "", "", "yes", "several"]),
            &full_mapping(),
            3,
            CurrencyCode::USD,
        );
        let record = outcome.record.unwrap();
        assert!(record.track_inventory);
        assert_eq!(record.inventory_count, None);
        assert_eq!(outcome.errors[0].field, "inventory_count");
    }

    #[test]
    fn test_digital_products_never_track_stock() {
        let outcome = transform_row(
            &row(&["Ebook", "A book", "9", "", "Books", "Yes", "true", "50"]),
            &full_mapping(),
            1,
            CurrencyCode::USD,
        );
        let record = outcome.record.unwrap();
        assert!(record.is_digital);
        assert!(!record.track_inventory);
        assert_eq!(record.inventory_count, None);
        assert_eq!(record.category, "Books");
        assert_eq!(record.description, "A book");
    }

    #[test]
    fn test_nameless_row_still_reports_field_errors() {
        let outcome = transform_row(&row(&["", "", "abc"]), &full_mapping(), 7, CurrencyCode::USD);
        assert!(outcome.record.is_none());
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn test_records_plus_missing_names_equals_rows() {
        let rows = vec![
            row(&["A", "", "1"]),
            row(&["", "", "2"]),
            row(&["C", "", "x"]),
            row(&["", "", ""]),
            row(&["E"]),
        ];
        let batch = validate_and_transform(&rows, &full_mapping(), CurrencyCode::USD);
        let missing_names = batch
            .errors
            .iter()
            .filter(|e| e.field == "name" && e.level == ErrorLevel::Row)
            .count();
        assert_eq!(batch.products.len() + missing_names, rows.len());
        assert_eq!(batch.rows, vec![1, 3, 5]);
        assert!(batch.products.iter().all(|p| !p.name.is_empty()));
    }
}
