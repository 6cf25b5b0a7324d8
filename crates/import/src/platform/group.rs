//! Row grouping and product reconstruction shared by every platform dialect.
//!
//! [`parse_rows`] turns a file's rows into [`VendorProduct`]s: rows are grouped
//! by parent key in first-appearance order and each group is read through the
//! dialect's [`ColumnLocatorTable`]. The lead row (the parent row when the
//! dialect marks one, otherwise the first row) supplies the scalar attributes. [`transform_to_import_products`] then
//! derives the variant-aware [`PlatformProductRecord`]s.

use std::collections::{BTreeMap, HashMap, HashSet};

use storeloom_core::{CurrencyCode, ProductStatus};
use tracing::{debug, instrument, warn};

use super::{ColumnLocatorTable, Platform, ShippingColumn};
use crate::coerce::{
    parse_bool, parse_flag, parse_optional_price, parse_quantity, split_list, validate_url,
};
use crate::error::ImportError;
use crate::reader::opt_cell;
use crate::record::{PlatformProductRecord, StandardProductRecord, VariantRecord};

/// One variant-bearing row of a platform export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorVariant {
    /// 1-based data row number.
    pub row: usize,
    /// Values for option slots 1..3; empty when unused.
    pub option_values: [String; 3],
    pub sku: String,
    /// Price charged, smallest currency unit.
    pub price: i64,
    pub compare_at_price: Option<i64>,
    /// Units on hand; `None` when the export left the cell empty.
    pub inventory: Option<u32>,
    /// `None` when the export does not say.
    pub requires_shipping: Option<bool>,
}

/// All rows sharing one parent key, merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorProduct {
    pub key: String,
    /// 1-based row number of the group's lead row.
    pub first_row: usize,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: ProductStatus,
    /// Names for option slots 1..3; empty when the export gives none.
    pub option_names: [String; 3],
    /// Distinct image URLs in first-seen order.
    pub images: Vec<String>,
    /// At least one entry for every product built by [`parse_rows`].
    pub variants: Vec<VendorVariant>,
}

/// Products and errors from one platform file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorParse {
    pub products: Vec<VendorProduct>,
    pub errors: Vec<ImportError>,
}

/// A numbered data row.
type Row<'a> = (usize, &'a [String]);

/// Group the rows of a platform export and read each group into a product.
///
/// Rows without a key are reported and skipped; a group without a title is
/// reported once at its first row and dropped.
#[must_use]
#[instrument(skip(rows, headers), fields(rows = rows.len()))]
pub fn parse_rows(
    platform: Platform,
    rows: &[Vec<String>],
    headers: &[String],
    currency: CurrencyCode,
) -> VendorParse {
    let table = platform.locate(headers);
    let mut parsed = VendorParse::default();

    if !table.has_key() {
        warn!(key = table.key_label, "Export has no grouping column");
        parsed.errors.push(ImportError::schema(
            table.key_label,
            format!("Missing required column: {}", table.key_label),
        ));
        return parsed;
    }
    if table.title.is_none() {
        warn!("Export has no title column");
        parsed
            .errors
            .push(ImportError::schema("title", "Missing required column: title"));
        return parsed;
    }

    let aliases = collect_aliases(&table, rows);
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Row<'_>>> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let Some(key) = group_key(&table, row, &aliases) else {
            parsed.errors.push(ImportError::row(
                row_number,
                table.key_label,
                format!("Row has no {}", table.key_label),
            ));
            continue;
        };
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push((row_number, row.as_slice()));
    }

    for key in order {
        let Some(mut group) = groups.remove(&key) else {
            continue;
        };
        // A parent row referenced before it appears still leads its group.
        group.sort_by_key(|&(_, row)| !is_parent_kind(&table, row));
        if let Some(product) = read_group(&table, key, &group, currency, &mut parsed.errors) {
            parsed.products.push(product);
        }
    }

    debug!(
        %platform,
        products = parsed.products.len(),
        errors = parsed.errors.len(),
        "Grouped platform rows"
    );

    parsed
}

/// Trimmed cell at an optional column.
fn at(row: &[String], column: Option<usize>) -> &str {
    opt_cell(row, column).trim()
}

/// The parent reference on a row, with the dialect's prefix removed.
fn parent_ref<'a>(table: &ColumnLocatorTable, row: &'a [String]) -> &'a str {
    let raw = at(row, table.parent_key);
    table
        .parent_key_prefix
        .and_then(|prefix| {
            let head = raw.get(..prefix.len())?;
            let rest = raw.get(prefix.len()..)?;
            head.eq_ignore_ascii_case(prefix).then(|| rest.trim())
        })
        .unwrap_or(raw)
}

/// Non-empty own-key cells of a row, in column order.
fn own_keys<'a>(table: &ColumnLocatorTable, row: &'a [String]) -> impl Iterator<Item = &'a str> {
    table
        .own_keys
        .iter()
        .map(move |&column| at(row, Some(column)))
        .filter(|value| !value.is_empty())
}

/// Map every own key of a parentless row to that row's group key.
fn collect_aliases(table: &ColumnLocatorTable, rows: &[Vec<String>]) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for row in rows {
        if !parent_ref(table, row).is_empty() {
            continue;
        }
        let mut keys = own_keys(table, row);
        let Some(canonical) = keys.next() else {
            continue;
        };
        aliases
            .entry(canonical.to_string())
            .or_insert_with(|| canonical.to_string());
        for alias in keys {
            aliases
                .entry(alias.to_string())
                .or_insert_with(|| canonical.to_string());
        }
    }
    aliases
}

fn group_key(
    table: &ColumnLocatorTable,
    row: &[String],
    aliases: &HashMap<String, String>,
) -> Option<String> {
    let parent = parent_ref(table, row);
    if !parent.is_empty() {
        return Some(
            aliases
                .get(parent)
                .cloned()
                .unwrap_or_else(|| parent.to_string()),
        );
    }
    own_keys(table, row).next().map(ToString::to_string)
}

/// First non-empty value of `columns` on one row.
fn first_of<'a>(row: &'a [String], columns: &[usize]) -> &'a str {
    columns
        .iter()
        .map(|&column| at(row, Some(column)))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

fn read_group(
    table: &ColumnLocatorTable,
    key: String,
    group: &[Row<'_>],
    currency: CurrencyCode,
    errors: &mut Vec<ImportError>,
) -> Option<VendorProduct> {
    let &(first_row, lead) = group.first()?;

    // Scalar attributes come from the lead row only.
    let title = at(lead, table.title);
    if title.is_empty() {
        errors.push(ImportError::row(
            first_row,
            "title",
            format!("Product {key} has no title"),
        ));
        return None;
    }

    let status = read_status(table, lead, first_row, errors);
    let option_names = table.options.map(|slot| at(lead, slot.name).to_string());

    let mut images = Vec::new();
    let mut seen = HashSet::new();
    for &(row_number, row) in group {
        for url in row_images(table, row, row_number, errors) {
            if seen.insert(url.clone()) {
                images.push(url);
            }
        }
    }

    let bearing: Vec<Row<'_>> = group
        .iter()
        .copied()
        .filter(|(_, row)| is_variant_row(table, row))
        .collect();
    let children: Vec<Row<'_>> = bearing
        .iter()
        .copied()
        .filter(|(_, row)| !is_parent_kind(table, row))
        .collect();
    // Parent rows only stand in for variants when nothing else does.
    let sources = match (children.is_empty(), bearing.is_empty()) {
        (false, _) => children,
        (true, false) => bearing,
        (true, true) => vec![(first_row, lead)],
    };

    let variants = sources
        .into_iter()
        .map(|(row_number, row)| read_variant(table, row, row_number, currency, errors))
        .collect();

    Some(VendorProduct {
        key,
        first_row,
        title: title.to_string(),
        description: first_of(lead, &table.description).to_string(),
        category: first_of(lead, &table.category).to_string(),
        status,
        option_names,
        images,
        variants,
    })
}

fn read_status(
    table: &ColumnLocatorTable,
    lead: &[String],
    first_row: usize,
    errors: &mut Vec<ImportError>,
) -> ProductStatus {
    let explicit = at(lead, table.status);
    if !explicit.is_empty() {
        match explicit.parse::<ProductStatus>() {
            Ok(status) => return status,
            Err(message) => errors.push(ImportError::field(first_row, "status", message)),
        }
    }

    let published = at(lead, table.published);
    if !published.is_empty() && !parse_bool(published) {
        ProductStatus::Draft
    } else {
        ProductStatus::Active
    }
}

fn row_images(
    table: &ColumnLocatorTable,
    row: &[String],
    row_number: usize,
    errors: &mut Vec<ImportError>,
) -> Vec<String> {
    let singles = table.image_single.iter().map(|&column| at(row, Some(column)));
    let lists = table
        .image_list
        .iter()
        .flat_map(|&column| split_list(at(row, Some(column))));

    singles
        .chain(lists)
        .filter(|candidate| !candidate.is_empty())
        .filter_map(|candidate| {
            validate_url(candidate)
                .map_err(|message| errors.push(ImportError::field(row_number, "images", message)))
                .ok()
        })
        .collect()
}

fn is_parent_kind(table: &ColumnLocatorTable, row: &[String]) -> bool {
    let kind = at(row, table.row_kind);
    !kind.is_empty()
        && table
            .parent_kinds
            .iter()
            .any(|parent| kind.eq_ignore_ascii_case(parent))
}

/// Whether a row describes a purchasable combination rather than only images.
fn is_variant_row(table: &ColumnLocatorTable, row: &[String]) -> bool {
    let has = |column: Option<usize>| !at(row, column).is_empty();
    table.options.iter().any(|slot| has(slot.value))
        || has(table.sku)
        || has(table.price)
        || has(table.sale_price)
        || has(table.compare_at_price)
        || has(table.inventory)
}

fn read_variant(
    table: &ColumnLocatorTable,
    row: &[String],
    row_number: usize,
    currency: CurrencyCode,
    errors: &mut Vec<ImportError>,
) -> VendorVariant {
    let option_values = table.options.map(|slot| {
        let value = at(row, slot.value);
        let placeholder = table
            .placeholder_option_values
            .iter()
            .any(|p| value.eq_ignore_ascii_case(p));
        if placeholder {
            String::new()
        } else {
            value.to_string()
        }
    });

    let mut price_of = |column: Option<usize>, field: &str| {
        parse_optional_price(at(row, column), currency).unwrap_or_else(|message| {
            errors.push(ImportError::field(row_number, field, message));
            None
        })
    };
    let regular = price_of(table.price, "price");
    let sale = price_of(table.sale_price, "sale_price");
    let compare_at = price_of(table.compare_at_price, "compare_at_price");

    let (price, compare_at_price) = match sale {
        Some(sale) => (sale, regular),
        None => (regular.unwrap_or(0), compare_at),
    };

    let inventory = match parse_quantity(at(row, table.inventory)) {
        Ok(quantity) => quantity.map(clamp_stock),
        Err(message) => {
            errors.push(ImportError::field(row_number, "inventory", message));
            Some(0)
        }
    };

    let requires_shipping = table.shipping.and_then(|shipping| match shipping {
        ShippingColumn::Requires(column) => parse_flag(at(row, Some(column))),
        ShippingColumn::Digital { column, values } => {
            let value = at(row, Some(column));
            if value.is_empty() {
                None
            } else {
                let digital = values.iter().any(|v| value.eq_ignore_ascii_case(v))
                    || parse_flag(value) == Some(true);
                Some(!digital)
            }
        }
    });

    VendorVariant {
        row: row_number,
        option_values,
        sku: at(row, table.sku).to_string(),
        price,
        compare_at_price,
        inventory,
        requires_shipping,
    }
}

/// Platforms that allow overselling export negative stock.
fn clamp_stock(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

/// Build variant-aware records from grouped products.
#[must_use]
pub fn transform_to_import_products(products: Vec<VendorProduct>) -> Vec<PlatformProductRecord> {
    products.into_iter().map(build_record).collect()
}

fn option_label(names: &[String; 3], slot: usize) -> String {
    names
        .get(slot)
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("Option {}", slot + 1))
}

fn build_record(product: VendorProduct) -> PlatformProductRecord {
    let VendorProduct {
        title,
        description,
        category,
        status,
        option_names,
        images,
        variants,
        ..
    } = product;

    let variant_options = (0..option_names.len())
        .filter(|&slot| {
            variants
                .iter()
                .any(|v| v.option_values.get(slot).is_some_and(|value| !value.is_empty()))
        })
        .map(|slot| option_label(&option_names, slot))
        .collect();

    let has_variants = variants.len() > 1
        || variants
            .first()
            .is_some_and(|v| v.option_values.first().is_some_and(|value| !value.is_empty()));

    let base_price = variants.first().map_or(0, |v| v.price);
    // A variant without a shipping flag is assumed to ship.
    let is_digital =
        !variants.is_empty() && variants.iter().all(|v| v.requires_shipping == Some(false));

    let counts: Vec<u32> = variants.iter().filter_map(|v| v.inventory).collect();
    let (track_inventory, inventory_count) = if has_variants || counts.is_empty() {
        (false, None)
    } else {
        (true, Some(counts.iter().fold(0_u32, |sum, n| sum.saturating_add(*n))))
    };

    let records = variants
        .iter()
        .enumerate()
        .map(|(index, variant)| {
            let filled: Vec<(usize, &String)> = variant
                .option_values
                .iter()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .collect();
            let name = if filled.is_empty() {
                format!("Variant {}", index + 1)
            } else {
                filled
                    .iter()
                    .map(|(_, value)| value.as_str())
                    .collect::<Vec<_>>()
                    .join(" / ")
            };
            let options: BTreeMap<String, String> = filled
                .into_iter()
                .map(|(slot, value)| (option_label(&option_names, slot), value.clone()))
                .collect();

            VariantRecord {
                name,
                sku: variant.sku.clone(),
                price_adjustment: variant.price - base_price,
                inventory_count: variant.inventory.unwrap_or(0),
                track_inventory: true,
                options,
                is_active: true,
                compare_at_price: variant.compare_at_price,
            }
        })
        .collect();

    let mut record = StandardProductRecord {
        name: title,
        description,
        price: base_price,
        images,
        category,
        is_digital,
        track_inventory,
        inventory_count,
    };
    record.enforce_digital_rule();

    PlatformProductRecord {
        product: record,
        has_variants,
        variant_options,
        variants: records,
        status,
    }
}
