//! Format selection and the single entry point over a whole file.

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};
use storeloom_core::CurrencyCode;
use tracing::{info, instrument, warn};

use crate::error::ImportError;
use crate::mapping::{CanonicalField, ColumnMapping, detect_mapping};
use crate::platform::{Platform, detect_platform, parse_rows, transform_to_import_products};
use crate::reader::{RawTable, parse};
use crate::record::{ImportRecord, PlatformImportBatch, StandardProductRecord};
use crate::standard::validate_and_transform;

/// Which path a file goes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImportFormat {
    /// Detect a platform export, falling back to [`ImportFormat::Standard`].
    #[default]
    Auto,
    /// Generic spreadsheet, one product per row.
    Standard,
    /// A known platform export.
    Platform(Platform),
}

impl ImportFormat {
    /// Resolve `Auto` against a file's headers; other formats pass through.
    #[must_use]
    pub fn resolve(self, headers: &[String]) -> Self {
        match self {
            Self::Auto => detect_platform(headers).map_or(Self::Standard, Self::Platform),
            other => other,
        }
    }
}

impl fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Standard => f.write_str("standard"),
            Self::Platform(platform) => fmt::Display::fmt(platform, f),
        }
    }
}

impl FromStr for ImportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "standard" | "generic" => Ok(Self::Standard),
            other => other
                .parse::<Platform>()
                .map(Self::Platform)
                .map_err(|_| format!("unknown import format: {s}")),
        }
    }
}

impl Serialize for ImportFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Caller choices for one import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub format: ImportFormat,
    /// Store currency; decides the minor-unit factor for prices.
    pub currency: CurrencyCode,
    /// Replaces the inferred mapping on the standard path; platform exports
    /// ignore it. The CLI fills it from `--mapping-json`.
    pub mapping: Option<ColumnMapping>,
    /// Individual columns pinned on top of the inferred (or supplied) mapping.
    pub overrides: Vec<(CanonicalField, usize)>,
}

/// Records produced by whichever path the file took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBatch {
    Standard(Vec<StandardProductRecord>),
    Platform(PlatformImportBatch),
}

impl ImportBatch {
    /// The resolved format that produced this batch.
    #[must_use]
    pub const fn format(&self) -> ImportFormat {
        match self {
            Self::Standard(_) => ImportFormat::Standard,
            Self::Platform(batch) => ImportFormat::Platform(batch.vendor),
        }
    }

    /// Flatten into submission order.
    #[must_use]
    pub fn into_records(self) -> Vec<ImportRecord> {
        match self {
            Self::Standard(products) => products.into_iter().map(ImportRecord::from).collect(),
            Self::Platform(batch) => batch.products.into_iter().map(ImportRecord::from).collect(),
        }
    }
}

/// Everything a caller needs to show before committing an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// The path the file went through; `auto` only when there was no header row.
    pub format: ImportFormat,
    /// The column mapping used, on the standard path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<ColumnMapping>,
    pub products: Vec<ImportRecord>,
    /// 1-based source row each product starts at, parallel to `products`.
    #[serde(skip)]
    pub source_rows: Vec<usize>,
    pub errors: Vec<ImportError>,
    pub product_count: usize,
    /// Variants across products that have them.
    pub variant_count: usize,
}

impl ImportReport {
    fn new(
        batch: ImportBatch,
        mapping: Option<ColumnMapping>,
        source_rows: Vec<usize>,
        errors: Vec<ImportError>,
    ) -> Self {
        let format = batch.format();
        let products = batch.into_records();
        Self {
            format,
            mapping,
            product_count: products.len(),
            variant_count: products.iter().map(ImportRecord::variant_count).sum(),
            products,
            source_rows,
            errors,
        }
    }

    fn rejected(
        format: ImportFormat,
        mapping: Option<ColumnMapping>,
        errors: Vec<ImportError>,
    ) -> Self {
        Self {
            format,
            mapping,
            products: Vec::new(),
            source_rows: Vec::new(),
            errors,
            product_count: 0,
            variant_count: 0,
        }
    }

    /// Whether any schema-level error stopped the import.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.errors.iter().any(ImportError::is_schema)
    }
}

/// A first look at a file, without transforming any row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInspection {
    pub headers: Vec<String>,
    pub row_count: usize,
    /// Platform export dialect, if the headers match one.
    pub detected: Option<Platform>,
    /// What the standard path would infer.
    pub mapping: ColumnMapping,
}

/// Tokenize a file and report its shape.
#[must_use]
pub fn inspect(content: &str) -> FileInspection {
    let RawTable { headers, rows } = parse(content);
    FileInspection {
        detected: detect_platform(&headers),
        mapping: detect_mapping(&headers),
        row_count: rows.len(),
        headers,
    }
}

/// Run a whole file through tokenizing, format selection and the chosen path.
///
/// Never fails: every problem is an entry in [`ImportReport::errors`], and a
/// schema-level problem leaves `products` empty.
#[must_use]
#[instrument(skip(content, options), fields(bytes = content.len(), format = %options.format))]
pub fn prepare_import(content: &str, options: &ImportOptions) -> ImportReport {
    let table = parse(content);
    if table.is_empty() {
        warn!("File has no header row");
        return ImportReport::rejected(
            options.format,
            None,
            vec![ImportError::schema("file", "File has no header row")],
        );
    }

    let format = options.format.resolve(&table.headers);
    info!(%format, rows = table.row_count(), "Preparing import");

    let report = match format {
        ImportFormat::Platform(platform) => {
            let parsed = parse_rows(platform, &table.rows, &table.headers, options.currency);
            let source_rows = parsed.products.iter().map(|p| p.first_row).collect();
            let batch = ImportBatch::Platform(PlatformImportBatch {
                vendor: platform,
                products: transform_to_import_products(parsed.products),
            });
            ImportReport::new(batch, None, source_rows, parsed.errors)
        }
        ImportFormat::Auto | ImportFormat::Standard => standard_report(&table, options),
    };

    info!(
        format = %report.format,
        products = report.product_count,
        variants = report.variant_count,
        errors = report.errors.len(),
        "Import prepared"
    );
    report
}

fn standard_report(table: &RawTable, options: &ImportOptions) -> ImportReport {
    let mut mapping = options
        .mapping
        .unwrap_or_else(|| detect_mapping(&table.headers));
    for &(field, column) in &options.overrides {
        mapping.set(field, Some(column));
    }

    let mapping_errors = mapping.validate(table.headers.len());
    if !mapping_errors.is_empty() {
        warn!(errors = mapping_errors.len(), "Column mapping out of range");
        return ImportReport::rejected(ImportFormat::Standard, Some(mapping), mapping_errors);
    }

    let result = validate_and_transform(&table.rows, &mapping, options.currency);
    ImportReport::new(
        ImportBatch::Standard(result.products),
        Some(mapping),
        result.rows,
        result.errors,
    )
}
