//! Product import commands.
//!
//! # Usage
//!
//! ```bash
//! # Show headers, detected format and inferred mapping
//! sl-cli import inspect products.csv
//!
//! # Print the validated records and errors as JSON
//! sl-cli import preview products.csv --format shopify --pretty
//!
//! # Submit every record (Ctrl-C stops after the current request)
//! sl-cli import run products.csv --currency EUR
//!
//! # Replace the inferred mapping, then pin one more column
//! sl-cli import preview items.csv --mapping-json '{"name":0,"price":2}' --map images=4
//! ```
//!
//! # Environment Variables
//!
//! - `STORELOOM_API_URL` / `STORELOOM_API_TOKEN` - Product API (`run` only)
//! - `STORELOOM_CURRENCY` - Default store currency

use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Args;
use storeloom_core::CurrencyCode;
use storeloom_import::{
    CanonicalField, ColumnMapping, ImportFormat, ImportOptions, ImportReport, ImportRunner, ImportSummary,
    ProductRepository, inspect as inspect_file, prepare_import,
};
use tracing::{info, warn};

use crate::config::{ApiConfig, ImportDefaults};
use crate::error::CliError;
use crate::repository::{DryRunRepository, HttpProductRepository};

/// Options shared by `preview` and `run`.
#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Input format (`auto`, `standard`, `shopify`, `woocommerce`, `bigcommerce`)
    #[arg(short, long, default_value = "auto", value_parser = parse_format)]
    pub format: ImportFormat,

    /// Store currency (defaults to `STORELOOM_CURRENCY`, then USD)
    #[arg(short, long, value_parser = parse_currency)]
    pub currency: Option<CurrencyCode>,

    /// Pin a column for the standard format, e.g. `--map price=3`
    #[arg(short = 'm', long = "map", value_name = "FIELD=INDEX", value_parser = parse_mapping_override)]
    pub overrides: Vec<(CanonicalField, usize)>,

    /// Full standard-format mapping as JSON, e.g. `{"name":0,"price":2}`
    #[arg(long = "mapping-json", value_name = "JSON", value_parser = parse_mapping_json)]
    pub mapping: Option<ColumnMapping>,
}

impl PrepareArgs {
    /// Whether mapping flags were given for a format that never reads them.
    fn ignores_mapping_flags(&self, format: ImportFormat) -> bool {
        let has_flags = self.mapping.is_some() || !self.overrides.is_empty();
        has_flags && !matches!(format, ImportFormat::Standard)
    }
}

fn parse_format(raw: &str) -> Result<ImportFormat, String> {
    raw.parse()
}

fn parse_currency(raw: &str) -> Result<CurrencyCode, String> {
    raw.parse().map_err(|e: storeloom_core::UnknownCurrency| e.to_string())
}

/// Parse `field=index` into a mapping override.
fn parse_mapping_override(raw: &str) -> Result<(CanonicalField, usize), String> {
    let (field, index) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=INDEX, got {raw}"))?;
    let field = field.parse::<CanonicalField>()?;
    let index = index
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("column index must be a non-negative integer, got {index}"))?;
    Ok((field, index))
}

fn parse_mapping_json(raw: &str) -> Result<ColumnMapping, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid column mapping: {e}"))
}

/// Print the file's headers, detected format and inferred mapping.
///
/// # Errors
///
/// Returns error if the file cannot be read or output cannot be written.
pub async fn inspect(file: &Path) -> Result<(), CliError> {
    let content = read_file(file).await?;
    let inspection = inspect_file(&content);

    let mut out = std::io::stdout().lock();
    writeln!(out, "File:     {}", file.display())?;
    writeln!(out, "Rows:     {}", inspection.row_count)?;
    match inspection.detected {
        Some(platform) => writeln!(out, "Format:   {platform} export")?,
        None => writeln!(out, "Format:   standard")?,
    }
    writeln!(out, "Headers:")?;
    for (index, header) in inspection.headers.iter().enumerate() {
        writeln!(out, "  [{index:>2}] {header}")?;
    }
    writeln!(out, "Inferred mapping:")?;
    for field in CanonicalField::ALL {
        let column = inspection.mapping.get(field).map_or_else(
            || "-".to_string(),
            |i| {
                let header = inspection.headers.get(i).map_or("", String::as_str);
                format!("[{i}] {header}")
            },
        );
        writeln!(out, "  {:<16} {column}", field.as_str())?;
    }
    Ok(())
}

/// Print the import report as JSON without submitting anything.
///
/// # Errors
///
/// Returns error if the file cannot be read or the report cannot be written.
pub async fn preview(args: &PrepareArgs, pretty: bool) -> Result<(), CliError> {
    let report = prepare(args).await?;
    log_errors(&report);

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    writeln!(std::io::stdout().lock(), "{json}")?;
    Ok(())
}

/// Prepare the file and submit every record.
///
/// # Errors
///
/// Returns error if the file is rejected, configuration is missing, or any
/// record fails to import.
pub async fn run(args: &PrepareArgs, dry_run: bool) -> Result<(), CliError> {
    let report = prepare(args).await?;
    log_errors(&report);

    if report.is_rejected() {
        let reasons: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        return Err(CliError::Rejected(reasons.join("; ")));
    }
    if report.products.is_empty() {
        warn!("No products to import");
        return Ok(());
    }

    let summary = if dry_run {
        info!("Dry run: records are validated but not submitted");
        submit(DryRunRepository, &report).await
    } else {
        let config = ApiConfig::from_env()?;
        let repository = HttpProductRepository::new(&config)?;
        info!(endpoint = %repository.endpoint(), "Submitting products");
        submit(repository, &report).await
    };

    for failure in &summary.failures {
        warn!(
            row = ?failure.row,
            product = %failure.name,
            "Not imported: {}",
            failure.message
        );
    }
    info!(
        run_id = %summary.run_id,
        succeeded = summary.succeeded,
        failed = summary.failed,
        variants = summary.variants_created,
        "Import finished"
    );

    if summary.is_clean() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failed: summary.failed,
            attempted: summary.attempted,
        })
    }
}

async fn read_file(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
}

async fn prepare(args: &PrepareArgs) -> Result<ImportReport, CliError> {
    let content = read_file(&args.file).await?;
    let currency = match args.currency {
        Some(currency) => currency,
        None => ImportDefaults::from_env()?.currency,
    };

    let options = ImportOptions {
        format: args.format,
        currency,
        mapping: args.mapping,
        overrides: args.overrides.clone(),
    };
    let report = prepare_import(&content, &options);
    if args.ignores_mapping_flags(report.format) {
        warn!(format = %report.format, "Column mapping flags only apply to standard files; ignored");
    }
    Ok(report)
}

fn log_errors(report: &ImportReport) {
    for error in &report.errors {
        warn!(row = error.row, field = %error.field, level = ?error.level, "{}", error.message);
    }
    info!(
        format = %report.format,
        products = report.product_count,
        variants = report.variant_count,
        errors = report.errors.len(),
        "Prepared import"
    );
}

/// Submit with a progress log line per record; Ctrl-C stops before the next one.
async fn submit<R: ProductRepository>(repository: R, report: &ImportReport) -> ImportSummary {
    let interrupted = Arc::new(AtomicBool::new(false));
    let watcher = {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; stopping after the current product");
                interrupted.store(true, Ordering::SeqCst);
            }
        })
    };

    let runner = ImportRunner::new(repository);
    let summary = runner
        .run_with_progress(&report.products, &report.source_rows, |progress| {
            info!(
                completed = progress.completed,
                total = progress.total,
                failed = progress.failed,
                "Progress"
            );
            if interrupted.load(Ordering::SeqCst) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await;

    watcher.abort();
    summary
}
