//! Sequential submission of prepared records.
//!
//! Records are sent one at a time, in file order, through a
//! [`ProductRepository`]. A failed create is recorded and the loop moves on;
//! nothing is retried. The progress callback runs after every settled request
//! and may stop the run before the next one starts.

use core::future::Future;
use core::ops::ControlFlow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storeloom_core::ProductId;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::record::ImportRecord;

/// The store's answer to a successful create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAck {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Variants the store actually created, when it reports them.
    #[serde(default)]
    pub variants_created: Option<u32>,
}

/// Destination for imported products.
pub trait ProductRepository {
    /// Create one product (and its variants).
    fn create(
        &self,
        record: &ImportRecord,
    ) -> impl Future<Output = Result<CreateAck, RepositoryError>> + Send;
}

/// Progress after one settled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportProgress {
    /// Requests settled so far.
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// One record the store did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionFailure {
    /// Position of the record in the submitted list.
    pub index: usize,
    /// Source row the record was built from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub name: String,
    pub message: String,
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Records submitted before the run ended.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub variants_created: u64,
    pub failures: Vec<SubmissionFailure>,
    /// True when the progress callback stopped the run early.
    pub cancelled: bool,
}

impl ImportSummary {
    /// Whether every attempted record was created.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Drives a list of records into a [`ProductRepository`].
#[derive(Debug)]
pub struct ImportRunner<R> {
    repository: R,
}

impl<R: ProductRepository> ImportRunner<R> {
    pub const fn new(repository: R) -> Self {
        Self { repository }
    }

    /// The underlying repository.
    pub const fn repository(&self) -> &R {
        &self.repository
    }

    /// Submit every record without progress reporting.
    pub async fn run(&self, records: &[ImportRecord]) -> ImportSummary {
        self.run_with_progress(records, &[], |_| ControlFlow::Continue(()))
            .await
    }

    /// Submit records in order, calling `on_progress` after each request.
    ///
    /// `rows` maps record index to source row for failure reports; it may be
    /// shorter than `records` or empty. Returning [`ControlFlow::Break`] from
    /// the callback stops the run before the next request.
    #[instrument(skip_all, fields(run_id = tracing::field::Empty, total = records.len()))]
    pub async fn run_with_progress<F>(
        &self,
        records: &[ImportRecord],
        rows: &[usize],
        mut on_progress: F,
    ) -> ImportSummary
    where
        F: FnMut(ImportProgress) -> ControlFlow<()>,
    {
        let run_id = Uuid::new_v4();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));

        let mut summary = ImportSummary {
            run_id,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            attempted: 0,
            succeeded: 0,
            failed: 0,
            variants_created: 0,
            failures: Vec::new(),
            cancelled: false,
        };

        info!(total = records.len(), "Starting import run");

        for (index, record) in records.iter().enumerate() {
            summary.attempted += 1;
            match self.repository.create(record).await {
                Ok(ack) => {
                    summary.succeeded += 1;
                    let variants = ack.variants_created.map_or_else(
                        || u64::try_from(record.variant_count()).unwrap_or(u64::MAX),
                        u64::from,
                    );
                    summary.variants_created = summary.variants_created.saturating_add(variants);
                }
                Err(e) => {
                    let row = rows.get(index).copied();
                    warn!(index, ?row, product = record.name(), error = %e, "Product create failed");
                    summary.failed += 1;
                    summary.failures.push(SubmissionFailure {
                        index,
                        row,
                        name: record.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }

            let progress = ImportProgress {
                completed: index + 1,
                total: records.len(),
                succeeded: summary.succeeded,
                failed: summary.failed,
            };
            if on_progress(progress).is_break() && index + 1 < records.len() {
                info!(completed = index + 1, "Import run cancelled");
                summary.cancelled = true;
                break;
            }
        }

        summary.finished_at = Utc::now();
        info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            variants_created = summary.variants_created,
            cancelled = summary.cancelled,
            "Import run finished"
        );
        summary
    }
}
