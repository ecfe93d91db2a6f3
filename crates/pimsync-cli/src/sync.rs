//! Sequential sync run: fetch a bounded batch, emit each record, pace the
//! storefront with fixed delays.

use std::fmt;
use std::time::Duration;

use pimsync_core::{AppConfig, ProductRecord};
use pimsync_source::PimClient;

use crate::destination::{Destination, Emitted, Outcome, RecordState};

/// Knobs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub max_records: usize,
    /// Sleep between consecutive records (storefront only).
    pub delay_between: Duration,
    /// Extra sleep after a successful image upload.
    pub delay_after_image: Duration,
}

impl SyncOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig, max_records: usize) -> Self {
        Self {
            max_records,
            delay_between: Duration::from_secs(config.delay_between_products_secs),
            delay_after_image: Duration::from_secs(config.delay_after_image_secs),
        }
    }
}

/// Per-run counters printed at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub fetched: usize,
    pub emitted: usize,
    pub failed: usize,
    /// Failed after the product itself was written.
    pub partial: usize,
    pub skipped: usize,
}

impl SyncSummary {
    fn count(&mut self, emitted: &Emitted) {
        match emitted.outcome {
            Outcome::Done => self.emitted += 1,
            Outcome::Failed => {
                self.failed += 1;
                if emitted.last_step != RecordState::NotSynced {
                    self.partial += 1;
                }
            }
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sync complete: {} fetched, {} emitted, {} failed ({} partial), {} skipped",
            self.fetched, self.emitted, self.failed, self.partial, self.skipped
        )
    }
}

/// Syncs up to `options.max_records` records matching `filter`.
///
/// Records are processed strictly in fetch order. A record that fails on
/// the storefront is counted and the run moves on.
///
/// # Errors
///
/// Returns an error only when the destination reports one, i.e. a failed
/// write to the export file.
pub async fn run(
    source: &PimClient,
    destination: &mut Destination,
    filter: &str,
    options: &SyncOptions,
) -> anyhow::Result<SyncSummary> {
    tracing::info!(filter, max_records = options.max_records, "starting sync");
    let records = source.fetch_products(filter, options.max_records).await;
    if records.is_empty() {
        tracing::warn!(filter, "no products found");
        return Ok(SyncSummary::default());
    }
    emit_all(source, destination, &records, options).await
}

async fn emit_all(
    source: &PimClient,
    destination: &mut Destination,
    records: &[ProductRecord],
    options: &SyncOptions,
) -> anyhow::Result<SyncSummary> {
    let total = records.len();
    let mut summary = SyncSummary {
        fetched: total,
        ..SyncSummary::default()
    };

    tracing::info!(total, "processing records");
    for (index, record) in records.iter().enumerate() {
        tracing::info!(
            position = index + 1,
            total,
            sku = %record.sku,
            "syncing record"
        );

        let emitted = destination.emit(record, source).await?;
        summary.count(&emitted);
        let has_next = index + 1 < total;
        pause(pause_after(&emitted, destination.is_remote(), has_next, options)).await;
    }

    tracing::info!(
        fetched = summary.fetched,
        emitted = summary.emitted,
        failed = summary.failed,
        partial = summary.partial,
        skipped = summary.skipped,
        "sync finished"
    );
    Ok(summary)
}

/// Sleep owed after a record: the post-image delay when an image went up,
/// plus the inter-record delay between storefront records.
fn pause_after(emitted: &Emitted, remote: bool, has_next: bool, options: &SyncOptions) -> Duration {
    let mut delay = Duration::ZERO;
    if emitted.image_uploaded {
        delay += options.delay_after_image;
    }
    if remote && has_next {
        delay += options.delay_between;
    }
    delay
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tracing::debug!(delay_secs = delay.as_secs(), "pausing");
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
