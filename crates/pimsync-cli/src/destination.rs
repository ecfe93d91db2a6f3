//! Where synced records go.
//!
//! The destination is chosen once at startup and every record flows through
//! [`Destination::emit`]. The storefront destination walks each record
//! through [`RecordState`]; every step after the upsert is best effort.

use std::path::PathBuf;

use clap::ValueEnum;
use pimsync_core::{ProductRecord, STOREFRONT_TITLE_MAX};
use pimsync_source::PimClient;
use pimsync_storefront::{ProductInput, ProductStatus, StorefrontClient, UpsertOutcome};

use crate::export::TsvExport;

/// Destination selected with `--mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Push to the storefront Admin API.
    Remote,
    /// Write a tab-delimited file.
    Tsv,
}

/// Progress of one record through the storefront destination.
///
/// A record ends as [`Outcome::Done`] or [`Outcome::Failed`]; the state is
/// the last step it completed before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    NotSynced,
    Created,
    /// Handle was taken; the existing product was looked up and updated.
    UpdateAttempted,
    VariantSynced,
    ImageAttempted,
}

/// How a record left the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
    /// Dry run: nothing was written.
    Skipped,
}

/// Result of emitting one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emitted {
    pub outcome: Outcome,
    pub last_step: RecordState,
    /// An image was uploaded, so the post-image delay applies.
    pub image_uploaded: bool,
}

impl Emitted {
    fn new(outcome: Outcome, last_step: RecordState) -> Self {
        Self {
            outcome,
            last_step,
            image_uploaded: false,
        }
    }
}

pub enum Destination {
    Storefront(StorefrontClient),
    File(TsvExport),
    /// `--dry-run`: logs what would be emitted and touches nothing.
    DryRun(Mode),
}

impl Destination {
    /// `true` when emitting talks to a remote service, so the inter-record
    /// delay applies.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Storefront(_))
    }

    /// Emits one record.
    ///
    /// Storefront failures are logged and reported through the returned
    /// state; only file-write failures are returned as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if a row cannot be written to the export file.
    pub async fn emit(
        &mut self,
        record: &ProductRecord,
        source: &PimClient,
    ) -> anyhow::Result<Emitted> {
        match self {
            Self::Storefront(client) => Ok(emit_remote(client, source, record).await),
            Self::File(export) => {
                export.write(record)?;
                Ok(Emitted::new(Outcome::Done, RecordState::NotSynced))
            }
            Self::DryRun(mode) => {
                tracing::info!(sku = %record.sku, handle = %record.handle(), ?mode, "dry-run: skipping");
                Ok(Emitted::new(Outcome::Skipped, RecordState::NotSynced))
            }
        }
    }

    /// Closes the destination, returning the export path in file mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the export file cannot be flushed.
    pub fn finish(self) -> anyhow::Result<Option<PathBuf>> {
        match self {
            Self::File(export) => export.finish().map(Some),
            Self::Storefront(_) | Self::DryRun(_) => Ok(None),
        }
    }
}

/// Storefront product input for a record.
#[must_use]
pub fn product_input(record: &ProductRecord) -> ProductInput {
    ProductInput {
        id: None,
        title: record.title(STOREFRONT_TITLE_MAX),
        description_html: record.sanitized_html(),
        vendor: record.brand_name.clone(),
        product_type: record.product_type.clone(),
        handle: record.handle(),
        status: ProductStatus::Active,
    }
}

async fn emit_remote(
    client: &StorefrontClient,
    source: &PimClient,
    record: &ProductRecord,
) -> Emitted {
    let sku = record.sku.as_str();
    let mut state = RecordState::NotSynced;

    let Some(outcome) = client.upsert_product(&product_input(record)).await else {
        tracing::error!(sku, ?state, "record failed: product upsert");
        return Emitted::new(Outcome::Failed, state);
    };
    state = match outcome {
        UpsertOutcome::Created(_) => RecordState::Created,
        UpsertOutcome::Updated(_) => RecordState::UpdateAttempted,
    };
    let product_id = outcome.id();

    if client
        .sync_variant(
            product_id,
            sku,
            &record.selected_price(),
            record.barcode(),
            record.mpn(),
        )
        .await
        .is_none()
    {
        tracing::error!(sku, product_id, ?state, "record failed: variant sync");
        return Emitted::new(Outcome::Failed, state);
    }
    state = RecordState::VariantSynced;

    let mut image_uploaded = false;
    if let Some(asset_id) = record.image_asset_id.as_deref() {
        match source.fetch_asset(asset_id).await {
            Some(bytes) => image_uploaded = client.upload_image(product_id, &bytes).await,
            None => tracing::warn!(sku, asset_id, "image asset unavailable, skipping upload"),
        }
        state = RecordState::ImageAttempted;
    }

    tracing::debug!(sku, last_step = ?state, "record synced");
    Emitted {
        outcome: Outcome::Done,
        last_step: state,
        image_uploaded,
    }
}
