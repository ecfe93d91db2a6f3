//! `--diagnose`: connectivity checks against one side of the sync.

use clap::ValueEnum;
use pimsync_core::AppConfig;
use pimsync_source::PimClient;
use pimsync_storefront::StorefrontClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiagnoseTarget {
    /// Query the PIM listing once.
    Source,
    /// Read the shop name with the admin token.
    Storefront,
}

/// Runs the check and prints one result line.
///
/// # Errors
///
/// Returns an error when the check fails, so the process exits non-zero.
pub async fn run(
    target: DiagnoseTarget,
    config: &AppConfig,
    filter: Option<&str>,
) -> anyhow::Result<()> {
    match target {
        DiagnoseTarget::Source => {
            let client = PimClient::from_config(config)
                .map_err(|e| anyhow::anyhow!("failed to build PIM client: {e}"))?;
            let filter = filter.unwrap_or_default();
            let records = client
                .try_fetch_products(filter, 1)
                .await
                .map_err(|e| anyhow::anyhow!("PIM check failed: {e}"))?;
            println!(
                "source OK: {} listing reachable, {} record(s) for {}={filter:?}",
                config.pim_listing,
                records.len(),
                config.pim_filter_field
            );
        }
        DiagnoseTarget::Storefront => {
            let client = StorefrontClient::from_config(config)
                .map_err(|e| anyhow::anyhow!("failed to build storefront client: {e}"))?;
            let shop = client
                .check_access()
                .await
                .map_err(|e| anyhow::anyhow!("storefront check failed: {e}"))?;
            println!("storefront OK: connected to shop {shop:?}");
        }
    }
    Ok(())
}
