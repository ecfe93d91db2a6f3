//! Mapping from raw PIM nodes to [`pimsync_core::ProductRecord`].
//!
//! This is the mapping boundary: past it, optional text is `""` instead of
//! `null`, so downstream slicing and concatenation never see a missing value.

use pimsync_core::ProductRecord;

use crate::error::SourceError;
use crate::types::RawProductNode;

/// Validates a raw node and converts it into a [`ProductRecord`].
///
/// # Errors
///
/// Returns [`SourceError::Validation`] when the SKU or the vendor part number
/// is missing or blank.
pub fn node_to_record(raw: RawProductNode) -> Result<ProductRecord, SourceError> {
    let node_id = raw.id.clone().unwrap_or_else(|| "<unknown>".to_string());

    let sku = required(raw.sku, "sku", &node_id)?;
    let vendor_part_number = required(raw.vendor_part_number, "VendorPartNumber", &node_id)?;

    let image_asset_id = raw
        .image_primary
        .and_then(|asset| asset.id)
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(ProductRecord {
        id: node_id,
        sku,
        upc: text(raw.upc),
        web_price: raw.web_price,
        map_price: raw.map_price,
        retail_price: raw.retail_price,
        cost: raw.cost,
        brand_name: text(raw.brand_name),
        model: text(raw.model),
        vendor_part_number,
        description_short: text(raw.description_short),
        description_medium: text(raw.description_medium),
        specifications_html: text(raw.specifications_wysiwyg),
        contents_html: text(raw.whats_in_box),
        product_type: text(raw.product_type),
        part_prefix: text(raw.part_prefix),
        product_url: text(raw.product_url),
        weight: raw.weight,
        image_asset_id,
    })
}

fn required(value: Option<String>, field: &str, node_id: &str) -> Result<String, SourceError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SourceError::Validation {
            node_id: node_id.to_string(),
            reason: format!("missing {field}"),
        })
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}
