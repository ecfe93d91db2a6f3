//! PIM GraphQL request and response types.
//!
//! The webservice wraps every response in the standard GraphQL envelope
//! (`{"data": ..., "errors": [...]}`); [`GraphQlEnvelope`] captures it
//! generically. Queries alias their root field (`products:`, `asset:`) so the
//! response structs stay fixed even though the listing operation name is
//! configurable.
//!
//! ## Observed field quirks
//!
//! - Price, cost and weight fields arrive as JSON numbers, numeric strings or
//!   `null` depending on how the class field is defined. All three shapes are
//!   accepted; anything unparsable becomes `0.0`.
//! - `id` is a string on newer webservice versions and an integer on older ones.
//! - Optional text fields are `null` rather than `""` when unset.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request body for a GraphQL POST.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// Standard GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorEntry {
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// product listing
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ListingVariables {
    pub limit: usize,
    /// JSON-encoded filter document, e.g. `{"PartPrefix":"ACM"}`.
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub products: Option<ListingConnection>,
}

#[derive(Debug, Deserialize)]
pub struct ListingConnection {
    #[serde(default)]
    pub edges: Vec<ListingEdge>,
}

/// One listing edge. The node is kept as raw JSON so a malformed node can be
/// skipped without failing the whole page.
#[derive(Debug, Deserialize)]
pub struct ListingEdge {
    #[serde(default)]
    pub node: Option<Value>,
}

/// A product node exactly as the webservice returns it.
#[derive(Debug, Default, Deserialize)]
pub struct RawProductNode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(rename = "WebPrice", default, deserialize_with = "lenient_f64")]
    pub web_price: f64,
    #[serde(rename = "MAP", default, deserialize_with = "lenient_f64")]
    pub map_price: f64,
    #[serde(rename = "Retail", default, deserialize_with = "lenient_f64")]
    pub retail_price: f64,
    #[serde(rename = "Cost", default, deserialize_with = "lenient_f64")]
    pub cost: f64,
    #[serde(rename = "BrandName", default)]
    pub brand_name: Option<String>,
    #[serde(rename = "Model", default)]
    pub model: Option<String>,
    #[serde(rename = "VendorPartNumber", default)]
    pub vendor_part_number: Option<String>,
    #[serde(rename = "Description_Short", default)]
    pub description_short: Option<String>,
    #[serde(rename = "Description_Medium", default)]
    pub description_medium: Option<String>,
    #[serde(rename = "Specifications_WYSIWYG", default)]
    pub specifications_wysiwyg: Option<String>,
    #[serde(rename = "WhatsInBox", default)]
    pub whats_in_box: Option<String>,
    #[serde(rename = "ProductType", default)]
    pub product_type: Option<String>,
    #[serde(rename = "PartPrefix", default)]
    pub part_prefix: Option<String>,
    #[serde(rename = "ProductURL", default)]
    pub product_url: Option<String>,
    #[serde(rename = "Weight", default, deserialize_with = "lenient_f64")]
    pub weight: f64,
    #[serde(rename = "ImagePrimary", default)]
    pub image_primary: Option<AssetRef>,
}

/// Link from a product to an asset (`ImagePrimary { id }`).
#[derive(Debug, Default, Deserialize)]
pub struct AssetRef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// asset download
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AssetVariables {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AssetData {
    #[serde(default)]
    pub asset: Option<AssetPayload>,
}

#[derive(Debug, Deserialize)]
pub struct AssetPayload {
    /// Base64-encoded file contents.
    #[serde(default)]
    pub data: Option<String>,
}

// ---------------------------------------------------------------------------
// lenient field decoders
// ---------------------------------------------------------------------------

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()).unwrap_or(0.0))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
