//! Storefront Admin API request and response types.
//!
//! GraphQL operations each get their own variables and data structs; the
//! REST endpoints used for variants and images get theirs below. Response
//! structs default every field so a partial payload degrades to `None`
//! instead of a deserialization error.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GraphQL envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub variables: V,
}

/// A GraphQL response as returned by [`crate::StorefrontClient::execute_call`].
///
/// Exhausted retries and other call-level failures are folded into `errors`
/// so callers inspect one shape.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphQlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

pub const THROTTLED_CODE: &str = "THROTTLED";

impl GraphQlError {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            extensions: None,
        }
    }

    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            == Some(THROTTLED_CODE)
    }
}

impl<T> GraphQlResponse<T> {
    /// A response carrying only an error message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: vec![GraphQlError::message(message)],
        }
    }

    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.errors.iter().any(GraphQlError::is_throttled)
    }

    /// All error messages joined with `"; "`, or `None` when there are none.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        Some(messages.join("; "))
    }
}

// ---------------------------------------------------------------------------
// products
// ---------------------------------------------------------------------------

/// `ProductInput` for `productCreate` / `productUpdate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    /// Set only for updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description_html: String,
    pub vendor: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_type: String,
    pub handle: String,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Draft,
}

#[derive(Debug, Serialize)]
pub struct ProductInputVariables<'a> {
    pub input: &'a ProductInput,
}

#[derive(Debug, Serialize)]
pub struct HandleVariables<'a> {
    pub handle: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreateData {
    #[serde(default)]
    pub product_create: Option<ProductMutationPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateData {
    #[serde(default)]
    pub product_update: Option<ProductMutationPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMutationPayload {
    #[serde(default)]
    pub product: Option<NodeId>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductByHandleData {
    #[serde(default)]
    pub product_by_handle: Option<NodeId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeId {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// shop
// ---------------------------------------------------------------------------

/// Serializes as `{}` for operations without variables.
#[derive(Debug, Serialize)]
pub struct NoVariables {}

#[derive(Debug, Default, Deserialize)]
pub struct ShopData {
    #[serde(default)]
    pub shop: Option<ShopName>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShopName {
    #[serde(default)]
    pub name: String,
}

// ---------------------------------------------------------------------------
// metafields
// ---------------------------------------------------------------------------

/// Namespace and key of a metafield definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetafieldKey {
    pub namespace: String,
    pub key: String,
}

impl MetafieldKey {
    #[must_use]
    pub fn new(namespace: &str, key: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            key: key.to_string(),
        }
    }
}

/// REST `GET variants/{id}/metafields.json`.
#[derive(Debug, Default, Deserialize)]
pub struct RestMetafieldsResponse {
    #[serde(default)]
    pub metafields: Vec<MetafieldKey>,
}

#[derive(Debug, Serialize)]
pub struct VariantMetafieldsVariables {
    pub first: u32,
}

/// `productVariants(first:) { edges { node { id metafields { ... } } } }`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetafieldsData {
    #[serde(default)]
    pub product_variants: Option<Connection<VariantMetafieldsNode>>,
}

#[derive(Debug, Deserialize)]
pub struct VariantMetafieldsNode {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub metafields: Option<Connection<MetafieldKey>>,
}

#[derive(Debug, Deserialize)]
pub struct Connection<N> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<N>>,
}

#[derive(Debug, Deserialize)]
pub struct Edge<N> {
    pub node: N,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetInput {
    pub owner_id: String,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub value_type: &'static str,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct MetafieldsSetVariables<'a> {
    pub metafields: &'a [MetafieldsSetInput],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetData {
    #[serde(default)]
    pub metafields_set: Option<MetafieldsSetPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetafieldsSetPayload {
    #[serde(default)]
    pub metafields: Vec<MetafieldKey>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

// ---------------------------------------------------------------------------
// REST: variants
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RestVariantsResponse {
    #[serde(default)]
    pub variants: Vec<RestVariant>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestVariantResponse {
    #[serde(default)]
    pub variant: Option<RestVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestVariant {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct VariantUpdateRequest<'a> {
    pub variant: VariantUpdate<'a>,
}

/// Body of `PUT variants/{id}.json`. A blank barcode is sent as `null` so the
/// storefront clears it.
#[derive(Debug, Serialize)]
pub struct VariantUpdate<'a> {
    pub id: i64,
    pub sku: &'a str,
    pub price: &'a str,
    pub barcode: Option<&'a str>,
    pub inventory_management: &'static str,
    pub inventory_policy: &'static str,
}

// ---------------------------------------------------------------------------
// REST: images
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ImageUploadRequest {
    pub image: ImageAttachment,
}

#[derive(Debug, Serialize)]
pub struct ImageAttachment {
    /// Base64-encoded image bytes.
    pub attachment: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestImageResponse {
    #[serde(default)]
    pub image: Option<RestImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestImage {
    pub id: i64,
}
