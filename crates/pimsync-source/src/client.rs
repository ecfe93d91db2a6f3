//! HTTP client for the PIM GraphQL webservice.
//!
//! Wraps `reqwest` with webservice URL construction, API key handling and
//! typed response deserialization. The `try_*` methods surface every failure
//! as a [`SourceError`]; the plain methods are the fail-soft variants the sync
//! run uses, which log and return an empty result instead.

use std::time::Duration;

use base64::Engine as _;
use pimsync_core::{AppConfig, ProductRecord};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SourceError;
use crate::normalize::node_to_record;
use crate::types::{
    AssetData, AssetVariables, GraphQlEnvelope, GraphQlRequest, ListingData, ListingVariables,
    RawProductNode,
};

const WEBSERVICE_PATH: &str = "pimcore-graphql-webservices";
const DEFAULT_LISTING: &str = "getProdM06Listing";
const DEFAULT_FILTER_FIELD: &str = "PartPrefix";

const PRODUCT_FIELDS: &str = "id sku upc WebPrice MAP Retail Cost BrandName Model \
    VendorPartNumber Description_Short Description_Medium Specifications_WYSIWYG \
    WhatsInBox ProductType PartPrefix ProductURL Weight ImagePrimary { id }";

const ASSET_QUERY: &str = "query($id: Int!) { asset: getAsset(id: $id) { data } }";

/// Client for the PIM GraphQL webservice.
///
/// Owns its HTTP session; construct once per run and pass it by reference.
/// Use [`PimClient::new`] with the webservice base URL (a wiremock server URI
/// in tests).
pub struct PimClient {
    client: Client,
    api_url: Url,
    listing: String,
    filter_field: String,
}

impl PimClient {
    /// Creates a client for the webservice endpoint
    /// `{base_url}/pimcore-graphql-webservices/{endpoint_name}?apikey={api_key}`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SourceError::InvalidBaseUrl`] if
    /// `base_url` is not a valid base URL.
    pub fn new(
        base_url: &str,
        endpoint_name: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pimsync/0.1 (catalog-export)")
            .build()?;

        let api_url = build_api_url(base_url, endpoint_name, api_key)?;

        Ok(Self {
            client,
            api_url,
            listing: DEFAULT_LISTING.to_string(),
            filter_field: DEFAULT_FILTER_FIELD.to_string(),
        })
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Same as [`PimClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self::new(
            &config.pim_base_url,
            &config.pim_endpoint_name,
            &config.pim_api_key,
            config.request_timeout_secs,
        )?
        .with_listing(&config.pim_listing, &config.pim_filter_field))
    }

    /// Overrides the listing operation and the field the filter value is
    /// matched against.
    #[must_use]
    pub fn with_listing(mut self, listing: &str, filter_field: &str) -> Self {
        self.listing = listing.to_string();
        self.filter_field = filter_field.to_string();
        self
    }

    /// Fetches up to `limit` products whose filter field equals `filter_value`.
    ///
    /// Fails soft: transport errors, malformed responses and GraphQL errors
    /// are logged and yield an empty list. Nodes that fail validation are
    /// skipped individually.
    pub async fn fetch_products(&self, filter_value: &str, limit: usize) -> Vec<ProductRecord> {
        match self.try_fetch_products(filter_value, limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(filter = filter_value, error = %e, "PIM product fetch failed");
                Vec::new()
            }
        }
    }

    /// Fetches up to `limit` products whose filter field equals `filter_value`.
    ///
    /// Only the first page is requested. Nodes that fail to deserialize or
    /// validate are logged and skipped; the rest are returned in fetch order.
    ///
    /// # Errors
    ///
    /// - [`SourceError::Http`] on network failure or non-2xx HTTP status.
    /// - [`SourceError::Deserialize`] if the body is not the expected shape.
    /// - [`SourceError::GraphQl`] if the webservice reports errors.
    /// - [`SourceError::MissingData`] if the listing field is null.
    pub async fn try_fetch_products(
        &self,
        filter_value: &str,
        limit: usize,
    ) -> Result<Vec<ProductRecord>, SourceError> {
        let query = self.listing_query();
        let variables = ListingVariables {
            limit,
            filter: self.filter_document(filter_value),
        };
        let data: ListingData = self.post_graphql(&self.listing, &query, variables).await?;
        let connection = data
            .products
            .ok_or_else(|| SourceError::MissingData(self.listing.clone()))?;

        let records = connection
            .edges
            .into_iter()
            .filter_map(|edge| edge.node)
            .filter_map(|node| {
                serde_json::from_value::<RawProductNode>(node)
                    .map_err(|e| SourceError::Deserialize {
                        context: "product node".to_string(),
                        source: e,
                    })
                    .and_then(node_to_record)
                    .map_err(|e| {
                        tracing::warn!(error = %e, "skipping invalid product node");
                    })
                    .ok()
            })
            .take(limit)
            .collect();

        Ok(records)
    }

    /// Downloads an asset's binary contents.
    ///
    /// Fails soft: any error is logged and yields `None`.
    pub async fn fetch_asset(&self, asset_id: &str) -> Option<Vec<u8>> {
        match self.try_fetch_asset(asset_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(asset_id, error = %e, "PIM asset download failed");
                None
            }
        }
    }

    /// Downloads an asset's binary contents, decoding the base64 payload.
    ///
    /// Returns `Ok(None)` when the asset exists but carries no data.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidAssetId`] if `asset_id` is not numeric.
    /// - [`SourceError::Base64`] if the payload does not decode.
    /// - Any error from the underlying GraphQL request.
    pub async fn try_fetch_asset(&self, asset_id: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let id = asset_id
            .trim()
            .parse::<i64>()
            .map_err(|_| SourceError::InvalidAssetId(asset_id.to_string()))?;

        let data: AssetData = self
            .post_graphql("getAsset", ASSET_QUERY, AssetVariables { id })
            .await?;

        let Some(encoded) = data
            .asset
            .and_then(|a| a.data)
            .filter(|d| !d.trim().is_empty())
        else {
            return Ok(None);
        };

        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
        Ok(Some(bytes))
    }

    fn listing_query(&self) -> String {
        format!(
            "query($limit: Int, $filter: String) {{ products: {listing}(first: $limit, filter: $filter) \
             {{ edges {{ node {{ {PRODUCT_FIELDS} }} }} }} }}",
            listing = self.listing
        )
    }

    /// Exact-match filter document for the configured field.
    fn filter_document(&self, value: &str) -> String {
        let mut filter = serde_json::Map::new();
        filter.insert(
            self.filter_field.clone(),
            serde_json::Value::String(value.to_string()),
        );
        serde_json::Value::Object(filter).to_string()
    }

    /// Posts a GraphQL request, asserts a 2xx status, and unwraps the envelope.
    ///
    /// `context` names the operation in errors; the request URL is never used
    /// because it carries the API key.
    async fn post_graphql<V, T>(
        &self,
        context: &str,
        query: &str,
        variables: V,
    ) -> Result<T, SourceError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest { query, variables };
        let response = self
            .client
            .post(self.api_url.clone())
            .json(&body)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let text = response.text().await?;

        let envelope: GraphQlEnvelope<T> =
            serde_json::from_str(&text).map_err(|e| SourceError::Deserialize {
                context: context.to_string(),
                source: e,
            })?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
            return Err(SourceError::GraphQl(messages.join("; ")));
        }

        envelope
            .data
            .ok_or_else(|| SourceError::MissingData(context.to_string()))
    }
}

fn build_api_url(base_url: &str, endpoint_name: &str, api_key: &str) -> Result<Url, SourceError> {
    let invalid = |reason: String| SourceError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    // Normalise to exactly one trailing slash so the webservice segments are
    // appended rather than replacing the last path segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let mut url = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .push(WEBSERVICE_PATH)
        .push(endpoint_name);
    url.query_pairs_mut().append_pair("apikey", api_key);
    Ok(url)
}
