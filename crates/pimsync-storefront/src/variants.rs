//! Variant price/inventory sync and MPN metafields.
//!
//! Synced products carry exactly one variant. Price, SKU and barcode go
//! through the REST variant endpoint; the MPN is written as two variant
//! metafields, one read by the Google Shopping feed and one generic.
//! The namespace/key of each is discovered from metafields already present
//! in the shop so the sync writes to whatever definition the shop uses.

use reqwest::Method;

use crate::client::{legacy_id, StorefrontClient};
use crate::products::join_user_errors;
use crate::types::{
    MetafieldKey, MetafieldsSetData, MetafieldsSetInput, MetafieldsSetVariables,
    RestMetafieldsResponse, RestVariantResponse, RestVariantsResponse, VariantMetafieldsData,
    VariantMetafieldsVariables, VariantUpdate, VariantUpdateRequest,
};

const DEFAULT_GOOGLE_MPN: (&str, &str) = ("mm-google-shopping", "mpn");
const DEFAULT_GENERIC_MPN: (&str, &str) = ("custom", "mpn");

/// Variants sampled when the variant itself has no MPN metafields.
const SIBLING_SAMPLE: u32 = 10;

const VARIANT_METAFIELDS_QUERY: &str = "query($first: Int!) { \
    productVariants(first: $first) { edges { node { id \
    metafields(first: 50) { edges { node { namespace key } } } } } } }";

const METAFIELDS_SET: &str = "mutation($metafields: [MetafieldsSetInput!]!) { \
    metafieldsSet(metafields: $metafields) { metafields { namespace key } \
    userErrors { field message } } }";

/// Where the two MPN metafields live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpnMetafields {
    pub google: MetafieldKey,
    pub generic: MetafieldKey,
}

impl Default for MpnMetafields {
    fn default() -> Self {
        Self {
            google: MetafieldKey::new(DEFAULT_GOOGLE_MPN.0, DEFAULT_GOOGLE_MPN.1),
            generic: MetafieldKey::new(DEFAULT_GENERIC_MPN.0, DEFAULT_GENERIC_MPN.1),
        }
    }
}

/// Partially discovered MPN keys; each slot keeps the first match seen.
#[derive(Debug, Default)]
struct MpnDiscovery {
    google: Option<MetafieldKey>,
    generic: Option<MetafieldKey>,
}

impl MpnDiscovery {
    fn observe<'a>(&mut self, keys: impl IntoIterator<Item = &'a MetafieldKey>) {
        for key in keys {
            if !key.key.to_lowercase().contains("mpn") {
                continue;
            }
            let slot = if key.namespace.to_lowercase().contains("google") {
                &mut self.google
            } else {
                &mut self.generic
            };
            if slot.is_none() {
                *slot = Some(key.clone());
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.google.is_some() && self.generic.is_some()
    }

    fn or_defaults(self) -> MpnMetafields {
        let defaults = MpnMetafields::default();
        MpnMetafields {
            google: self.google.unwrap_or(defaults.google),
            generic: self.generic.unwrap_or(defaults.generic),
        }
    }
}

fn variant_gid(variant_id: i64) -> String {
    format!("gid://shopify/ProductVariant/{variant_id}")
}

impl StorefrontClient {
    /// Updates the product's sole variant and, when `mpn` is given, its MPN
    /// metafields.
    ///
    /// Inventory is tracked by the storefront and overselling is allowed
    /// (`inventory_policy = continue`). A `None` barcode clears it. Returns
    /// the variant id, or `None` (after logging) when the product has no
    /// variant or the update fails. Metafield failures are logged only.
    pub async fn sync_variant(
        &self,
        product_id: &str,
        sku: &str,
        price: &str,
        barcode: Option<&str>,
        mpn: Option<&str>,
    ) -> Option<i64> {
        let product = legacy_id(product_id);
        let variants: RestVariantsResponse = match self
            .rest_call::<(), _>(
                Method::GET,
                &format!("products/{product}/variants.json"),
                None,
            )
            .await
        {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(product_id, sku, error = %e, "variant lookup failed");
                return None;
            }
        };

        let Some(variant_id) = variants.variants.first().map(|v| v.id) else {
            tracing::warn!(product_id, sku, "product has no variants");
            return None;
        };

        let body = VariantUpdateRequest {
            variant: VariantUpdate {
                id: variant_id,
                sku,
                price,
                barcode: barcode.map(str::trim).filter(|b| !b.is_empty()),
                inventory_management: "shopify",
                inventory_policy: "continue",
            },
        };
        if let Err(e) = self
            .rest_call::<_, RestVariantResponse>(
                Method::PUT,
                &format!("variants/{variant_id}.json"),
                Some(&body),
            )
            .await
        {
            tracing::error!(product_id, sku, variant_id, error = %e, "variant update failed");
            return None;
        }
        tracing::info!(sku, variant_id, price, "variant synced");

        if let Some(mpn) = mpn.map(str::trim).filter(|m| !m.is_empty()) {
            self.set_mpn_metafields(variant_id, mpn).await;
        }
        Some(variant_id)
    }

    /// Writes `mpn` to both MPN metafields of the variant. Returns `true` when
    /// the storefront accepted the write.
    pub async fn set_mpn_metafields(&self, variant_id: i64, mpn: &str) -> bool {
        let keys = self.discover_mpn_metafields(variant_id).await;
        let owner_id = variant_gid(variant_id);

        let mut inputs = vec![MetafieldsSetInput {
            owner_id: owner_id.clone(),
            namespace: keys.google.namespace.clone(),
            key: keys.google.key.clone(),
            value_type: "single_line_text_field",
            value: mpn.to_string(),
        }];
        if keys.generic != keys.google {
            inputs.push(MetafieldsSetInput {
                owner_id,
                namespace: keys.generic.namespace,
                key: keys.generic.key,
                value_type: "single_line_text_field",
                value: mpn.to_string(),
            });
        }

        let result = self
            .execute_call::<_, MetafieldsSetData>(
                "metafieldsSet",
                METAFIELDS_SET,
                &MetafieldsSetVariables {
                    metafields: &inputs,
                },
            )
            .await
            .into_data("metafieldsSet");
        match result {
            Ok(data) => {
                let user_errors = data.metafields_set.unwrap_or_default().user_errors;
                if user_errors.is_empty() {
                    tracing::info!(variant_id, mpn, "MPN metafields set");
                    true
                } else {
                    tracing::warn!(
                        variant_id,
                        errors = %join_user_errors(&user_errors),
                        "MPN metafields rejected"
                    );
                    false
                }
            }
            Err(e) => {
                tracing::warn!(variant_id, error = %e, "MPN metafield write failed");
                false
            }
        }
    }

    /// Resolves the MPN metafield locations: the variant's own metafields
    /// first, then those of other variants in the shop, then the defaults.
    pub async fn discover_mpn_metafields(&self, variant_id: i64) -> MpnMetafields {
        let mut discovery = MpnDiscovery::default();

        match self
            .rest_call::<(), RestMetafieldsResponse>(
                Method::GET,
                &format!("variants/{variant_id}/metafields.json"),
                None,
            )
            .await
        {
            Ok(own) => discovery.observe(&own.metafields),
            Err(e) => tracing::warn!(variant_id, error = %e, "variant metafield read failed"),
        }

        if !discovery.is_complete() {
            let current = variant_gid(variant_id);
            match self
                .execute_call::<_, VariantMetafieldsData>(
                    "productVariants",
                    VARIANT_METAFIELDS_QUERY,
                    &VariantMetafieldsVariables {
                        first: SIBLING_SAMPLE,
                    },
                )
                .await
                .into_data("productVariants")
            {
                Ok(data) => {
                    let siblings = data
                        .product_variants
                        .map(|c| c.edges)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|edge| edge.node)
                        .filter(|node| node.id != current);
                    for sibling in siblings {
                        let keys: Vec<MetafieldKey> = sibling
                            .metafields
                            .map(|c| c.edges.into_iter().map(|e| e.node).collect())
                            .unwrap_or_default();
                        discovery.observe(&keys);
                        if discovery.is_complete() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(variant_id, error = %e, "sibling variant metafield read failed");
                }
            }
        }

        let keys = discovery.or_defaults();
        tracing::debug!(
            variant_id,
            google = %format!("{}.{}", keys.google.namespace, keys.google.key),
            generic = %format!("{}.{}", keys.generic.namespace, keys.generic.key),
            "MPN metafield keys resolved"
        );
        keys
    }
}
