//! Product upsert keyed by handle.
//!
//! `productCreate` is always tried first. When the storefront answers with a
//! "handle has already been taken" user error, the existing product is looked
//! up by handle and overwritten with `productUpdate`.

use crate::client::StorefrontClient;
use crate::types::{
    HandleVariables, ProductByHandleData, ProductCreateData, ProductInput,
    ProductInputVariables, ProductUpdateData, UserError,
};

const PRODUCT_CREATE: &str = "mutation($input: ProductInput!) { \
    productCreate(input: $input) { product { id } userErrors { field message } } }";

const PRODUCT_BY_HANDLE: &str =
    "query($handle: String!) { productByHandle(handle: $handle) { id } }";

const PRODUCT_UPDATE: &str = "mutation($input: ProductInput!) { \
    productUpdate(input: $input) { product { id } userErrors { field message } } }";

/// Which path an upsert took, carrying the product's global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(String),
    /// The handle was taken; the existing product was updated in place.
    Updated(String),
}

impl UpsertOutcome {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

impl StorefrontClient {
    /// Creates the product, or updates the existing one when its handle is
    /// already taken.
    ///
    /// Returns `None` (after logging) when the create fails for any other
    /// reason, when no product id comes back, or when the handle lookup
    /// finds nothing. A failed `productUpdate` is logged but the looked-up id
    /// is still returned.
    pub async fn upsert_product(&self, input: &ProductInput) -> Option<UpsertOutcome> {
        let handle = input.handle.as_str();
        let payload = match self
            .execute_call::<_, ProductCreateData>(
                "productCreate",
                PRODUCT_CREATE,
                &ProductInputVariables { input },
            )
            .await
            .into_data("productCreate")
        {
            Ok(data) => data.product_create.unwrap_or_default(),
            Err(e) => {
                tracing::error!(handle, error = %e, "product create failed");
                return None;
            }
        };

        if payload.user_errors.iter().any(is_handle_taken) {
            tracing::info!(handle, "handle already taken, updating existing product");
            return self.update_by_handle(input).await.map(UpsertOutcome::Updated);
        }

        if !payload.user_errors.is_empty() {
            tracing::error!(
                handle,
                errors = %join_user_errors(&payload.user_errors),
                "product create rejected"
            );
            return None;
        }

        let Some(id) = payload.product.and_then(|p| p.id) else {
            tracing::error!(handle, "product create returned no product id");
            return None;
        };
        tracing::info!(handle, product_id = %id, "product created");
        Some(UpsertOutcome::Created(id))
    }

    async fn update_by_handle(&self, input: &ProductInput) -> Option<String> {
        let handle = input.handle.as_str();
        let found = match self
            .execute_call::<_, ProductByHandleData>(
                "productByHandle",
                PRODUCT_BY_HANDLE,
                &HandleVariables { handle },
            )
            .await
            .into_data("productByHandle")
        {
            Ok(data) => data.product_by_handle.and_then(|p| p.id),
            Err(e) => {
                tracing::error!(handle, error = %e, "product lookup by handle failed");
                return None;
            }
        };

        let Some(id) = found else {
            tracing::error!(handle, "handle reported taken but no product found for it");
            return None;
        };

        let update = ProductInput {
            id: Some(id.clone()),
            ..input.clone()
        };
        match self
            .execute_call::<_, ProductUpdateData>(
                "productUpdate",
                PRODUCT_UPDATE,
                &ProductInputVariables { input: &update },
            )
            .await
            .into_data("productUpdate")
        {
            Ok(data) => {
                let user_errors = data.product_update.unwrap_or_default().user_errors;
                if user_errors.is_empty() {
                    tracing::info!(handle, product_id = %id, "product updated");
                } else {
                    tracing::warn!(
                        handle,
                        product_id = %id,
                        errors = %join_user_errors(&user_errors),
                        "product update rejected"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(handle, product_id = %id, error = %e, "product update failed");
            }
        }
        Some(id)
    }
}

fn is_handle_taken(err: &UserError) -> bool {
    err.message.to_lowercase().contains("taken")
}

pub(crate) fn join_user_errors(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) if !field.is_empty() => format!("{}: {}", field.join("."), e.message),
            _ => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
