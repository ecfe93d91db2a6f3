//! Writer for the storefront Admin API: product upsert by handle, variant and
//! metafield sync, image upload, all behind one bounded retry policy.

pub mod client;
pub mod error;
pub mod images;
pub mod products;
pub(crate) mod retry;
pub mod types;
pub mod variants;

pub use client::{StorefrontClient, MAX_RETRIES_MESSAGE};
pub use error::StorefrontError;
pub use products::UpsertOutcome;
pub use retry::RetryPolicy;
pub use types::{GraphQlResponse, ProductInput, ProductStatus};
pub use variants::MpnMetafields;
