use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub pim_base_url: String,
    pub pim_endpoint_name: String,
    pub pim_api_key: String,
    /// GraphQL listing operation queried for products, e.g. `getProdM06Listing`.
    pub pim_listing: String,
    /// Categorical field the `--prefix` value is matched against.
    pub pim_filter_field: String,
    pub shop_domain: Option<String>,
    pub shop_access_token: Option<String>,
    pub shop_api_version: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub throttle_backoff_secs: u64,
    pub transport_backoff_secs: u64,
    pub delay_between_products_secs: u64,
    pub delay_after_image_secs: u64,
    pub output_dir: PathBuf,
}

/// Storefront connection settings, present only when both the shop domain
/// and the admin token are configured.
#[derive(Clone)]
pub struct StorefrontSettings {
    pub domain: String,
    pub access_token: String,
    pub api_version: String,
}

impl AppConfig {
    /// Returns the storefront connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] naming the first absent variable
    /// when either `SHOPIFY_DOMAIN_MYSHOPIFY` or `SHOPIFY_ADMIN_TOKEN` is unset.
    pub fn storefront(&self) -> Result<StorefrontSettings, ConfigError> {
        let domain = self
            .shop_domain
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPIFY_DOMAIN_MYSHOPIFY".to_string()))?;
        let access_token = self
            .shop_access_token
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOPIFY_ADMIN_TOKEN".to_string()))?;
        Ok(StorefrontSettings {
            domain,
            access_token,
            api_version: self.shop_api_version.clone(),
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("pim_base_url", &self.pim_base_url)
            .field("pim_endpoint_name", &self.pim_endpoint_name)
            .field("pim_api_key", &"[redacted]")
            .field("pim_listing", &self.pim_listing)
            .field("pim_filter_field", &self.pim_filter_field)
            .field("shop_domain", &self.shop_domain)
            .field(
                "shop_access_token",
                &self.shop_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("shop_api_version", &self.shop_api_version)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .field("throttle_backoff_secs", &self.throttle_backoff_secs)
            .field("transport_backoff_secs", &self.transport_backoff_secs)
            .field(
                "delay_between_products_secs",
                &self.delay_between_products_secs,
            )
            .field("delay_after_image_secs", &self.delay_after_image_secs)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

impl std::fmt::Debug for StorefrontSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontSettings")
            .field("domain", &self.domain)
            .field("access_token", &"[redacted]")
            .field("api_version", &self.api_version)
            .finish()
    }
}
