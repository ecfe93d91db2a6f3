use crate::app_config::AppConfig;
use crate::ConfigError;

/// Env file the export tooling ships its credentials in. Loaded before the
/// conventional `.env` so either location works.
const EXPORT_ENV_FILE: &str = ".env.export";

/// Load application configuration from environment variables.
///
/// Loads `.env.export` and then `.env` via `dotenvy` (both optional) before
/// reading env vars. Variables already set in the process win.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::from_filename(EXPORT_ENV_FILE).ok();
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Skips the `.env.export` and `.env` files read by [`load_app_config`].
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Required PIM variables fail fast; storefront variables stay optional until
/// [`AppConfig::storefront`] is called.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let pim_base_url = require("PIMCORE_BASE_URL")?;
    let pim_endpoint_name = require("PIMCORE_ENDPOINT_NAME")?;
    let pim_api_key = require("PIMCORE_API_KEY")?;
    let pim_listing = or_default("PIMCORE_LISTING", "getProdM06Listing");
    let pim_filter_field = or_default("PIMCORE_FILTER_FIELD", "PartPrefix");

    let shop_domain = optional("SHOPIFY_DOMAIN_MYSHOPIFY");
    let shop_access_token = optional("SHOPIFY_ADMIN_TOKEN");
    let shop_api_version = or_default("SHOPIFY_API_VERSION", "2024-10");

    let log_level = or_default("PIMSYNC_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PIMSYNC_REQUEST_TIMEOUT_SECS", "30")?;
    let max_attempts = parse_u32("PIMSYNC_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PIMSYNC_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let throttle_backoff_secs = parse_u64("PIMSYNC_THROTTLE_BACKOFF_SECS", "5")?;
    let transport_backoff_secs = parse_u64("PIMSYNC_TRANSPORT_BACKOFF_SECS", "2")?;

    let delay_between_products_secs = parse_u64("DELAY_BETWEEN_PRODUCTS", "2")?;
    let delay_after_image_secs = parse_u64("DELAY_AFTER_IMAGE", "3")?;
    let output_dir = PathBuf::from(or_default("PIMSYNC_OUTPUT_DIR", "."));

    Ok(AppConfig {
        log_level,
        pim_base_url,
        pim_endpoint_name,
        pim_api_key,
        pim_listing,
        pim_filter_field,
        shop_domain,
        shop_access_token,
        shop_api_version,
        request_timeout_secs,
        max_attempts,
        throttle_backoff_secs,
        transport_backoff_secs,
        delay_between_products_secs,
        delay_after_image_secs,
        output_dir,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
