use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("PIMCORE_BASE_URL", "https://pim.example.com");
    m.insert("PIMCORE_ENDPOINT_NAME", "products");
    m.insert("PIMCORE_API_KEY", "pim-key");
    m
}

#[test]
fn build_app_config_fails_without_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PIMCORE_BASE_URL"),
        "expected MissingEnvVar(PIMCORE_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_without_api_key() {
    let mut map = full_env();
    map.remove("PIMCORE_API_KEY");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PIMCORE_API_KEY"),
        "expected MissingEnvVar(PIMCORE_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_required_var_as_missing() {
    let mut map = full_env();
    map.insert("PIMCORE_ENDPOINT_NAME", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PIMCORE_ENDPOINT_NAME"),
        "expected MissingEnvVar(PIMCORE_ENDPOINT_NAME), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_all_required_vars() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.pim_base_url, "https://pim.example.com");
    assert_eq!(cfg.pim_endpoint_name, "products");
    assert_eq!(cfg.pim_listing, "getProdM06Listing");
    assert_eq!(cfg.pim_filter_field, "PartPrefix");
    assert!(cfg.shop_domain.is_none());
    assert!(cfg.shop_access_token.is_none());
    assert_eq!(cfg.shop_api_version, "2024-10");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.throttle_backoff_secs, 5);
    assert_eq!(cfg.transport_backoff_secs, 2);
    assert_eq!(cfg.delay_between_products_secs, 2);
    assert_eq!(cfg.delay_after_image_secs, 3);
    assert_eq!(cfg.output_dir, std::path::PathBuf::from("."));
}

#[test]
fn delays_can_be_overridden() {
    let mut map = full_env();
    map.insert("DELAY_BETWEEN_PRODUCTS", "0");
    map.insert("DELAY_AFTER_IMAGE", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.delay_between_products_secs, 0);
    assert_eq!(cfg.delay_after_image_secs, 10);
}

#[test]
fn invalid_delay_is_rejected() {
    let mut map = full_env();
    map.insert("DELAY_BETWEEN_PRODUCTS", "two");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DELAY_BETWEEN_PRODUCTS"),
        "expected InvalidEnvVar(DELAY_BETWEEN_PRODUCTS), got: {result:?}"
    );
}

#[test]
fn zero_max_attempts_is_rejected() {
    let mut map = full_env();
    map.insert("PIMSYNC_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PIMSYNC_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(PIMSYNC_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn storefront_settings_require_domain_and_token() {
    let mut map = full_env();
    map.insert("SHOPIFY_ADMIN_TOKEN", "shpat_test");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let err = cfg.storefront().unwrap_err();
    assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "SHOPIFY_DOMAIN_MYSHOPIFY"));

    map.insert("SHOPIFY_DOMAIN_MYSHOPIFY", "acme.myshopify.com");
    map.insert("SHOPIFY_API_VERSION", "2024-01");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let shop = cfg.storefront().expect("storefront settings should resolve");
    assert_eq!(shop.domain, "acme.myshopify.com");
    assert_eq!(shop.access_token, "shpat_test");
    assert_eq!(shop.api_version, "2024-01");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("SHOPIFY_ADMIN_TOKEN", "shpat_secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("pim-key"), "api key leaked: {rendered}");
    assert!(!rendered.contains("shpat_secret"), "token leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}
