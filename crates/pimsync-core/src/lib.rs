pub mod app_config;
pub mod config;
pub mod product;
pub mod text;

pub use app_config::{AppConfig, StorefrontSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use product::{ProductRecord, STAGING_TITLE_MAX, STOREFRONT_TITLE_MAX};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
