use pimsync_core::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorefrontError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP 429 or a GraphQL error carrying the `THROTTLED` extension code.
    #[error("throttled by storefront during {context}")]
    Throttled { context: String },

    #[error("storefront rejected the access token (HTTP 401) during {context}")]
    Unauthorized { context: String },

    #[error("unexpected HTTP status {status} during {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("storefront GraphQL error during {context}: {message}")]
    GraphQl { context: String, message: String },

    /// Mutation-level `userErrors`; the request itself succeeded.
    #[error("{context} rejected: {message}")]
    UserErrors { context: String, message: String },

    #[error("storefront response for {0} carried no data")]
    MissingData(String),

    #[error("invalid storefront URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("storefront configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StorefrontError {
    /// `true` for timeouts, connection failures and 5xx responses.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::UnexpectedStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }
}
