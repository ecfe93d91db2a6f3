use thiserror::Error;

/// Errors returned by the PIM GraphQL client.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or TLS failure from the underlying HTTP client, or a non-2xx status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The webservice answered with a GraphQL `errors` array.
    #[error("PIM GraphQL error: {0}")]
    GraphQl(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The response parsed but the expected `data` field was null or absent.
    #[error("PIM response for {0} carried no data")]
    MissingData(String),

    /// A product node lacked a field every record must have.
    #[error("product node {node_id} failed validation: {reason}")]
    Validation { node_id: String, reason: String },

    #[error("invalid PIM base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Asset ids are numeric in the PIM; anything else is rejected before a request is made.
    #[error("invalid asset id \"{0}\"")]
    InvalidAssetId(String),

    #[error("asset payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}
