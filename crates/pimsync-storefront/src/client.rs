//! HTTP client for the storefront Admin API (GraphQL plus a few REST
//! endpoints).
//!
//! Every call goes through [`retry_with_policy`]: throttles and transport
//! failures are retried with linear backoff, anything else is surfaced on the
//! first occurrence. REST creates that are not idempotent only retry on
//! throttles. HTTP 401 is never retried and gets a diagnostic log line
//! pointing at the token.

use std::time::Duration;

use pimsync_core::{AppConfig, ConfigError, StorefrontSettings};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorefrontError;
use crate::retry::{retry_bounded, retry_with_policy, RetryPolicy};
use crate::types::{GraphQlRequest, GraphQlResponse, NoVariables, ShopData};

/// Message placed in the error payload once the attempt budget is spent.
pub const MAX_RETRIES_MESSAGE: &str = "Max retries exceeded";

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const SHOP_QUERY: &str = "query { shop { name } }";

/// Client for one shop's Admin API.
///
/// Owns its HTTP session and retry policy; construct once per run and pass
/// it by reference.
pub struct StorefrontClient {
    client: Client,
    graphql_url: Url,
    /// `{base}/admin/api/{version}/`, always with a trailing slash.
    rest_base: Url,
    policy: RetryPolicy,
}

impl StorefrontClient {
    /// Creates a client for `https://{settings.domain}`.
    ///
    /// # Errors
    ///
    /// See [`StorefrontClient::with_base_url`].
    pub fn new(
        settings: &StorefrontSettings,
        timeout_secs: u64,
        policy: RetryPolicy,
    ) -> Result<Self, StorefrontError> {
        let domain = settings
            .domain
            .trim()
            .trim_start_matches("https://")
            .trim_end_matches('/');
        Self::with_base_url(
            &format!("https://{domain}"),
            &settings.access_token,
            &settings.api_version,
            timeout_secs,
            policy,
        )
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Config`] when the shop domain or admin token
    /// is not configured, or any error from [`StorefrontClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, StorefrontError> {
        let settings = config.storefront()?;
        Self::new(
            &settings,
            config.request_timeout_secs,
            RetryPolicy::from_config(config),
        )
    }

    /// Creates a client rooted at `base_url` (a wiremock server URI in tests).
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Config`] if the access token is not a valid
    ///   header value.
    /// - [`StorefrontError::InvalidUrl`] if `base_url` cannot be parsed.
    /// - [`StorefrontError::Http`] if the `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        api_version: &str,
        timeout_secs: u64,
        policy: RetryPolicy,
    ) -> Result<Self, StorefrontError> {
        let mut token =
            HeaderValue::from_str(access_token).map_err(|e| ConfigError::InvalidEnvVar {
                var: "SHOPIFY_ADMIN_TOKEN".to_string(),
                reason: e.to_string(),
            })?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pimsync/0.1 (catalog-sync)")
            .default_headers(headers)
            .build()?;

        let invalid = |reason: String| StorefrontError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| invalid(e.to_string()))?;
        let rest_base = base
            .join(&format!("admin/api/{}/", api_version.trim()))
            .map_err(|e| invalid(e.to_string()))?;
        let graphql_url = rest_base
            .join("graphql.json")
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            graphql_url,
            rest_base,
            policy,
        })
    }

    /// Runs a GraphQL operation and always returns a response payload.
    ///
    /// Throttles and transport failures are retried under the client's
    /// policy. When the budget is spent the payload carries the single error
    /// [`MAX_RETRIES_MESSAGE`]; other call-level failures (401, undecodable
    /// body, 4xx) are folded into `errors` with their message.
    pub async fn execute_call<V, T>(
        &self,
        operation: &str,
        query: &str,
        variables: &V,
    ) -> GraphQlResponse<T>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        match self.try_execute(operation, query, variables).await {
            Ok(response) => response,
            Err(e) if RetryPolicy::is_retryable(&e) => {
                tracing::error!(
                    operation,
                    max_attempts = self.policy.max_attempts,
                    error = %e,
                    "storefront call gave up"
                );
                GraphQlResponse::failure(MAX_RETRIES_MESSAGE)
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "storefront call failed");
                GraphQlResponse::failure(e.to_string())
            }
        }
    }

    /// Runs a GraphQL operation with retries, surfacing call-level failures.
    ///
    /// A response whose `errors` carry the `THROTTLED` code counts as a
    /// throttle; other GraphQL errors are returned inside the payload.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Throttled`] or a transport error once the attempt
    ///   budget is spent.
    /// - [`StorefrontError::Unauthorized`] on HTTP 401 (not retried).
    /// - [`StorefrontError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`StorefrontError::Deserialize`] if the body is not a GraphQL response.
    pub async fn try_execute<V, T>(
        &self,
        operation: &str,
        query: &str,
        variables: &V,
    ) -> Result<GraphQlResponse<T>, StorefrontError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = GraphQlRequest { query, variables };
        retry_with_policy(self.policy, |attempt| {
            let body = &body;
            async move {
                tracing::debug!(operation, attempt, "storefront GraphQL request");
                let response = self
                    .client
                    .post(self.graphql_url.clone())
                    .json(body)
                    .send()
                    .await?;
                check_status(response.status(), operation)?;

                let text = response.text().await?;
                let parsed: GraphQlResponse<T> =
                    serde_json::from_str(&text).map_err(|e| StorefrontError::Deserialize {
                        context: operation.to_string(),
                        source: e,
                    })?;

                if parsed.is_throttled() {
                    return Err(StorefrontError::Throttled {
                        context: operation.to_string(),
                    });
                }
                Ok(parsed)
            }
        })
        .await
    }

    /// Calls a REST endpoint relative to `/admin/api/{version}/` with retries.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::try_execute`], plus
    /// [`StorefrontError::InvalidUrl`] if `path` does not join onto the base.
    pub(crate) async fn rest_call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, StorefrontError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.rest_request(method, path, body, RetryPolicy::is_retryable)
            .await
    }

    /// REST `POST` that creates a resource. Retried on throttles only: a
    /// timeout or 5xx may still have created the resource.
    ///
    /// # Errors
    ///
    /// Same classes as [`StorefrontClient::rest_call`].
    pub(crate) async fn rest_create<B, T>(&self, path: &str, body: &B) -> Result<T, StorefrontError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.rest_request(Method::POST, path, Some(body), StorefrontError::is_throttled)
            .await
    }

    async fn rest_request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        is_retryable: fn(&StorefrontError) -> bool,
    ) -> Result<T, StorefrontError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .rest_base
            .join(path)
            .map_err(|e| StorefrontError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })?;
        let context = format!("{method} {path}");
        let policy = self.policy;

        retry_bounded(
            policy.max_attempts,
            is_retryable,
            |attempt, err| policy.backoff(attempt, err),
            |attempt| {
                let url = url.clone();
                let method = method.clone();
                let context = context.as_str();
                async move {
                    tracing::debug!(context, attempt, "storefront REST request");
                    let mut request = self.client.request(method, url);
                    if let Some(body) = body {
                        request = request.json(body);
                    }
                    let response = request.send().await?;
                    check_status(response.status(), context)?;

                    let text = response.text().await?;
                    serde_json::from_str::<T>(&text).map_err(|e| StorefrontError::Deserialize {
                        context: context.to_string(),
                        source: e,
                    })
                }
            },
        )
        .await
    }

    /// Verifies the token by reading the shop name.
    ///
    /// # Errors
    ///
    /// Any error from [`StorefrontClient::try_execute`], or
    /// [`StorefrontError::GraphQl`] / [`StorefrontError::MissingData`] when
    /// the query does not return a shop.
    pub async fn check_access(&self) -> Result<String, StorefrontError> {
        let data: ShopData = self
            .try_execute("shop", SHOP_QUERY, &NoVariables {})
            .await?
            .into_data("shop")?;
        data.shop
            .map(|shop| shop.name)
            .ok_or_else(|| StorefrontError::MissingData("shop".to_string()))
    }
}

impl<T> GraphQlResponse<T> {
    /// Unwraps `data`, turning GraphQL errors into [`StorefrontError::GraphQl`].
    ///
    /// # Errors
    ///
    /// [`StorefrontError::GraphQl`] when `errors` is non-empty, otherwise
    /// [`StorefrontError::MissingData`] when `data` is absent.
    pub fn into_data(self, context: &str) -> Result<T, StorefrontError> {
        if let Some(message) = self.error_message() {
            return Err(StorefrontError::GraphQl {
                context: context.to_string(),
                message,
            });
        }
        self.data
            .ok_or_else(|| StorefrontError::MissingData(context.to_string()))
    }
}

fn check_status(status: StatusCode, context: &str) -> Result<(), StorefrontError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(StorefrontError::Throttled {
            context: context.to_string(),
        });
    }
    if status == StatusCode::UNAUTHORIZED {
        tracing::error!(
            context,
            "storefront returned 401 Unauthorized: check that SHOPIFY_ADMIN_TOKEN is an Admin API \
             access token for SHOPIFY_DOMAIN_MYSHOPIFY and that the app is still installed"
        );
        return Err(StorefrontError::Unauthorized {
            context: context.to_string(),
        });
    }
    if !status.is_success() {
        return Err(StorefrontError::UnexpectedStatus {
            status: status.as_u16(),
            context: context.to_string(),
        });
    }
    Ok(())
}

/// Numeric id from a GraphQL global id (`gid://shopify/Product/123` → `123`).
pub(crate) fn legacy_id(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(domain: &str) -> StorefrontSettings {
        StorefrontSettings {
            domain: domain.to_owned(),
            access_token: "shpat_test".to_owned(),
            api_version: "2024-10".to_owned(),
        }
    }

    #[test]
    fn urls_include_api_version() {
        let client = StorefrontClient::new(
            &settings("acme.myshopify.com"),
            30,
            RetryPolicy::default(),
        )
        .expect("client construction should not fail");
        assert_eq!(
            client.graphql_url.as_str(),
            "https://acme.myshopify.com/admin/api/2024-10/graphql.json"
        );
        assert_eq!(
            client.rest_base.as_str(),
            "https://acme.myshopify.com/admin/api/2024-10/"
        );
    }

    #[test]
    fn domain_with_scheme_and_slash_is_normalised() {
        let client = StorefrontClient::new(
            &settings("https://acme.myshopify.com/"),
            30,
            RetryPolicy::default(),
        )
        .expect("client construction should not fail");
        assert_eq!(
            client.graphql_url.as_str(),
            "https://acme.myshopify.com/admin/api/2024-10/graphql.json"
        );
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let result = StorefrontClient::with_base_url(
            "https://acme.myshopify.com",
            "bad\ntoken",
            "2024-10",
            30,
            RetryPolicy::default(),
        );
        assert!(matches!(result, Err(StorefrontError::Config(_))));
    }

    #[test]
    fn legacy_id_takes_last_segment() {
        assert_eq!(legacy_id("gid://shopify/Product/123"), "123");
        assert_eq!(legacy_id("456"), "456");
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS, "t"),
            Err(StorefrontError::Throttled { .. })
        ));
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, "t"),
            Err(StorefrontError::Unauthorized { .. })
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "t"),
            Err(StorefrontError::UnexpectedStatus { status: 502, .. })
        ));
        assert!(check_status(StatusCode::CREATED, "t").is_ok());
    }

    #[test]
    fn into_data_prefers_errors_over_data() {
        let resp = GraphQlResponse::<ShopData>::failure(MAX_RETRIES_MESSAGE);
        let err = resp.into_data("shop").unwrap_err();
        assert!(
            matches!(err, StorefrontError::GraphQl { ref message, .. } if message == MAX_RETRIES_MESSAGE)
        );
    }
}
