//! HubSpot API client implementation.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthMethod;
use crate::config::{HubSpotConfig, HubSpotConfigBuilder};
use crate::context::ExecutionContext;
use crate::errors::{HubSpotError, HubSpotResult};
use crate::resilience::{AttemptOutcome, RetryExecutor};
use crate::services::ContactsService;

/// HubSpot API client.
///
/// Construction captures the configuration immutably; every method is safe to
/// call from any number of concurrent tasks.
pub struct HubSpotClient {
    /// HTTP client.
    http: Client,
    /// Configuration.
    config: HubSpotConfig,
    /// Authentication method.
    auth: AuthMethod,
    /// Retry executor.
    retry: RetryExecutor,
}

impl HubSpotClient {
    /// Creates a new HubSpot client.
    pub fn new(config: HubSpotConfig) -> HubSpotResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build()
            .map_err(|e| HubSpotError::Configuration {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        let auth = config.auth.clone().ok_or_else(|| HubSpotError::Configuration {
            message: "authentication is required".to_string(),
        })?;

        let retry = RetryExecutor::new(config.retry.clone());

        Ok(Self {
            http,
            config,
            auth,
            retry,
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> HubSpotClientBuilder {
        HubSpotClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // Service accessors

    /// Gets the contacts service.
    pub fn contacts(&self) -> ContactsService<'_> {
        ContactsService::new(self)
    }

    // HTTP verbs

    /// Performs a GET request.
    pub async fn get(&self, ctx: &ExecutionContext, path: &str) -> HubSpotResult<Response> {
        self.execute(ctx, Method::GET, path, Option::<&()>::None)
            .await
    }

    /// Performs a POST request.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        ctx: &ExecutionContext,
        path: &str,
        body: &B,
    ) -> HubSpotResult<Response> {
        self.execute(ctx, Method::POST, path, Some(body)).await
    }

    /// Performs a PATCH request.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        ctx: &ExecutionContext,
        path: &str,
        body: &B,
    ) -> HubSpotResult<Response> {
        self.execute(ctx, Method::PATCH, path, Some(body)).await
    }

    /// Performs a DELETE request.
    pub async fn delete(&self, ctx: &ExecutionContext, path: &str) -> HubSpotResult<Response> {
        self.execute(ctx, Method::DELETE, path, Option::<&()>::None)
            .await
    }

    // Internal

    /// Executes one logical request through the retry loop.
    ///
    /// The body is serialized once, before the first attempt; a serialization
    /// failure is terminal and no attempt is made. Each attempt rebuilds the
    /// transport request from the prepared parts.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        ctx: &ExecutionContext,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> HubSpotResult<Response> {
        let url = self.build_url(path);

        let body_bytes = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HubSpotError::Serialization {
                message: e.to_string(),
            })?;

        let auth_header = self.auth.authorization_header();

        self.retry
            .execute(ctx, || {
                let mut request = self
                    .http
                    .request(method.clone(), &url)
                    .header(AUTHORIZATION, &auth_header)
                    .header(CONTENT_TYPE, "application/json")
                    .header(ACCEPT, "application/json");

                if let Some(bytes) = &body_bytes {
                    request = request.body(bytes.clone());
                }

                async move { AttemptOutcome::from_result(request.send().await) }
            })
            .await
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Decodes a JSON success response into a typed value.
///
/// Consumes the response; the dual of [`ApiError::from_response`] for the
/// success path.
///
/// [`ApiError::from_response`]: crate::errors::ApiError::from_response
pub async fn decode_response<T: DeserializeOwned>(response: Response) -> HubSpotResult<T> {
    let body = response
        .bytes()
        .await
        .map_err(|e| HubSpotError::Decode {
            message: format!("failed to read response body: {e}"),
        })?;

    serde_json::from_slice(&body).map_err(|e| HubSpotError::Decode {
        message: e.to_string(),
    })
}

/// Builder for [`HubSpotClient`].
pub struct HubSpotClientBuilder {
    config_builder: HubSpotConfigBuilder,
}

impl HubSpotClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: HubSpotConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.config_builder = self.config_builder.auth(auth);
        self
    }

    /// Sets a private app access token.
    pub fn private_app_token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::private_app_token(token))
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, config: crate::config::RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(config);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.config_builder = self.config_builder.no_retry();
        self
    }

    /// Builds the client.
    pub fn build(self) -> HubSpotResult<HubSpotClient> {
        let config = self.config_builder.build()?;
        HubSpotClient::new(config)
    }
}

impl Default for HubSpotClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> HubSpotClient {
        HubSpotClient::builder()
            .private_app_token("pat-na1-test")
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = test_client();

        assert_eq!(
            client.build_url("/crm/v3/objects/contacts"),
            "https://api.hubapi.com/crm/v3/objects/contacts"
        );
        assert_eq!(
            client.build_url("crm/v3/objects/contacts"),
            "https://api.hubapi.com/crm/v3/objects/contacts"
        );
    }

    #[test]
    fn test_client_requires_auth() {
        let result = HubSpotClient::builder().build();
        assert!(matches!(
            result,
            Err(HubSpotError::Configuration { .. })
        ));
    }

    #[test]
    fn test_client_builder() {
        let result = HubSpotClient::builder()
            .private_app_token("pat-na1-test")
            .base_url("https://api.hubapi.example.com/")
            .build();

        assert!(result.is_ok());
    }
}
