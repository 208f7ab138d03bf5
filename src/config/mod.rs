//! Configuration types for the HubSpot client.

use std::time::Duration;

use crate::auth::AuthMethod;
use crate::errors::HubSpotError;

/// Default HubSpot API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry configuration.
///
/// Immutable once the client is constructed; to change the policy at runtime,
/// construct a new client.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the initial attempt. 0 disables retries.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any computed backoff.
    pub max_backoff: Duration,
    /// Exponential growth factor per attempt.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Validates the policy invariants.
    pub fn validate(&self) -> Result<(), HubSpotError> {
        if self.initial_backoff.is_zero() {
            return Err(HubSpotError::Configuration {
                message: "initial_backoff must be positive".to_string(),
            });
        }
        if self.max_backoff < self.initial_backoff {
            return Err(HubSpotError::Configuration {
                message: format!(
                    "max_backoff ({:?}) must not be less than initial_backoff ({:?})",
                    self.max_backoff, self.initial_backoff
                ),
            });
        }
        if self.multiplier < 1.0 {
            return Err(HubSpotError::Configuration {
                message: format!("multiplier ({}) must be at least 1.0", self.multiplier),
            });
        }
        Ok(())
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 20,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// HubSpot client configuration.
#[derive(Debug, Clone)]
pub struct HubSpotConfig {
    /// API base URL.
    pub base_url: String,
    /// Authentication method.
    pub auth: Option<AuthMethod>,
    /// Request timeout, applied per attempt.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Connection pool configuration.
    pub pool: PoolConfig,
}

impl Default for HubSpotConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth: None,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            retry: RetryConfig::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl HubSpotConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> HubSpotConfigBuilder {
        HubSpotConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), HubSpotError> {
        if self.base_url.is_empty() {
            return Err(HubSpotError::Configuration {
                message: "base URL cannot be empty".to_string(),
            });
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| HubSpotError::Configuration {
            message: format!("invalid base URL: {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HubSpotError::Configuration {
                message: "base URL must use http or https".to_string(),
            });
        }

        self.retry.validate()
    }
}

/// Builder for [`HubSpotConfig`].
#[derive(Debug, Default)]
pub struct HubSpotConfigBuilder {
    base_url: Option<String>,
    auth: Option<AuthMethod>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: Option<RetryConfig>,
    pool: Option<PoolConfig>,
}

impl HubSpotConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the authentication method.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Disables retries.
    pub fn no_retry(mut self) -> Self {
        self.retry = Some(RetryConfig {
            max_attempts: 0,
            ..Default::default()
        });
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<HubSpotConfig, HubSpotError> {
        let config = HubSpotConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            auth: self.auth,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            retry: self.retry.unwrap_or_default(),
            pool: self.pool.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
