//! Authentication for the HubSpot API.
//!
//! HubSpot authenticates every request with a bearer token, either a private
//! app access token or an OAuth access token. The token is an opaque secret:
//! it is never logged and never appears in error messages.

use secrecy::{ExposeSecret, SecretString};

/// Authentication method for the HubSpot API.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Private app access token (`pat-...`).
    PrivateApp(SecretString),
    /// OAuth access token.
    OAuth(SecretString),
}

impl AuthMethod {
    /// Creates a private app token authentication method.
    pub fn private_app_token(token: impl Into<String>) -> Self {
        Self::PrivateApp(SecretString::new(token.into()))
    }

    /// Creates an OAuth token authentication method.
    pub fn oauth(token: impl Into<String>) -> Self {
        Self::OAuth(SecretString::new(token.into()))
    }

    /// The `Authorization` header value for a request.
    pub(crate) fn authorization_header(&self) -> String {
        let token = match self {
            Self::PrivateApp(token) | Self::OAuth(token) => token.expose_secret(),
        };
        format!("Bearer {token}")
    }

    /// Redacted token marker, safe to log.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            Self::PrivateApp(token) => {
                if token.expose_secret().starts_with("pat-") {
                    "pat-***"
                } else {
                    "***"
                }
            }
            Self::OAuth(_) => "oauth-***",
        }
    }
}
