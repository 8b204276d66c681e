//! Provider credentials and endpoints, loaded once per run.

use std::fmt;

use crate::error::{ApiError, Result};

pub const CLIENT_ID_VAR: &str = "IB_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "IB_CLIENT_SECRET";
pub const SERVICE_URL_VAR: &str = "IB_SERVICE_URL";
pub const CUSTOMER_ID_VAR: &str = "CUSTOMER_ID";
pub const TOKEN_URL_VAR: &str = "IB_TOKEN_URL";
pub const API_BASE_URL_VAR: &str = "IB_API_BASE_URL";

pub const DEFAULT_SERVICE_URL: &str = "https://localhost/callback";
pub const DEFAULT_TOKEN_URL: &str = "https://auth.interbanking.com.ar/cas/oidc/accessToken";
pub const DEFAULT_API_BASE_URL: &str = "https://api-gw.interbanking.com.ar/api/prod/v1";

/// Immutable provider settings handed to [`crate::ProviderClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Sent as the `service` header on the token exchange
    pub service_url: String,
    pub customer_id: String,
    pub token_url: String,
    /// Prefix for `/accounts/{n}/statements`
    pub api_base_url: String,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("service_url", &self.service_url)
            .field("customer_id", &self.customer_id)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ProviderConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup. Blank values count as missing; every missing
    /// required key is reported in one error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut missing = Vec::new();
        let mut required = |key: &'static str| {
            get(key).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let client_id = required(CLIENT_ID_VAR);
        let client_secret = required(CLIENT_SECRET_VAR);
        let customer_id = required(CUSTOMER_ID_VAR);

        if !missing.is_empty() {
            return Err(ApiError::MissingConfig(missing));
        }

        Ok(Self {
            client_id,
            client_secret,
            customer_id,
            service_url: get(SERVICE_URL_VAR).unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string()),
            token_url: get(TOKEN_URL_VAR).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            api_base_url: get(API_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        })
    }
}
