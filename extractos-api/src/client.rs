use reqwest::{Client, Response};
use std::fmt;

use crate::config::ProviderConfig;
use crate::error::{ApiError, Result};

/// Access token returned by the token endpoint. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// HTTP client for the provider. One instance per run, reused for every call.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    pub(crate) http: Client,
    pub(crate) config: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("extractos/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Http {
                endpoint: "client",
                source,
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Turn a non-2xx response into [`ApiError::Status`], keeping the body text.
pub(crate) async fn check_status(endpoint: &'static str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            endpoint,
            status,
            body,
        });
    }
    Ok(resp)
}
