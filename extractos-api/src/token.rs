//! OAuth2 client-credentials exchange.
//!
//! The provider wants the client id and secret in the query string, the
//! registered service URL as a `service` header, and the grant type as a form
//! body.

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{check_status, BearerToken, ProviderClient};
use crate::error::{ApiError, Result};

pub const SCOPE: &str = "info-financiera";
const ENDPOINT: &str = "token endpoint";

impl ProviderClient {
    pub async fn acquire_token(&self) -> Result<BearerToken> {
        let cfg = &self.config;
        debug!(url = %cfg.token_url, "requesting access token");

        let resp = self
            .http
            .post(&cfg.token_url)
            .query(&[
                ("scope", SCOPE),
                ("client_id", cfg.client_id.as_str()),
                ("client_secret", cfg.client_secret.as_str()),
            ])
            .header("service", cfg.service_url.as_str())
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| ApiError::Http {
                endpoint: ENDPOINT,
                source,
            })?;

        let resp = check_status(ENDPOINT, resp).await?;
        let body: Value = resp.json().await.map_err(|source| ApiError::Http {
            endpoint: ENDPOINT,
            source,
        })?;

        let token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::MissingField {
                endpoint: ENDPOINT,
                field: "access_token",
            })?;

        info!("access token acquired");
        Ok(BearerToken::new(token))
    }
}
