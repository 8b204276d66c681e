//! Single-day statement download for one account.

use chrono::NaiveDate;
use extractos_core::{zero_pad, RawRecord};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{check_status, BearerToken, ProviderClient};
use crate::error::{ApiError, Result};

pub const ACCOUNT_TYPE: &str = "CC";
pub const CURRENCY: &str = "ARS";
const ENDPOINT: &str = "statements endpoint";

impl ProviderClient {
    /// Fetch every movement of `account_number` on `date`. The provider returns
    /// the whole day in one response; there is no paging.
    pub async fn fetch_statements(
        &self,
        token: &BearerToken,
        account_number: &str,
        bank_number: &str,
        date: NaiveDate,
    ) -> Result<Vec<RawRecord>> {
        let cfg = &self.config;
        let url = self.statements_url(account_number)?;
        let bank_number = zero_pad(bank_number, 3);
        let date = date.format("%Y-%m-%d").to_string();

        debug!(%url, bank_number = %bank_number, date = %date, "requesting statements");

        let resp = self
            .http
            .get(url)
            .bearer_auth(token.secret())
            .header("client_id", cfg.client_id.as_str())
            .query(&[
                ("account-type", ACCOUNT_TYPE),
                ("bank-number", bank_number.as_str()),
                ("currency", CURRENCY),
                ("customer-id", cfg.customer_id.as_str()),
                ("date-since", date.as_str()),
                ("date-until", date.as_str()),
            ])
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

        extract_records(body)
    }

    pub(crate) fn statements_url(&self, account_number: &str) -> Result<Url> {
        let base = self.config.api_base_url.trim_end_matches('/');
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base.to_string(),
            reason,
        };

        let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push("accounts")
            .push(account_number.trim())
            .push("statements");
        Ok(url)
    }
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Records live under `statements` when the body is an object, or are the
/// body itself when it is a list. Non-object entries are dropped.
pub fn extract_records(body: Value) -> Result<Vec<RawRecord>> {
    let items = match body {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.get_mut("statements").map(Value::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ApiError::UnexpectedPayload(format!(
                    "`statements` is {}",
                    kind(&other)
                )));
            }
        },
        other => {
            return Err(ApiError::UnexpectedPayload(format!(
                "body is {}",
                kind(&other)
            )));
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            other => {
                warn!(kind = kind(&other), "skipping non-object statement entry");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use serde_json::json;

    fn client(base: &str) -> ProviderClient {
        ProviderClient::new(ProviderConfig {
            client_id: "id".into(),
            client_secret: "secret".into(),
            service_url: "https://localhost/callback".into(),
            customer_id: "c".into(),
            token_url: "https://auth.example.test/token".into(),
            api_base_url: base.into(),
        })
        .unwrap()
    }

    #[test]
    fn test_statements_url() {
        let c = client("https://api.example.test/api/prod/v1/");
        assert_eq!(
            c.statements_url("0001234").unwrap().as_str(),
            "https://api.example.test/api/prod/v1/accounts/0001234/statements"
        );
        assert_eq!(
            c.statements_url("12/3 4").unwrap().as_str(),
            "https://api.example.test/api/prod/v1/accounts/12%2F3%204/statements"
        );
        assert!(client("not a url").statements_url("1").is_err());
    }

    #[test]
    fn test_extract_records_shapes() {
        let rec = json!({"description": "Pago"});

        assert_eq!(extract_records(json!([rec.clone()])).unwrap().len(), 1);
        assert_eq!(
            extract_records(json!({"statements": [rec.clone(), rec.clone()], "page": 1}))
                .unwrap()
                .len(),
            2
        );
        assert!(extract_records(json!({"accountNumber": "1"})).unwrap().is_empty());
        assert!(extract_records(json!({"statements": null})).unwrap().is_empty());
        assert!(extract_records(Value::Null).unwrap().is_empty());

        assert!(matches!(
            extract_records(json!("oops")),
            Err(ApiError::UnexpectedPayload(_))
        ));
        assert!(matches!(
            extract_records(json!({"statements": {"a": 1}})),
            Err(ApiError::UnexpectedPayload(_))
        ));
    }

    #[test]
    fn test_extract_records_skips_non_objects() {
        let recs = extract_records(json!([{"a": 1}, 3, "x", {"b": 2}])).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1]["b"], json!(2));
    }
}
