//! HTTP access: the shared JSON GET path and the positions API client

use crate::{
    constants::{POSITIONS_ENDPOINT, REQUEST_TIMEOUT_SECS, STACKING_TRACKER_API_URL, USER_AGENT},
    error::FetchError,
    types::PositionRecord,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client shared by every outbound call of the SDK
pub(crate) fn http_client() -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?)
}

/// GETs `url` and decodes its JSON body.
///
/// Non-success statuses become [`FetchError::Api`]; undecodable bodies become
/// [`FetchError::InvalidResponse`] naming `what` was being decoded.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    what: &str,
) -> Result<T, FetchError> {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Api {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    let body = response.text().await?;
    decode_json(&body, what)
}

fn decode_json<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::InvalidResponse(format!("malformed {}: {}", what, e)))
}

/// Source of address-specific positions
#[async_trait]
pub trait PositionsApi: Send + Sync {
    /// Fetches every position for `address`, including balances
    async fn fetch_positions(&self, address: &str) -> Result<Vec<PositionRecord>, FetchError>;
}

/// HTTP implementation of [`PositionsApi`]
pub struct HttpPositionsApi {
    client: Client,
    base_url: String,
}

impl HttpPositionsApi {
    /// Creates a client for the given API base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Builds the positions URL for an address
    fn build_url(&self, address: &str) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            POSITIONS_ENDPOINT,
            address.trim()
        )
    }
}

impl Default for HttpPositionsApi {
    fn default() -> Self {
        Self::new(STACKING_TRACKER_API_URL).expect("Failed to create positions API client")
    }
}

#[async_trait]
impl PositionsApi for HttpPositionsApi {
    async fn fetch_positions(&self, address: &str) -> Result<Vec<PositionRecord>, FetchError> {
        let url = self.build_url(address);
        tracing::debug!(url = %url, "Fetching positions");

        let positions: Vec<PositionRecord> =
            get_json(&self.client, &url, "positions response").await?;

        tracing::debug!(
            address = %address,
            count = positions.len(),
            "Fetched positions"
        );

        Ok(positions)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionCategory;

    #[test]
    fn test_build_url() {
        let api = HttpPositionsApi::new("https://api.example.com/").unwrap();
        assert_eq!(
            api.build_url(" SP000 "),
            "https://api.example.com/positions/SP000"
        );
    }

    #[test]
    fn test_decode_positions() {
        let body = r#"[
            {"id": "stackingdao", "name": "StackingDAO", "type": "LST", "symbol": "stSTX",
             "logo": "/logos/stackingdao.webp", "link": "https://app.stackingdao.com",
             "tvl": 1000.0, "tvl_usd": 1800.0, "apy": 9.5, "balance": 12.5, "balance_usd": 22.5},
            {"id": "zest", "name": "Zest", "type": "DeFi", "symbol": "stSTX",
             "tvl": 10.0, "tvl_usd": 18.0, "apy": null}
        ]"#;

        let positions = decode_json::<Vec<PositionRecord>>(body, "positions response").unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].balance, Some(12.5));
        assert_eq!(positions[1].category, PositionCategory::DeFi);
        assert_eq!(positions[1].apy, None);
    }

    #[test]
    fn test_decode_rejects_garbage_without_echoing_it() {
        let result = decode_json::<Vec<PositionRecord>>("<html>", "positions response");
        match result {
            Err(FetchError::InvalidResponse(msg)) => {
                assert!(msg.starts_with("malformed positions response"));
                assert!(!msg.contains("<html>"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
