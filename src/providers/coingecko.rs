//! CoinGecko quotes for the header ticker

use crate::{
    api::{get_json, http_client},
    constants::{COINGECKO_API_URL, COINGECKO_SIMPLE_PRICE_ENDPOINT},
    error::{FetchError, ProviderError},
    provider::PriceProvider,
    types::{Asset, PriceData},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

const SOURCE: &str = "coingecko";

/// `/simple/price` maps each coin id to its quotes
type SimplePrice = HashMap<String, UsdQuote>;

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: f64,
}

/// Keeps the quotes of the requested assets, in USD
fn quotes_for(mut quotes: SimplePrice, assets: &[Asset]) -> HashMap<Asset, PriceData> {
    assets
        .iter()
        .filter_map(|asset| {
            let quote = quotes.remove(asset.coingecko_id())?;
            Some((*asset, PriceData::new(*asset, quote.usd, SOURCE.to_string())))
        })
        .collect()
}

/// STX and BTC prices from the public CoinGecko API
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(COINGECKO_API_URL)
    }

    /// Targets a different API host (pro tier, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, assets: &[Asset]) -> String {
        let ids: Vec<&str> = assets.iter().map(|a| a.coingecko_id()).collect();
        format!(
            "{}{}?ids={}&vs_currencies=usd",
            self.base_url,
            COINGECKO_SIMPLE_PRICE_ENDPOINT,
            ids.join(",")
        )
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    async fn fetch_prices(
        &self,
        assets: &[Asset],
    ) -> Result<HashMap<Asset, PriceData>, ProviderError> {
        if assets.is_empty() {
            return Ok(HashMap::new());
        }

        let quotes: SimplePrice = get_json(&self.client, &self.build_url(assets), "price quotes")
            .await
            .map_err(|e| match e {
                FetchError::Api { status: 429, .. } => ProviderError::RateLimitExceeded,
                other => ProviderError::Fetch(other),
            })?;

        let prices = quotes_for(quotes, assets);
        if prices.is_empty() {
            let symbols: Vec<&str> = assets.iter().map(|a| a.symbol()).collect();
            return Err(ProviderError::MissingQuotes(symbols.join(",")));
        }

        Ok(prices)
    }

    fn provider_name(&self) -> &'static str {
        SOURCE
    }
}
