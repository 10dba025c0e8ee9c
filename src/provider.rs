//! Provider abstraction for fetching ticker prices from external APIs

use crate::{
    error::ProviderError,
    types::{Asset, PriceData},
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Trait for market price providers
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetches prices for several assets in a single request
    ///
    /// # Arguments
    /// * `assets` - Slice of assets to fetch prices for
    ///
    /// # Returns
    /// HashMap of asset to price data, or an error if the fetch fails
    async fn fetch_prices(
        &self,
        assets: &[Asset],
    ) -> Result<HashMap<Asset, PriceData>, ProviderError>;

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock provider for testing
    #[derive(Default)]
    pub struct MockPriceProvider {
        prices: Arc<Mutex<HashMap<Asset, f64>>>,
        failures_left: Arc<Mutex<usize>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockPriceProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_price(&self, asset: Asset, price_usd: f64) {
            self.prices.lock().unwrap().insert(asset, price_usd);
        }

        /// Fails the next `count` calls
        pub fn fail_next(&self, count: usize) {
            *self.failures_left.lock().unwrap() = count;
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl PriceProvider for MockPriceProvider {
        async fn fetch_prices(
            &self,
            assets: &[Asset],
        ) -> Result<HashMap<Asset, PriceData>, ProviderError> {
            *self.call_count.lock().unwrap() += 1;

            {
                let mut failures = self.failures_left.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(ProviderError::RateLimitExceeded);
                }
            }

            let prices = self.prices.lock().unwrap();
            let result: HashMap<Asset, PriceData> = assets
                .iter()
                .filter_map(|asset| {
                    prices
                        .get(asset)
                        .map(|p| (*asset, PriceData::new(*asset, *p, "mock".to_string())))
                })
                .collect();

            if result.is_empty() {
                Err(ProviderError::MissingQuotes(
                    assets.iter().map(|a| a.symbol()).collect::<Vec<_>>().join(","),
                ))
            } else {
                Ok(result)
            }
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
