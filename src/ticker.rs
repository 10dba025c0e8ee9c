//! Header price ticker
//!
//! Keeps STX and BTC USD prices fresh for the dashboard header.

use crate::{
    constants::{
        INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRY_ATTEMPTS, PRICE_REFRESH_INTERVAL_SECS,
        PRICE_STALE_THRESHOLD_SECS, TICKER_ASSETS,
    },
    error::{PriceError, ProviderError},
    format::currency,
    provider::PriceProvider,
    providers::CoinGeckoProvider,
    types::{Asset, PriceData},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// In-memory store for ticker prices
#[derive(Default)]
pub struct PriceStore {
    prices: RwLock<HashMap<Asset, PriceData>>,
}

impl PriceStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored prices of every asset in `prices`
    pub async fn update_prices(&self, prices: HashMap<Asset, PriceData>) {
        let mut stored = self.prices.write().await;
        for (asset, price_data) in prices {
            tracing::debug!(
                asset = asset.symbol(),
                price_usd = price_data.price_usd,
                "Updated price"
            );
            stored.insert(asset, price_data);
        }
    }

    /// Gets the current price for an asset
    ///
    /// # Returns
    /// The current price data or an error if not available or stale
    pub async fn get_price(&self, asset: Asset) -> Result<PriceData, PriceError> {
        let prices = self.prices.read().await;
        let price_data = prices
            .get(&asset)
            .ok_or_else(|| PriceError::not_available(asset.symbol()))?;

        if price_data.is_stale(PRICE_STALE_THRESHOLD_SECS) {
            return Err(PriceError::stale(asset.symbol(), price_data.age()));
        }

        Ok(price_data.clone())
    }

    /// Gets all non-stale prices
    pub async fn get_all_prices(&self) -> HashMap<Asset, PriceData> {
        self.prices
            .read()
            .await
            .iter()
            .filter(|(_, price)| !price.is_stale(PRICE_STALE_THRESHOLD_SECS))
            .map(|(asset, price)| (*asset, price.clone()))
            .collect()
    }
}

/// Pause after the `attempt`-th failure, capped at `MAX_BACKOFF_MS`
fn retry_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    initial
        .saturating_mul(factor)
        .min(Duration::from_millis(MAX_BACKOFF_MS))
}

/// STX/BTC price ticker
pub struct PriceTicker {
    store: Arc<PriceStore>,
    provider: Arc<dyn PriceProvider>,
    initial_backoff: Duration,
}

impl PriceTicker {
    /// Creates a ticker backed by CoinGecko
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self::with_provider(Arc::new(CoinGeckoProvider::new()?)))
    }

    /// Creates a ticker with a custom provider
    pub fn with_provider(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            store: Arc::new(PriceStore::new()),
            provider,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        }
    }

    /// Overrides the first retry delay
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Starts polling in the background until the handle is aborted
    pub fn start_background_task(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        let provider = self.provider.clone();
        let initial_backoff = self.initial_backoff;

        tokio::spawn(async move {
            tracing::info!(
                refresh_interval_secs = PRICE_REFRESH_INTERVAL_SECS,
                provider = provider.provider_name(),
                "Starting price ticker background task"
            );

            loop {
                if let Err(e) = Self::fetch_and_update(&provider, &store, initial_backoff).await {
                    tracing::warn!(error = %e, "Failed to fetch prices");
                }

                sleep(Duration::from_secs(PRICE_REFRESH_INTERVAL_SECS)).await;
            }
        })
    }

    /// One refresh: up to `MAX_RETRY_ATTEMPTS` calls, doubling the pause
    /// between them. Quotes land in `store` only on success.
    async fn fetch_and_update(
        provider: &Arc<dyn PriceProvider>,
        store: &Arc<PriceStore>,
        initial_backoff: Duration,
    ) -> Result<(), ProviderError> {
        let mut attempt = 1;
        loop {
            let error = match provider.fetch_prices(TICKER_ASSETS).await {
                Ok(prices) => {
                    store.update_prices(prices).await;
                    return Ok(());
                }
                Err(e) => e,
            };

            if attempt >= MAX_RETRY_ATTEMPTS || !error.is_retryable() {
                return Err(error);
            }

            let pause = retry_delay(initial_backoff, attempt);
            tracing::warn!(
                attempt,
                error = %error,
                pause_ms = pause.as_millis() as u64,
                "Ticker refresh failed"
            );
            sleep(pause).await;
            attempt += 1;
        }
    }

    /// Forces an immediate refresh
    pub async fn refresh_now(&self) -> Result<(), ProviderError> {
        Self::fetch_and_update(&self.provider, &self.store, self.initial_backoff).await
    }

    /// Gets the current price for an asset
    pub async fn get_price(&self, asset: Asset) -> Result<PriceData, PriceError> {
        self.store.get_price(asset).await
    }

    /// Gets prices for all tracked assets (non-stale only)
    pub async fn get_all_prices(&self) -> HashMap<Asset, PriceData> {
        self.store.get_all_prices().await
    }

    /// Header label such as `$1.85`; missing or stale prices read `$0.00`
    pub async fn ticker_label(&self, asset: Asset) -> String {
        let price = self
            .get_price(asset)
            .await
            .map(|p| p.price_usd)
            .unwrap_or_default();
        format!("${}", currency::SHORT.format(price))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockPriceProvider;
    use chrono::Utc;

    fn ticker(provider: Arc<MockPriceProvider>) -> PriceTicker {
        PriceTicker::with_provider(provider).with_initial_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_refresh_populates_store() {
        let provider = Arc::new(MockPriceProvider::new());
        provider.set_price(Asset::STX, 1.8512);
        provider.set_price(Asset::BTC, 97123.456);
        let ticker = ticker(provider);

        assert_eq!(
            ticker.get_price(Asset::STX).await.unwrap_err(),
            PriceError::not_available("STX")
        );
        ticker.refresh_now().await.unwrap();

        assert_eq!(ticker.get_all_prices().await.len(), 2);
        assert_eq!(ticker.ticker_label(Asset::STX).await, "$1.85");
        assert_eq!(ticker.ticker_label(Asset::BTC).await, "$97,123.46");
        assert_eq!(ticker.provider_name(), "mock");
    }

    #[tokio::test]
    async fn test_refresh_retries_then_succeeds() {
        let provider = Arc::new(MockPriceProvider::new());
        provider.set_price(Asset::STX, 2.0);
        provider.fail_next(2);
        let ticker = ticker(provider.clone());

        ticker.refresh_now().await.unwrap();

        assert_eq!(provider.call_count(), 3);
        assert_eq!(ticker.get_price(Asset::STX).await.unwrap().price_usd, 2.0);
    }

    #[tokio::test]
    async fn test_refresh_gives_up_after_max_attempts() {
        let provider = Arc::new(MockPriceProvider::new());
        provider.set_price(Asset::STX, 2.0);
        provider.fail_next(10);
        let ticker = ticker(provider.clone());

        let result = ticker.refresh_now().await;

        assert!(matches!(result, Err(ProviderError::RateLimitExceeded)));
        assert_eq!(provider.call_count(), MAX_RETRY_ATTEMPTS as usize);
        assert_eq!(ticker.ticker_label(Asset::STX).await, "$0.00");
    }

    #[tokio::test]
    async fn test_missing_quotes_are_not_retried() {
        let provider = Arc::new(MockPriceProvider::new());
        let ticker = ticker(provider.clone());

        let result = ticker.refresh_now().await;

        assert!(matches!(result, Err(ProviderError::MissingQuotes(_))));
        assert_eq!(provider.call_count(), 1);
    }

    #[test]
    fn test_retry_delay_doubles_up_to_cap() {
        let initial = Duration::from_millis(1000);
        assert_eq!(retry_delay(initial, 1), Duration::from_millis(1000));
        assert_eq!(retry_delay(initial, 2), Duration::from_millis(2000));
        assert_eq!(retry_delay(initial, 3), Duration::from_millis(4000));
        assert_eq!(retry_delay(initial, 40), Duration::from_millis(MAX_BACKOFF_MS));
    }

    #[tokio::test]
    async fn test_stale_prices_are_rejected() {
        let store = PriceStore::new();
        let mut old = PriceData::new(Asset::BTC, 90000.0, "mock".to_string());
        old.last_updated = Utc::now() - chrono::Duration::seconds(PRICE_STALE_THRESHOLD_SECS as i64 + 60);
        store.update_prices(HashMap::from([(Asset::BTC, old)])).await;

        assert!(matches!(
            store.get_price(Asset::BTC).await,
            Err(PriceError::Stale { .. })
        ));
        assert!(store.get_all_prices().await.is_empty());
    }
}
