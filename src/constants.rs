//! Constants for the Stacking Tracker SDK
//!
//! Compile-time defaults live here. The few values that vary per deployment
//! (network environment, API base URL, local API port) can be overridden
//! through the environment, see [`crate::config::Settings::from_env`].

use crate::types::Asset;

/// Storage key holding the user's chosen wallet provider
pub const PROVIDER_PREFERENCE_KEY: &str = "stacking-tracker-sign-provider";

/// Average Stacks block time used for duration estimates (in minutes)
pub const MINUTES_PER_BLOCK: u64 = 10;

/// Upper bound for a wallet `connect()` or auth popup (in seconds)
pub const CONNECT_TIMEOUT_SECS: u64 = 15;

/// Upper bound for a positions fetch (in seconds)
pub const FETCH_TIMEOUT_SECS: u64 = 15;

/// HTTP request timeout for the underlying client (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Stacking Tracker public API base URL
pub const STACKING_TRACKER_API_URL: &str = "https://api.stacking-tracker.com";

/// Positions endpoint, suffixed with `/{address}`
pub const POSITIONS_ENDPOINT: &str = "/positions";

/// Default Stacks API endpoint (mainnet)
pub const MAINNET_API_URL: &str =
    "https://small-solemn-frost.stacks-mainnet.discover.quiknode.pro/deaf86bafdfbef850e40cdf5fa22c41cd447cdff";

/// Hiro testnet API endpoint
pub const TESTNET_API_URL: &str = "https://api.testnet.hiro.so";

/// Regtest API endpoint
pub const REGTEST_API_URL: &str = "https://stacks-node-api.regtest.stacks.co";

/// Port of a locally running Stacks API (mocknet)
pub const DEFAULT_LOCAL_API_PORT: u16 = 3999;

/// Hiro explorer base URL
pub const EXPLORER_URL: &str = "https://explorer.hiro.so";

/// How often the price ticker refreshes (in seconds)
pub const PRICE_REFRESH_INTERVAL_SECS: u64 = 60;

/// How long before price data is considered stale (in seconds)
pub const PRICE_STALE_THRESHOLD_SECS: u64 = 300;

/// Maximum number of retry attempts when a price provider fails
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial backoff delay for retries (in milliseconds)
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay for retries (in milliseconds)
pub const MAX_BACKOFF_MS: u64 = 30000;

/// Assets shown in the header ticker
pub const TICKER_ASSETS: &[Asset] = &[Asset::STX, Asset::BTC];

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API endpoint for simple price queries
pub const COINGECKO_SIMPLE_PRICE_ENDPOINT: &str = "/simple/price";

/// User agent for HTTP requests
pub const USER_AGENT: &str = "stacking-tracker-sdk/0.1.0";
