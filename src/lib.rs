//! # Stacking Tracker SDK
//!
//! Client-side core of the Stacking Tracker dashboard for the Stacks chain:
//! wallet connection, personalized stacking positions, the STX/BTC price
//! ticker and the display formatting shared by every screen.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use stacking_tracker_sdk::{
//!     config::Settings, HttpPositionsApi, PositionsView, WalletController,
//! };
//! # use stacking_tracker_sdk::wallet::{AuthFlow, Clipboard};
//! # async fn example(
//! #     env: stacking_tracker_sdk::WalletEnvironment,
//! #     auth: Arc<dyn AuthFlow>,
//! #     clipboard: Arc<dyn Clipboard>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//!
//! let mut wallet = WalletController::new(Some(env), auth, clipboard)
//!     .with_explorer(settings.explorer());
//!
//! let api = Arc::new(HttpPositionsApi::new(settings.api_url.clone())?);
//! let view = Arc::new(PositionsView::new(api, Vec::new()));
//! view.clone().follow_session(wallet.subscribe_address());
//!
//! wallet.initiate_connection().await?;
//! for row in view.rows().await {
//!     println!("{}: {} STX", row.name, row.tvl);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! WalletController ──resolve──> resolver (InjectedProviders + PreferenceStore)
//!        │
//!        └─ session address (watch) ──> PositionsView ──> PositionsApi
//!                                             │
//!                                             └─> rows formatted via `format`
//! PriceTicker ──> PriceProvider (CoinGecko)
//! ```

pub mod api;
pub mod config;
pub mod connector;
pub mod constants;
pub mod error;
pub mod format;
pub mod network;
pub mod positions;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod store;
pub mod ticker;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use api::{HttpPositionsApi, PositionsApi};
pub use connector::{InjectedProviders, WalletConnector};
pub use error::{ConfigError, FetchError, PriceError, ProviderError, WalletError};
pub use positions::{PositionRow, PositionsView};
pub use resolver::{resolve_provider, ResolvedProvider, WalletEnvironment};
pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use ticker::PriceTicker;
pub use types::{
    Asset, ConnectionState, PositionCategory, PositionRecord, PriceData, ViewState, WalletEvent,
    WalletKind,
};
pub use wallet::WalletController;
