//! Types shared across the Stacking Tracker SDK

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Assets shown in the price ticker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Asset {
    /// Stacks
    STX,
    /// Bitcoin
    BTC,
}

impl Asset {
    /// Get the asset symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::STX => "STX",
            Asset::BTC => "BTC",
        }
    }

    /// Get the CoinGecko ID for this asset
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Asset::STX => "blockstack",
            Asset::BTC => "bitcoin",
        }
    }
}

/// Price data for an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceData {
    /// The asset
    pub asset: Asset,

    /// Price in USD
    pub price_usd: f64,

    /// Last updated timestamp
    pub last_updated: DateTime<Utc>,

    /// Data source
    pub source: String,
}

impl PriceData {
    /// Create new price data
    pub fn new(asset: Asset, price_usd: f64, source: String) -> Self {
        Self {
            asset,
            price_usd,
            last_updated: Utc::now(),
            source,
        }
    }

    /// Check if the price data is stale (older than threshold seconds)
    pub fn is_stale(&self, threshold_seconds: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.last_updated);
        age.num_seconds() > threshold_seconds as i64
    }

    /// Get the age of the price data
    pub fn age(&self) -> std::time::Duration {
        let duration = Utc::now().signed_duration_since(self.last_updated);
        std::time::Duration::from_secs(duration.num_seconds().max(0) as u64)
    }
}

/// Wallet families the dashboard knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Xverse,
    Asigna,
    Okx,
    Leather,
    Hiro,
    /// Whatever registered itself as the generic `StacksProvider`
    Generic,
}

impl WalletKind {
    /// Token persisted in the preference store
    pub fn token(&self) -> &'static str {
        match self {
            WalletKind::Xverse => "xverse",
            WalletKind::Asigna => "asigna",
            WalletKind::Okx => "okx",
            WalletKind::Leather => "leather",
            WalletKind::Hiro => "hiro",
            WalletKind::Generic => "generic",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for WalletKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xverse" => Ok(WalletKind::Xverse),
            "asigna" => Ok(WalletKind::Asigna),
            "okx" => Ok(WalletKind::Okx),
            "leather" => Ok(WalletKind::Leather),
            "hiro" => Ok(WalletKind::Hiro),
            "generic" => Ok(WalletKind::Generic),
            other => Err(format!("unknown wallet kind: {}", other)),
        }
    }
}

/// Payload returned by a wallet's `connect()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub address: String,
}

/// Wallet connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No session
    Disconnected,
    /// Waiting for the user to choose a provider
    Selecting,
    /// Handshake in flight
    Connecting,
    /// Session address available
    Connected,
}

/// Wallet lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletEvent {
    /// A session address was obtained
    Connected {
        id: Uuid,
        provider: WalletKind,
        address: String,
        timestamp: DateTime<Utc>,
    },

    /// The session was cleared
    Disconnected { id: Uuid, timestamp: DateTime<Utc> },

    /// The user picked a provider in the selection dialog
    ProviderChosen {
        id: Uuid,
        provider: WalletKind,
        timestamp: DateTime<Utc>,
    },

    /// A connection attempt failed
    ConnectionFailed {
        id: Uuid,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl WalletEvent {
    /// Get the event type as string
    pub fn event_type(&self) -> &'static str {
        match self {
            WalletEvent::Connected { .. } => "CONNECTED",
            WalletEvent::Disconnected { .. } => "DISCONNECTED",
            WalletEvent::ProviderChosen { .. } => "PROVIDER_CHOSEN",
            WalletEvent::ConnectionFailed { .. } => "CONNECTION_FAILED",
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEvent::Connected {
                provider, address, ..
            } => write!(f, "Connected {} via {}", address, provider),
            WalletEvent::Disconnected { .. } => write!(f, "Disconnected"),
            WalletEvent::ProviderChosen { provider, .. } => {
                write!(f, "Provider chosen: {}", provider)
            }
            WalletEvent::ConnectionFailed { error_message, .. } => {
                write!(f, "Connection failed: {}", error_message)
            }
        }
    }
}

/// Position category as reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PositionCategory {
    /// Liquid stacking token
    Lst,
    DeFi,
    Other(String),
}

impl From<String> for PositionCategory {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LST" => PositionCategory::Lst,
            "DeFi" => PositionCategory::DeFi,
            _ => PositionCategory::Other(value),
        }
    }
}

impl From<PositionCategory> for String {
    fn from(value: PositionCategory) -> Self {
        value.label().to_string()
    }
}

impl PositionCategory {
    /// Label as displayed under the position name
    pub fn label(&self) -> &str {
        match self {
            PositionCategory::Lst => "LST",
            PositionCategory::DeFi => "DeFi",
            PositionCategory::Other(label) => label,
        }
    }
}

/// A stacking position as served by `GET /positions[/{address}]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: PositionCategory,
    pub symbol: String,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub link: String,
    /// Total value locked, in STX
    #[serde(default)]
    pub tvl: f64,
    #[serde(default)]
    pub tvl_usd: f64,
    /// Gross APY in percent
    #[serde(default)]
    pub apy: Option<f64>,
    /// Only present in address-specific responses
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub balance_usd: Option<f64>,
}

/// Loading state of the positions view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Showing public positions, no address resolved
    Default,
    /// Fetching positions for an address
    Loading,
    /// Showing positions for an address
    User,
    /// The last fetch failed, public positions are shown
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_kind_tokens() {
        for kind in [
            WalletKind::Xverse,
            WalletKind::Asigna,
            WalletKind::Okx,
            WalletKind::Leather,
            WalletKind::Hiro,
            WalletKind::Generic,
        ] {
            assert_eq!(kind.token().parse::<WalletKind>(), Ok(kind));
        }
        assert!("metamask".parse::<WalletKind>().is_err());
    }

    #[test]
    fn test_position_record_decodes_api_payload() {
        let json = r#"{
            "id": "stackingdao",
            "name": "StackingDAO",
            "type": "LST",
            "symbol": "stSTX",
            "logo": "/logos/stackingdao.webp",
            "link": "https://app.stackingdao.com",
            "tvl": 50000000.5,
            "tvl_usd": 90000000.0,
            "apy": 9.8
        }"#;

        let position: PositionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(position.category, PositionCategory::Lst);
        assert_eq!(position.apy, Some(9.8));
        assert_eq!(position.balance, None);

        let other: PositionCategory = serde_json::from_str("\"Pool\"").unwrap();
        assert_eq!(other, PositionCategory::Other("Pool".to_string()));
        assert_eq!(serde_json::to_string(&PositionCategory::DeFi).unwrap(), "\"DeFi\"");
    }

    #[test]
    fn test_wallet_event_serializes_with_tag() {
        let event = WalletEvent::Disconnected {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "DISCONNECTED");
        assert_eq!(event.event_type(), "DISCONNECTED");
    }
}
