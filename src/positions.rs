//! Positions view model
//!
//! Holds the public positions, resolves which address (if any) to show
//! personalized positions for, fetches them, and turns the result into the
//! grouped rows of the positions table.
//!
//! Address precedence: a manually entered address, then the wallet session
//! address, then none. Every change of either input starts a new load; a load
//! whose address has since been superseded never writes its result.

use crate::{
    api::PositionsApi,
    constants::FETCH_TIMEOUT_SECS,
    error::FetchError,
    format::{apy, currency, usd},
    types::{PositionCategory, PositionRecord, ViewState},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// StackingDAO stSTX entry heading the stSTX group
pub const STSTX_GROUP_ID: &str = "stackingdao";
/// StackingDAO stSTXbtc entry heading the stSTXbtc group
pub const STSTXBTC_GROUP_ID: &str = "stackingdao-btc";

/// Where a row sits in the grouped table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Collapsible group parent
    GroupHeader { collapsed: bool },
    /// DeFi position nested under a group
    GroupMember,
    Standalone,
}

/// How rewards are paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardMode {
    Compounding,
    Manual,
}

impl RewardMode {
    pub fn label(&self) -> &'static str {
        match self {
            RewardMode::Compounding => "Compounding",
            RewardMode::Manual => "Manual",
        }
    }
}

/// Balance cell, only present for an address-specific view
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceCell {
    pub amount: String,
    pub usd: String,
    /// Token the balance is denominated in
    pub token: &'static str,
    /// Non-zero balances are emphasized
    pub highlighted: bool,
}

/// A display-ready row of the positions table
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub logo: String,
    pub link: String,
    pub kind: RowKind,
    pub tvl: String,
    pub tvl_usd: String,
    pub reward_token: &'static str,
    pub reward_mode: RewardMode,
    pub apy: String,
    pub balance: Option<BalanceCell>,
}

impl PositionRow {
    fn from_record(position: &PositionRecord, kind: RowKind, with_balance: bool) -> Self {
        let (reward_token, reward_mode) = rewards(&position.symbol);

        let name = if position.category == PositionCategory::Lst && position.name == "StackingDAO"
        {
            format!("{} {}", position.name, position.symbol)
        } else {
            position.name.clone()
        };

        let balance = with_balance.then(|| {
            let amount = position.balance.unwrap_or_default();
            BalanceCell {
                amount: currency::ROUNDED.format(amount),
                usd: usd(position.balance_usd.unwrap_or_default()),
                token: balance_token(&position.symbol),
                highlighted: amount > 0.0,
            }
        });

        Self {
            id: position.id.clone(),
            name,
            category: position.category.label().to_string(),
            logo: position.logo.clone(),
            link: position.link.clone(),
            kind,
            tvl: currency::ROUNDED.format(position.tvl),
            tvl_usd: usd(position.tvl_usd),
            reward_token,
            reward_mode,
            apy: apy(position.apy),
            balance,
        }
    }
}

fn rewards(symbol: &str) -> (&'static str, RewardMode) {
    match symbol {
        "stSTX" => ("stSTX", RewardMode::Compounding),
        "stSTXbtc" => ("sBTC", RewardMode::Manual),
        "BTC" => ("BTC", RewardMode::Manual),
        "LiSTX" => ("LiSTX", RewardMode::Manual),
        _ => ("STX", RewardMode::Manual),
    }
}

fn balance_token(symbol: &str) -> &'static str {
    match symbol {
        "stSTX" => "stSTX",
        "LiSTX" => "LiSTX",
        _ => "STX",
    }
}

#[derive(Debug)]
struct ViewInner {
    default_positions: Vec<PositionRecord>,
    input_address: String,
    session_address: Option<String>,
    user_positions: Option<Vec<PositionRecord>>,
    state: ViewState,
    collapsed_ststx: bool,
    collapsed_ststxbtc: bool,
    /// Bumped on every load; only the latest load may write results
    generation: u64,
}

impl ViewInner {
    fn target_address(&self) -> Option<String> {
        if !self.input_address.is_empty() {
            Some(self.input_address.clone())
        } else {
            self.session_address.clone()
        }
    }

    fn positions(&self) -> &[PositionRecord] {
        self.user_positions
            .as_deref()
            .unwrap_or(&self.default_positions)
    }
}

/// Positions page state
pub struct PositionsView {
    api: Arc<dyn PositionsApi>,
    fetch_timeout: Duration,
    inner: RwLock<ViewInner>,
}

impl PositionsView {
    /// Creates a view showing `default_positions` until an address resolves
    pub fn new(api: Arc<dyn PositionsApi>, default_positions: Vec<PositionRecord>) -> Self {
        Self {
            api,
            fetch_timeout: Duration::from_secs(FETCH_TIMEOUT_SECS),
            inner: RwLock::new(ViewInner {
                default_positions,
                input_address: String::new(),
                session_address: None,
                user_positions: None,
                state: ViewState::Default,
                collapsed_ststx: false,
                collapsed_ststxbtc: false,
                generation: 0,
            }),
        }
    }

    /// Overrides the fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub async fn state(&self) -> ViewState {
        self.inner.read().await.state.clone()
    }

    /// Address whose positions are (being) shown
    pub async fn active_address(&self) -> Option<String> {
        self.inner.read().await.target_address()
    }

    /// Whether balances are shown
    pub async fn has_user_positions(&self) -> bool {
        self.inner.read().await.user_positions.is_some()
    }

    /// Sets the manually entered address (empty clears it) and reloads
    pub async fn set_input_address(&self, address: impl Into<String>) -> ViewState {
        {
            let mut inner = self.inner.write().await;
            inner.input_address = address.into().trim().to_string();
        }
        self.load().await
    }

    /// Sets the wallet session address and reloads
    pub async fn set_session_address(&self, address: Option<String>) -> ViewState {
        {
            let mut inner = self.inner.write().await;
            inner.session_address = address.filter(|a| !a.is_empty());
        }
        self.load().await
    }

    /// Resolves the address and loads its positions.
    ///
    /// Returns the view state after this load. If another load started in the
    /// meantime, this one's result is dropped and the newer state returned.
    pub async fn load(&self) -> ViewState {
        let (generation, target) = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.user_positions = None;

            let target = inner.target_address();
            inner.state = if target.is_some() {
                ViewState::Loading
            } else {
                ViewState::Default
            };
            (inner.generation, target)
        };

        let Some(address) = target else {
            return ViewState::Default;
        };

        let result = match tokio::time::timeout(
            self.fetch_timeout,
            self.api.fetch_positions(&address),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::FetchTimeout(self.fetch_timeout)),
        };

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            tracing::debug!(
                address = %address,
                "Discarding positions for superseded address"
            );
            return inner.state.clone();
        }

        match result {
            Ok(positions) => {
                tracing::debug!(
                    address = %address,
                    count = positions.len(),
                    "Loaded user positions"
                );
                inner.user_positions = Some(positions);
                inner.state = ViewState::User;
            }
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Failed to load user positions");
                inner.state = ViewState::Error(e.to_string());
            }
        }
        inner.state.clone()
    }

    /// Keeps the session address in sync with a wallet controller's watch
    /// channel. Each change starts its own load, so a change while a fetch is
    /// in flight supersedes it.
    pub fn follow_session(self: Arc<Self>, mut rx: watch::Receiver<Option<String>>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let address = rx.borrow_and_update().clone();
                {
                    let mut inner = self.inner.write().await;
                    inner.session_address = address.filter(|a| !a.is_empty());
                }
                let view = self.clone();
                tokio::spawn(async move {
                    view.load().await;
                });

                if rx.changed().await.is_err() {
                    tracing::debug!("Session address channel closed");
                    break;
                }
            }
        })
    }

    pub async fn toggle_ststx_group(&self) {
        let mut inner = self.inner.write().await;
        inner.collapsed_ststx = !inner.collapsed_ststx;
    }

    pub async fn toggle_ststxbtc_group(&self) {
        let mut inner = self.inner.write().await;
        inner.collapsed_ststxbtc = !inner.collapsed_ststxbtc;
    }

    /// Grouped table rows.
    ///
    /// Order: stSTX group header, its DeFi members, stSTXbtc group header,
    /// its DeFi members, then every other non-DeFi position.
    pub async fn rows(&self) -> Vec<PositionRow> {
        let inner = self.inner.read().await;
        let with_balance = inner.user_positions.is_some();
        let positions = inner.positions();

        let row = |p: &PositionRecord, kind| PositionRow::from_record(p, kind, with_balance);
        let members = move |symbol: &'static str| {
            positions
                .iter()
                .filter(move |p| p.category == PositionCategory::DeFi && p.symbol == symbol)
        };

        let mut rows = Vec::with_capacity(positions.len());

        rows.extend(positions.iter().filter(|p| p.id == STSTX_GROUP_ID).map(|p| {
            row(
                p,
                RowKind::GroupHeader {
                    collapsed: inner.collapsed_ststx,
                },
            )
        }));
        if !inner.collapsed_ststx {
            rows.extend(members("stSTX").map(|p| row(p, RowKind::GroupMember)));
        }

        rows.extend(positions.iter().filter(|p| p.id == STSTXBTC_GROUP_ID).map(|p| {
            row(
                p,
                RowKind::GroupHeader {
                    collapsed: inner.collapsed_ststxbtc,
                },
            )
        }));
        if !inner.collapsed_ststxbtc {
            rows.extend(members("stSTXbtc").map(|p| row(p, RowKind::GroupMember)));
        }

        rows.extend(
            positions
                .iter()
                .filter(|p| {
                    p.category != PositionCategory::DeFi
                        && p.id != STSTX_GROUP_ID
                        && p.id != STSTXBTC_GROUP_ID
                })
                .map(|p| row(p, RowKind::Standalone)),
        );

        rows
    }

    /// Every position in API order, ungrouped (compact layout)
    pub async fn cards(&self) -> Vec<PositionRow> {
        let inner = self.inner.read().await;
        let with_balance = inner.user_positions.is_some();
        inner
            .positions()
            .iter()
            .map(|p| PositionRow::from_record(p, RowKind::Standalone, with_balance))
            .collect()
    }
}
