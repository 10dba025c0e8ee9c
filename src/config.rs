//! Runtime settings
//!
//! Defaults come from [`crate::constants`]; a handful of deployment-specific
//! values can be overridden through environment variables:
//!
//! - `STACKING_TRACKER_NETWORK_ENV`: `mainnet` (default), `testnet`, `regtest`, `mocknet`
//! - `LOCAL_STACKS_API_PORT`: port of the mocknet API (default 3999)
//! - `STACKING_TRACKER_API_URL`: positions API base URL
//! - `STACKING_TRACKER_APP_ORIGIN`: origin the dashboard is served from

use crate::{
    constants::{DEFAULT_LOCAL_API_PORT, STACKING_TRACKER_API_URL},
    error::ConfigError,
    network::{stacks_chain, ExplorerLinks, NetworkEnv, StacksChain},
};

pub const NETWORK_ENV_VAR: &str = "STACKING_TRACKER_NETWORK_ENV";
pub const LOCAL_API_PORT_VAR: &str = "LOCAL_STACKS_API_PORT";
pub const API_URL_VAR: &str = "STACKING_TRACKER_API_URL";
pub const APP_ORIGIN_VAR: &str = "STACKING_TRACKER_APP_ORIGIN";

/// Resolved runtime settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Raw environment token, kept because chain selection needs an exact match
    pub network_token: String,
    pub network: NetworkEnv,
    pub local_api_port: u16,
    pub api_url: String,
    pub app_origin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network_token: "mainnet".to_string(),
            network: NetworkEnv::Mainnet,
            local_api_port: DEFAULT_LOCAL_API_PORT,
            api_url: STACKING_TRACKER_API_URL.to_string(),
            app_origin: String::new(),
        }
    }
}

impl Settings {
    /// Reads settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let network_token = lookup(NETWORK_ENV_VAR)
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.network_token);

        let local_api_port = match lookup(LOCAL_API_PORT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: LOCAL_API_PORT_VAR,
                value: raw.clone(),
            })?,
            None => defaults.local_api_port,
        };

        let api_url = lookup(API_URL_VAR)
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let app_origin = lookup(APP_ORIGIN_VAR).unwrap_or(defaults.app_origin);

        let settings = Self {
            network: NetworkEnv::from_token(&network_token),
            network_token,
            local_api_port,
            api_url,
            app_origin,
        };

        tracing::debug!(
            network = ?settings.network,
            api_url = %settings.api_url,
            "Loaded stacking tracker settings"
        );

        Ok(settings)
    }

    /// Stacks API endpoint for the configured network
    pub fn core_api_url(&self) -> String {
        self.network.core_api_url(self.local_api_port)
    }

    /// Chain the wallet should sign for
    pub fn chain(&self) -> StacksChain {
        stacks_chain(&self.network_token)
    }

    /// Explorer link builder for the configured origin
    pub fn explorer(&self) -> ExplorerLinks {
        ExplorerLinks::new(&self.app_origin)
    }
}
