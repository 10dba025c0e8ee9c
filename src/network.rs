//! Network environment selection and explorer links

use crate::constants::{
    DEFAULT_LOCAL_API_PORT, EXPLORER_URL, MAINNET_API_URL, REGTEST_API_URL, TESTNET_API_URL,
};
use serde::{Deserialize, Serialize};

/// Deployment environment the dashboard talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkEnv {
    /// Local devnet
    Mocknet,
    Testnet,
    Regtest,
    Mainnet,
}

/// Chain the wallet signs for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StacksChain {
    Mainnet,
    Testnet,
}

impl NetworkEnv {
    /// Interprets an environment token.
    ///
    /// Tokens are matched by substring in the order mocknet, testnet, regtest,
    /// so `"mocknet-2"` selects mocknet. Anything else is mainnet.
    pub fn from_token(token: &str) -> Self {
        if token.contains("mocknet") {
            NetworkEnv::Mocknet
        } else if token.contains("testnet") {
            NetworkEnv::Testnet
        } else if token.contains("regtest") {
            NetworkEnv::Regtest
        } else {
            NetworkEnv::Mainnet
        }
    }

    /// Stacks API endpoint for this environment
    pub fn core_api_url(&self, local_port: u16) -> String {
        match self {
            NetworkEnv::Mocknet => format!("http://localhost:{}", local_port),
            NetworkEnv::Testnet => TESTNET_API_URL.to_string(),
            NetworkEnv::Regtest => REGTEST_API_URL.to_string(),
            NetworkEnv::Mainnet => MAINNET_API_URL.to_string(),
        }
    }
}

/// Chain selection.
///
/// Only the exact token `mainnet` signs for mainnet; every other token,
/// including an unknown one that falls back to the mainnet API, signs for
/// testnet.
pub fn stacks_chain(token: &str) -> StacksChain {
    if token == "mainnet" {
        StacksChain::Mainnet
    } else {
        StacksChain::Testnet
    }
}

/// Builds explorer deep links
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerLinks {
    /// Whether the app itself is served from localhost
    local: bool,
}

impl ExplorerLinks {
    /// `app_origin` is the origin the dashboard is served from
    pub fn new(app_origin: &str) -> Self {
        Self {
            local: app_origin.contains("localhost"),
        }
    }

    /// Link to a transaction
    pub fn transaction(&self, tx_id: &str) -> String {
        if self.local {
            format!(
                "http://localhost:{}/extended/v1/tx/{}",
                DEFAULT_LOCAL_API_PORT, tx_id
            )
        } else {
            format!("{}/txid/{}?chain=mainnet", EXPLORER_URL, tx_id)
        }
    }

    /// Link to an account
    pub fn address(&self, address: &str) -> String {
        format!("{}/address/{}?chain=mainnet", EXPLORER_URL, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_tokens() {
        assert_eq!(NetworkEnv::from_token("mocknet"), NetworkEnv::Mocknet);
        assert_eq!(NetworkEnv::from_token("testnet"), NetworkEnv::Testnet);
        assert_eq!(NetworkEnv::from_token("regtest"), NetworkEnv::Regtest);
        assert_eq!(NetworkEnv::from_token("mainnet"), NetworkEnv::Mainnet);
        assert_eq!(NetworkEnv::from_token("staging"), NetworkEnv::Mainnet);
        assert_eq!(NetworkEnv::from_token("mocknet-testnet"), NetworkEnv::Mocknet);
    }

    #[test]
    fn test_core_api_urls() {
        assert_eq!(
            NetworkEnv::Mocknet.core_api_url(3999),
            "http://localhost:3999"
        );
        assert_eq!(
            NetworkEnv::Testnet.core_api_url(3999),
            "https://api.testnet.hiro.so"
        );
        assert_eq!(NetworkEnv::Mainnet.core_api_url(1), MAINNET_API_URL);
    }

    #[test]
    fn test_chain_selection() {
        assert_eq!(stacks_chain("mainnet"), StacksChain::Mainnet);
        assert_eq!(stacks_chain("testnet"), StacksChain::Testnet);
        assert_eq!(stacks_chain("staging"), StacksChain::Testnet);
    }

    #[test]
    fn test_explorer_links() {
        let local = ExplorerLinks::new("http://localhost:3000");
        assert_eq!(
            local.transaction("0xabc"),
            "http://localhost:3999/extended/v1/tx/0xabc"
        );

        let public = ExplorerLinks::new("https://www.stacking-tracker.com");
        assert_eq!(
            public.transaction("0xabc"),
            "https://explorer.hiro.so/txid/0xabc?chain=mainnet"
        );
        assert_eq!(
            public.address("SP000"),
            "https://explorer.hiro.so/address/SP000?chain=mainnet"
        );
    }
}
