//! Wallet provider handles and the registry of injected providers
//!
//! Browser wallet extensions inject their provider objects into the page.
//! Here every injected object is a [`WalletConnector`] and the set of them is
//! an explicit [`InjectedProviders`] value, so resolution can be driven by
//! whatever environment the host application (or a test) supplies.

use crate::{error::WalletError, types::ConnectResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// A wallet provider injected by a browser extension
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Asks the wallet for the user's Stacks account
    async fn connect(&self) -> Result<ConnectResponse, WalletError>;

    /// Human readable provider name, used in logs
    fn name(&self) -> &str;

    /// Capability flag set by OKX providers, which connect directly instead
    /// of going through the auth popup
    fn is_okx_wallet(&self) -> bool {
        false
    }
}

/// Shared handle to an injected provider
pub type ConnectorHandle = Arc<dyn WalletConnector>;

/// `XverseProviders` object; the Stacks provider hangs off it
#[derive(Clone, Default)]
pub struct XverseProviders {
    pub stacks_provider: Option<ConnectorHandle>,
}

/// `okxwallet` object; the Stacks provider hangs off it
#[derive(Clone, Default)]
pub struct OkxWallet {
    pub stacks: Option<ConnectorHandle>,
}

/// Providers currently injected into the environment
#[derive(Clone, Default)]
pub struct InjectedProviders {
    pub xverse: Option<XverseProviders>,
    pub asigna: Option<ConnectorHandle>,
    pub okx: Option<OkxWallet>,
    pub leather: Option<ConnectorHandle>,
    pub hiro: Option<ConnectorHandle>,
    /// Generic `StacksProvider`
    pub stacks: Option<ConnectorHandle>,
}

impl InjectedProviders {
    /// Nothing injected
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_xverse(mut self, provider: ConnectorHandle) -> Self {
        self.xverse = Some(XverseProviders {
            stacks_provider: Some(provider),
        });
        self
    }

    pub fn with_asigna(mut self, provider: ConnectorHandle) -> Self {
        self.asigna = Some(provider);
        self
    }

    pub fn with_okx(mut self, provider: ConnectorHandle) -> Self {
        self.okx = Some(OkxWallet {
            stacks: Some(provider),
        });
        self
    }

    pub fn with_leather(mut self, provider: ConnectorHandle) -> Self {
        self.leather = Some(provider);
        self
    }

    pub fn with_hiro(mut self, provider: ConnectorHandle) -> Self {
        self.hiro = Some(provider);
        self
    }

    pub fn with_stacks(mut self, provider: ConnectorHandle) -> Self {
        self.stacks = Some(provider);
        self
    }

    /// Names of the injected providers, for logging
    pub fn available(&self) -> Vec<&str> {
        let nested = [
            self.xverse.as_ref().and_then(|x| x.stacks_provider.as_ref()),
            self.okx.as_ref().and_then(|o| o.stacks.as_ref()),
        ];
        nested
            .into_iter()
            .chain([
                self.asigna.as_ref(),
                self.leather.as_ref(),
                self.hiro.as_ref(),
                self.stacks.as_ref(),
            ])
            .flatten()
            .map(|p| p.name())
            .collect()
    }
}

impl std::fmt::Debug for InjectedProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedProviders")
            .field("available", &self.available())
            .finish()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Address(String),
        Reject(String),
        Hang,
    }

    /// Scriptable wallet provider
    pub struct MockConnector {
        name: String,
        okx: bool,
        behavior: Mutex<Behavior>,
        call_count: AtomicUsize,
    }

    impl MockConnector {
        pub fn new(name: &str, address: &str) -> Self {
            Self {
                name: name.to_string(),
                okx: false,
                behavior: Mutex::new(Behavior::Address(address.to_string())),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn okx(address: &str) -> Self {
            Self {
                okx: true,
                ..Self::new("okx", address)
            }
        }

        pub fn rejecting(name: &str, reason: &str) -> Self {
            let connector = Self::new(name, "");
            *connector.behavior.lock().unwrap() = Behavior::Reject(reason.to_string());
            connector
        }

        pub fn hanging(name: &str) -> Self {
            let connector = Self::new(name, "");
            *connector.behavior.lock().unwrap() = Behavior::Hang;
            connector
        }

        pub fn flagged_okx(mut self) -> Self {
            self.okx = true;
            self
        }

        pub fn set_address(&self, address: &str) {
            *self.behavior.lock().unwrap() = Behavior::Address(address.to_string());
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn handle(self) -> Arc<Self> {
            Arc::new(self)
        }
    }

    #[async_trait]
    impl WalletConnector for MockConnector {
        async fn connect(&self) -> Result<ConnectResponse, WalletError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let outcome = match &*self.behavior.lock().unwrap() {
                Behavior::Address(address) => Some(Ok(ConnectResponse {
                    address: address.clone(),
                })),
                Behavior::Reject(reason) => Some(Err(WalletError::rejected(reason.clone()))),
                Behavior::Hang => None,
            };
            match outcome {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn is_okx_wallet(&self) -> bool {
            self.okx
        }
    }
}
