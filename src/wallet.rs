//! Wallet connection controller
//!
//! Drives the connect button: resolve a provider, connect through it (OKX
//! directly, everything else through the auth popup), fall back to the
//! provider chooser when nothing can be resolved, and manage the resulting
//! session address.
//!
//! ```text
//! Disconnected --initiate--> Connecting --ok--> Connected
//!      |                         |                  |
//!      | (nothing resolved)      +--err/timeout--> Disconnected
//!      v                                            ^
//!  Selecting --choose--> Connecting                 |
//!                                  Connected --sign_out
//! ```

use crate::{
    constants::{CONNECT_TIMEOUT_SECS, PROVIDER_PREFERENCE_KEY},
    error::WalletError,
    network::ExplorerLinks,
    resolver::{resolve_provider, ResolvedProvider, WalletEnvironment},
    types::{ConnectionState, WalletEvent, WalletKind},
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

/// Capacity of the wallet event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Generic wallet authentication popup (Stacks Connect)
#[async_trait]
pub trait AuthFlow: Send + Sync {
    /// Opens the popup for `provider` and resolves with the account address
    async fn open_auth(&self, provider: &ResolvedProvider) -> Result<String, WalletError>;

    /// Clears whatever session data the auth flow keeps
    async fn sign_out(&self) {}
}

/// System clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), WalletError>;
}

/// Wallet connection state machine
pub struct WalletController {
    env: Option<WalletEnvironment>,
    auth: Arc<dyn AuthFlow>,
    clipboard: Arc<dyn Clipboard>,
    explorer: ExplorerLinks,
    connect_timeout: Duration,
    state: ConnectionState,
    /// Kept so OKX sessions can sign later without resolving again
    okx_provider: Option<ResolvedProvider>,
    address_tx: watch::Sender<Option<String>>,
    events: broadcast::Sender<WalletEvent>,
}

impl WalletController {
    /// Creates a disconnected controller.
    ///
    /// `env` is `None` in non-interactive contexts, where every connection
    /// attempt ends in provider selection.
    pub fn new(
        env: Option<WalletEnvironment>,
        auth: Arc<dyn AuthFlow>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let (address_tx, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            env,
            auth,
            clipboard,
            explorer: ExplorerLinks::default(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            state: ConnectionState::Disconnected,
            okx_provider: None,
            address_tx,
            events,
        }
    }

    /// Overrides the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Overrides the explorer link builder
    pub fn with_explorer(mut self, explorer: ExplorerLinks) -> Self {
        self.explorer = explorer;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current session address
    pub fn session_address(&self) -> Option<String> {
        self.address_tx.borrow().clone()
    }

    /// Provider retained from a direct OKX connection
    pub fn okx_provider(&self) -> Option<&ResolvedProvider> {
        self.okx_provider.as_ref()
    }

    /// Watches the session address
    pub fn subscribe_address(&self) -> watch::Receiver<Option<String>> {
        self.address_tx.subscribe()
    }

    /// Receives wallet lifecycle events
    pub fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }

    /// Handles a click on the connect button.
    ///
    /// Returns the state reached: `Connected`, or `Selecting` when no
    /// provider could be resolved and the user has to choose one.
    pub async fn initiate_connection(&mut self) -> Result<ConnectionState, WalletError> {
        if self.state == ConnectionState::Connected {
            tracing::debug!("Wallet already connected");
            return Ok(self.state);
        }

        match resolve_provider(self.env.as_ref()) {
            Some(provider) => {
                self.connect_with(provider).await?;
                Ok(self.state)
            }
            None => {
                tracing::debug!("No wallet provider resolved, asking user to choose");
                self.state = ConnectionState::Selecting;
                Ok(self.state)
            }
        }
    }

    /// Handles a pick in the provider chooser.
    ///
    /// The choice is persisted before connecting, so it sticks even if the
    /// connection then fails.
    pub async fn on_provider_chosen(
        &mut self,
        choice: WalletKind,
    ) -> Result<ConnectionState, WalletError> {
        let env = match &self.env {
            Some(env) => env,
            None => {
                self.end_session();
                return Err(WalletError::NoProviderAvailable);
            }
        };

        if let Err(e) = env.store.set(PROVIDER_PREFERENCE_KEY, choice.token()) {
            self.end_session();
            return Err(e);
        }
        self.emit(WalletEvent::ProviderChosen {
            id: Uuid::new_v4(),
            provider: choice,
            timestamp: Utc::now(),
        });
        tracing::info!(provider = %choice, "Wallet provider chosen");

        match resolve_provider(Some(env)) {
            Some(provider) => {
                self.connect_with(provider).await?;
                Ok(self.state)
            }
            None => {
                tracing::warn!(provider = %choice, "Chosen wallet provider is not installed");
                self.end_session();
                Err(WalletError::NoProviderAvailable)
            }
        }
    }

    /// Closes the provider chooser without picking anything
    pub fn cancel_selection(&mut self) {
        if self.state == ConnectionState::Selecting {
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Copies the session address to the clipboard.
    ///
    /// Does nothing without a session; clipboard failures are logged and
    /// dropped.
    pub async fn copy_address(&self) {
        let Some(address) = self.session_address() else {
            tracing::debug!("No session address to copy");
            return;
        };

        if let Err(e) = self.clipboard.write_text(&address).await {
            tracing::warn!(error = %e, "Failed to copy address");
        }
    }

    /// Explorer page of the session address
    pub fn explorer_link(&self) -> Option<String> {
        self.session_address()
            .map(|address| self.explorer.address(&address))
    }

    /// Clears the session
    pub async fn sign_out(&mut self) {
        if !self.end_session() {
            self.emit_disconnected();
        }
        self.auth.sign_out().await;
        tracing::info!("Wallet signed out");
    }

    /// Moves to `Disconnected`, dropping any session address and OKX handle.
    ///
    /// Returns whether a session was dropped; subscribers then also get a
    /// `Disconnected` event.
    fn end_session(&mut self) -> bool {
        self.state = ConnectionState::Disconnected;
        self.okx_provider = None;
        let had_session = self.address_tx.send_replace(None).is_some();
        if had_session {
            self.emit_disconnected();
        }
        had_session
    }

    fn emit_disconnected(&self) {
        self.emit(WalletEvent::Disconnected {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
        });
    }

    async fn connect_with(&mut self, provider: ResolvedProvider) -> Result<(), WalletError> {
        self.state = ConnectionState::Connecting;
        let okx = provider.is_okx();

        tracing::debug!(
            provider = %provider.kind(),
            direct = okx,
            "Connecting wallet"
        );

        let attempt = if okx {
            tokio::time::timeout(self.connect_timeout, async {
                provider
                    .connector()
                    .connect()
                    .await
                    .map(|response| response.address)
            })
            .await
        } else {
            tokio::time::timeout(self.connect_timeout, self.auth.open_auth(&provider)).await
        };

        let result = match attempt {
            Ok(Ok(address)) if address.is_empty() => {
                Err(WalletError::rejected("wallet returned an empty address"))
            }
            Ok(result) => result,
            Err(_) => Err(WalletError::ConnectionTimeout(self.connect_timeout)),
        };

        match result {
            Ok(address) => {
                tracing::info!(
                    provider = %provider.kind(),
                    address = %address,
                    "Wallet connected"
                );
                self.emit(WalletEvent::Connected {
                    id: Uuid::new_v4(),
                    provider: provider.kind(),
                    address: address.clone(),
                    timestamp: Utc::now(),
                });
                self.address_tx.send_replace(Some(address));
                if okx {
                    self.okx_provider = Some(provider);
                }
                self.state = ConnectionState::Connected;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    provider = %provider.kind(),
                    error = %e,
                    "Wallet connection failed"
                );
                self.emit(WalletEvent::ConnectionFailed {
                    id: Uuid::new_v4(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.end_session();
                Err(e)
            }
        }
    }

    fn emit(&self, event: WalletEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Auth popup that answers with a fixed result
    pub struct MockAuthFlow {
        result: Mutex<Result<String, WalletError>>,
        opened_with: Mutex<Vec<WalletKind>>,
        sign_outs: Mutex<usize>,
    }

    impl MockAuthFlow {
        pub fn approving(address: &str) -> Self {
            Self {
                result: Mutex::new(Ok(address.to_string())),
                opened_with: Mutex::new(Vec::new()),
                sign_outs: Mutex::new(0),
            }
        }

        pub fn rejecting(reason: &str) -> Self {
            let flow = Self::approving("");
            *flow.result.lock().unwrap() = Err(WalletError::rejected(reason));
            flow
        }

        pub fn opened_with(&self) -> Vec<WalletKind> {
            self.opened_with.lock().unwrap().clone()
        }

        pub fn sign_outs(&self) -> usize {
            *self.sign_outs.lock().unwrap()
        }
    }

    #[async_trait]
    impl AuthFlow for MockAuthFlow {
        async fn open_auth(&self, provider: &ResolvedProvider) -> Result<String, WalletError> {
            self.opened_with.lock().unwrap().push(provider.kind());
            self.result.lock().unwrap().clone()
        }

        async fn sign_out(&self) {
            *self.sign_outs.lock().unwrap() += 1;
        }
    }

    /// Clipboard recording what was written
    #[derive(Default)]
    pub struct MockClipboard {
        pub contents: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl MockClipboard {
        pub fn failing() -> Self {
            Self {
                contents: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Clipboard for MockClipboard {
        async fn write_text(&self, text: &str) -> Result<(), WalletError> {
            if self.fail {
                return Err(WalletError::ClipboardUnavailable("denied".to_string()));
            }
            self.contents.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}
