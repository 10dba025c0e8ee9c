//! Wallet provider resolution
//!
//! Picks the provider to connect with from the persisted preference and the
//! providers injected into the environment. Precedence:
//!
//! 1. preference `xverse` and Xverse's Stacks provider injected
//! 2. preference `asigna` and Asigna injected
//! 3. preference `okx` and `okxwallet.stacks` injected
//! 4. Leather, whatever the preference
//! 5. Hiro, whatever the preference
//! 6. the generic `StacksProvider`, if any
//!
//! Steps 4 and 5 deliberately override a preference whose provider is not
//! installed.

use crate::{
    connector::{ConnectorHandle, InjectedProviders},
    constants::PROVIDER_PREFERENCE_KEY,
    store::PreferenceStore,
    types::WalletKind,
};
use std::sync::Arc;

/// Everything resolution reads: the injected providers and the preference store
#[derive(Clone)]
pub struct WalletEnvironment {
    pub providers: InjectedProviders,
    pub store: Arc<dyn PreferenceStore>,
}

impl WalletEnvironment {
    pub fn new(providers: InjectedProviders, store: Arc<dyn PreferenceStore>) -> Self {
        Self { providers, store }
    }

    /// Currently persisted provider token, if any
    pub fn preference(&self) -> Option<String> {
        self.store.get(PROVIDER_PREFERENCE_KEY)
    }
}

/// A resolved provider, tagged by the slot it was found in
#[derive(Clone)]
pub enum ResolvedProvider {
    Xverse(ConnectorHandle),
    Asigna(ConnectorHandle),
    Okx(ConnectorHandle),
    Leather(ConnectorHandle),
    Hiro(ConnectorHandle),
    Generic(ConnectorHandle),
}

impl ResolvedProvider {
    pub fn kind(&self) -> WalletKind {
        match self {
            ResolvedProvider::Xverse(_) => WalletKind::Xverse,
            ResolvedProvider::Asigna(_) => WalletKind::Asigna,
            ResolvedProvider::Okx(_) => WalletKind::Okx,
            ResolvedProvider::Leather(_) => WalletKind::Leather,
            ResolvedProvider::Hiro(_) => WalletKind::Hiro,
            ResolvedProvider::Generic(_) => WalletKind::Generic,
        }
    }

    pub fn connector(&self) -> &ConnectorHandle {
        match self {
            ResolvedProvider::Xverse(c)
            | ResolvedProvider::Asigna(c)
            | ResolvedProvider::Okx(c)
            | ResolvedProvider::Leather(c)
            | ResolvedProvider::Hiro(c)
            | ResolvedProvider::Generic(c) => c,
        }
    }

    /// OKX providers connect directly instead of through the auth popup
    pub fn is_okx(&self) -> bool {
        matches!(self, ResolvedProvider::Okx(_)) || self.connector().is_okx_wallet()
    }
}

impl std::fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ResolvedProvider")
            .field(&self.kind())
            .field(&self.connector().name())
            .finish()
    }
}

/// Resolves the provider to connect with.
///
/// Returns `None` when there is no environment (non-interactive context),
/// when no preference has been stored yet, or when nothing usable is
/// injected.
pub fn resolve_provider(env: Option<&WalletEnvironment>) -> Option<ResolvedProvider> {
    let env = env?;
    let preference = env.preference()?;
    let providers = &env.providers;

    let resolved = match preference.as_str() {
        "xverse" if has_xverse(providers) => providers
            .xverse
            .as_ref()
            .and_then(|x| x.stacks_provider.clone())
            .map(ResolvedProvider::Xverse),
        "asigna" if providers.asigna.is_some() => {
            providers.asigna.clone().map(ResolvedProvider::Asigna)
        }
        "okx" if has_okx(providers) => providers
            .okx
            .as_ref()
            .and_then(|o| o.stacks.clone())
            .map(ResolvedProvider::Okx),
        _ => fallback(providers),
    };

    match &resolved {
        Some(provider) => tracing::debug!(
            preference = %preference,
            resolved = %provider.kind(),
            "Resolved wallet provider"
        ),
        None => tracing::debug!(
            preference = %preference,
            "No wallet provider injected"
        ),
    }

    resolved
}

fn has_xverse(providers: &InjectedProviders) -> bool {
    providers
        .xverse
        .as_ref()
        .is_some_and(|x| x.stacks_provider.is_some())
}

fn has_okx(providers: &InjectedProviders) -> bool {
    providers.okx.as_ref().is_some_and(|o| o.stacks.is_some())
}

fn fallback(providers: &InjectedProviders) -> Option<ResolvedProvider> {
    if let Some(leather) = &providers.leather {
        Some(ResolvedProvider::Leather(leather.clone()))
    } else if let Some(hiro) = &providers.hiro {
        Some(ResolvedProvider::Hiro(hiro.clone()))
    } else {
        providers.stacks.clone().map(ResolvedProvider::Generic)
    }
}
