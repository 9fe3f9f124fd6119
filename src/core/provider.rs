//! Account providers and the registry that selects them.
//!
//! Providers are keyed by [`ProviderId`]. The registry never relies on the
//! position of a provider in a list.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::ETH_PRIVATE_KEY_METHOD;
use crate::core::error::{ProviderFailure, WalletError};
use crate::core::identity::{AccountSession, RawKey, SocialSession};
use crate::models::{ProviderDescriptor, ProviderId, ProviderKind, UserInfo};

/// A strategy for acquiring a connected account.
#[async_trait(?Send)]
pub trait AccountProvider {
    fn descriptor(&self) -> ProviderDescriptor;

    /// Hand a secret to the provider ahead of `connect`.
    ///
    /// Providers that take no secret ignore the call.
    fn configure(&self, _secret: &str) -> Result<(), WalletError> {
        Ok(())
    }

    async fn connect(&self) -> Result<Address, WalletError>;

    /// End the provider session and drop any key material it holds.
    async fn disconnect(&self) {}

    /// Key material and credentials of the current session.
    async fn session(&self) -> Result<AccountSession, WalletError>;
}

// ============================================================================
// Private Key Import
// ============================================================================

/// Connects with a private key pasted by the user.
#[derive(Debug, Default)]
pub struct PrivateKeyProvider {
    key: RefCell<Option<RawKey>>,
}

impl PrivateKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.key.borrow().is_some()
    }
}

#[async_trait(?Send)]
impl AccountProvider for PrivateKeyProvider {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ProviderId::PrivateKey,
            kind: ProviderKind::PrivateKeyImport,
            label: "Import Wallet",
            requires_secret: true,
        }
    }

    /// A rejected secret leaves any previously configured key in place.
    fn configure(&self, secret: &str) -> Result<(), WalletError> {
        let key = RawKey::parse(secret).map_err(|_| WalletError::InvalidSecret)?;
        *self.key.borrow_mut() = Some(key);
        Ok(())
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        self.key
            .borrow()
            .as_ref()
            .map(RawKey::address)
            .ok_or_else(|| WalletError::ProviderUnavailable("no private key configured".into()))
    }

    async fn disconnect(&self) {
        self.key.borrow_mut().take();
    }

    async fn session(&self) -> Result<AccountSession, WalletError> {
        self.key
            .borrow()
            .clone()
            .map(AccountSession::Imported)
            .ok_or(WalletError::NotConnected)
    }
}

// ============================================================================
// Social Login
// ============================================================================

/// Social-login backend (Web3Auth modal and its EIP-1193 provider).
#[async_trait(?Send)]
pub trait SocialLoginClient {
    /// Run the login flow and return the session's account.
    async fn connect(&self) -> Result<Address, ProviderFailure>;

    /// `getUserInfo`
    async fn user_info(&self) -> Result<UserInfo, ProviderFailure>;

    /// Provider JSON-RPC request with no params, result as a string.
    async fn request(&self, method: &str) -> Result<String, ProviderFailure>;

    async fn logout(&self) -> Result<(), ProviderFailure>;
}

/// Connects through a [`SocialLoginClient`].
pub struct SocialLoginProvider {
    client: Rc<dyn SocialLoginClient>,
}

impl SocialLoginProvider {
    pub fn new(client: Rc<dyn SocialLoginClient>) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl AccountProvider for SocialLoginProvider {
    fn descriptor(&self) -> ProviderDescriptor {
        ProviderDescriptor {
            id: ProviderId::Web3Auth,
            kind: ProviderKind::SocialLogin,
            label: "Social Login",
            requires_secret: false,
        }
    }

    async fn connect(&self) -> Result<Address, WalletError> {
        Ok(self.client.connect().await?)
    }

    async fn disconnect(&self) {
        if let Err(err) = self.client.logout().await {
            warn!(error = %err, "social login logout failed");
        }
    }

    async fn session(&self) -> Result<AccountSession, WalletError> {
        let user_info = self.client.user_info().await?;
        let key_hex = zeroize::Zeroizing::new(self.client.request(ETH_PRIVATE_KEY_METHOD).await?);
        let key = RawKey::parse(&key_hex)?;
        Ok(AccountSession::Social(SocialSession { user_info, key }))
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Account providers keyed by [`ProviderId`].
#[derive(Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Rc<dyn AccountProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Social login through `social` plus private-key import.
    pub fn standard(social: Rc<dyn SocialLoginClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Rc::new(SocialLoginProvider::new(social)));
        registry.register(Rc::new(PrivateKeyProvider::new()));
        registry
    }

    /// Register `provider` under its descriptor's id, replacing any previous one.
    pub fn register(&mut self, provider: Rc<dyn AccountProvider>) {
        let id = provider.descriptor().id;
        if self.providers.insert(id, provider).is_some() {
            debug!(provider = %id, "provider replaced");
        }
    }

    pub fn resolve(&self, id: ProviderId) -> Result<Rc<dyn AccountProvider>, WalletError> {
        self.providers
            .get(&id)
            .cloned()
            .ok_or_else(|| WalletError::ProviderUnavailable(format!("{} is not registered", id)))
    }

    pub fn descriptor(&self, id: ProviderId) -> Option<ProviderDescriptor> {
        self.providers.get(&id).map(|provider| provider.descriptor())
    }

    /// Registered providers in display order.
    pub fn descriptors(&self) -> Vec<ProviderDescriptor> {
        self.providers.values().map(|provider| provider.descriptor()).collect()
    }

    /// Hand `secret` to provider `id`. Fails before any connection attempt
    /// when the secret is empty or malformed.
    pub fn configure(&self, id: ProviderId, secret: &str) -> Result<(), WalletError> {
        let provider = self.resolve(id)?;
        if provider.descriptor().requires_secret && secret.trim().is_empty() {
            return Err(WalletError::InvalidSecret);
        }
        provider.configure(secret).inspect_err(|_| {
            warn!(provider = %id, "rejected provider secret");
        })?;
        info!(provider = %id, "provider configured");
        Ok(())
    }
}
