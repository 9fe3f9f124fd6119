//! Connection lifecycle for the active account provider.
//!
//! At most one connection attempt is in flight: `connecting` gates new
//! attempts, and it is cleared however the attempt ends (success, failure,
//! or the attempt's future being dropped).

use std::cell::{Cell, RefCell};

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::core::error::WalletError;
use crate::core::provider::ProviderRegistry;
use crate::models::{ConnectionState, ProviderId};

/// Owns [`ConnectionState`].
#[derive(Debug, Default)]
pub struct ConnectionManager {
    state: RefCell<ConnectionState>,
    /// Bumped by `disconnect`; a connect that started in an earlier epoch
    /// does not store its result.
    epoch: Cell<u64>,
}

/// Clears `connecting` when dropped.
struct ConnectingGuard<'a> {
    state: &'a RefCell<ConnectionState>,
}

impl<'a> ConnectingGuard<'a> {
    fn engage(state: &'a RefCell<ConnectionState>) -> Self {
        state.borrow_mut().connecting = true;
        Self { state }
    }
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().connecting = false;
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Connected address, if any.
    pub fn address(&self) -> Option<Address> {
        self.state.borrow().address
    }

    pub fn active_provider(&self) -> Option<ProviderId> {
        self.state.borrow().active_provider
    }

    pub fn is_connecting(&self) -> bool {
        self.state.borrow().connecting
    }

    /// Drive provider `id` to a connected address.
    ///
    /// Rejected with `ConnectionInProgress` while another attempt is in
    /// flight. A session from a different provider is ended first so that at
    /// most one provider is active.
    pub async fn connect(
        &self,
        registry: &ProviderRegistry,
        id: ProviderId,
    ) -> Result<Address, WalletError> {
        if self.is_connecting() {
            debug!(provider = %id, "connect rejected, attempt already in flight");
            return Err(WalletError::ConnectionInProgress);
        }
        let provider = registry.resolve(id)?;
        let guard = ConnectingGuard::engage(&self.state);

        if let Some(previous) = self.active_provider()
            && previous != id
        {
            debug!(from = %previous, to = %id, "switching provider");
            let old = registry.resolve(previous)?;
            {
                let mut state = self.state.borrow_mut();
                state.address = None;
                state.active_provider = None;
            }
            old.disconnect().await;
        }

        let epoch = self.epoch.get();
        let result = provider.connect().await;
        drop(guard);

        match result {
            Ok(address) if self.epoch.get() == epoch => {
                let mut state = self.state.borrow_mut();
                state.address = Some(address);
                state.active_provider = Some(id);
                info!(provider = %id, %address, "wallet connected");
                Ok(address)
            }
            Ok(_) => {
                debug!(provider = %id, "discarding connection finished after disconnect");
                Err(WalletError::Cancelled)
            }
            Err(err) => {
                warn!(provider = %id, error = %err, "connection failed");
                Err(err)
            }
        }
    }

    /// Clear the connection and end the provider session. Idempotent.
    pub async fn disconnect(&self, registry: &ProviderRegistry) {
        let previous = std::mem::take(&mut *self.state.borrow_mut());
        self.epoch.set(self.epoch.get() + 1);

        let Some(id) = previous.active_provider else {
            return;
        };
        if let Ok(provider) = registry.resolve(id) {
            provider.disconnect().await;
        }
        info!(provider = %id, "wallet disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    use crate::core::provider::AccountProvider;
    use crate::testing::{MockSocialLogin, TEST_SECRET};

    fn registry() -> (ProviderRegistry, Rc<MockSocialLogin>) {
        let social = Rc::new(MockSocialLogin::new());
        (ProviderRegistry::standard(social.clone()), social)
    }

    #[tokio::test]
    async fn test_connect_stores_address() {
        let (registry, social) = registry();
        let manager = ConnectionManager::new();

        let address = manager.connect(&registry, ProviderId::Web3Auth).await.unwrap();
        assert_eq!(address, social.address());

        let state = manager.state();
        assert_eq!(state.address, Some(address));
        assert_eq!(state.active_provider, Some(ProviderId::Web3Auth));
        assert!(!state.connecting);
    }

    #[tokio::test]
    async fn test_failed_connect_clears_connecting() {
        let (registry, social) = registry();
        social.set_reject(true);
        let manager = ConnectionManager::new();

        let result = manager.connect(&registry, ProviderId::Web3Auth).await;
        assert!(matches!(result, Err(WalletError::ConnectionRejected(_))));
        assert_eq!(manager.state(), ConnectionState::default());
    }

    #[tokio::test]
    async fn test_unconfigured_import_is_unavailable() {
        let (registry, _) = registry();
        let manager = ConnectionManager::new();
        let result = manager.connect(&registry, ProviderId::PrivateKey).await;
        assert!(matches!(result, Err(WalletError::ProviderUnavailable(_))));
        assert!(!manager.is_connecting());
    }

    #[tokio::test]
    async fn test_overlapping_connect_is_rejected() {
        let (registry, social) = registry();
        social.hold_connections(true);
        let manager = ConnectionManager::new();

        let (first, second) = futures::join!(
            manager.connect(&registry, ProviderId::Web3Auth),
            async {
                let second = manager.connect(&registry, ProviderId::Web3Auth).await;
                social.release_connections();
                second
            }
        );
        assert_eq!(second, Err(WalletError::ConnectionInProgress));
        assert_eq!(first, Ok(social.address()));
        assert!(!manager.is_connecting());
    }

    #[tokio::test]
    async fn test_dropped_connect_clears_connecting() {
        let (registry, social) = registry();
        social.hold_connections(true);
        let manager = ConnectionManager::new();

        {
            let pending = manager.connect(&registry, ProviderId::Web3Auth);
            futures::pin_mut!(pending);
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert!(manager.is_connecting());
        }
        assert!(!manager.is_connecting());
        assert_eq!(manager.address(), None);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let (registry, social) = registry();
        let manager = ConnectionManager::new();

        manager.disconnect(&registry).await;
        assert_eq!(manager.state(), ConnectionState::default());
        assert!(!social.logged_out());

        manager.connect(&registry, ProviderId::Web3Auth).await.unwrap();
        manager.disconnect(&registry).await;
        assert_eq!(manager.state(), ConnectionState::default());
        assert!(social.logged_out());

        manager.disconnect(&registry).await;
        assert_eq!(manager.state(), ConnectionState::default());
    }

    #[tokio::test]
    async fn test_switching_provider_ends_previous_session() {
        let (registry, social) = registry();
        let manager = ConnectionManager::new();

        manager.connect(&registry, ProviderId::Web3Auth).await.unwrap();
        registry.configure(ProviderId::PrivateKey, TEST_SECRET).unwrap();
        let address = manager.connect(&registry, ProviderId::PrivateKey).await.unwrap();

        assert!(social.logged_out());
        assert_eq!(manager.active_provider(), Some(ProviderId::PrivateKey));
        assert_eq!(manager.address(), Some(address));
        let import = registry.resolve(ProviderId::PrivateKey).unwrap();
        assert!(import.session().await.is_ok());
    }
}
