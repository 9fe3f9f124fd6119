//! Session context tying providers, connection, identity, transfers and the
//! view machine together.
//!
//! [`WalletController`] is what the presentation layer talks to: it reads
//! state through accessors and mutates it only through intents. Async steps
//! run inside the [`TaskScope`] of the panel that started them, so leaving a
//! panel aborts its pending work. The session scope covers work that outlives
//! a panel (identity resolution after connecting, transfers) and is aborted
//! on disconnect.

use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::Address;
use tracing::{debug, info, warn};

use crate::config::{WalletConfig, messages};
use crate::core::connection::ConnectionManager;
use crate::core::error::WalletError;
use crate::core::identity::{AccountSession, IdentityLinker, IdentityService, Resolution, validate_email};
use crate::core::notify::NotificationQueue;
use crate::core::provider::ProviderRegistry;
use crate::core::task::TaskScope;
use crate::core::transfer::{BlockchainClient, TransferController};
use crate::core::view::{ViewEvent, ViewMachine};
use crate::models::{
    ConnectionState, Identity, Notification, ProviderDescriptor, ProviderId, TransferReceipt,
    TransferState, ViewState,
};

/// Scopes owned by the panels that start async work, plus the session.
struct PanelTasks {
    wallet_import: TaskScope,
    email_import: TaskScope,
    settings: TaskScope,
    session: TaskScope,
}

impl PanelTasks {
    fn new() -> Self {
        Self {
            wallet_import: TaskScope::new("wallet-import"),
            email_import: TaskScope::new("email-import"),
            settings: TaskScope::new("settings"),
            session: TaskScope::new("session"),
        }
    }

    fn for_panel(&self, view: ViewState) -> Option<&TaskScope> {
        match view {
            ViewState::WalletImport => Some(&self.wallet_import),
            ViewState::EmailImport => Some(&self.email_import),
            ViewState::Settings => Some(&self.settings),
            ViewState::Closed | ViewState::DropdownOpen => None,
        }
    }

    fn cancel_all(&self) {
        self.wallet_import.cancel();
        self.email_import.cancel();
        self.settings.cancel();
        self.session.cancel();
    }
}

/// The wallet session context.
pub struct WalletController {
    config: WalletConfig,
    registry: ProviderRegistry,
    connection: ConnectionManager,
    linker: IdentityLinker,
    transfers: TransferController,
    view: ViewMachine,
    notifications: Rc<NotificationQueue>,
    identity: RefCell<Option<Identity>>,
    tasks: PanelTasks,
}

impl WalletController {
    pub fn new(
        config: WalletConfig,
        registry: ProviderRegistry,
        identity_service: Rc<dyn IdentityService>,
        chain: Rc<dyn BlockchainClient>,
    ) -> Self {
        let notifications = Rc::new(NotificationQueue::new());
        let transfers = TransferController::new(chain, notifications.clone(), &config);
        Self {
            config,
            registry,
            connection: ConnectionManager::new(),
            linker: IdentityLinker::new(identity_service),
            transfers,
            view: ViewMachine::new(),
            notifications,
            identity: RefCell::new(None),
            tasks: PanelTasks::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn view_state(&self) -> ViewState {
        self.view.state()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.identity.borrow().clone()
    }

    pub fn transfer(&self) -> TransferState {
        self.transfers.state()
    }

    pub fn providers(&self) -> Vec<ProviderDescriptor> {
        self.registry.descriptors()
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn button_label(&self) -> String {
        self.connection.state().display_name()
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    // ------------------------------------------------------------------------
    // Panel intents
    // ------------------------------------------------------------------------

    /// The single wallet button: settings when connected, the provider
    /// dropdown otherwise. Ignored while connecting.
    pub fn click_wallet_button(&self) {
        if self.connection.is_connecting() {
            debug!("wallet button ignored while connecting");
        } else if self.is_connected() {
            self.apply(ViewEvent::ClickAddress);
        } else {
            self.apply(ViewEvent::IntentToConnect);
        }
    }

    pub fn open_dropdown(&self) {
        self.apply(ViewEvent::IntentToConnect);
    }

    pub fn choose_import(&self) {
        self.apply(ViewEvent::ChooseImport);
    }

    pub fn cancel_import(&self) {
        self.apply(ViewEvent::Cancel);
    }

    pub fn click_address(&self) {
        self.apply(ViewEvent::ClickAddress);
    }

    /// Close whichever panel is open, aborting its pending work.
    pub fn dismiss(&self) {
        self.apply(ViewEvent::Dismiss);
    }

    // ------------------------------------------------------------------------
    // Async intents
    // ------------------------------------------------------------------------

    /// Connect through social login, then resolve and link the identity.
    pub async fn choose_social(&self) -> Result<Address, WalletError> {
        self.apply(ViewEvent::ChooseSocial);
        let address = self
            .tasks
            .session
            .run(self.connection.connect(&self.registry, ProviderId::Web3Auth))
            .await
            .and_then(|result| result)
            .inspect_err(|err| self.notify_failure(err))?;

        self.after_connect(address, ProviderId::Web3Auth).await?;
        Ok(address)
    }

    /// Connect with a pasted private key (with or without `0x`).
    ///
    /// An invalid secret is reported and the import panel stays open.
    pub async fn import_wallet(&self, secret: &str) -> Result<Address, WalletError> {
        self.registry
            .configure(ProviderId::PrivateKey, secret)
            .inspect_err(|err| self.notify_failure(err))?;

        let address = self
            .tasks
            .wallet_import
            .run(self.connection.connect(&self.registry, ProviderId::PrivateKey))
            .await
            .and_then(|result| result)
            .inspect_err(|err| self.notify_failure(err))?;

        self.apply(ViewEvent::ImportSucceeded);
        self.after_connect(address, ProviderId::PrivateKey).await?;
        Ok(address)
    }

    /// Link `email` to the connected address from the email panel.
    pub async fn submit_email(&self, email: &str) -> Result<Identity, WalletError> {
        let result = self
            .tasks
            .email_import
            .run(self.link_email(email))
            .await
            .and_then(|result| result);

        match result {
            Ok(identity) => {
                *self.identity.borrow_mut() = Some(identity.clone());
                self.notifications.push(Notification::success(messages::EMAIL_SAVED));
                self.apply(ViewEvent::EmailLinked);
                Ok(identity)
            }
            Err(err) => {
                self.notify_failure(&err);
                Err(err)
            }
        }
    }

    /// Submit a transfer and wait for its confirmation.
    ///
    /// Bound to the session, so closing the settings panel does not drop the
    /// confirmation.
    pub async fn submit_transfer(
        &self,
        amount: &str,
        recipient: &str,
    ) -> Result<TransferReceipt, WalletError> {
        if !self.is_connected() {
            let err = WalletError::NotConnected;
            self.notify_failure(&err);
            return Err(err);
        }

        let session = &self.tasks.session;
        let result: Result<TransferReceipt, WalletError> = async {
            let tx_hash = session.run(self.transfers.submit(amount, recipient)).await??;
            session.run(self.transfers.await_confirmation(tx_hash)).await?
        }
        .await;

        result.inspect_err(|err| self.notify_failure(err))
    }

    /// End the session: abort pending work, disconnect the provider and
    /// clear identity, transfer and view state.
    pub async fn disconnect(&self) {
        self.tasks.cancel_all();
        self.apply(ViewEvent::Disconnect);
        self.view.reset();
        self.connection.disconnect(&self.registry).await;
        self.identity.borrow_mut().take();
        self.transfers.reset();
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn is_connected(&self) -> bool {
        self.connection.address().is_some()
    }

    /// Apply a view event; leaving a panel aborts the work it owns.
    fn apply(&self, event: ViewEvent) {
        if let Some((from, _)) = self.view.apply(event, self.is_connected())
            && let Some(scope) = self.tasks.for_panel(from)
        {
            scope.cancel();
        }
    }

    fn notify_failure(&self, err: &WalletError) {
        match err {
            WalletError::Cancelled => {}
            err if err.is_validation() => {
                self.notifications.push(Notification::warning(err.to_string()))
            }
            err => self.notifications.push(Notification::error(err.to_string())),
        }
    }

    /// Start a fresh session for a new connection. Work still pending for
    /// the previous connection is aborted so it cannot touch the new one.
    fn begin_session(&self) {
        self.tasks.session.cancel();
        self.identity.borrow_mut().take();
        self.transfers.reset();
    }

    async fn after_connect(&self, address: Address, provider: ProviderId) -> Result<(), WalletError> {
        self.begin_session();
        self.tasks
            .session
            .run(self.on_connected(address, provider))
            .await
            .inspect_err(|err| self.notify_failure(err))
    }

    /// Session initialization: read the session's key material, resolve the
    /// identity, link the social-login email, and prompt for an email when
    /// nothing could be resolved.
    async fn on_connected(&self, address: Address, provider: ProviderId) {
        let session = match self.registry.resolve(provider) {
            Ok(provider) => provider.session().await.inspect_err(|err| {
                warn!(%address, error = %err, "session key material unavailable");
            }),
            Err(err) => Err(err),
        };
        let public_identifier = session.as_ref().ok().map(AccountSession::public_identifier);
        *self.identity.borrow_mut() = Some(Identity::unlinked(address, public_identifier.clone()));

        let resolution = self.linker.resolve(address).await;

        let social_identity = match &session {
            Ok(AccountSession::Social(social)) => {
                match self.linker.link_from_social_session(address, social).await {
                    Ok(identity) => Some(identity),
                    Err(err) => {
                        self.notify_failure(&err);
                        None
                    }
                }
            }
            _ => None,
        };

        let prompt = match resolution {
            Resolution::Found(mut identity) => {
                identity.public_identifier = public_identifier;
                info!(%address, "identity restored");
                *self.identity.borrow_mut() = Some(identity);
                false
            }
            Resolution::NotFound | Resolution::Unavailable(_) if social_identity.is_some() => {
                *self.identity.borrow_mut() = social_identity;
                false
            }
            Resolution::NotFound => true,
            Resolution::Unavailable(_) if self.config.reprompt_on_service_error => true,
            Resolution::Unavailable(err) => {
                debug!(%address, error = %err, "not prompting for email after service failure");
                self.notifications
                    .push(Notification::warning(messages::IDENTITY_SERVICE_UNAVAILABLE));
                false
            }
        };

        if prompt {
            self.apply(ViewEvent::IdentityUnresolved);
        }
    }

    async fn link_email(&self, email: &str) -> Result<Identity, WalletError> {
        let email = validate_email(email)?;
        let (address, provider) = {
            let state = self.connection.state();
            match (state.address, state.active_provider) {
                (Some(address), Some(provider)) => (address, provider),
                _ => return Err(WalletError::NotConnected),
            }
        };
        let session = self.registry.resolve(provider)?.session().await?;
        let source = session.credential_source()?;
        self.linker.link_identity(address, &email, &source).await
    }
}
