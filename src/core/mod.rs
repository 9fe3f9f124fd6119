//! Core business logic for wallet onboarding.
//!
//! This module provides:
//! - [`ProviderRegistry`] and the [`AccountProvider`] strategies
//! - [`ConnectionManager`] for the active connection
//! - [`IdentityLinker`] for address ↔ email associations
//! - [`TransferController`] for token transfers
//! - [`ViewMachine`] for the onboarding view state
//! - [`WalletController`], the session context tying them together

mod connection;
mod controller;
pub mod credential;
pub mod error;
pub mod identity;
mod notify;
pub mod provider;
pub mod task;
pub mod transfer;
pub mod view;

pub use connection::ConnectionManager;
pub use controller::WalletController;
pub use credential::CredentialSource;
pub use error::{ChainError, ProviderFailure, ServiceError, WalletError};
pub use identity::{
    AccountSession, IdentityLinker, IdentityService, LinkRequest, RawKey, Resolution,
    SocialSession, derive_identifier, validate_email,
};
pub use notify::NotificationQueue;
pub use provider::{
    AccountProvider, PrivateKeyProvider, ProviderRegistry, SocialLoginClient, SocialLoginProvider,
};
pub use task::TaskScope;
pub use transfer::{BlockchainClient, TransferController, parse_recipient, parse_token_amount};
pub use view::{ViewEvent, ViewMachine, transition};
