//! Wallet onboarding for the Flock app.
//!
//! Connects an account through social login or a pasted private key, links
//! the address to an email through the identity-linking service, and
//! transfers FLC tokens from the connected account. Everything runs on a
//! single thread; the presentation layer reads state from
//! [`WalletController`] and drives it through its intents.

pub mod config;
pub mod core;
pub mod models;
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use crate::config::WalletConfig;
pub use crate::core::{WalletController, WalletError};
