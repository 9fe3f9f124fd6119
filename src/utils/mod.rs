//! Utility modules for formatting and the identity service transport.
//!
//! Provides:
//! - [`format_eth_address`], [`format_token_amount`] - display helpers
//! - [`HttpIdentityService`] - identity-linking service over HTTP

mod fetch;
mod format;

pub use fetch::HttpIdentityService;
pub use format::{format_eth_address, format_token_amount};
