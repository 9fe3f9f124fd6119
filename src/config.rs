//! Application configuration.
//!
//! Centralizes the constants used throughout the crate and the runtime
//! [`WalletConfig`], which can be loaded from TOML.

use serde::Deserialize;

// =============================================================================
// Token Configuration
// =============================================================================

/// Symbol of the transferable token.
pub const TOKEN_SYMBOL: &str = "FLC";

/// Decimal places of the token's smallest unit.
pub const TOKEN_DECIMALS: u8 = 18;

// =============================================================================
// Key Material
// =============================================================================

/// Width of a secp256k1 private key in bytes.
pub const SECRET_KEY_BYTES: usize = 32;

/// Width of a private key in hex characters, after left-padding.
pub const SECRET_KEY_HEX_LEN: usize = SECRET_KEY_BYTES * 2;

// =============================================================================
// Identity Service
// =============================================================================

/// Base URL of the identity-linking service.
pub const IDENTITY_SERVICE_URL: &str = "https://us-central1-flock-demo-design.cloudfunctions.net";

/// Lookup endpoint, queried with `?wallet=<address>`.
pub const GET_EMAIL_PATH: &str = "/getEmailFromDB";

/// Link endpoint, accepts `{ pubKey, email, wallet }`.
pub const POST_EMAIL_PATH: &str = "/postEmailToDB";

// =============================================================================
// Providers
// =============================================================================

/// Provider request returning the session's raw key material.
pub const ETH_PRIVATE_KEY_METHOD: &str = "eth_private_key";

/// Maximum number of undrained notifications kept for the presentation layer.
pub const MAX_NOTIFICATIONS: usize = 32;

// =============================================================================
// Display
// =============================================================================

/// Wallet button label while disconnected.
pub const CONNECT_LABEL: &str = "Connect Wallet";

/// Wallet button label while a provider is connecting.
pub const CONNECTING_LABEL: &str = "connecting...";

/// Ethereum address layout used for validation and truncation.
pub mod eth_address {
    /// Length of a `0x`-prefixed address.
    pub const FULL_LEN: usize = 42;
    /// Number of hex digits in an address.
    pub const HEX_LEN: usize = 40;
    /// Characters kept at the start of a truncated address (`0x1234`).
    pub const PREFIX_LEN: usize = 6;
    /// Index where the kept suffix of a truncated address starts.
    pub const SUFFIX_START: usize = 38;
}

/// User-visible notification texts.
pub mod messages {
    pub const EMAIL_SAVED: &str = "Email saved";
    pub const IDENTITY_SERVICE_UNAVAILABLE: &str =
        "Email service unavailable, your email could not be loaded";
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Runtime settings for the wallet controller.
///
/// Every field has a default, so a TOML document only needs the keys it
/// overrides:
///
/// ```toml
/// identity_service_url = "http://localhost:8080"
/// reprompt_on_service_error = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WalletConfig {
    /// Base URL of the identity-linking service (no trailing slash).
    pub identity_service_url: String,
    /// Token symbol used in transfer notifications.
    pub token_symbol: String,
    /// Decimal places used to scale user-entered amounts.
    pub token_decimals: u8,
    /// Whether a lookup that failed because the service was unreachable
    /// prompts for an email like a missing record does.
    pub reprompt_on_service_error: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            identity_service_url: IDENTITY_SERVICE_URL.to_string(),
            token_symbol: TOKEN_SYMBOL.to_string(),
            token_decimals: TOKEN_DECIMALS,
            reprompt_on_service_error: true,
        }
    }
}

impl WalletConfig {
    /// Parse a (possibly partial) TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(input)?;
        config.identity_service_url = config.identity_service_url.trim_end_matches('/').to_string();
        Ok(config)
    }
}
