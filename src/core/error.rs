//! Error types for the wallet controller.
//!
//! - [`WalletError`] - every failure an operation can surface to the user
//! - [`ServiceError`] - HTTP transport errors from the identity-linking service
//! - [`ChainError`] - failures reported by the blockchain client
//! - [`ProviderFailure`] - failures reported by an account provider's backend
//!
//! The `Display` text of [`WalletError`] is shown verbatim in notifications.

use thiserror::Error;

/// Wallet onboarding, identity and transfer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// Secret handed to a provider is empty or not a usable private key
    #[error("Invalid private key")]
    InvalidSecret,
    /// Secret cannot be normalized to a 32-byte key
    #[error("Malformed private key")]
    MalformedSecret,
    /// Provider refused the connection (user closed the popup, etc.)
    #[error("Connection rejected: {0}")]
    ConnectionRejected(String),
    /// Provider is not registered, not configured, or unreachable
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Another connection attempt is still in flight
    #[error("A connection attempt is already in progress")]
    ConnectionInProgress,
    /// Operation requires a connected wallet
    #[error("Wallet not connected")]
    NotConnected,
    /// Identity service did not accept the address/email association
    #[error("Failed to link email: {0}")]
    LinkingFailed(String),
    /// Email entered by the user is not plausible
    #[error("Invalid email address")]
    InvalidEmail,
    /// Transfer amount is not a positive decimal in token units
    #[error("Invalid amount")]
    InvalidAmount,
    /// Transfer recipient is not a `0x`-prefixed 20-byte address
    #[error("Invalid recipient address")]
    InvalidRecipient,
    /// Blockchain client refused or failed the transfer
    #[error("Transfer failed: {0}")]
    SubmissionRejected(String),
    /// A previous transfer is still awaiting confirmation
    #[error("A transfer is already in progress")]
    TransferInProgress,
    /// The panel or session that owned the operation went away
    #[error("Operation cancelled")]
    Cancelled,
}

impl WalletError {
    /// Local validation failures, detected without contacting any service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSecret
                | Self::MalformedSecret
                | Self::InvalidEmail
                | Self::InvalidAmount
                | Self::InvalidRecipient
        )
    }
}

/// Identity-service transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Request never produced a response (DNS, CORS, connection reset, ...)
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// Failed to read the response body
    #[error("Failed to read response")]
    ResponseReadFailed,
    /// Response body is not the expected JSON
    #[error("JSON parse error: {0}")]
    JsonParseError(String),
}

/// Blockchain client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Transaction was refused before broadcast (user rejection, gas, nonce)
    #[error("{0}")]
    Rejected(String),
    /// Transaction was mined but reverted
    #[error("transaction reverted: {0}")]
    Reverted(String),
    /// Node or watch facility unreachable
    #[error("blockchain client unavailable: {0}")]
    Unavailable(String),
}

/// Account provider backend errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// User or provider declined the request
    #[error("{0}")]
    Rejected(String),
    /// Provider backend unreachable or not initialized
    #[error("{0}")]
    Unavailable(String),
}

impl From<ProviderFailure> for WalletError {
    fn from(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::Rejected(msg) => Self::ConnectionRejected(msg),
            ProviderFailure::Unavailable(msg) => Self::ProviderUnavailable(msg),
        }
    }
}

impl From<ChainError> for WalletError {
    fn from(err: ChainError) -> Self {
        Self::SubmissionRejected(err.to_string())
    }
}
