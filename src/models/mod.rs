//! Data models and types for the wallet controller.
//!
//! Contains domain types for:
//! - [`ConnectionState`], [`ProviderId`], [`ProviderDescriptor`] - Account connection
//! - [`Identity`], [`PublicKeyHex`], [`UserInfo`] - Off-chain email identity
//! - [`TransferState`], [`TransferRequest`], [`TransferStatus`] - Token transfers
//! - [`ViewState`] - Onboarding panel selection
//! - [`Notification`] - User-visible toasts

mod identity;
mod notification;
mod transfer;
mod view;
mod wallet;

pub use identity::{Identity, PublicKeyHex, UserInfo};
pub use notification::{Notification, NotificationLevel};
pub use transfer::{TransferReceipt, TransferRequest, TransferState, TransferStatus};
pub use view::ViewState;
pub use wallet::{ConnectionState, ProviderDescriptor, ProviderId, ProviderKind};
