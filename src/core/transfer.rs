//! Token transfers through the connected account.
//!
//! Status moves `Idle -> Submitted -> Confirmed`; the next submission
//! overwrites a confirmed (or otherwise stale) request. The busy flag is set
//! from validation until confirmation and is cleared however the operation
//! ends, including when its future is dropped by a cancelled scope.

use std::cell::RefCell;
use std::rc::Rc;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::{WalletConfig, eth_address};
use crate::core::error::{ChainError, WalletError};
use crate::core::notify::NotificationQueue;
use crate::models::{Notification, TransferReceipt, TransferRequest, TransferState, TransferStatus};
use crate::utils::format_token_amount;

/// Blockchain client able to call the token contract's `transfer`.
#[async_trait(?Send)]
pub trait BlockchainClient {
    /// Submit `transfer(to, amount)`; `amount` is in the token's smallest unit.
    async fn transfer(&self, to: Address, amount: U256) -> Result<TxHash, ChainError>;

    /// Resolve once `hash` is confirmed.
    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<TransferReceipt, ChainError>;
}

/// Parse a positive decimal amount in whole token units and scale it by
/// `10^decimals`.
pub fn parse_token_amount(amount: &str, decimals: u8) -> Result<U256, WalletError> {
    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !all_digits(whole)
        || !all_digits(fraction)
        || fraction.len() > decimals as usize
    {
        return Err(WalletError::InvalidAmount);
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    let scaled = U256::from_str_radix(&digits, 10).map_err(|_| WalletError::InvalidAmount)?;
    if scaled.is_zero() {
        return Err(WalletError::InvalidAmount);
    }
    Ok(scaled)
}

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_recipient(recipient: &str) -> Result<Address, WalletError> {
    let recipient = recipient.trim();
    let valid_format = recipient.len() == eth_address::FULL_LEN
        && recipient.starts_with("0x")
        && recipient[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !valid_format {
        return Err(WalletError::InvalidRecipient);
    }
    recipient
        .parse::<Address>()
        .map_err(|_| WalletError::InvalidRecipient)
}

/// Clears the busy flag when dropped unless disarmed.
struct BusyGuard<'a> {
    state: &'a RefCell<TransferState>,
    armed: bool,
}

impl<'a> BusyGuard<'a> {
    fn engage(state: &'a RefCell<TransferState>) -> Self {
        state.borrow_mut().busy = true;
        Self { state, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.borrow_mut().busy = false;
        }
    }
}

/// Drives transfers and owns [`TransferState`].
pub struct TransferController {
    chain: Rc<dyn BlockchainClient>,
    notifications: Rc<NotificationQueue>,
    token_symbol: String,
    token_decimals: u8,
    state: RefCell<TransferState>,
}

impl TransferController {
    pub fn new(
        chain: Rc<dyn BlockchainClient>,
        notifications: Rc<NotificationQueue>,
        config: &WalletConfig,
    ) -> Self {
        Self {
            chain,
            notifications,
            token_symbol: config.token_symbol.clone(),
            token_decimals: config.token_decimals,
            state: RefCell::new(TransferState::default()),
        }
    }

    pub fn state(&self) -> TransferState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> TransferStatus {
        self.state.borrow().status()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    /// Validate and submit a transfer of `amount` whole tokens to `recipient`.
    ///
    /// Nothing reaches the blockchain client unless both inputs are valid.
    /// On success status is `Submitted` and the busy flag stays set until
    /// [`await_confirmation`](Self::await_confirmation) finishes.
    pub async fn submit(&self, amount: &str, recipient: &str) -> Result<TxHash, WalletError> {
        if self.is_busy() {
            return Err(WalletError::TransferInProgress);
        }
        let scaled_amount = parse_token_amount(amount, self.token_decimals)?;
        let recipient = parse_recipient(recipient)?;

        let guard = BusyGuard::engage(&self.state);
        debug!(
            %recipient,
            amount = %format_token_amount(scaled_amount, self.token_decimals),
            "submitting transfer"
        );

        let tx_hash = self
            .chain
            .transfer(recipient, scaled_amount)
            .await
            .inspect_err(|err| warn!(%recipient, error = %err, "transfer rejected"))?;

        self.state.borrow_mut().request = Some(TransferRequest {
            amount: amount.trim().to_string(),
            scaled_amount,
            recipient,
            status: TransferStatus::Submitted,
            tx_hash: Some(tx_hash),
        });
        guard.disarm();
        info!(%tx_hash, %recipient, "transfer submitted");
        Ok(tx_hash)
    }

    /// Wait for `tx_hash` to confirm, then mark the request `Confirmed` and
    /// notify with the unscaled amount. Clears the busy flag in every case.
    pub async fn await_confirmation(&self, tx_hash: TxHash) -> Result<TransferReceipt, WalletError> {
        let _guard = BusyGuard {
            state: &self.state,
            armed: true,
        };

        let receipt = self
            .chain
            .wait_for_confirmation(tx_hash)
            .await
            .inspect_err(|err| warn!(%tx_hash, error = %err, "transfer confirmation failed"))?;

        let amount = {
            let mut state = self.state.borrow_mut();
            match state.request.as_mut() {
                Some(request) if request.tx_hash == Some(tx_hash) => {
                    request.status = TransferStatus::Confirmed;
                    Some(request.amount.clone())
                }
                _ => None,
            }
        };

        match amount {
            Some(amount) => {
                info!(%tx_hash, block = ?receipt.block_number, "transfer confirmed");
                self.notifications.push(Notification::success(format!(
                    "Transferred {} {} successfully",
                    amount, self.token_symbol
                )));
            }
            None => debug!(%tx_hash, "confirmation for a superseded transfer"),
        }
        Ok(receipt)
    }

    /// Drop all transfer state (session teardown).
    pub fn reset(&self) {
        *self.state.borrow_mut() = TransferState::default();
    }
}
