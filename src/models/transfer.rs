use alloy_primitives::{Address, TxHash, U256};

/// Progress of a token transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferStatus {
    #[default]
    Idle,
    Submitted,
    Confirmed,
}

/// A transfer handed to the blockchain client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    /// Amount as entered by the user, in whole token units
    pub amount: String,
    /// `amount` scaled to the token's smallest unit
    pub scaled_amount: U256,
    pub recipient: Address,
    pub status: TransferStatus,
    pub tx_hash: Option<TxHash>,
}

/// Transfer progress exposed to the presentation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferState {
    /// Most recent transfer, kept until the next submission overwrites it
    pub request: Option<TransferRequest>,
    /// A transfer is awaiting submission or confirmation
    pub busy: bool,
}

impl TransferState {
    pub fn status(&self) -> TransferStatus {
        self.request
            .as_ref()
            .map_or(TransferStatus::Idle, |request| request.status)
    }

    /// Transfer button label.
    pub fn button_label(&self) -> &'static str {
        if self.busy { "Transferring..." } else { "Transfer" }
    }
}

/// Confirmation reported by the blockchain client's watch facility.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}
