use alloy_primitives::Address;

use crate::config::{CONNECTING_LABEL, CONNECT_LABEL};
use crate::utils::format_eth_address;

/// Registry key of an account provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderId {
    /// Web3Auth social login
    Web3Auth,
    /// Raw private-key import
    PrivateKey,
}

impl ProviderId {
    /// All providers in display order.
    pub const ALL: [ProviderId; 2] = [ProviderId::Web3Auth, ProviderId::PrivateKey];

    /// Stable connector identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Web3Auth => "web3auth",
            Self::PrivateKey => "privateKey",
        }
    }

    pub fn kind(self) -> ProviderKind {
        match self {
            Self::Web3Auth => ProviderKind::SocialLogin,
            Self::PrivateKey => ProviderKind::PrivateKeyImport,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a provider acquires an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    SocialLogin,
    PrivateKeyImport,
}

/// Static description of a registered provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub kind: ProviderKind,
    /// Button label shown in the connect dropdown
    pub label: &'static str,
    /// Whether `configure` must be called with a secret before connecting
    pub requires_secret: bool,
}

/// Active connection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Set only once a provider has completed connection
    pub address: Option<Address>,
    /// Provider that produced `address`
    pub active_provider: Option<ProviderId>,
    /// A connection attempt is in flight
    pub connecting: bool,
}

impl ConnectionState {
    /// Check if wallet is connected
    pub fn is_connected(&self) -> bool {
        self.address.is_some()
    }

    /// Wallet button label (`Connect Wallet`, `connecting...` or `0x1234...5678`)
    pub fn display_name(&self) -> String {
        match self.address {
            Some(address) => format_eth_address(&address.to_string()),
            None if self.connecting => CONNECTING_LABEL.to_string(),
            None => CONNECT_LABEL.to_string(),
        }
    }
}
