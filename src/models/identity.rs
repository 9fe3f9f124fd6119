//! Off-chain identity types.

use std::fmt;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Hex-encoded SEC1 compressed secp256k1 public key (66 lowercase hex chars).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKeyHex(String);

impl PublicKeyHex {
    pub(crate) fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address ↔ email association for the connected session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub address: Address,
    pub email: Option<String>,
    /// Known once the session's key material has been read; an address-only
    /// lookup leaves it empty.
    pub public_identifier: Option<PublicKeyHex>,
}

impl Identity {
    /// Identity with no linked email.
    pub fn unlinked(address: Address, public_identifier: Option<PublicKeyHex>) -> Self {
        Self {
            address,
            email: None,
            public_identifier,
        }
    }

    pub fn has_email(&self) -> bool {
        self.email.is_some()
    }
}

/// Profile returned by the social-login provider's `getUserInfo`.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub aggregate_verifier: Option<String>,
    pub verifier: Option<String>,
    pub verifier_id: Option<String>,
    pub type_of_login: Option<String>,
    /// Provider-issued JWT used as the bearer credential
    pub id_token: Option<String>,
    pub o_auth_id_token: Option<String>,
    pub o_auth_access_token: Option<String>,
}

// Tokens stay out of logs.
impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInfo")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("verifier", &self.verifier)
            .field("type_of_login", &self.type_of_login)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
