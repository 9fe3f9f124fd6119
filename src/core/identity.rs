//! Identity linking between on-chain addresses and off-chain emails.
//!
//! Provides:
//! - [`RawKey`] / [`derive_identifier`] - private key normalization and the
//!   public identifier derived from it
//! - [`IdentityService`] - the identity-linking service seam
//! - [`IdentityLinker`] - lookup and link operations over that service

use std::fmt;
use std::rc::Rc;

use alloy_primitives::{Address, keccak256};
use async_trait::async_trait;
use k256::SecretKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Serialize;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::config::{SECRET_KEY_BYTES, SECRET_KEY_HEX_LEN};
use crate::core::credential::CredentialSource;
use crate::core::error::{ServiceError, WalletError};
use crate::models::{Identity, PublicKeyHex, UserInfo};

// ============================================================================
// Key Material
// ============================================================================

/// A secp256k1 private key held in memory for the connected session only.
///
/// Zeroized on drop. `Debug` never prints the key.
#[derive(Clone)]
pub struct RawKey(SecretKey);

impl RawKey {
    /// Normalize and validate a hex private key.
    ///
    /// Accepts an optional `0x` prefix and shorter inputs, which are
    /// left-padded with zeros to 32 bytes. Fails with `MalformedSecret` for
    /// empty, non-hex or overlong input, and for scalars outside the curve
    /// order.
    pub fn parse(secret: &str) -> Result<Self, WalletError> {
        let trimmed = secret.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty()
            || digits.len() > SECRET_KEY_HEX_LEN
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(WalletError::MalformedSecret);
        }

        let padded = Zeroizing::new(format!("{:0>width$}", digits, width = SECRET_KEY_HEX_LEN));
        let mut bytes = Zeroizing::new([0u8; SECRET_KEY_BYTES]);
        hex::decode_to_slice(padded.as_bytes(), bytes.as_mut_slice())
            .map_err(|_| WalletError::MalformedSecret)?;

        SecretKey::from_slice(bytes.as_slice())
            .map(Self)
            .map_err(|_| WalletError::MalformedSecret)
    }

    /// Lowercase, left-padded 64-char hex encoding.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.to_bytes()))
    }

    /// Compressed public key, hex-encoded.
    pub fn public_identifier(&self) -> PublicKeyHex {
        PublicKeyHex::from_bytes(self.0.public_key().to_encoded_point(true).as_bytes())
    }

    /// Ethereum address controlled by this key.
    pub fn address(&self) -> Address {
        let point = self.0.public_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        Address::from_slice(&digest[12..])
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawKey(<redacted>)")
    }
}

/// Derive the public identifier for a hex private key.
pub fn derive_identifier(secret: &str) -> Result<PublicKeyHex, WalletError> {
    RawKey::parse(secret).map(|key| key.public_identifier())
}

/// Check that an email is plausible before contacting the service.
pub fn validate_email(email: &str) -> Result<String, WalletError> {
    let email = email.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(WalletError::InvalidEmail);
    };

    let plausible = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);

    if plausible {
        Ok(email.to_string())
    } else {
        Err(WalletError::InvalidEmail)
    }
}

// ============================================================================
// Sessions
// ============================================================================

/// Key material and profile of a social-login session.
#[derive(Clone, Debug)]
pub struct SocialSession {
    pub user_info: UserInfo,
    /// Result of the provider's `eth_private_key` request
    pub key: RawKey,
}

impl SocialSession {
    pub fn credential_source(&self) -> Result<CredentialSource, WalletError> {
        let id_token = self.user_info.id_token.clone().ok_or_else(|| {
            WalletError::LinkingFailed("provider session has no identity token".into())
        })?;
        Ok(CredentialSource::ProviderIssued {
            id_token,
            key: self.key.clone(),
        })
    }
}

/// Credential material of the connected account, by onboarding path.
#[derive(Clone, Debug)]
pub enum AccountSession {
    Imported(RawKey),
    Social(SocialSession),
}

impl AccountSession {
    pub fn public_identifier(&self) -> PublicKeyHex {
        match self {
            Self::Imported(key) => key.public_identifier(),
            Self::Social(session) => session.key.public_identifier(),
        }
    }

    pub fn credential_source(&self) -> Result<CredentialSource, WalletError> {
        match self {
            Self::Imported(key) => Ok(CredentialSource::Symmetric { key: key.clone() }),
            Self::Social(session) => session.credential_source(),
        }
    }
}

// ============================================================================
// Identity Service
// ============================================================================

/// JSON body of a link request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkRequest {
    #[serde(rename = "pubKey")]
    pub pub_key: String,
    pub email: String,
    pub wallet: String,
}

/// Identity-linking service.
#[async_trait(?Send)]
pub trait IdentityService {
    /// `Ok(None)` when the service has no record for `wallet`.
    async fn fetch_email(&self, wallet: &Address) -> Result<Option<String>, ServiceError>;

    /// Store the association; `bearer` is sent as `Authorization: Bearer`.
    async fn store_email(&self, bearer: &str, request: &LinkRequest) -> Result<(), ServiceError>;
}

/// Outcome of an address lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Found(Identity),
    /// The service answered and holds no email for the address
    NotFound,
    /// The service could not be reached or answered with an error
    Unavailable(ServiceError),
}

impl Resolution {
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Found(identity) => Some(identity),
            Self::NotFound | Self::Unavailable(_) => None,
        }
    }
}

/// Reads and writes address ↔ email associations.
#[derive(Clone)]
pub struct IdentityLinker {
    service: Rc<dyn IdentityService>,
}

impl IdentityLinker {
    pub fn new(service: Rc<dyn IdentityService>) -> Self {
        Self { service }
    }

    /// Look up the email for `address`, keeping the reason it was unresolved.
    pub async fn resolve(&self, address: Address) -> Resolution {
        match self.service.fetch_email(&address).await {
            Ok(Some(email)) => {
                debug!(%address, "identity resolved");
                Resolution::Found(Identity {
                    address,
                    email: Some(email),
                    public_identifier: None,
                })
            }
            Ok(None) => {
                debug!(%address, "no identity record");
                Resolution::NotFound
            }
            Err(err) => {
                warn!(%address, error = %err, "identity service lookup failed");
                Resolution::Unavailable(err)
            }
        }
    }

    /// Look up the email for `address`; any failure is "unresolved".
    pub async fn resolve_identity(&self, address: Address) -> Option<Identity> {
        self.resolve(address).await.into_identity()
    }

    /// Store `email` for `address`, authorized by `source`.
    ///
    /// Re-linking the same pair is accepted by the service and is not an
    /// error here.
    pub async fn link_identity(
        &self,
        address: Address,
        email: &str,
        source: &CredentialSource,
    ) -> Result<Identity, WalletError> {
        let email = validate_email(email)?;
        let public_identifier = source.public_identifier();
        let bearer = source.bearer_token()?;
        let request = LinkRequest {
            pub_key: public_identifier.to_string(),
            email: email.clone(),
            wallet: address.to_string(),
        };

        self.service
            .store_email(&bearer, &request)
            .await
            .map_err(|err| {
                warn!(%address, error = %err, "identity link rejected");
                WalletError::LinkingFailed(err.to_string())
            })?;

        info!(%address, identifier = %public_identifier, "identity linked");
        Ok(Identity {
            address,
            email: Some(email),
            public_identifier: Some(public_identifier),
        })
    }

    /// Link the email reported by a social-login session, using the
    /// provider's identity token as the credential.
    pub async fn link_from_social_session(
        &self,
        address: Address,
        session: &SocialSession,
    ) -> Result<Identity, WalletError> {
        if session.user_info.email.trim().is_empty() {
            return Err(WalletError::LinkingFailed(
                "provider session has no email".into(),
            ));
        }
        let source = session.credential_source()?;
        self.link_identity(address, &session.user_info.email, &source)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryIdentityService;

    /// Private key 1: its public key is the curve generator.
    const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";
    const GENERATOR: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const KEY_ONE_ADDRESS: &str = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf";

    const SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn test_derive_known_vector() {
        assert_eq!(derive_identifier(KEY_ONE).unwrap().as_str(), GENERATOR);
        let address: Address = KEY_ONE_ADDRESS.parse().unwrap();
        assert_eq!(RawKey::parse(KEY_ONE).unwrap().address(), address);
    }

    #[test]
    fn test_short_secret_is_left_padded() {
        assert_eq!(derive_identifier("1").unwrap().as_str(), GENERATOR);
        assert_eq!(derive_identifier("0x01").unwrap().as_str(), GENERATOR);
    }

    #[test]
    fn test_derive_is_stable() {
        let a = derive_identifier(SECRET).unwrap();
        let b = derive_identifier(SECRET).unwrap();
        let c = derive_identifier(&SECRET.to_uppercase()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.as_str().len(), 66);
    }

    #[test]
    fn test_malformed_secrets() {
        let overlong = format!("{SECRET}00");
        let zero = "0".repeat(64);
        for secret in ["", "0x", "zz", "12 34", overlong.as_str(), zero.as_str()] {
            assert_eq!(derive_identifier(secret), Err(WalletError::MalformedSecret), "{secret}");
        }
        // curve order n is not a valid scalar
        let order = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";
        assert_eq!(derive_identifier(order), Err(WalletError::MalformedSecret));
    }

    #[test]
    fn test_raw_key_hex_is_normalized() {
        let key = RawKey::parse("0xABC").unwrap();
        assert_eq!(key.to_hex().as_str(), format!("{:0>64}", "abc"));
        assert_eq!(format!("{:?}", key), "RawKey(<redacted>)");
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" a@b.com ").unwrap(), "a@b.com");
        for email in ["", "ab.com", "@b.com", "a@", "a@b@c", "a b@c.com", "a@.com"] {
            assert_eq!(validate_email(email), Err(WalletError::InvalidEmail), "{email}");
        }
    }

    #[tokio::test]
    async fn test_link_then_resolve_round_trip() {
        let service = Rc::new(MemoryIdentityService::new());
        let linker = IdentityLinker::new(service.clone());
        let key = RawKey::parse(SECRET).unwrap();
        let address = key.address();

        assert_eq!(linker.resolve(address).await, Resolution::NotFound);

        let source = CredentialSource::Symmetric { key: key.clone() };
        let linked = linker.link_identity(address, "a@b.com", &source).await.unwrap();
        assert_eq!(linked.public_identifier, Some(key.public_identifier()));

        let resolved = linker.resolve_identity(address).await.unwrap();
        assert_eq!(resolved.email.as_deref(), Some("a@b.com"));

        // re-linking the same pair is not an error
        linker.link_identity(address, "a@b.com", &source).await.unwrap();
        assert_eq!(service.link_count(), 2);
    }

    #[tokio::test]
    async fn test_link_request_carries_identifier_not_secret() {
        let service = Rc::new(MemoryIdentityService::new());
        let linker = IdentityLinker::new(service.clone());
        let key = RawKey::parse(SECRET).unwrap();

        let source = CredentialSource::Symmetric { key: key.clone() };
        linker.link_identity(key.address(), "a@b.com", &source).await.unwrap();

        let (bearer, request) = service.last_link().unwrap();
        assert_eq!(request.pub_key, key.public_identifier().as_str());
        assert_eq!(request.wallet, key.address().to_string());
        assert!(!bearer.contains(SECRET));
        assert!(!request.pub_key.contains(SECRET));
    }

    #[tokio::test]
    async fn test_unavailable_service_is_unresolved() {
        let service = Rc::new(MemoryIdentityService::new());
        service.set_offline(true);
        let linker = IdentityLinker::new(service.clone());
        let address = RawKey::parse(SECRET).unwrap().address();

        assert!(matches!(linker.resolve(address).await, Resolution::Unavailable(_)));
        assert_eq!(linker.resolve_identity(address).await, None);
    }

    #[tokio::test]
    async fn test_rejected_link_is_linking_failed() {
        let service = Rc::new(MemoryIdentityService::new());
        service.set_reject_links(true);
        let linker = IdentityLinker::new(service.clone());
        let key = RawKey::parse(SECRET).unwrap();

        let result = linker
            .link_identity(key.address(), "a@b.com", &CredentialSource::Symmetric { key: key.clone() })
            .await;
        assert!(matches!(result, Err(WalletError::LinkingFailed(_))));
    }

    #[tokio::test]
    async fn test_link_from_social_session_uses_provider_token() {
        let service = Rc::new(MemoryIdentityService::new());
        let linker = IdentityLinker::new(service.clone());
        let session = SocialSession {
            user_info: UserInfo {
                email: "social@b.com".into(),
                id_token: Some("provider.jwt.token".into()),
                ..Default::default()
            },
            key: RawKey::parse(SECRET).unwrap(),
        };
        let address: Address = KEY_ONE_ADDRESS.parse().unwrap();

        let identity = linker.link_from_social_session(address, &session).await.unwrap();
        assert_eq!(identity.email.as_deref(), Some("social@b.com"));

        let (bearer, request) = service.last_link().unwrap();
        assert_eq!(bearer, "provider.jwt.token");
        assert_eq!(request.pub_key, session.key.public_identifier().as_str());
        assert_eq!(request.email, "social@b.com");
    }

    #[tokio::test]
    async fn test_social_session_without_token_fails() {
        let service = Rc::new(MemoryIdentityService::new());
        let linker = IdentityLinker::new(service.clone());
        let session = SocialSession {
            user_info: UserInfo {
                email: "social@b.com".into(),
                ..Default::default()
            },
            key: RawKey::parse(SECRET).unwrap(),
        };

        let result = linker.link_from_social_session(Address::ZERO, &session).await;
        assert!(matches!(result, Err(WalletError::LinkingFailed(_))));
        assert_eq!(service.link_count(), 0);
    }
}
