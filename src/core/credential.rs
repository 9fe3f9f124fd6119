//! Bearer credentials for the identity-linking service.
//!
//! Both onboarding paths go through [`CredentialSource`]:
//!
//! - [`CredentialSource::Symmetric`] (private-key import) signs a compact JWS
//!   with HS256. The HMAC key is the base64url decoding of the normalized
//!   private-key hex, i.e. a JWK `oct` key whose `k` is that hex string.
//! - [`CredentialSource::ProviderIssued`] (social login) presents the
//!   provider's identity token as is.
//!
//! In both cases the payload is `{"publicKey": "<compressed pubkey hex>"}`
//! and the raw key never leaves the process.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::core::error::WalletError;
use crate::core::identity::RawKey;
use crate::models::PublicKeyHex;

type HmacSha256 = Hmac<Sha256>;

const JWS_HEADER: &str = r#"{"alg":"HS256"}"#;

#[derive(Serialize)]
struct CredentialPayload<'a> {
    #[serde(rename = "publicKey")]
    public_key: &'a str,
}

/// Key material and token source for one linking request.
#[derive(Clone)]
pub enum CredentialSource {
    /// Imported private key; the credential is signed locally.
    Symmetric { key: RawKey },
    /// Social-login session; the provider token is the credential and the
    /// key material only derives the public identifier.
    ProviderIssued { id_token: String, key: RawKey },
}

impl CredentialSource {
    /// Public identifier sent alongside the credential.
    pub fn public_identifier(&self) -> PublicKeyHex {
        match self {
            Self::Symmetric { key } | Self::ProviderIssued { key, .. } => key.public_identifier(),
        }
    }

    /// Build the `Authorization: Bearer` value. Built fresh per request.
    pub fn bearer_token(&self) -> Result<String, WalletError> {
        match self {
            Self::Symmetric { key } => sign_identifier(key),
            Self::ProviderIssued { id_token, .. } if id_token.is_empty() => Err(
                WalletError::LinkingFailed("provider session has no identity token".into()),
            ),
            Self::ProviderIssued { id_token, .. } => Ok(id_token.clone()),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symmetric { .. } => f.write_str("CredentialSource::Symmetric(<redacted>)"),
            Self::ProviderIssued { .. } => f.write_str("CredentialSource::ProviderIssued(<redacted>)"),
        }
    }
}

fn sign_identifier(key: &RawKey) -> Result<String, WalletError> {
    let identifier = key.public_identifier();
    let payload = serde_json::to_vec(&CredentialPayload {
        public_key: identifier.as_str(),
    })
    .map_err(|e| WalletError::LinkingFailed(e.to_string()))?;

    let hmac_key = Zeroizing::new(
        URL_SAFE_NO_PAD
            .decode(key.to_hex().as_bytes())
            .map_err(|_| WalletError::MalformedSecret)?,
    );
    sign_compact(&payload, &hmac_key)
}

/// Compact JWS serialization: `header.payload.signature`, all base64url.
fn sign_compact(payload: &[u8], hmac_key: &[u8]) -> Result<String, WalletError> {
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(JWS_HEADER),
        URL_SAFE_NO_PAD.encode(payload)
    );
    let mut mac = HmacSha256::new_from_slice(hmac_key).map_err(|_| WalletError::MalformedSecret)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn decode(part: &str) -> Vec<u8> {
        URL_SAFE_NO_PAD.decode(part).unwrap()
    }

    #[test]
    fn test_symmetric_credential_structure() {
        let key = RawKey::parse(SECRET).unwrap();
        let token = CredentialSource::Symmetric { key: key.clone() }
            .bearer_token()
            .unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(decode(parts[0]), JWS_HEADER.as_bytes());

        let payload: serde_json::Value = serde_json::from_slice(&decode(parts[1])).unwrap();
        assert_eq!(payload["publicKey"], key.public_identifier().as_str());
    }

    #[test]
    fn test_symmetric_signature_verifies() {
        let key = RawKey::parse(SECRET).unwrap();
        let token = CredentialSource::Symmetric { key }.bearer_token().unwrap();
        let (signing_input, signature) = token.rsplit_once('.').unwrap();

        let hmac_key = URL_SAFE_NO_PAD.decode(SECRET).unwrap();
        let mut mac = HmacSha256::new_from_slice(&hmac_key).unwrap();
        mac.update(signing_input.as_bytes());
        assert!(mac.verify_slice(&decode(signature)).is_ok());
    }

    #[test]
    fn test_credential_never_contains_secret() {
        let key = RawKey::parse(SECRET).unwrap();
        let token = CredentialSource::Symmetric { key }.bearer_token().unwrap();
        assert!(!token.contains(SECRET));
        for part in token.split('.') {
            assert!(!hex::encode(decode(part)).contains(SECRET));
        }
    }

    #[test]
    fn test_symmetric_credential_is_deterministic() {
        let a = CredentialSource::Symmetric { key: RawKey::parse(SECRET).unwrap() };
        let b = CredentialSource::Symmetric { key: RawKey::parse(&format!("0x{SECRET}")).unwrap() };
        assert_eq!(a.bearer_token().unwrap(), b.bearer_token().unwrap());
    }

    #[test]
    fn test_provider_issued_uses_id_token() {
        let source = CredentialSource::ProviderIssued {
            id_token: "eyJhbGciOiJFUzI1NiJ9.e30.sig".into(),
            key: RawKey::parse(SECRET).unwrap(),
        };
        assert_eq!(source.bearer_token().unwrap(), "eyJhbGciOiJFUzI1NiJ9.e30.sig");
        assert_eq!(
            source.public_identifier(),
            RawKey::parse(SECRET).unwrap().public_identifier()
        );
    }

    #[test]
    fn test_provider_issued_without_token_fails() {
        let source = CredentialSource::ProviderIssued {
            id_token: String::new(),
            key: RawKey::parse(SECRET).unwrap(),
        };
        assert!(matches!(source.bearer_token(), Err(WalletError::LinkingFailed(_))));
    }

    #[test]
    fn test_debug_is_redacted() {
        let source = CredentialSource::Symmetric { key: RawKey::parse(SECRET).unwrap() };
        assert!(!format!("{:?}", source).contains(SECRET));
    }
}
