//! HTTP client for the identity-linking service.

use alloy_primitives::Address;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::{GET_EMAIL_PATH, POST_EMAIL_PATH, WalletConfig};
use crate::core::error::ServiceError;
use crate::core::identity::{IdentityService, LinkRequest};

/// [`IdentityService`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIdentityService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.identity_service_url.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn lookup_url(&self, wallet: &Address) -> String {
        format!("{}{}?wallet={}", self.base_url, GET_EMAIL_PATH, wallet)
    }

    fn link_url(&self) -> String {
        format!("{}{}", self.base_url, POST_EMAIL_PATH)
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

/// Parse a lookup response body: a JSON string, where `null` or `""` mean no
/// record.
fn parse_email_body(body: &str) -> Result<Option<String>, ServiceError> {
    let email: Option<String> =
        serde_json::from_str(body).map_err(|e| ServiceError::JsonParseError(e.to_string()))?;
    Ok(email.filter(|email| !email.trim().is_empty()))
}

/// Interpret a lookup response: `404` means no record, any other non-2xx
/// status is a service failure.
fn lookup_outcome(status: StatusCode, body: &str) -> Result<Option<String>, ServiceError> {
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ServiceError::HttpError(status.as_u16()));
    }
    parse_email_body(body)
}

/// Interpret a link response; anything but 2xx is a rejection.
fn link_outcome(status: StatusCode) -> Result<(), ServiceError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ServiceError::HttpError(status.as_u16()))
    }
}

fn network_error(err: reqwest::Error) -> ServiceError {
    ServiceError::Network(err.without_url().to_string())
}

// =============================================================================
// Service Implementation
// =============================================================================

#[async_trait(?Send)]
impl IdentityService for HttpIdentityService {
    async fn fetch_email(&self, wallet: &Address) -> Result<Option<String>, ServiceError> {
        let response = self
            .client
            .get(self.lookup_url(wallet))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = if status.is_success() {
            response
                .text()
                .await
                .map_err(|_| ServiceError::ResponseReadFailed)?
        } else {
            String::new()
        };
        lookup_outcome(status, &body)
    }

    async fn store_email(&self, bearer: &str, request: &LinkRequest) -> Result<(), ServiceError> {
        let response = self
            .client
            .post(self.link_url())
            .bearer_auth(bearer)
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), "link request answered");
        link_outcome(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let service = HttpIdentityService::new("http://localhost:8080/");
        let wallet: Address = "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".parse().unwrap();
        assert_eq!(
            service.lookup_url(&wallet),
            "http://localhost:8080/getEmailFromDB?wallet=0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(service.link_url(), "http://localhost:8080/postEmailToDB");
    }

    #[test]
    fn test_default_base_url() {
        let service = HttpIdentityService::from_config(&WalletConfig::default());
        assert_eq!(service.base_url(), crate::config::IDENTITY_SERVICE_URL);
    }

    #[test]
    fn test_parse_email_body() {
        assert_eq!(parse_email_body("\"a@b.com\""), Ok(Some("a@b.com".into())));
        assert_eq!(parse_email_body("null"), Ok(None));
        assert_eq!(parse_email_body("\"\""), Ok(None));
        assert!(matches!(parse_email_body("<html>"), Err(ServiceError::JsonParseError(_))));
    }

    #[test]
    fn test_lookup_outcome() {
        assert_eq!(
            lookup_outcome(StatusCode::OK, "\"a@b.com\""),
            Ok(Some("a@b.com".into()))
        );
        assert_eq!(lookup_outcome(StatusCode::OK, "null"), Ok(None));
        assert_eq!(lookup_outcome(StatusCode::NOT_FOUND, ""), Ok(None));
        assert_eq!(
            lookup_outcome(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Err(ServiceError::HttpError(500))
        );
        assert_eq!(
            lookup_outcome(StatusCode::FORBIDDEN, "\"a@b.com\""),
            Err(ServiceError::HttpError(403))
        );
    }

    #[test]
    fn test_link_outcome() {
        assert_eq!(link_outcome(StatusCode::OK), Ok(()));
        assert_eq!(link_outcome(StatusCode::CREATED), Ok(()));
        assert_eq!(link_outcome(StatusCode::NO_CONTENT), Ok(()));
        assert_eq!(link_outcome(StatusCode::UNAUTHORIZED), Err(ServiceError::HttpError(401)));
        assert_eq!(
            link_outcome(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ServiceError::HttpError(500))
        );
    }

    #[test]
    fn test_link_request_body() {
        let request = LinkRequest {
            pub_key: "02ab".into(),
            email: "a@b.com".into(),
            wallet: "0x01".into(),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "pubKey": "02ab", "email": "a@b.com", "wallet": "0x01" })
        );
    }
}
