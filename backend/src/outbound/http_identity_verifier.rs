//! Reqwest-backed identity verifier.
//!
//! Sends the caller's credential as a bearer token and decodes the asserted
//! identity. 401 and 403 answers mean the credential was rejected; timeouts
//! and 5xx answers mean the verifier is unavailable.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::http_support::{body_preview, client};
use crate::domain::ports::{IdentityVerifier, IdentityVerifierError};
use crate::domain::{MemberId, Role, VerifiedIdentity};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityDto {
    member_id: String,
    display_name: String,
    role: String,
    #[serde(default = "active_by_default")]
    is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl TryFrom<IdentityDto> for VerifiedIdentity {
    type Error = IdentityVerifierError;

    fn try_from(dto: IdentityDto) -> Result<Self, Self::Error> {
        let member_id = MemberId::new(&dto.member_id)
            .map_err(|err| IdentityVerifierError::invalid_response(err.to_string()))?;
        let role = dto
            .role
            .parse::<Role>()
            .map_err(|err| IdentityVerifierError::invalid_response(err.to_string()))?;
        Ok(Self {
            member_id,
            display_name: dto.display_name,
            role,
            is_active: dto.is_active,
        })
    }
}

/// Identity verifier calling an external endpoint over HTTP.
pub struct HttpIdentityVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpIdentityVerifier {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client(timeout)?,
            endpoint,
        })
    }
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityVerifierError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .bearer_auth(credential)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| IdentityVerifierError::unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| IdentityVerifierError::unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        parse_identity(&body)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> IdentityVerifierError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            IdentityVerifierError::rejected(message)
        }
        _ if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
            IdentityVerifierError::unavailable(message)
        }
        _ => IdentityVerifierError::invalid_response(message),
    }
}

fn parse_identity(body: &[u8]) -> Result<VerifiedIdentity, IdentityVerifierError> {
    let dto: IdentityDto = serde_json::from_slice(body).map_err(|err| {
        IdentityVerifierError::invalid_response(format!("decode identity: {err}"))
    })?;
    VerifiedIdentity::try_from(dto)
}
