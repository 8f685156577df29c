//! Reqwest-backed report classifier.
//!
//! Posts `{reason, description}` to the configured endpoint and expects
//! `{"validated": bool}` back. Transport failures and odd answers become
//! port errors; the moderation engine turns those into "not validated".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::http_support::{body_preview, client};
use crate::domain::ReportClaim;
use crate::domain::ports::{ReportValidator, ReportValidatorError};

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    reason: &'a str,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    validated: bool,
}

/// Report validator calling an external classifier over HTTP.
pub struct HttpReportValidator {
    client: Client,
    endpoint: Url,
}

impl HttpReportValidator {
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
impl ReportValidator for HttpReportValidator {
    async fn validate(&self, claim: &ReportClaim) -> Result<bool, ReportValidatorError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&ClassifyRequest {
                reason: claim.reason.as_str(),
                description: &claim.description,
            })
            .send()
            .await
            .map_err(|err| ReportValidatorError::unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ReportValidatorError::unavailable(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &body));
        }
        parse_verdict(&body)
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ReportValidatorError {
    let message = format!("status {}: {}", status.as_u16(), body_preview(body));
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ReportValidatorError::unavailable(message)
    } else {
        ReportValidatorError::invalid_response(message)
    }
}

fn parse_verdict(body: &[u8]) -> Result<bool, ReportValidatorError> {
    serde_json::from_slice::<ClassifyResponse>(body)
        .map(|verdict| verdict.validated)
        .map_err(|err| ReportValidatorError::invalid_response(format!("decode verdict: {err}")))
}
