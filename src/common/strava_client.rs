use crate::common::metrics;
use crate::common::types::{PipelineError, PipelineResult, status_text};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

const ENDPOINT: &str = "https://www.strava.com/api/v3";

/// Strava `data_type` for Training Center XML uploads.
pub const TCX_DATA_TYPE: &str = "tcx";

/// App credentials and the athlete's long-lived refresh token.
/// Presence is not checked here; Strava rejects incomplete requests.
#[derive(Debug, Clone, Default)]
pub struct StravaCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

// OAuth types
#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    grant_type: &'static str, // "refresh_token"
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<&'a str>,
}

impl<'a> From<&'a StravaCredentials> for RefreshTokenRequest<'a> {
    fn from(credentials: &'a StravaCredentials) -> Self {
        Self {
            grant_type: "refresh_token",
            refresh_token: credentials.refresh_token.as_deref(),
            client_id: credentials.client_id.as_deref(),
            client_secret: credentials.client_secret.as_deref(),
        }
    }
}

#[derive(Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_at: Option<i64>,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
}

/// Short-lived bearer token. Minted once per run and never persisted.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// Form fields of a `POST /uploads` request.
#[derive(Debug, Clone)]
pub struct UploadParameters {
    pub file: Vec<u8>,
    pub file_name: String,
    pub name: String,
    pub description: String,
    pub data_type: String,
    pub trainer: Option<String>,
    pub commute: Option<String>,
    pub external_id: Option<String>,
}

impl UploadParameters {
    fn into_form(self) -> PipelineResult<Form> {
        let file = Part::bytes(self.file)
            .file_name(self.file_name)
            .mime_str("application/xml")
            .map_err(|e| PipelineError::UploadFailed(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("name", self.name)
            .text("description", self.description)
            .text("data_type", self.data_type);

        if let Some(trainer) = self.trainer {
            form = form.text("trainer", trainer);
        }
        if let Some(commute) = self.commute {
            form = form.text("commute", commute);
        }
        if let Some(external_id) = self.external_id {
            form = form.text("external_id", external_id);
        }

        Ok(form)
    }
}

/// Strava's acknowledgment of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: Option<i64>,
    pub id_str: Option<String>,
    pub external_id: Option<String>,
    pub error: Option<String>,
    pub status: Option<String>,
    pub activity_id: Option<i64>,
}

pub struct StravaClient {
    client: reqwest::Client,
    endpoint: String,
}

impl StravaClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_endpoint(ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, super::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: super::http_client(timeout)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchanges the refresh token for a fresh access token. No retry.
    pub async fn exchange_refresh_token(
        &self,
        credentials: &StravaCredentials,
    ) -> PipelineResult<AccessToken> {
        let path = format!("{}/oauth/token", self.endpoint);
        debug!("POST {}", path);

        let response = self
            .client
            .post(path)
            .json(&RefreshTokenRequest::from(credentials))
            .send()
            .await
            .map_err(|e| {
                metrics::increment_strava_api_failure();
                PipelineError::TokenExchangeFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::increment_strava_api_failure();
            error!("Failed to get access token: {}", status_text(status));
            return Err(PipelineError::TokenExchangeFailed(status_text(status)));
        }

        let response_text = response.text().await.map_err(|e| {
            metrics::increment_strava_api_failure();
            PipelineError::TokenExchangeFailed(e.to_string())
        })?;

        let token_response: OAuthTokenResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                metrics::increment_strava_api_failure();
                PipelineError::TokenExchangeFailed(format!(
                    "Failed to parse OAuth token response: {e}"
                ))
            })?;

        metrics::increment_strava_api_success();
        Ok(AccessToken::new(token_response.access_token))
    }

    /// Uploads an activity file. Non-success responses carry the remote error body.
    pub async fn upload(
        &self,
        token: &AccessToken,
        params: UploadParameters,
    ) -> PipelineResult<UploadResponse> {
        let path = format!("{}/uploads", self.endpoint);
        debug!("POST {} ({} bytes)", path, params.file.len());

        let form = params.into_form()?;

        let response = self
            .client
            .post(path)
            .header("Authorization", token.bearer())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                metrics::increment_strava_upload_failure();
                PipelineError::UploadFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            metrics::increment_strava_upload_failure();
            let error_body = response.text().await.unwrap_or_default();
            return Err(PipelineError::UploadFailed(format!(
                "{} - {}",
                status_text(status),
                error_body
            )));
        }

        let response_text = response.text().await.map_err(|e| {
            metrics::increment_strava_upload_failure();
            PipelineError::UploadFailed(e.to_string())
        })?;

        let upload_response: UploadResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                metrics::increment_strava_upload_failure();
                PipelineError::UploadFailed(format!("Failed to parse upload response: {e}"))
            })?;

        metrics::increment_strava_upload_success();
        Ok(upload_response)
    }
}
