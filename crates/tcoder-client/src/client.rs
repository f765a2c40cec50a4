//! Transcoding service HTTP client.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use tcoder_models::{Job, JobId, Preset};

use crate::error::{ClientError, ClientResult};

/// Configuration for the tcoder client.
#[derive(Debug, Clone)]
pub struct TcoderConfig {
    /// Base URL of the transcoding service
    pub base_url: String,
    /// Timeout for upload requests
    pub upload_timeout: Duration,
    /// Timeout for status and health requests
    pub request_timeout: Duration,
}

impl Default for TcoderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8787".to_string(),
            upload_timeout: Duration::from_secs(300), // large files over slow links
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TcoderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("TCODER_BASE_URL").unwrap_or(defaults.base_url),
            upload_timeout: Duration::from_secs(
                std::env::var("TCODER_UPLOAD_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.upload_timeout.as_secs()),
            ),
            request_timeout: Duration::from_secs(
                std::env::var("TCODER_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.request_timeout.as_secs()),
            ),
        }
    }

    /// Override the base URL, trimming any trailing slash.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url: String = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

/// Options accompanying an upload request.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Original filename of the video
    pub filename: String,
    /// MIME type of the video, e.g. "video/mp4"
    pub content_type: String,
    /// Transcoding preset to apply
    pub preset: Preset,
}

/// Response body of a successful upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    job_id: JobId,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP client for the tcoder transcoding service.
pub struct TcoderClient {
    http: Client,
    config: TcoderConfig,
}

impl TcoderClient {
    /// Create a new client.
    pub fn new(config: TcoderConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.upload_timeout.max(config.request_timeout))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(TcoderConfig::from_env())
    }

    /// Check if the transcoding service is healthy.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).timeout(self.config.request_timeout).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<HealthResponse>().await {
                    Ok(health) => Ok(health.status == "healthy" || health.status == "ok"),
                    Err(e) => {
                        warn!("Transcoding service health check returned invalid body: {}", e);
                        Ok(false)
                    }
                }
            }
            Ok(response) => {
                warn!("Transcoding service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Transcoding service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Upload a video for transcoding and return the assigned job ID.
    pub async fn upload(&self, bytes: Vec<u8>, opts: &UploadOptions) -> ClientResult<JobId> {
        let url = format!("{}/upload", self.config.base_url);

        debug!(
            filename = %opts.filename,
            content_type = %opts.content_type,
            preset = %opts.preset,
            size = bytes.len(),
            "Uploading video to {}", url
        );

        let file_part = Part::bytes(bytes)
            .file_name(opts.filename.clone())
            .mime_str(&opts.content_type)
            .map_err(ClientError::Network)?;

        let form = Form::new()
            .part("file", file_part)
            .text("preset", opts.preset.as_str());

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.config.upload_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed { status, body });
        }

        let upload: UploadResponse = response.json().await?;
        debug!(job_id = %upload.job_id, "Upload accepted");
        Ok(upload.job_id)
    }

    /// Query the current status of a job.
    pub async fn get_status(&self, job_id: &JobId) -> ClientResult<Job> {
        let url = format!("{}/jobs/{}", self.config.base_url, job_id);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RequestFailed { status, body });
        }

        let job: Job = response.json().await?;
        Ok(job)
    }
}
