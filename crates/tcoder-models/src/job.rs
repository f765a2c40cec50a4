//! Job definitions for the transcoding service.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{JobStatus, Preset, VideoQuality};

/// Unique identifier for a job, assigned by the backend at upload time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transcoded output variant of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobOutput {
    /// Output quality
    pub quality: VideoQuality,

    /// Primary playback URL
    pub url: String,

    /// CDN-backed URL, preferred for playback when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdn_url: Option<String>,
}

impl JobOutput {
    /// URL to play this output from, preferring the CDN when available.
    pub fn playback_url(&self) -> &str {
        self.cdn_url.as_deref().unwrap_or(&self.url)
    }
}

/// A transcoding job as reported by the backend status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique job ID
    pub job_id: JobId,

    /// Current lifecycle status
    #[serde(default)]
    pub status: JobStatus,

    /// Preset the job was submitted with
    #[serde(default)]
    pub preset: Preset,

    /// Identifier of the worker machine processing the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,

    /// Output variants, populated once the job completes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<JobOutput>,

    /// Error message, populated if the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create the local record for a freshly submitted job.
    ///
    /// The backend has only assigned the ID at this point; status starts at
    /// `Uploading` until the first status query reports otherwise.
    pub fn submitted(job_id: JobId, preset: Preset) -> Self {
        Self {
            job_id,
            status: JobStatus::Uploading,
            preset,
            machine_id: None,
            outputs: Vec::new(),
            error: None,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
