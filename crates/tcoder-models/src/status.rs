//! Job status vocabulary shared with the backend.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a transcoding job.
///
/// The string forms are a stable wire contract with the backend;
/// `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Source video is being uploaded to storage
    #[default]
    Uploading,
    /// Job accepted and added to the transcoding queue
    Queued,
    /// Waiting for a transcoding worker
    Pending,
    /// A worker is transcoding the video
    Running,
    /// All outputs produced successfully
    Completed,
    /// Job failed with an error
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploading => "uploading",
            JobStatus::Queued => "queued",
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Short human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Uploading => "Uploading",
            JobStatus::Queued => "Queued",
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Transcoding",
            JobStatus::Completed => "Completed",
            JobStatus::Failed => "Failed",
        }
    }

    /// One-line description of what the job is doing in this state.
    pub fn description(&self) -> &'static str {
        match self {
            JobStatus::Uploading => "Uploading video to storage...",
            JobStatus::Queued => "Added to transcoding queue",
            JobStatus::Pending => "Waiting for transcoding worker...",
            JobStatus::Running => "Video is being transcoded",
            JobStatus::Completed => "All outputs are ready",
            JobStatus::Failed => "Transcoding failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
