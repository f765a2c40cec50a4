//! Boundary trait between the orchestrator and the transcoding service.
//!
//! The session orchestrator depends on this trait rather than on the
//! concrete HTTP client, so its state machine can be exercised against an
//! in-memory fake.

use async_trait::async_trait;

use tcoder_models::{Job, JobId};

use crate::client::{TcoderClient, UploadOptions};
use crate::error::ClientResult;

/// Upload and status-query boundary of the transcoding service.
#[async_trait]
pub trait TranscodeService: Send + Sync {
    /// Submit a video for transcoding, returning the assigned job ID.
    async fn upload(&self, bytes: Vec<u8>, opts: &UploadOptions) -> ClientResult<JobId>;

    /// Query the current status of a job.
    async fn get_status(&self, job_id: &JobId) -> ClientResult<Job>;
}

#[async_trait]
impl TranscodeService for TcoderClient {
    async fn upload(&self, bytes: Vec<u8>, opts: &UploadOptions) -> ClientResult<JobId> {
        TcoderClient::upload(self, bytes, opts).await
    }

    async fn get_status(&self, job_id: &JobId) -> ClientResult<Job> {
        TcoderClient::get_status(self, job_id).await
    }
}
