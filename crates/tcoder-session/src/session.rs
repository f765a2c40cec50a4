//! The single-job transcoding session state machine.
//!
//! `Idle -> FileSelected -> Uploading -> Polling -> Completed | Failed`,
//! with `reset` returning to `Idle` from any state. The session owns the
//! one job slot, the one preview reference, and the one poller; every event
//! (selection, confirmation, poll update, reset) is processed on the
//! caller's task, one at a time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use tcoder_client::{TranscodeService, UploadOptions};
use tcoder_models::{Job, JobId, JobStatus, Preset};

use crate::error::{SessionError, SessionResult};
use crate::file::SelectedFile;
use crate::poller::{PollUpdate, StatusPoller, DEFAULT_POLL_INTERVAL};
use crate::preview::{PreviewHandle, PreviewManager};

/// Observable lifecycle state of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected
    Idle,
    /// A valid video is selected and previewable
    FileSelected,
    /// Upload request in flight
    Uploading,
    /// Job accepted; polling for status
    Polling,
    /// Job finished with outputs
    Completed,
    /// Job failed, or a status query failed; reset required
    Failed,
}

/// Orchestrator for one transcoding job at a time.
pub struct TranscodeSession {
    service: Arc<dyn TranscodeService>,
    preset: Preset,
    state: SessionState,
    file: Option<SelectedFile>,
    preview: PreviewManager,
    poller: StatusPoller,
    job: Option<Job>,
    error: Option<String>,
    /// Bumped on every poller start and every reset; updates carrying an
    /// older generation are discarded.
    generation: u64,
    updates_tx: mpsc::UnboundedSender<PollUpdate>,
    updates_rx: mpsc::UnboundedReceiver<PollUpdate>,
}

impl TranscodeSession {
    /// Create a session with the default 3-second poll interval.
    pub fn new(service: Arc<dyn TranscodeService>, preset: Preset) -> Self {
        Self::with_poll_interval(service, preset, DEFAULT_POLL_INTERVAL)
    }

    /// Create a session with a custom poll interval.
    pub fn with_poll_interval(
        service: Arc<dyn TranscodeService>,
        preset: Preset,
        poll_interval: std::time::Duration,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            service,
            preset,
            state: SessionState::Idle,
            file: None,
            preview: PreviewManager::new(),
            poller: StatusPoller::new(poll_interval),
            job: None,
            error: None,
            generation: 0,
            updates_tx,
            updates_rx,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The tracked job, if one has been submitted.
    pub fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// The currently selected file, if any.
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// The live preview reference, if any.
    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.current()
    }

    /// Whether `handle` is still the live preview reference.
    pub fn preview_is_live(&self, handle: &PreviewHandle) -> bool {
        self.preview.is_live(handle)
    }

    /// The visible error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Select a file for upload.
    ///
    /// Non-video files are rejected locally with no state change and no
    /// preview allocation. A valid selection replaces any previous one,
    /// revoking its preview reference first. Only valid while `Idle` or
    /// `FileSelected`; a finished or in-flight job must be `reset` first.
    pub fn select_file(&mut self, file: SelectedFile) -> SessionResult<PreviewHandle> {
        // State guard first: while a job is in flight or finished, selection
        // is rejected without touching the visible error, which belongs to
        // the active job.
        match self.state {
            SessionState::Idle | SessionState::FileSelected => {}
            _ => return Err(SessionError::InvalidState("a job is already in progress")),
        }

        if !file.is_video() {
            warn!(
                file = %file.name,
                content_type = %file.content_type,
                "Rejected non-video selection"
            );
            self.error = Some(SessionError::NotAVideo.to_string());
            return Err(SessionError::NotAVideo);
        }

        let handle = self.preview.acquire(&file);
        info!(file = %file.name, preview = %handle.uri(), "File selected");
        self.file = Some(file);
        self.error = None;
        self.state = SessionState::FileSelected;
        Ok(handle)
    }

    /// Upload the selected file.
    ///
    /// On success the job slot is created with the backend-assigned ID and
    /// polling starts. On failure the session returns to `FileSelected`
    /// with the file and preview intact so the upload can be retried.
    pub async fn confirm_upload(&mut self) -> SessionResult<JobId> {
        if self.state != SessionState::FileSelected {
            return Err(SessionError::InvalidState("no file selected"));
        }
        let Some(file) = self.file.as_ref() else {
            return Err(SessionError::InvalidState("no file selected"));
        };

        let opts = UploadOptions {
            filename: file.name.clone(),
            content_type: file.content_type.clone(),
            preset: self.preset,
        };
        let bytes = file.bytes.clone();

        self.state = SessionState::Uploading;
        self.error = None;
        info!(file = %opts.filename, preset = %opts.preset, "Uploading");

        match self.service.upload(bytes, &opts).await {
            Ok(job_id) => {
                info!(job_id = %job_id, "Upload accepted, polling for status");
                self.job = Some(Job::submitted(job_id.clone(), self.preset));
                self.state = SessionState::Polling;
                self.generation += 1;
                self.poller.start(
                    self.service.clone(),
                    job_id.clone(),
                    self.generation,
                    self.updates_tx.clone(),
                );
                Ok(job_id)
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Upload failed");
                self.state = SessionState::FileSelected;
                self.error = Some(message.clone());
                Err(SessionError::Upload(message))
            }
        }
    }

    /// Wait for the next poll update and apply it.
    ///
    /// Returns the state after applying the update, or `None` when the
    /// session is not polling.
    pub async fn next_update(&mut self) -> Option<SessionState> {
        if self.state != SessionState::Polling {
            return None;
        }
        let update = self.updates_rx.recv().await?;
        self.apply_update(update);
        Some(self.state)
    }

    /// Apply one poll update to the job slot.
    ///
    /// Updates from a superseded generation, for a different job, or after
    /// a terminal state has been reached are discarded: status progression
    /// is monotonic per job instance.
    pub fn apply_update(&mut self, update: PollUpdate) {
        if update.generation != self.generation {
            debug!(
                job_id = %update.job_id,
                update_generation = update.generation,
                current_generation = self.generation,
                "Discarding stale poll update"
            );
            return;
        }
        if self.state != SessionState::Polling {
            debug!(job_id = %update.job_id, "Discarding poll update outside Polling");
            return;
        }
        let Some(job) = self.job.as_mut() else {
            return;
        };
        if job.job_id != update.job_id || job.is_terminal() {
            return;
        }

        match update.result {
            Ok(remote) => match remote.status {
                JobStatus::Completed => {
                    info!(job_id = %job.job_id, outputs = remote.outputs.len(), "Job completed");
                    job.status = JobStatus::Completed;
                    job.outputs = remote.outputs;
                    job.machine_id = remote.machine_id;
                    job.updated_at = remote.updated_at;
                    job.error = None;
                    self.state = SessionState::Completed;
                    self.poller.stop();
                }
                JobStatus::Failed => {
                    let message = remote
                        .error
                        .unwrap_or_else(|| "Transcoding failed".to_string());
                    warn!(job_id = %job.job_id, error = %message, "Job failed");
                    job.status = JobStatus::Failed;
                    job.error = Some(message.clone());
                    job.outputs.clear();
                    self.error = Some(message);
                    self.state = SessionState::Failed;
                    self.poller.stop();
                }
                status => {
                    debug!(job_id = %job.job_id, status = %status, "Status update");
                    job.status = status;
                    job.preset = remote.preset;
                    job.machine_id = remote.machine_id;
                    job.updated_at = remote.updated_at;
                }
            },
            Err(e) => {
                // A failed status query is fatal to this job instance: no
                // retry, explicit reset required.
                let message = e.to_string();
                warn!(job_id = %job.job_id, error = %message, "Status query failed");
                job.status = JobStatus::Failed;
                job.error = Some(message.clone());
                self.error = Some(message);
                self.state = SessionState::Failed;
                self.poller.stop();
            }
        }
    }

    /// Return to `Idle` from any state: stop polling, revoke the preview
    /// reference, drop the job slot and any error.
    pub fn reset(&mut self) {
        info!(state = ?self.state, "Session reset");
        self.poller.stop();
        self.generation += 1;
        // Anything still queued belongs to the old generation; drop it now.
        while self.updates_rx.try_recv().is_ok() {}
        self.preview.release_current();
        self.file = None;
        self.job = None;
        self.error = None;
        self.state = SessionState::Idle;
    }
}

impl Drop for TranscodeSession {
    fn drop(&mut self) {
        self.poller.stop();
        self.preview.release_current();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use tcoder_client::{ClientError, ClientResult};

    fn mp4(name: &str) -> SelectedFile {
        SelectedFile::new(name, "video/mp4", vec![0u8; 8])
    }

    /// In-memory stand-in for the transcoding service.
    struct FakeService {
        upload_result: Mutex<Option<ClientResult<JobId>>>,
        statuses: Mutex<VecDeque<ClientResult<Job>>>,
        status_calls: AtomicUsize,
    }

    impl FakeService {
        fn new(upload_result: ClientResult<JobId>) -> Self {
            Self {
                upload_result: Mutex::new(Some(upload_result)),
                statuses: Mutex::new(VecDeque::new()),
                status_calls: AtomicUsize::new(0),
            }
        }

        fn accepting(job_id: &str) -> Self {
            Self::new(Ok(JobId::from_string(job_id)))
        }

        fn push_status(&self, status: JobStatus) {
            let mut job = Job::submitted(JobId::from_string("abc"), Preset::Default);
            job.status = status;
            self.statuses.lock().unwrap().push_back(Ok(job));
        }

        fn push_result(&self, result: ClientResult<Job>) {
            self.statuses.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscodeService for FakeService {
        async fn upload(&self, _bytes: Vec<u8>, _opts: &UploadOptions) -> ClientResult<JobId> {
            self.upload_result
                .lock()
                .unwrap()
                .take()
                .expect("upload called more than once")
        }

        async fn get_status(&self, job_id: &JobId) -> ClientResult<Job> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.statuses.lock().unwrap().pop_front().unwrap_or_else(|| {
                // Default to an endless running job when the script runs out.
                let mut job = Job::submitted(job_id.clone(), Preset::Default);
                job.status = JobStatus::Running;
                Ok(job)
            })
        }
    }

    #[tokio::test]
    async fn non_video_selection_is_rejected_locally() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);

        let err = session
            .select_file(SelectedFile::new("notes.txt", "text/plain", vec![1]))
            .expect_err("selection should fail");

        assert!(matches!(err, SessionError::NotAVideo));
        assert_eq!(session.error(), Some("Please select a video file"));
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.preview().is_none());
        assert!(session.selected_file().is_none());
    }

    #[tokio::test]
    async fn replacing_selection_revokes_previous_preview() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);

        let first = session.select_file(mp4("a.mp4")).unwrap();
        let second = session.select_file(mp4("b.mp4")).unwrap();

        assert_ne!(first, second);
        assert_eq!(session.preview(), Some(&second));
        assert_eq!(session.selected_file().map(|f| f.name.as_str()), Some("b.mp4"));
    }

    #[tokio::test]
    async fn upload_failure_returns_to_file_selected() {
        let service = Arc::new(FakeService::new(Err(ClientError::RequestFailed {
            status: 500,
            body: "disk full".into(),
        })));
        let mut session = TranscodeSession::new(service, Preset::Default);

        let preview = session.select_file(mp4("a.mp4")).unwrap();
        let err = session.confirm_upload().await.expect_err("upload should fail");

        assert!(matches!(err, SessionError::Upload(_)));
        assert_eq!(session.state(), SessionState::FileSelected);
        assert_eq!(session.error(), Some("Service returned 500: disk full"));
        // File and preview survive for a retry.
        assert_eq!(session.preview(), Some(&preview));
        assert_eq!(session.selected_file().map(|f| f.name.as_str()), Some("a.mp4"));
        assert!(session.job().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn happy_path_runs_to_completed_outputs() {
        let service = Arc::new(FakeService::accepting("abc"));
        service.push_status(JobStatus::Running);
        let mut completed = Job::submitted(JobId::from_string("abc"), Preset::Default);
        completed.status = JobStatus::Completed;
        completed.outputs = vec![tcoder_models::JobOutput {
            quality: tcoder_models::VideoQuality::Q360p,
            url: "u1".into(),
            cdn_url: None,
        }];
        service.push_result(Ok(completed));

        let mut session = TranscodeSession::new(service.clone(), Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();

        let job_id = session.confirm_upload().await.unwrap();
        assert_eq!(job_id.as_str(), "abc");
        assert_eq!(session.state(), SessionState::Polling);

        assert_eq!(session.next_update().await, Some(SessionState::Polling));
        assert_eq!(session.job().unwrap().status, JobStatus::Running);

        assert_eq!(session.next_update().await, Some(SessionState::Completed));
        let job = session.job().unwrap();
        assert_eq!(job.outputs.len(), 1);
        assert_eq!(job.outputs[0].quality, tcoder_models::VideoQuality::Q360p);
        assert_eq!(job.outputs[0].url, "u1");
        assert_eq!(job.outputs[0].playback_url(), "u1");
        assert!(job.error.is_none());

        // Terminal: the poller must not query again.
        let calls = service.calls();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(service.calls(), calls);
        assert!(session.next_update().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn backend_reported_failure_is_terminal() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut failed = Job::submitted(JobId::from_string("abc"), Preset::Default);
        failed.status = JobStatus::Failed;
        failed.error = Some("codec not supported".into());
        service.push_result(Ok(failed));

        let mut session = TranscodeSession::new(service, Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();

        assert_eq!(session.next_update().await, Some(SessionState::Failed));
        assert_eq!(session.error(), Some("codec not supported"));
        let job = session.job().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.outputs.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn polling_error_is_fatal_without_retry() {
        let service = Arc::new(FakeService::accepting("abc"));
        service.push_result(Err(ClientError::RequestFailed {
            status: 502,
            body: "bad gateway".into(),
        }));

        let mut session = TranscodeSession::new(service.clone(), Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();

        assert_eq!(session.next_update().await, Some(SessionState::Failed));
        assert_eq!(session.error(), Some("Service returned 502: bad gateway"));

        // Single-shot: the failed query is never retried.
        let calls = service.calls();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(service.calls(), calls);
        assert_eq!(calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_polling_and_releases_preview() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service.clone(), Preset::Default);

        let preview = session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();
        assert_eq!(session.next_update().await, Some(SessionState::Polling));

        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.preview().is_none());
        assert!(!session.preview_is_live(&preview));
        assert!(session.job().is_none());
        assert!(session.error().is_none());

        // No further status queries after reset.
        let calls = service.calls();
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        assert_eq!(service.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_update_never_overwrites_state() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();
        assert_eq!(session.state(), SessionState::Polling);

        // A late result from a superseded generation must be ignored.
        let mut stale_job = Job::submitted(JobId::from_string("abc"), Preset::Default);
        stale_job.status = JobStatus::Failed;
        stale_job.error = Some("from a previous job".into());
        session.apply_update(PollUpdate {
            generation: 0,
            job_id: JobId::from_string("abc"),
            result: Ok(stale_job),
        });
        assert_eq!(session.state(), SessionState::Polling);
        assert!(session.error().is_none());

        // As must a result for a different job id.
        let mut other_job = Job::submitted(JobId::from_string("other"), Preset::Default);
        other_job.status = JobStatus::Completed;
        session.apply_update(PollUpdate {
            generation: 1,
            job_id: JobId::from_string("other"),
            result: Ok(other_job),
        });
        assert_eq!(session.state(), SessionState::Polling);
    }

    #[tokio::test]
    async fn selection_rejected_while_job_in_flight() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();

        let err = session.select_file(mp4("b.mp4")).expect_err("must reject");
        assert!(matches!(err, SessionError::InvalidState(_)));
        assert_eq!(session.state(), SessionState::Polling);

        // After reset, selection works again.
        session.reset();
        assert!(session.select_file(mp4("b.mp4")).is_ok());
        assert_eq!(session.state(), SessionState::FileSelected);
    }

    #[tokio::test]
    async fn non_video_selection_while_polling_leaves_job_error_clear() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);
        session.select_file(mp4("a.mp4")).unwrap();
        session.confirm_upload().await.unwrap();
        assert_eq!(session.state(), SessionState::Polling);

        // While the poller is active the selection is rejected for its
        // state, not its MIME type: no validation message may show up next
        // to a live job.
        let err = session
            .select_file(SelectedFile::new("notes.txt", "text/plain", vec![1]))
            .expect_err("must reject");
        assert!(matches!(err, SessionError::InvalidState(_)));
        assert_eq!(session.state(), SessionState::Polling);
        assert!(session.error().is_none());
        assert_eq!(session.selected_file().map(|f| f.name.as_str()), Some("a.mp4"));
    }

    #[tokio::test]
    async fn confirm_without_selection_is_rejected() {
        let service = Arc::new(FakeService::accepting("abc"));
        let mut session = TranscodeSession::new(service, Preset::Default);

        let err = session.confirm_upload().await.expect_err("must reject");
        assert!(matches!(err, SessionError::InvalidState(_)));
        assert_eq!(session.state(), SessionState::Idle);
    }
}
