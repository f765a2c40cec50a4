//! Job lifecycle orchestration for the tcoder client.
//!
//! This crate owns the single active job slot: it takes a locally selected
//! file through validation, preview allocation, upload, status polling and
//! terminal rendering, and guarantees that polling tasks and preview
//! references never outlive the job they belong to.
//!
//! The pieces, leaves first:
//! - [`preview`] manages the one revocable preview reference.
//! - [`file`] holds the selected file and its MIME validation.
//! - [`poller`] issues status queries on a fixed delay until a terminal
//!   state, with explicit cancellation.
//! - [`session`] composes them into the state machine the caller drives.

pub mod error;
pub mod file;
pub mod poller;
pub mod preview;
pub mod session;

pub use error::{SessionError, SessionResult};
pub use file::SelectedFile;
pub use poller::{PollUpdate, StatusPoller, DEFAULT_POLL_INTERVAL};
pub use preview::{PreviewHandle, PreviewManager};
pub use session::{SessionState, TranscodeSession};
