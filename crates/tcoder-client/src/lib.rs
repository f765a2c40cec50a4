//! Client for the tcoder transcoding service.
//!
//! This crate provides the HTTP boundary used by the session orchestrator:
//! uploading a video for transcoding and querying job status. The
//! [`TranscodeService`] trait abstracts the boundary so the orchestrator can
//! be tested against an in-memory fake instead of a live service.

pub mod client;
pub mod error;
pub mod service;

pub use client::{TcoderClient, TcoderConfig, UploadOptions};
pub use error::{ClientError, ClientResult};
pub use service::TranscodeService;
