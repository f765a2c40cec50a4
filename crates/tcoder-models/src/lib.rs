//! Shared data models for the tcoder client.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs, job identifiers and job outputs
//! - The job status vocabulary shared with the backend
//! - Transcoding presets and output qualities

pub mod job;
pub mod preset;
pub mod quality;
pub mod status;

// Re-export common types
pub use job::{Job, JobId, JobOutput};
pub use preset::{Preset, PresetParseError};
pub use quality::{QualityParseError, VideoQuality};
pub use status::JobStatus;
