//! Output quality vocabulary.
//!
//! Each quality maps to a fixed target resolution and bitrate pair. The
//! targets are used for display only; the backend enforces the actual
//! encoding parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported output qualities, ordered lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub enum VideoQuality {
    #[serde(rename = "144p")]
    Q144p,
    #[serde(rename = "360p")]
    Q360p,
    #[serde(rename = "720p")]
    Q720p,
}

impl VideoQuality {
    /// All supported qualities in ascending order.
    pub const ALL: &'static [VideoQuality] =
        &[VideoQuality::Q144p, VideoQuality::Q360p, VideoQuality::Q720p];

    /// Wire string (matches the serde rename).
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoQuality::Q144p => "144p",
            VideoQuality::Q360p => "360p",
            VideoQuality::Q720p => "720p",
        }
    }

    /// Target resolution (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            VideoQuality::Q144p => (256, 144),
            VideoQuality::Q360p => (640, 360),
            VideoQuality::Q720p => (1280, 720),
        }
    }

    /// Target video bitrate.
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            VideoQuality::Q144p => "100k",
            VideoQuality::Q360p => "400k",
            VideoQuality::Q720p => "1500k",
        }
    }

    /// Target audio bitrate.
    pub fn audio_bitrate(&self) -> &'static str {
        match self {
            VideoQuality::Q144p => "64k",
            VideoQuality::Q360p => "96k",
            VideoQuality::Q720p => "128k",
        }
    }

    /// One-line description, e.g. "640x360, 400k video, 96k audio".
    pub fn description(&self) -> String {
        let (w, h) = self.resolution();
        format!(
            "{}x{}, {} video, {} audio",
            w,
            h,
            self.video_bitrate(),
            self.audio_bitrate()
        )
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoQuality {
    type Err = QualityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "144p" => Ok(VideoQuality::Q144p),
            "360p" => Ok(VideoQuality::Q360p),
            "720p" => Ok(VideoQuality::Q720p),
            _ => Err(QualityParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown quality: {0}")]
pub struct QualityParseError(String);
