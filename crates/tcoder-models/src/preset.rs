//! Transcoding preset definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available transcoding presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Standard quality outputs
    #[default]
    Default,
    /// Optimized for web streaming
    WebOptimized,
    /// HLS streaming format
    Hls,
    /// Adaptive bitrate HLS
    HlsAdaptive,
}

impl Preset {
    /// All available presets.
    pub const ALL: &'static [Preset] = &[
        Preset::Default,
        Preset::WebOptimized,
        Preset::Hls,
        Preset::HlsAdaptive,
    ];

    /// Wire string as sent in upload requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Default => "default",
            Preset::WebOptimized => "web-optimized",
            Preset::Hls => "hls",
            Preset::HlsAdaptive => "hls-adaptive",
        }
    }

    /// One-line description for display.
    pub fn description(&self) -> &'static str {
        match self {
            Preset::Default => "Standard quality outputs",
            Preset::WebOptimized => "Optimized for web streaming",
            Preset::Hls => "HLS streaming format",
            Preset::HlsAdaptive => "Adaptive bitrate HLS",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Preset {
    type Err = PresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(Preset::Default),
            "web-optimized" => Ok(Preset::WebOptimized),
            "hls" => Ok(Preset::Hls),
            "hls-adaptive" => Ok(Preset::HlsAdaptive),
            _ => Err(PresetParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown preset: {0}")]
pub struct PresetParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_strings() {
        assert_eq!(Preset::WebOptimized.as_str(), "web-optimized");
        assert_eq!(
            serde_json::to_string(&Preset::HlsAdaptive).unwrap(),
            "\"hls-adaptive\""
        );
        let preset: Preset = serde_json::from_str("\"web-optimized\"").unwrap();
        assert_eq!(preset, Preset::WebOptimized);
    }

    #[test]
    fn test_parse() {
        assert_eq!("hls".parse::<Preset>().unwrap(), Preset::Hls);
        assert_eq!("HLS-Adaptive".parse::<Preset>().unwrap(), Preset::HlsAdaptive);
        assert!("4k-remux".parse::<Preset>().is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(Preset::default(), Preset::Default);
    }
}
