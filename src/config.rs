//! Runtime configuration
//!
//! All knobs default to the values the stream was tuned with; a TOML file
//! can override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    DEFAULT_FRAME_HEADER, DEFAULT_GAP_THRESHOLD_MS, DEFAULT_SAMPLE_RATE, DEFAULT_TARGET_DEPTH,
    DEFAULT_UDP_PORT, MAX_FRAME_SIZE,
};
use crate::error::{Error, Result};

/// Stream-level settings shared by sender and receiver
///
/// `frame_header` and `frame_capacity` are a contract: peers that disagree
/// on either will reject each other's frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Byte tag prefixed to every frame; receivers accept nothing else
    pub frame_header: Vec<u8>,

    /// Total frame budget including the header (bounded by the link MTU)
    pub frame_capacity: usize,

    /// Jitter buffer pre-roll depth in samples
    pub target_depth: usize,

    /// Sample rate of the voice stream
    pub sample_rate: u32,

    /// Arrival gaps above this many milliseconds count as a gap event
    pub gap_threshold_ms: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            frame_header: DEFAULT_FRAME_HEADER.to_vec(),
            frame_capacity: MAX_FRAME_SIZE,
            target_depth: DEFAULT_TARGET_DEPTH,
            sample_rate: DEFAULT_SAMPLE_RATE,
            gap_threshold_ms: DEFAULT_GAP_THRESHOLD_MS,
        }
    }
}

/// Transmit-side noise gate settings
///
/// Hysteresis: the gate opens above `open_threshold`, then stays open until
/// the level has sat below `close_threshold` for `hold_samples` samples.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseGateConfig {
    pub enabled: bool,

    /// Absolute 16-bit level that opens a closed gate
    pub open_threshold: i32,

    /// Absolute 16-bit level below which the hold countdown drains
    pub close_threshold: i32,

    /// Hold time in samples (~12 ms at 16 kHz by default)
    pub hold_samples: u32,
}

impl Default for NoiseGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_threshold: 520,
            close_threshold: 360,
            hold_samples: 192,
        }
    }
}

/// UDP demo link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Port the broadcast frames travel on
    pub udp_port: u16,

    /// Address the sender broadcasts to
    pub broadcast_address: String,

    /// Address the listener binds
    pub bind_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            udp_port: DEFAULT_UDP_PORT,
            broadcast_address: "255.255.255.255".to_string(),
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stream: StreamConfig,
    pub gate: NoiseGateConfig,
    pub network: NetworkConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Write configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.stream.frame_capacity, MAX_FRAME_SIZE);
        assert_eq!(config.stream.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.stream.gap_threshold_ms, 30);
        assert!(config.gate.enabled);
        assert!(config.gate.open_threshold > config.gate.close_threshold);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.stream.frame_header, config.stream.frame_header);
        assert_eq!(parsed.stream.target_depth, config.stream.target_depth);
        assert_eq!(parsed.network.udp_port, config.network.udp_port);
    }

    #[test]
    fn test_partial_override() {
        let parsed: AppConfig = toml::from_str("[stream]\ntarget_depth = 640\n").unwrap();
        assert_eq!(parsed.stream.target_depth, 640);
        // everything else keeps its default
        assert_eq!(parsed.stream.frame_capacity, MAX_FRAME_SIZE);
        assert_eq!(parsed.gate.open_threshold, 520);
    }
}
