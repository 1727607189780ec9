//! Configuration file support
//!
//! Loads server configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{
    DownstreamConfig, SchedulerConfig, SegmenterConfig, ServerConfig, TeletextConfig,
    TimecodeConfig,
};

/// Configuration file format
///
/// Every section is optional; omitted sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Server settings
    pub server: Option<ServerSettings>,
    /// Teletext settings
    pub teletext: Option<TeletextConfig>,
    /// Segmenter settings
    pub segmenter: Option<SegmenterConfig>,
    /// Scheduler settings
    pub scheduler: Option<SchedulerConfig>,
    /// Downstream link settings
    pub downstream: Option<DownstreamConfig>,
    /// Timecode ingestion settings
    pub timecode: Option<TimecodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ConfigFile = toml::from_str(&content)?;
        Ok(config)
    }

    /// Convert to ServerConfig
    pub fn into_server_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        let (host, port, log_level) = match self.server {
            Some(s) => (
                s.host,
                s.port,
                s.log_level.unwrap_or(defaults.log_level),
            ),
            None => (defaults.host, defaults.port, defaults.log_level),
        };
        ServerConfig {
            host,
            port,
            log_level,
            teletext: self.teletext.unwrap_or_default(),
            segmenter: self.segmenter.unwrap_or_default(),
            scheduler: self.scheduler.unwrap_or_default(),
            downstream: self.downstream.unwrap_or_default(),
            timecode: self.timecode.unwrap_or_default(),
        }
    }
}
