//! Server configuration

use serde::{Deserialize, Serialize};

/// Diacritics strategy for display rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiacriticsEncoding {
    /// Fold accented letters to their base ASCII letter in the row itself
    Latin2,
    /// Keep base letters in the row and paint accents via X/26 enhancements
    X26,
}

/// How caron letters are carried in the X/26 stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaronEncoding {
    /// G0 base letter plus a diacritic triplet with the configured index
    Compose,
    /// Precomposed G2 character; the row cell becomes a space
    G2,
}

/// G2 code-set variant for precomposed caron letters
///
/// The correct variant is decoder-dependent; all four are selectable at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum G2Variant {
    Default,
    Alt1,
    Alt2,
    Iso88592,
}

/// Teletext page encoding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeletextConfig {
    /// Magazine number (0..7; 0 means magazine 8 on the wire)
    pub magazine: u8,

    /// Page number within the magazine (0x00..0xFF, BCD-style nibbles)
    pub page: u8,

    /// First display row for subtitle text
    pub start_row: u8,

    /// Display row width in columns, framing bytes included
    pub row_width: usize,

    /// Diacritics strategy
    pub diacritics: DiacriticsEncoding,

    /// Caron strategy when diacritics run through X/26
    pub caron_encoding: CaronEncoding,

    /// G2 column-4 diacritic index used for composed carons (1..15)
    pub caron_diacritic_index: u8,

    /// G2 code-set variant used for precomposed carons
    pub g2_variant: G2Variant,
}

impl Default for TeletextConfig {
    fn default() -> Self {
        Self {
            magazine: 0,
            page: 0x01,
            start_row: 19,
            row_width: 40,
            diacritics: DiacriticsEncoding::X26,
            caron_encoding: CaronEncoding::Compose,
            caron_diacritic_index: 15,
            g2_variant: G2Variant::Default,
        }
    }
}

/// Segmenter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Maximum characters per wrapped line
    ///
    /// Kept separate from `TeletextConfig::row_width`: 38 is the
    /// display-safe width, the row itself is 40 columns.
    pub line_width: usize,

    /// Maximum lines per display segment
    pub max_lines: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            line_width: 38,
            max_lines: 2,
        }
    }
}

/// Playback scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Tick cadence in milliseconds
    pub tick_ms: u64,

    /// How long a title may hang on-screen past its segment when the next
    /// segment starts within this window
    pub hang_secs: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            hang_secs: 2.0,
        }
    }
}

/// Downstream video-mixer link configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamConfig {
    /// Video mixer host
    pub host: String,

    /// Video mixer TCP port
    pub port: u16,

    /// Channel-layer selector in the APPLY command
    pub channel_layer: String,

    /// Reconnection back-off in seconds
    pub reconnect_secs: u64,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5250,
            channel_layer: "1-10".to_string(),
            reconnect_secs: 2,
        }
    }
}

/// Timecode ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimecodeConfig {
    /// UDP bind address for the OSC listener
    pub bind: String,

    /// Address selecting the playback-time messages
    pub address: String,

    /// Require an exact address match instead of a suffix match
    pub strict_address: bool,
}

impl Default for TimecodeConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:6250".to_string(),
            address: "/time".to_string(),
            strict_address: false,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind the HTTP control surface to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Teletext encoding configuration
    pub teletext: TeletextConfig,

    /// Segmenter configuration
    pub segmenter: SegmenterConfig,

    /// Scheduler configuration
    pub scheduler: SchedulerConfig,

    /// Downstream link configuration
    pub downstream: DownstreamConfig,

    /// Timecode ingestion configuration
    pub timecode: TimecodeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            teletext: TeletextConfig::default(),
            segmenter: SegmenterConfig::default(),
            scheduler: SchedulerConfig::default(),
            downstream: DownstreamConfig::default(),
            timecode: TimecodeConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.teletext.magazine, 0);
        assert_eq!(config.teletext.page, 0x01);
        assert_eq!(config.teletext.start_row, 19);
        assert_eq!(config.teletext.caron_diacritic_index, 15);
        assert_eq!(config.teletext.row_width, 40);
        assert_eq!(config.segmenter.line_width, 38);
        assert_eq!(config.scheduler.tick_ms, 100);
        assert_eq!(config.downstream.reconnect_secs, 2);
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_enum_serde_names() {
        let cfg: TeletextConfig = toml::from_str(
            r#"
            magazine = 2
            page = 51
            start_row = 19
            row_width = 40
            diacritics = "latin2"
            caron_encoding = "g2"
            caron_diacritic_index = 4
            g2_variant = "iso88592"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.diacritics, DiacriticsEncoding::Latin2);
        assert_eq!(cfg.caron_encoding, CaronEncoding::G2);
        assert_eq!(cfg.g2_variant, G2Variant::Iso88592);
    }
}
