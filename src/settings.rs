//! murmur application settings
use crate::config_error;
use crate::error::Result;

pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ID_SEPARATOR: &str = "-";
pub const DEFAULT_OUTBOUND_BUFFER: &str = "1024";
pub const STANDARD_OUTBOUND_BUFFER: usize = 1024;

/// How a node picks the peers a newly seen value is forwarded to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FanoutMode {
    /// Every member of the cluster except self and the sender
    #[default]
    Flood,
    /// Only the neighbours named for this node by the latest `topology` message
    Topology,
}

impl std::fmt::Display for FanoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FanoutMode::Flood => write!(f, "flood"),
            FanoutMode::Topology => write!(f, "topology"),
        }
    }
}

impl std::str::FromStr for FanoutMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flood" => Ok(FanoutMode::Flood),
            "topology" => Ok(FanoutMode::Topology),
            _ => Err(format!("Invalid fanout mode: {}", s)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    // Peer selection for value fan-out
    pub fanout_mode: FanoutMode,

    // Inserted between node name and counter in generated ids
    pub id_separator: String,

    // Capacity of the channel feeding the stdout writer
    pub outbound_buffer: usize,

    // Format of diagnostic output on stderr
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fanout_mode: FanoutMode::default(),
            id_separator: DEFAULT_ID_SEPARATOR.to_string(),
            outbound_buffer: STANDARD_OUTBOUND_BUFFER,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.outbound_buffer == 0 {
            return Err(config_error!("outbound buffer must be greater than zero"));
        }
        if self.id_separator.chars().any(|c| c.is_ascii_digit()) {
            return Err(config_error!(
                "id separator {:?} must not contain digits",
                self.id_separator
            ));
        }
        Ok(())
    }
}
