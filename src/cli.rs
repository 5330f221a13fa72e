//! CLI for this application
//!
use crate::settings;

#[derive(Clone, Debug, clap::Parser)]
#[command(name = settings::APP_NAME, version = settings::APP_VERSION)]
pub struct Cli {
    // Peer selection for fan-out
    #[clap(
        long,
        default_value = "flood",
        env("MURMUR_FANOUT_MODE"),
        help = "fanout-mode: 'flood' or 'topology'"
    )]
    pub fanout_mode: settings::FanoutMode,

    // Separator between node name and counter in generated ids
    #[clap(
        long,
        default_value = settings::DEFAULT_ID_SEPARATOR,
        env("MURMUR_ID_SEPARATOR"),
        help = "Separator placed between node id and counter in generated ids"
    )]
    pub id_separator: String,

    // Outbound channel capacity
    #[clap(
        long,
        default_value = settings::DEFAULT_OUTBOUND_BUFFER,
        env("MURMUR_OUTBOUND_BUFFER"),
        help = "Number of outbound messages buffered ahead of the stdout writer"
    )]
    pub outbound_buffer: usize,

    // Log output format (always written to stderr)
    #[clap(
        long,
        default_value = "text",
        env("MURMUR_LOG_FORMAT"),
        help = "log-format: 'text' or 'json'"
    )]
    pub log_format: settings::LogFormat,
}

impl Cli {
    pub fn into_settings(self) -> settings::Settings {
        settings::Settings {
            fanout_mode: self.fanout_mode,
            id_separator: self.id_separator,
            outbound_buffer: self.outbound_buffer,
            log_format: self.log_format,
        }
    }
}
