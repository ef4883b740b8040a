//! Logging Config
//!
//! Logs always go to stderr so command output on stdout stays pipeable.

use clap::{Args, ValueEnum};

/// How log lines are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// One short line per event, for a terminal.
    #[default]
    Compact,

    /// One JSON object per event, for log collectors.
    Json,
}

/// Logging settings.
///
/// The storefront is quiet by default: only warnings, such as failed mirror
/// syncs or catalog requests, are shown unless a more verbose filter is given.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `storefront=debug`
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log line format
    #[arg(long, env = "STOREFRONT_LOG_FORMAT", value_enum, default_value_t)]
    pub log_format: LogFormat,
}
