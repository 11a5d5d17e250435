//! Command-line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "uptime_monitor", version, about = "Periodic HTTP endpoint availability monitor")]
pub struct Cli {
    /// Path to the YAML (or .json) endpoint file
    pub config_file: PathBuf,

    /// Probe all endpoints of a cycle at the same time
    #[arg(long, env = "MONITOR_CONCURRENT")]
    pub concurrent: bool,

    /// Log line format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
