//! Error types for the uptime monitor

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug)]
pub enum MonitorError {
    /// Endpoint file does not exist
    ConfigNotFound(PathBuf),

    /// Endpoint file could not be read or parsed
    ConfigParse(String),

    /// IO operation failed
    Io(std::io::Error),

    /// YAML deserialization failed
    Yaml(serde_yaml::Error),

    /// JSON deserialization failed
    Json(serde_json::Error),

    /// Endpoint uses a method other than GET or POST
    UnsupportedMethod(String),

    /// HTTP request failed
    Http(reqwest::Error),

    /// Transport error
    Transport(String),
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorError::ConfigNotFound(path) => {
                write!(f, "Could not find file '{}'", path.display())
            }
            MonitorError::ConfigParse(msg) => write!(f, "Failed to load config file: {}", msg),
            MonitorError::Io(err) => write!(f, "IO error: {}", err),
            MonitorError::Yaml(err) => write!(f, "YAML error: {}", err),
            MonitorError::Json(err) => write!(f, "JSON error: {}", err),
            MonitorError::UnsupportedMethod(method) => write!(f, "Invalid HTTP method: {}", method),
            MonitorError::Http(err) => write!(f, "Request error: {}", err),
            MonitorError::Transport(msg) => write!(f, "Transport error: {}", msg),
        }
    }
}

impl std::error::Error for MonitorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MonitorError::Io(err) => Some(err),
            MonitorError::Yaml(err) => Some(err),
            MonitorError::Json(err) => Some(err),
            MonitorError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(err: std::io::Error) -> Self {
        MonitorError::Io(err)
    }
}

impl From<serde_yaml::Error> for MonitorError {
    fn from(err: serde_yaml::Error) -> Self {
        MonitorError::Yaml(err)
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Json(err)
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Http(err)
    }
}
