//! Endpoint list loading and monitor settings

use crate::errors::{MonitorError, Result};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Pause between the end of one probe cycle and the start of the next
pub const CYCLE_INTERVAL: Duration = Duration::from_secs(15);

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Responses at or above this latency count as down
pub const LATENCY_THRESHOLD: Duration = Duration::from_millis(500);

/// One entry of the endpoint file.
///
/// Every key is optional at load time. Entries without a `url` keep their
/// slot in the list and are skipped when probing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EndpointSpec {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    /// Raw method string, resolved with [`EndpointSpec::method`]
    #[serde(default)]
    pub method: Option<String>,

    /// Scalar values (numbers, booleans) are kept as their text form
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: HashMap<String, String>,

    #[serde(default)]
    pub body: String,
}

impl EndpointSpec {
    /// Create a GET endpoint for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Name used in log lines, falling back to the URL
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.url.as_deref())
    }

    /// Resolve the configured method, defaulting to GET
    pub fn method(&self) -> Result<HttpMethod> {
        match self.method.as_deref() {
            None => Ok(HttpMethod::Get),
            Some(raw) => raw.parse(),
        }
    }
}

/// Header value as written in the file
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl From<ScalarValue> for String {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Text(text) => text,
            ScalarValue::Integer(n) => n.to_string(),
            ScalarValue::Float(n) => n.to_string(),
            ScalarValue::Flag(b) => b.to_string(),
        }
    }
}

fn deserialize_headers<'de, D>(
    deserializer: D,
) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, ScalarValue>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(key, value)| (key, String::from(value))).collect())
}

/// HTTP methods the prober knows how to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
        }
    }
}

impl FromStr for HttpMethod {
    type Err = MonitorError;

    // Matching is case-sensitive: "get" is rejected like any other unknown verb.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            other => Err(MonitorError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// Encoding of the endpoint file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the parser from the file extension. Anything but `.json` is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Load the endpoint list from disk.
///
/// Returns [`MonitorError::ConfigNotFound`] if the path does not exist and
/// [`MonitorError::ConfigParse`] for every other failure. The file is read
/// once; there is no retry.
pub fn load_endpoints(path: &Path) -> Result<Vec<EndpointSpec>> {
    if !path.exists() {
        return Err(MonitorError::ConfigNotFound(path.to_path_buf()));
    }

    let endpoints = read_endpoints(path, ConfigFormat::from_path(path))
        .map_err(|e| MonitorError::ConfigParse(e.to_string()))?;

    debug!(
        "Loaded {} endpoint entries from {}",
        endpoints.len(),
        path.display()
    );

    Ok(endpoints)
}

fn read_endpoints(path: &Path, format: ConfigFormat) -> Result<Vec<EndpointSpec>> {
    let content = std::fs::read_to_string(path)?;
    parse_endpoints(&content, format)
}

/// Parse endpoint definitions from an in-memory document
pub fn parse_endpoints(content: &str, format: ConfigFormat) -> Result<Vec<EndpointSpec>> {
    if content.trim().is_empty() {
        return Err(MonitorError::ConfigParse(
            "configuration file is empty".to_string(),
        ));
    }

    let endpoints = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };

    Ok(endpoints)
}

/// Timing and scheduling knobs for a [`crate::Monitor`].
///
/// The binary always runs with the fixed defaults; the struct lets tests and
/// embedders substitute their own values.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Pause after each cycle
    pub interval: Duration,

    /// Timeout applied to every probe request
    pub request_timeout: Duration,

    /// Latency at or above which an ok response is still down
    pub latency_threshold: Duration,

    /// Probe all endpoints of a cycle at the same time
    pub concurrent: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: CYCLE_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            latency_threshold: LATENCY_THRESHOLD,
            concurrent: false,
        }
    }
}

impl MonitorSettings {
    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Latency threshold in milliseconds
    pub fn latency_threshold_ms(&self) -> f64 {
        self.latency_threshold.as_secs_f64() * 1000.0
    }
}
