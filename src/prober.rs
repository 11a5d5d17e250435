//! HTTP probing of a single endpoint

use crate::config::{EndpointSpec, HttpMethod};
use crate::errors::{MonitorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, error};

/// Outcome of one probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub success: bool,
    pub latency_ms: f64,
}

impl ProbeResult {
    /// Down result for probes that never produced a response
    pub fn failed() -> Self {
        Self {
            success: false,
            latency_ms: 0.0,
        }
    }
}

/// A single request to send to an endpoint
#[derive(Debug, Clone, Copy)]
pub struct ProbeRequest<'a> {
    pub method: HttpMethod,
    pub url: &'a str,
    pub headers: &'a HashMap<String, String>,
    /// Only sent with POST
    pub body: &'a str,
}

/// What the prober needs to know about a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
}

impl ProbeResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform an HTTP request and report its status.
///
/// Returning `Err` means no response was received at all.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    async fn execute(&self, request: ProbeRequest<'_>) -> Result<ProbeResponse>;
}

/// reqwest-backed transport with a fixed timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(format!("uptime_monitor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self {
            client,
            timeout: request_timeout,
        })
    }
}

#[async_trait]
impl ProbeTransport for ReqwestTransport {
    async fn execute(&self, request: ProbeRequest<'_>) -> Result<ProbeResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url).body(request.body.to_string()),
        };

        for (key, value) in request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        // The body is read so the measured latency covers the full response.
        let status = timeout(self.timeout, async {
            let response = builder.send().await?;
            let status = response.status();
            response.bytes().await?;
            Ok::<_, MonitorError>(status)
        })
        .await
        .map_err(|_| MonitorError::Transport("Request timeout".to_string()))??;

        debug!("{} {} returned {}", request.method, request.url, status);

        Ok(ProbeResponse {
            status: status.as_u16(),
        })
    }
}

/// Up iff the response was ok and strictly faster than the threshold
pub fn classify(ok: bool, latency_ms: f64, threshold_ms: f64) -> bool {
    ok && latency_ms < threshold_ms
}

/// Runs probes against endpoints and classifies the outcome
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn ProbeTransport>,
    latency_threshold: Duration,
}

impl Prober {
    pub fn new(transport: Arc<dyn ProbeTransport>, latency_threshold: Duration) -> Self {
        Self {
            transport,
            latency_threshold,
        }
    }

    /// Probe one endpoint. Never fails: every error becomes a down result
    /// with zero latency.
    pub async fn probe(&self, endpoint: &EndpointSpec) -> ProbeResult {
        let Some(url) = endpoint.url.as_deref() else {
            error!("Endpoint has no url, nothing to probe");
            return ProbeResult::failed();
        };

        let method = match endpoint.method() {
            Ok(method) => method,
            Err(e) => {
                error!("{}", e);
                return ProbeResult::failed();
            }
        };

        let request = ProbeRequest {
            method,
            url,
            headers: &endpoint.headers,
            body: &endpoint.body,
        };

        let start = Instant::now();
        match self.transport.execute(request).await {
            Ok(response) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                let threshold_ms = self.latency_threshold.as_secs_f64() * 1000.0;

                ProbeResult {
                    success: classify(response.is_ok(), latency_ms, threshold_ms),
                    latency_ms,
                }
            }
            Err(e) => {
                error!("{} ({})", e, url);
                ProbeResult::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Transport answering with a fixed status after a fixed delay
    struct FakeTransport {
        status: u16,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl FakeTransport {
        fn new(status: u16, delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                status,
                delay: Duration::from_millis(delay_ms),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProbeTransport for FakeTransport {
        async fn execute(&self, _request: ProbeRequest<'_>) -> Result<ProbeResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ProbeResponse {
                status: self.status,
            })
        }
    }

    struct RefusingTransport;

    #[async_trait]
    impl ProbeTransport for RefusingTransport {
        async fn execute(&self, _request: ProbeRequest<'_>) -> Result<ProbeResponse> {
            Err(MonitorError::Transport("connection refused".to_string()))
        }
    }

    fn prober(transport: Arc<dyn ProbeTransport>) -> Prober {
        Prober::new(transport, Duration::from_millis(500))
    }

    #[test]
    fn test_classify() {
        assert!(classify(true, 400.0, 500.0));
        assert!(!classify(true, 600.0, 500.0));
        assert!(!classify(true, 500.0, 500.0));
        assert!(!classify(false, 10.0, 500.0));
    }

    #[test]
    fn test_response_ok_is_2xx() {
        assert!(ProbeResponse { status: 200 }.is_ok());
        assert!(ProbeResponse { status: 204 }.is_ok());
        assert!(!ProbeResponse { status: 301 }.is_ok());
        assert!(!ProbeResponse { status: 404 }.is_ok());
        assert!(!ProbeResponse { status: 500 }.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_ok_response_is_up() {
        let result = prober(FakeTransport::new(200, 400))
            .probe(&EndpointSpec::new("http://example.com/"))
            .await;

        assert!(result.success);
        assert!(result.latency_ms >= 400.0 && result.latency_ms < 500.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ok_response_is_down() {
        let result = prober(FakeTransport::new(200, 600))
            .probe(&EndpointSpec::new("http://example.com/"))
            .await;

        assert!(!result.success);
        assert!(result.latency_ms >= 600.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_status_is_down() {
        let result = prober(FakeTransport::new(503, 10))
            .probe(&EndpointSpec::new("http://example.com/"))
            .await;

        assert!(!result.success);
        assert!(result.latency_ms >= 10.0);
    }

    #[tokio::test]
    async fn test_unsupported_method_skips_transport() {
        let transport = FakeTransport::new(200, 0);
        let endpoint = EndpointSpec::new("http://example.com/").with_method("PUT");

        let result = prober(transport.clone()).probe(&endpoint).await;

        assert_eq!(result, ProbeResult::failed());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_down_with_zero_latency() {
        let result = prober(Arc::new(RefusingTransport))
            .probe(&EndpointSpec::new("http://example.com/"))
            .await;

        assert_eq!(result, ProbeResult::failed());
    }

    #[tokio::test]
    async fn test_missing_url_is_down() {
        let transport = FakeTransport::new(200, 0);
        let result = prober(transport.clone()).probe(&EndpointSpec::default()).await;

        assert_eq!(result, ProbeResult::failed());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_transport_creation() {
        tokio_test::assert_ok!(ReqwestTransport::new(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_reqwest_get_against_live_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10)).unwrap());
        let endpoint = EndpointSpec::new(format!("{}/health", server.uri()));
        let result = prober(transport).probe(&endpoint).await;

        assert!(result.success);
        assert!(result.latency_ms > 0.0);
        assert!(result.latency_ms < 500.0);
    }

    #[tokio::test]
    async fn test_reqwest_post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(header("x-api-key", "secret"))
            .and(body_string(r#"{"user":"monitor"}"#))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10)).unwrap());
        let endpoint = EndpointSpec::new(format!("{}/login", server.uri()))
            .with_method("POST")
            .with_header("x-api-key", "secret")
            .with_body(r#"{"user":"monitor"}"#);

        let result = prober(transport).probe(&endpoint).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_reqwest_server_error_keeps_latency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10)).unwrap());
        let result = prober(transport)
            .probe(&EndpointSpec::new(server.uri()))
            .await;

        assert!(!result.success);
        assert!(result.latency_ms > 0.0);
    }

    #[tokio::test]
    async fn test_reqwest_slow_response_is_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(600)))
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(10)).unwrap());
        let result = prober(transport)
            .probe(&EndpointSpec::new(server.uri()))
            .await;

        assert!(!result.success);
        assert!(result.latency_ms >= 600.0);
    }

    #[tokio::test]
    async fn test_reqwest_timeout_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let transport = Arc::new(ReqwestTransport::new(Duration::from_millis(100)).unwrap());
        let result = prober(transport)
            .probe(&EndpointSpec::new(server.uri()))
            .await;

        assert_eq!(result, ProbeResult::failed());
    }

    #[tokio::test]
    async fn test_reqwest_connection_refused() {
        // Grab a free port and release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(2)).unwrap());
        let result = prober(transport)
            .probe(&EndpointSpec::new(format!("http://127.0.0.1:{}/", port)))
            .await;

        assert_eq!(result, ProbeResult::failed());
    }
}
