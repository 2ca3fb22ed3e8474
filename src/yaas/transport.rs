use async_trait::async_trait;
use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use reqwest::{Client, Method};
use std::fmt;
use std::time::Duration;

type Breaker = StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportFailure {
    Network(String),
    CircuitOpen,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Network(message) => write!(f, "{}", message),
            TransportFailure::CircuitOpen => write!(f, "circuit breaker is open"),
        }
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// reqwest-backed transport. No retries; an optional breaker only rejects.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    circuit_breaker: Option<Breaker>,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().unwrap_or_else(|e| {
            tracing::error!(error = %e, ?timeout, "HTTP client setup failed, using reqwest defaults");
            Client::new()
        });

        ReqwestTransport {
            client,
            circuit_breaker: None,
        }
    }

    /// Trips after `failure_threshold` consecutive failures (network errors
    /// and 5xx responses) and rejects calls until the reset window elapses.
    pub fn with_circuit_breaker(
        timeout: Option<Duration>,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs.saturating_mul(2)),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);

        ReqwestTransport {
            circuit_breaker: Some(Config::new().failure_policy(policy).build()),
            ..Self::new(timeout)
        }
    }

    /// Returns the current state of the circuit breaker, if one is installed.
    pub fn circuit_state(&self) -> Option<&'static str> {
        self.circuit_breaker.as_ref().map(|breaker| {
            if breaker.is_call_permitted() {
                "closed"
            } else {
                "open"
            }
        })
    }

    async fn send(client: Client, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = client
            .request(request.method, &request.url)
            .header("Content-Type", "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.to_string());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportFailure::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Server errors count against the breaker but are still handed back intact.
enum Tripped {
    Failure(TransportFailure),
    ServerError(HttpResponse),
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let Some(breaker) = &self.circuit_breaker else {
            return Self::send(self.client.clone(), request).await;
        };

        let client = self.client.clone();
        let result = breaker
            .call(async move {
                match Self::send(client, request).await {
                    Ok(response) if response.status >= 500 => Err(Tripped::ServerError(response)),
                    Ok(response) => Ok(response),
                    Err(failure) => Err(Tripped::Failure(failure)),
                }
            })
            .await;

        match result {
            Ok(response) => Ok(response),
            Err(FailsafeError::Rejected) => Err(TransportFailure::CircuitOpen),
            Err(FailsafeError::Inner(Tripped::ServerError(response))) => Ok(response),
            Err(FailsafeError::Inner(Tripped::Failure(failure))) => Err(failure),
        }
    }
}
