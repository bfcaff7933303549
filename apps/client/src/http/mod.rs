/// API Client — the single point of entry for all PORTMAN backend calls.
///
/// ARCHITECTURAL RULE: No other module may drive the transport directly for
/// functional requests. All backend interactions MUST go through `ApiClient`
/// so retry, timeout, and error typing stay uniform. (The health poller is
/// the one deliberate exception: probes bypass retry by design.)
///
/// Worst-case latency for one logical call is bounded and documented:
/// approximately `sum(timeout + retry_delay * n)` over the configured
/// attempts. Callers surfacing loading UI should budget for that.
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{ApiError, ErrorBody};

pub mod transport;

use transport::{HttpTransport, Method, RequestBody, TransportRequest, TransportResponse};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Which failures are worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry every failure uniformly, HTTP and transport alike. A 4xx
    /// retried this way fails identically on every attempt; callers that
    /// want permanent failures to short-circuit opt into `TransientOnly`.
    #[default]
    AllFailures,
    /// Retry only transport failures and 5xx responses; 4xx is permanent.
    TransientOnly,
}

impl RetryPolicy {
    pub fn should_retry(&self, error: &ApiError) -> bool {
        match self {
            RetryPolicy::AllFailures => {
                matches!(error, ApiError::Http { .. } | ApiError::Network(_))
            }
            RetryPolicy::TransientOnly => error.is_transient(),
        }
    }
}

/// Retry/timeout parameters for one logical request. Immutable per call.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout: Duration,
    /// Total attempt budget, never less than 1.
    pub max_retries: u32,
    /// Linear backoff base: attempt N+1 starts `retry_delay * N` after
    /// attempt N fails.
    pub retry_delay: Duration,
    pub policy: RetryPolicy,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            policy: RetryPolicy::default(),
        }
    }
}

/// One logical request. Built by the convenience methods on `ApiClient`;
/// callers only touch this when they need per-call overrides.
#[derive(Debug, Clone)]
pub struct Call {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
    config: RequestConfig,
    cancel: Option<CancellationToken>,
}

impl Call {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
            config: RequestConfig::default(),
            cancel: None,
        }
    }

    /// Serializes `body` as JSON. Fails fast, before any network attempt,
    /// when the value is not representable.
    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(body).map_err(ApiError::Serialize)?;
        self.body = Some(RequestBody::Json(Bytes::from(bytes)));
        Ok(self)
    }

    pub fn with_multipart(mut self, field: &str, file_name: &str, mime: &str, content: Bytes) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content,
            mime: mime.to_string(),
        });
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Successful response payload, classified by content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Deserializes a JSON payload into an explicit type. Shape drift from
    /// the backend surfaces as `SchemaMismatch`, never as a propagated null.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            ResponseBody::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::SchemaMismatch(e.to_string()))
            }
            ResponseBody::Text(_) => Err(ApiError::SchemaMismatch(
                "expected a JSON response, got text".to_string(),
            )),
        }
    }
}

/// Composes `{base_url}/api/{version}/{path}`, tolerating stray slashes on
/// either side of the join.
pub fn compose_url(base_url: &str, version: &str, path: &str) -> String {
    format!(
        "{}/api/{}/{}",
        base_url.trim_end_matches('/'),
        version.trim_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_version: String,
    defaults: RequestConfig,
}

impl ApiClient {
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            defaults: RequestConfig {
                timeout: config.request_timeout,
                max_retries: config.max_retries.max(1),
                retry_delay: config.retry_delay,
                policy: RetryPolicy::default(),
            },
        }
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        compose_url(&self.base_url, &self.api_version, path)
    }

    pub fn defaults(&self) -> &RequestConfig {
        &self.defaults
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.send(Call::new(Method::Get, path)).await
    }

    pub async fn get_typed<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path).await?.into_typed()
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ResponseBody, ApiError> {
        self.send(Call::new(Method::Post, path).with_json(body)?).await
    }

    pub async fn post_typed<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.post(path, body).await?.into_typed()
    }

    /// Multipart file upload with external cancellation. Cancellation is
    /// terminal: the in-flight attempt is abandoned and no retry follows.
    pub async fn upload_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        file_name: &str,
        mime: &str,
        content: Bytes,
        cancel: CancellationToken,
    ) -> Result<T, ApiError> {
        self.send(
            Call::new(Method::Post, path)
                .with_multipart(field, file_name, mime, content)
                .with_cancel(cancel),
        )
        .await?
        .into_typed()
    }

    /// Executes one logical call with bounded sequential retry.
    ///
    /// Attempts run strictly one after another — attempt N+1 never starts
    /// before attempt N's failure is observed — so a retried POST can never
    /// race itself. Linear backoff between attempts; the final failure
    /// propagates with its last observed status and body.
    pub async fn send(&self, call: Call) -> Result<ResponseBody, ApiError> {
        let url = self.endpoint_url(&call.path);
        let max_attempts = call.config.max_retries.max(1);
        let mut last_error: Option<ApiError> = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = call.config.retry_delay * (attempt - 1);
                warn!(
                    url = %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "request failed, retrying after backoff"
                );
                if self.wait_or_cancelled(delay, call.cancel.as_ref()).await {
                    return Err(ApiError::Cancelled);
                }
            }

            let request = TransportRequest {
                method: call.method,
                url: url.clone(),
                headers: call.headers.clone(),
                body: call.body.clone(),
                timeout: call.config.timeout,
            };

            let outcome = match call.cancel.as_ref() {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(ApiError::Cancelled),
                        outcome = self.transport.execute(request) => outcome,
                    }
                }
                None => self.transport.execute(request).await,
            };

            let error = match outcome {
                Ok(response) if response.is_success() => {
                    debug!(url = %url, attempt, status = response.status, "request succeeded");
                    return decode_success(response);
                }
                Ok(response) => http_error(response),
                Err(transport_error) => ApiError::Network(transport_error.to_string()),
            };

            if !call.config.policy.should_retry(&error) {
                return Err(error);
            }
            last_error = Some(error);
        }

        Err(last_error
            .unwrap_or_else(|| ApiError::Network("request failed with no attempt recorded".to_string())))
    }

    /// Returns true when the cancellation token fired before the delay elapsed.
    async fn wait_or_cancelled(&self, delay: Duration, cancel: Option<&CancellationToken>) -> bool {
        match cancel {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                false
            }
        }
    }
}

/// Classifies a 2xx body: JSON content type parses to a structured value
/// (an empty body is an empty structured value, never a parse error);
/// anything else comes back as raw text.
fn decode_success(response: TransportResponse) -> Result<ResponseBody, ApiError> {
    if response.is_json() {
        if response.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(ResponseBody::Json(serde_json::Value::Null));
        }
        serde_json::from_slice(&response.body)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::SchemaMismatch(format!("invalid JSON in 2xx response: {e}")))
    } else {
        Ok(ResponseBody::Text(
            String::from_utf8_lossy(&response.body).to_string(),
        ))
    }
}

/// Builds the typed error for a non-success response, keeping whichever of
/// JSON/text the body actually is.
fn http_error(response: TransportResponse) -> ApiError {
    let body = if response.body.is_empty() {
        ErrorBody::Empty
    } else if response.is_json() {
        match serde_json::from_slice(&response.body) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(String::from_utf8_lossy(&response.body).to_string()),
        }
    } else {
        ErrorBody::Text(String::from_utf8_lossy(&response.body).to_string())
    };
    ApiError::Http {
        status: response.status,
        body,
    }
}
