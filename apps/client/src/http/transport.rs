//! HTTP transport abstraction. The request wrapper and the health poller
//! talk to this trait, never to reqwest directly, so both are testable with
//! scripted in-memory transports.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// Request payload. JSON bodies are pre-serialized by the caller so a
/// non-serializable value fails before any transport work happens.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Bytes),
    Multipart {
        field: String,
        file_name: String,
        content: Bytes,
        mime: String,
    },
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

/// A response that made it back, whatever its status.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }
}

/// Failure with no response at all. Status-bearing failures are not
/// transport errors; they come back as a `TransportResponse`.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport failure: {0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest)
        -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by reqwest with a shared connection pool.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_idle_timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { client })
    }

    fn classify_error(e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        debug!(method = request.method.as_str(), url = %request.url, "HTTP request start");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Patch => self.client.patch(&request.url),
            Method::Delete => self.client.delete(&request.url),
        }
        .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            Some(RequestBody::Json(bytes)) => builder
                .header("Content-Type", "application/json")
                .body(bytes),
            Some(RequestBody::Multipart {
                field,
                file_name,
                content,
                mime,
            }) => {
                let part = reqwest::multipart::Part::bytes(content.to_vec())
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| TransportError::Other(e.to_string()))?;
                builder.multipart(reqwest::multipart::Form::new().part(field, part))
            }
            None => builder,
        };

        let response = builder.send().await.map_err(|e| Self::classify_error(&e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;

        debug!(status, bytes = body.len(), "HTTP request complete");

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}
