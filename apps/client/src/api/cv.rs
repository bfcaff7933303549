use bytes::Bytes;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::http::ApiClient;
use crate::models::{CvAnalysis, CvData, CvUploadResponse};

/// Uploads a CV file for extraction. Long-running; the cancellation token
/// aborts the transfer and suppresses retries.
pub async fn upload(
    client: &ApiClient,
    file_name: &str,
    content: Bytes,
    cancel: CancellationToken,
) -> Result<CvUploadResponse, ApiError> {
    client
        .upload_typed(
            "cv/upload",
            "file",
            file_name,
            "application/octet-stream",
            content,
            cancel,
        )
        .await
}

/// Fetches the structured parse of an uploaded CV.
pub async fn parse(client: &ApiClient, cv_id: Uuid) -> Result<CvData, ApiError> {
    client.get_typed(&format!("cv/{cv_id}/parse")).await
}

/// Runs the AI review over a parsed CV.
pub async fn analyze(client: &ApiClient, cv_id: Uuid) -> Result<CvAnalysis, ApiError> {
    client
        .post_typed(&format!("cv/{cv_id}/analyze"), &json!({}))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::config::Config;
    use crate::http::transport::{
        HttpTransport, RequestBody, TransportError, TransportRequest, TransportResponse,
    };

    struct CaptureTransport {
        response_body: String,
        last_request: Mutex<Option<TransportRequest>>,
    }

    #[async_trait]
    impl HttpTransport for CaptureTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok(TransportResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: Bytes::from(self.response_body.clone()),
            })
        }
    }

    fn client_with(transport: Arc<CaptureTransport>) -> ApiClient {
        let config = Config {
            base_url: "http://backend.test".to_string(),
            api_version: "v1".to_string(),
            request_timeout: std::time::Duration::from_secs(5),
            max_retries: 1,
            retry_delay: std::time::Duration::from_millis(100),
            probe_timeout: std::time::Duration::from_secs(2),
            poll_interval: std::time::Duration::from_secs(120),
            state_file: None,
            rust_log: "info".to_string(),
        };
        ApiClient::new(&config, transport)
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_to_the_upload_route() {
        let cv_id = Uuid::new_v4();
        let transport = Arc::new(CaptureTransport {
            response_body: format!(
                r#"{{"cv_id":"{cv_id}","file_name":"resume.pdf","uploaded_at":"2026-08-07T10:00:00Z"}}"#
            ),
            last_request: Mutex::new(None),
        });
        let client = client_with(transport.clone());

        let response = upload(
            &client,
            "resume.pdf",
            Bytes::from_static(b"%PDF-1.4"),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(response.cv_id, cv_id);

        let request = transport.last_request.lock().unwrap().take().unwrap();
        assert_eq!(request.url, "http://backend.test/api/v1/cv/upload");
        match request.body {
            Some(RequestBody::Multipart {
                field, file_name, ..
            }) => {
                assert_eq!(field, "file");
                assert_eq!(file_name, "resume.pdf");
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parse_decodes_into_cv_data() {
        let cv_id = Uuid::new_v4();
        let transport = Arc::new(CaptureTransport {
            response_body: format!(
                r#"{{"cv_id":"{cv_id}","file_name":"resume.pdf","contact":{{"name":"Dana Smith"}},"summary":null}}"#
            ),
            last_request: Mutex::new(None),
        });
        let client = client_with(transport);

        let cv = parse(&client, cv_id).await.unwrap();
        assert_eq!(cv.contact.name, "Dana Smith");
        assert!(cv.experience.is_empty());
    }
}
