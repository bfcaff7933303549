use serde_json::json;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::http::ApiClient;
use crate::models::{AtsAnalysis, AtsOptimization, AtsResume, AtsTemplate};

/// Scores a CV against ATS criteria, optionally targeting a job description.
pub async fn analyze(
    client: &ApiClient,
    cv_id: Uuid,
    job_description: Option<&str>,
) -> Result<AtsAnalysis, ApiError> {
    client
        .post_typed(
            "ats/analyze",
            &json!({ "cv_id": cv_id, "job_description": job_description }),
        )
        .await
}

pub async fn optimize(client: &ApiClient, cv_id: Uuid) -> Result<AtsOptimization, ApiError> {
    client
        .post_typed("ats/optimize", &json!({ "cv_id": cv_id }))
        .await
}

pub async fn templates(client: &ApiClient) -> Result<Vec<AtsTemplate>, ApiError> {
    client.get_typed("ats/templates").await
}

pub async fn generate(
    client: &ApiClient,
    cv_id: Uuid,
    template_id: &str,
) -> Result<AtsResume, ApiError> {
    client
        .post_typed(
            "ats/generate",
            &json!({ "cv_id": cv_id, "template_id": template_id }),
        )
        .await
}
