use serde_json::json;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::http::ApiClient;
use crate::models::{DeployResult, PortfolioConfig, PortfolioPreview, PortfolioSite, PortfolioTemplate};

pub async fn templates(client: &ApiClient) -> Result<Vec<PortfolioTemplate>, ApiError> {
    client.get_typed("portfolio/templates").await
}

pub async fn generate(
    client: &ApiClient,
    cv_id: Uuid,
    config: &PortfolioConfig,
) -> Result<PortfolioSite, ApiError> {
    client
        .post_typed(
            "portfolio/generate",
            &json!({ "cv_id": cv_id, "config": config }),
        )
        .await
}

pub async fn preview(
    client: &ApiClient,
    portfolio_id: Uuid,
) -> Result<PortfolioPreview, ApiError> {
    client
        .get_typed(&format!("portfolio/{portfolio_id}/preview"))
        .await
}

pub async fn deploy(client: &ApiClient, portfolio_id: Uuid) -> Result<DeployResult, ApiError> {
    client
        .post_typed(&format!("portfolio/{portfolio_id}/deploy"), &json!({}))
        .await
}
