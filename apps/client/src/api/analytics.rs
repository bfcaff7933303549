use uuid::Uuid;

use crate::errors::ApiError;
use crate::http::ApiClient;
use crate::models::{EngagementStats, PerformanceReport, PortfolioMetrics, TrackEvent};

pub async fn metrics(client: &ApiClient, portfolio_id: Uuid) -> Result<PortfolioMetrics, ApiError> {
    client
        .get_typed(&format!("analytics/metrics/{portfolio_id}"))
        .await
}

pub async fn engagement(
    client: &ApiClient,
    portfolio_id: Uuid,
) -> Result<EngagementStats, ApiError> {
    client
        .get_typed(&format!("analytics/engagement/{portfolio_id}"))
        .await
}

pub async fn performance(
    client: &ApiClient,
    portfolio_id: Uuid,
) -> Result<PerformanceReport, ApiError> {
    client
        .get_typed(&format!("analytics/performance/{portfolio_id}"))
        .await
}

/// Fire-and-forget event report; the response body is ignored.
pub async fn track_event(client: &ApiClient, event: &TrackEvent) -> Result<(), ApiError> {
    client.post("analytics/events", event).await?;
    Ok(())
}
