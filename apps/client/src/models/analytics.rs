use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub portfolio_id: Uuid,
    pub views: u64,
    pub unique_visitors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub portfolio_id: Uuid,
    pub clicks: u64,
    pub cv_downloads: u64,
    pub contact_requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub portfolio_id: Uuid,
    pub avg_load_time_ms: u64,
    pub lighthouse_score: Option<u32>,
}

/// A client-side event reported to the analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub event_type: String,
    pub portfolio_id: Option<Uuid>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
