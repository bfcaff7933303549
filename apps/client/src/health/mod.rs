//! Backend health model: per-endpoint status, pure aggregation with
//! error > warning > ok precedence, and the fixed endpoint registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::transport::Method;

pub mod poller;

/// Observed condition of a single endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Healthy,
    /// Responding, but the endpoint itself reports trouble.
    Degraded,
    Unhealthy,
    /// Not probed yet.
    Unknown,
}

/// Three-level overall signal shown to operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Warning,
    Error,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Ok => "ok",
            OverallStatus::Warning => "warning",
            OverallStatus::Error => "error",
        }
    }
}

/// A named endpoint to probe. Built once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    pub name: String,
    pub path: String,
    pub method: Method,
}

impl EndpointDescriptor {
    pub fn get(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            method: Method::Get,
        }
    }
}

/// Latest observation for one endpoint. Overwritten every poll cycle; no
/// history lives here (transitions go to the event log instead).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStatus {
    pub endpoint: String,
    pub health: Health,
    /// None when no response was received.
    pub http_status: Option<u16>,
    pub details: Option<String>,
    /// Resource metrics some service endpoints attach (response times,
    /// counts, usage percentages). Surfaced verbatim, never validated.
    pub metrics: serde_json::Map<String, serde_json::Value>,
    pub checked_at_ms: i64,
}

impl EndpointStatus {
    pub fn unknown(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            health: Health::Unknown,
            http_status: None,
            details: None,
            metrics: serde_json::Map::new(),
            checked_at_ms: 0,
        }
    }
}

/// Aggregate picture across all endpoints. Derived on every read from the
/// current status set, never stored or partially updated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateHealth {
    pub overall: OverallStatus,
    /// Endpoints currently not healthy, each counted once.
    pub issue_count: usize,
    pub endpoints: BTreeMap<String, EndpointStatus>,
    pub summary: String,
}

/// A health transition kept in the bounded rolling event log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthEvent {
    pub endpoint: String,
    pub from: Health,
    pub to: Health,
    pub at_ms: i64,
}

/// Derives the aggregate from a status set. Pure: the same input always
/// yields the same output, so re-reading without a new poll is idempotent.
///
/// Precedence is exactly error > warning > ok: any unhealthy endpoint makes
/// the whole system "error"; otherwise any unknown or degraded endpoint
/// makes it "warning"; an empty set is vacuously "ok".
pub fn aggregate(statuses: &BTreeMap<String, EndpointStatus>) -> AggregateHealth {
    let total = statuses.len();
    let unhealthy = statuses
        .values()
        .filter(|s| s.health == Health::Unhealthy)
        .count();
    let attention = statuses
        .values()
        .filter(|s| matches!(s.health, Health::Degraded | Health::Unknown))
        .count();

    let overall = if unhealthy > 0 {
        OverallStatus::Error
    } else if attention > 0 {
        OverallStatus::Warning
    } else {
        OverallStatus::Ok
    };

    let issue_count = unhealthy + attention;

    let summary = if total == 0 {
        "no endpoints configured".to_string()
    } else if issue_count == 0 {
        format!("all {total} endpoints healthy")
    } else {
        format!("{issue_count} of {total} endpoints reporting issues")
    };

    AggregateHealth {
        overall,
        issue_count,
        endpoints: statuses.clone(),
        summary,
    }
}

/// The fixed probe list: root health, aggregate system status, and one
/// check per backend service.
pub fn default_endpoints() -> Vec<EndpointDescriptor> {
    let mut endpoints = vec![
        EndpointDescriptor::get("api", "health"),
        EndpointDescriptor::get("system", "status"),
    ];
    for service in [
        "cv",
        "portfolio",
        "ats",
        "analytics",
        "users",
        "ai",
        "logs",
        "endpoints",
    ] {
        endpoints.push(EndpointDescriptor::get(service, &format!("{service}/health")));
    }
    endpoints
}

/// Drops descriptors whose name was already seen; first occurrence wins.
pub fn dedup_by_name(descriptors: Vec<EndpointDescriptor>) -> Vec<EndpointDescriptor> {
    let mut seen = std::collections::BTreeSet::new();
    descriptors
        .into_iter()
        .filter(|d| seen.insert(d.name.clone()))
        .collect()
}
