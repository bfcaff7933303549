//! Endpoint health poller. Probes every configured endpoint concurrently,
//! classifies each outcome as data (a probe never throws), and keeps the
//! latest status set plus a bounded log of transitions.
//!
//! Probes deliberately bypass the request wrapper's retry policy: a health
//! check that fails once is reported failed immediately, because retrying it
//! would mask real degradation and delay the aggregate signal.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::ErrorBody;
use crate::health::{
    aggregate, dedup_by_name, AggregateHealth, EndpointDescriptor, EndpointStatus, Health,
    HealthEvent, OverallStatus,
};
use crate::http::compose_url;
use crate::http::transport::{HttpTransport, TransportRequest};

/// Transitions kept for display. Oldest entries are dropped on overflow.
pub const EVENT_LOG_CAPACITY: usize = 50;

pub struct HealthPoller {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_version: String,
    probe_timeout: Duration,
    poll_interval: Duration,
    endpoints: Vec<EndpointDescriptor>,
    statuses: Mutex<BTreeMap<String, EndpointStatus>>,
    events: Mutex<VecDeque<HealthEvent>>,
    last_overall: Mutex<Option<OverallStatus>>,
    refresh: Notify,
}

impl HealthPoller {
    /// Builds a poller over a descriptor list. Duplicate names are dropped
    /// (first wins) and every endpoint starts out `unknown`.
    pub fn new(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        endpoints: Vec<EndpointDescriptor>,
    ) -> Self {
        let endpoints = dedup_by_name(endpoints);
        let statuses = endpoints
            .iter()
            .map(|d| (d.name.clone(), EndpointStatus::unknown(&d.name)))
            .collect();
        Self {
            transport,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            probe_timeout: config.probe_timeout,
            poll_interval: config.poll_interval,
            endpoints,
            statuses: Mutex::new(statuses),
            events: Mutex::new(VecDeque::new()),
            last_overall: Mutex::new(None),
            refresh: Notify::new(),
        }
    }

    /// Current aggregate, recomputed from the latest status set.
    pub fn snapshot(&self) -> AggregateHealth {
        let statuses = self.statuses.lock().unwrap();
        aggregate(&statuses)
    }

    /// Latest transitions, oldest first.
    pub fn recent_events(&self) -> Vec<HealthEvent> {
        self.events.lock().unwrap().iter().cloned().collect()
    }

    /// Asks the run loop to poll immediately and restart its interval, so a
    /// scheduled poll never fires right after a manual one.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Runs one full cycle: all probes in flight at once, aggregation only
    /// after every probe has settled. Wall-clock cost is the slowest probe,
    /// not the sum.
    pub async fn poll_once(&self) -> AggregateHealth {
        let probes = self.endpoints.iter().map(|d| self.probe(d));
        let results = join_all(probes).await;
        self.apply(results);
        self.snapshot()
    }

    /// Initial poll, then a recurring interval until cancelled. Manual
    /// refreshes reset the schedule.
    pub async fn run(&self, cancel: CancellationToken) {
        self.poll_once().await;

        let mut interval = tokio::time::interval_at(
            tokio::time::Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("health poller stopping");
                    break;
                }
                _ = interval.tick() => {
                    self.poll_once().await;
                }
                _ = self.refresh.notified() => {
                    debug!("manual refresh requested");
                    self.poll_once().await;
                    interval.reset();
                }
            }
        }
    }

    /// Probes one endpoint. Every failure mode becomes an `EndpointStatus`;
    /// this function cannot fail.
    async fn probe(&self, descriptor: &EndpointDescriptor) -> EndpointStatus {
        let request = TransportRequest {
            method: descriptor.method,
            url: compose_url(&self.base_url, &self.api_version, &descriptor.path),
            headers: Vec::new(),
            body: None,
            timeout: self.probe_timeout,
        };

        let mut status = EndpointStatus::unknown(&descriptor.name);
        status.checked_at_ms = Utc::now().timestamp_millis();

        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => {
                let (health, details, metrics) = classify_healthy_body(&response.body);
                status.health = health;
                status.http_status = Some(response.status);
                status.details = details;
                status.metrics = metrics;
            }
            Ok(response) => {
                let body = if response.is_json() {
                    serde_json::from_slice(&response.body)
                        .map(ErrorBody::Json)
                        .unwrap_or_else(|_| {
                            ErrorBody::Text(String::from_utf8_lossy(&response.body).to_string())
                        })
                } else {
                    ErrorBody::Text(String::from_utf8_lossy(&response.body).trim().to_string())
                };
                warn!(endpoint = %descriptor.name, status = response.status, "probe returned failure status");
                status.health = Health::Unhealthy;
                status.http_status = Some(response.status);
                status.details = Some(body.message());
            }
            Err(error) => {
                warn!(endpoint = %descriptor.name, error = %error, "probe transport failure");
                status.health = Health::Unhealthy;
                status.http_status = None;
                status.details = Some(error.to_string());
            }
        }

        status
    }

    /// Merges a cycle's results into the status map, clamping timestamps so
    /// a result never back-dates an endpoint, and recording transitions.
    fn apply(&self, results: Vec<EndpointStatus>) {
        let mut statuses = self.statuses.lock().unwrap();
        let mut events = self.events.lock().unwrap();

        for mut result in results {
            if let Some(previous) = statuses.get(&result.endpoint) {
                result.checked_at_ms = result.checked_at_ms.max(previous.checked_at_ms);
                if previous.health != result.health {
                    debug!(
                        endpoint = %result.endpoint,
                        from = ?previous.health,
                        to = ?result.health,
                        "endpoint health changed"
                    );
                    events.push_back(HealthEvent {
                        endpoint: result.endpoint.clone(),
                        from: previous.health,
                        to: result.health,
                        at_ms: result.checked_at_ms,
                    });
                    while events.len() > EVENT_LOG_CAPACITY {
                        events.pop_front();
                    }
                }
            }
            statuses.insert(result.endpoint.clone(), result);
        }

        let overall = aggregate(&statuses).overall;
        drop(statuses);
        drop(events);

        let mut last = self.last_overall.lock().unwrap();
        if *last != Some(overall) {
            info!(overall = overall.as_str(), "aggregate health changed");
            *last = Some(overall);
        }
    }
}

/// Classifies a 2xx probe body. A parseable JSON object may downgrade the
/// endpoint via its `status` field; everything else on a 2xx is healthy.
/// Fields other than `status` are carried through as unvalidated metrics.
fn classify_healthy_body(
    body: &[u8],
) -> (
    Health,
    Option<String>,
    serde_json::Map<String, serde_json::Value>,
) {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(mut map)) => {
            let reported = map
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or("ok")
                .to_lowercase();
            let message = map
                .get("message")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            map.remove("status");

            let health = match reported.as_str() {
                "warning" | "degraded" => Health::Degraded,
                "error" | "unhealthy" => Health::Unhealthy,
                _ => Health::Healthy,
            };
            let details = match health {
                Health::Healthy => None,
                _ => message.or(Some(format!("service reported '{reported}'"))),
            };
            (health, details, map)
        }
        _ => (Health::Healthy, None, serde_json::Map::new()),
    }
}
