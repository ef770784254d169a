//! In-process request counters, aggregated from timing records.
//!
//! One entry per `(method, path, status)`: request count plus total, min and
//! max latency. Status `>= 500` also counts as an error. The binary logs a
//! summary on shutdown, in the shape of the `api_requests` / `api_errors`
//! series a log-shipping collector would build from the timing lines.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::timing::{RequestTiming, TimingRecorder};

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct RouteKey {
    pub method: String,
    pub path: String,
    pub status: u16,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouteStats {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl RouteStats {
    fn observe(&mut self, elapsed: Duration) {
        if self.count == 0 || elapsed < self.min {
            self.min = elapsed;
        }
        self.max = self.max.max(elapsed);
        self.total += elapsed;
        self.count += 1;
    }

    /// Mean latency in whole milliseconds.
    pub fn mean_ms(&self) -> u64 {
        if self.count == 0 {
            return 0;
        }
        u64::try_from(self.total.as_millis() / u128::from(self.count)).unwrap_or(u64::MAX)
    }
}

/// Shared counters; clones feed the same table.
#[derive(Clone, Debug, Default)]
pub struct RequestMetrics {
    routes: Arc<Mutex<BTreeMap<RouteKey, RouteStats>>>,
}

impl RequestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries sorted by method, path, status.
    pub fn snapshot(&self) -> Vec<(RouteKey, RouteStats)> {
        match self.routes.lock() {
            Ok(routes) => routes.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Err(poisoned) => poisoned
                .into_inner()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Total requests with a `5xx` status.
    pub fn errors(&self) -> u64 {
        self.snapshot()
            .iter()
            .filter(|(key, _)| key.status >= 500)
            .map(|(_, stats)| stats.count)
            .sum()
    }

    /// Emits one `info` event per entry.
    pub fn log_summary(&self) {
        for (key, stats) in self.snapshot() {
            tracing::info!(
                method = %key.method,
                path = %key.path,
                status = key.status,
                count = stats.count,
                mean_ms = stats.mean_ms(),
                min_ms = u64::try_from(stats.min.as_millis()).unwrap_or(u64::MAX),
                max_ms = u64::try_from(stats.max.as_millis()).unwrap_or(u64::MAX),
                "request summary"
            );
        }
        tracing::info!(errors = self.errors(), "server errors");
    }
}

impl TimingRecorder for RequestMetrics {
    fn record(&self, timing: RequestTiming) {
        let key = RouteKey {
            method: timing.method.as_str().to_owned(),
            path: timing.path,
            status: timing.status,
        };
        let mut routes = match self.routes.lock() {
            Ok(routes) => routes,
            Err(poisoned) => poisoned.into_inner(),
        };
        routes.entry(key).or_default().observe(timing.elapsed);
    }
}
