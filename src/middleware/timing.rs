//! Per-request timing.

use std::sync::Arc;
use std::time::Duration;

use http::Method;

use super::{Middleware, Next};
use crate::clock::Clock;
use crate::handler::BoxFuture;
use crate::request::Request;

/// Timing of one finished request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTiming {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub elapsed: Duration,
}

impl RequestTiming {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Receives each [`RequestTiming`] exactly once.
pub trait TimingRecorder: Send + Sync + 'static {
    fn record(&self, timing: RequestTiming);
}

/// Emits one `info` event per request through `tracing`.
#[derive(Debug, Default)]
pub struct LogRecorder;

impl TimingRecorder for LogRecorder {
    fn record(&self, timing: RequestTiming) {
        tracing::info!(
            method = %timing.method,
            path = %timing.path,
            status = timing.status,
            elapsed_ms = timing.elapsed_ms(),
            "request completed"
        );
    }
}

/// Measures every request end to end and reports it to a [`TimingRecorder`].
///
/// Purely an observer: the response passes through untouched, whatever its
/// status.
pub struct TimingMiddleware {
    clock: Arc<dyn Clock>,
    recorders: Arc<[Arc<dyn TimingRecorder>]>,
}

impl TimingMiddleware {
    /// Times with `clock` and logs through [`LogRecorder`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, recorders: Arc::new([Arc::new(LogRecorder) as Arc<dyn TimingRecorder>]) }
    }

    /// Replaces every recorder with `recorder`.
    pub fn with_recorder(mut self, recorder: impl TimingRecorder) -> Self {
        self.recorders = Arc::new([Arc::new(recorder) as Arc<dyn TimingRecorder>]);
        self
    }

    /// Adds `recorder` next to the existing ones.
    pub fn also_record(mut self, recorder: impl TimingRecorder) -> Self {
        let mut recorders = self.recorders.to_vec();
        recorders.push(Arc::new(recorder));
        self.recorders = recorders.into();
        self
    }
}

impl Middleware for TimingMiddleware {
    fn handle(&self, req: Request, next: Next) -> BoxFuture {
        let clock = Arc::clone(&self.clock);
        let recorders = Arc::clone(&self.recorders);
        let method = req.method().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            let start = clock.monotonic();
            let res = next.run(req).await;
            let elapsed = clock.monotonic().saturating_sub(start);

            let timing = RequestTiming {
                method,
                path,
                status: res.status_code().as_u16(),
                elapsed,
            };
            for recorder in recorders.iter() {
                recorder.record(timing.clone());
            }
            res
        })
    }
}
