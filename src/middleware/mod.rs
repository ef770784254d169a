//! Middleware layer.
//!
//! A middleware receives the request together with a [`Next`] continuation
//! standing for the rest of the pipeline. `Next::run` consumes the
//! continuation, so a layer can delegate at most once.
//!
//! Layers are attached with [`Router::layer`](crate::Router::layer) and wrap
//! the whole dispatcher. Built-in:
//! - [`TimingMiddleware`] — one timing record per request: method, path,
//!   status, latency
//!
//! Timing records go to [`TimingRecorder`]s: [`LogRecorder`] writes the log
//! line, [`RequestMetrics`] keeps per-route counters.

mod metrics;
mod timing;

use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

pub use metrics::{RequestMetrics, RouteKey, RouteStats};
pub use timing::{LogRecorder, RequestTiming, TimingMiddleware, TimingRecorder};

/// Logic that runs before and after the rest of the pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture;
}

/// The remainder of the pipeline after the current middleware.
pub struct Next {
    inner: BoxedHandler,
}

impl Next {
    pub async fn run(self, req: Request) -> Response {
        self.inner.call(req).await
    }
}

struct Layered {
    middleware: Arc<dyn Middleware>,
    inner: BoxedHandler,
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.inner) };
        self.middleware.handle(req, next)
    }
}

/// Wraps `endpoint` so that `layers[0]` runs first.
pub(crate) fn wrap(endpoint: BoxedHandler, layers: &[Arc<dyn Middleware>]) -> BoxedHandler {
    layers.iter().rev().fold(endpoint, |inner, middleware| {
        let layered: BoxedHandler = Arc::new(Layered { middleware: Arc::clone(middleware), inner });
        layered
    })
}
