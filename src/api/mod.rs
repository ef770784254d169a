//! The mock API: route table and the middleware wrapped around it.
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | GET  | `/`                  | plain-text greeting |
//! | GET  | `/health`            | status + current UTC time |
//! | GET  | `/api/users`         | fixed list of three users |
//! | GET  | `/api/users/{id}`    | synthesized user, `400` if `id` is not an `i32` |
//! | POST | `/api/users`         | echoes the JSON body, blocks the worker first |
//! | GET  | `/api/slow`          | suspends on a timer, then answers |
//! | GET  | `/api/error`         | `500` problem details |

pub mod demo;
pub mod users;

use http::Method;

use crate::config::Delays;
use crate::middleware::{RequestMetrics, TimingMiddleware};
use crate::{Capabilities, Request, Router, health};

pub const GREETING: &str = "Hello World! API is running.";

/// The route table without any middleware.
pub fn routes(caps: &Capabilities, delays: Delays) -> Router {
    let health_caps = caps.clone();
    let create_caps = caps.clone();

    Router::new()
        .on(Method::GET, "/", root)
        .on(Method::GET, "/health", move |req: Request| health::check(req, health_caps.clone()))
        .on(Method::GET, "/api/users", users::list)
        .on(Method::GET, "/api/users/{id:int}", users::get)
        .on(Method::POST, "/api/users", move |req: Request| {
            users::create(req, create_caps.clone(), delays.blocking)
        })
        .on(Method::GET, "/api/slow", move |req: Request| demo::slow(req, delays.slow))
        .on(Method::GET, "/api/error", demo::error)
}

/// The full application: [`routes`] wrapped in request timing.
pub fn app(caps: &Capabilities, delays: Delays) -> Router {
    routes(caps, delays).layer(TimingMiddleware::new(caps.clock.clone()))
}

/// [`app`], with every timing record also fed into `metrics`.
pub fn app_with_metrics(caps: &Capabilities, delays: Delays, metrics: &RequestMetrics) -> Router {
    routes(caps, delays)
        .layer(TimingMiddleware::new(caps.clock.clone()).also_record(metrics.clone()))
}

async fn root(_req: Request) -> &'static str {
    GREETING
}
