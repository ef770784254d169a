//! # apiprobe
//!
//! A mock HTTP API for exercising latency monitoring. Every endpoint returns
//! canned or synthesized data; what differs between them is *how long* they
//! take and *how* they spend that time:
//!
//! - `GET /`, `/health`, `/api/users`, `/api/users/{id}` answer immediately.
//! - `POST /api/users` blocks its worker thread before answering.
//! - `GET /api/slow` suspends on a timer, leaving the worker free.
//! - `GET /api/error` answers with a `500`.
//!
//! A [`TimingMiddleware`](middleware::TimingMiddleware) wraps the router and
//! logs method, path, status and elapsed milliseconds for every request,
//! including `404`s.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apiprobe::{Capabilities, Server, api, config::Delays};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apiprobe::Error> {
//!     let app = api::app(&Capabilities::system(), Delays::default());
//!     Server::bind("127.0.0.1:8080".parse().unwrap()).await?.serve(app).await
//! }
//! ```

mod clock;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod api;
pub mod config;
pub mod env;
pub mod health;
pub mod logging;
pub mod middleware;

pub use clock::{Capabilities, Clock, IdSource, RandomIds, SystemClock};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Problem, Response, ResponseBuilder};
pub use router::{ParamKind, Router, Service};
pub use server::Server;
