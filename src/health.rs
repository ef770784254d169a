//! Health-check handler.
//!
//! `GET /health` answers `{"status":"Healthy","timestamp":"…"}` with the
//! current UTC time from the injected [`Clock`](crate::Clock). The service has
//! no dependencies to check, so if it can respond at all it is healthy.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::Json;
use crate::{Capabilities, Request};

#[derive(Clone, Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn check(_req: Request, caps: Capabilities) -> Json<HealthStatus> {
    Json(HealthStatus { status: "Healthy", timestamp: caps.clock.now_utc() })
}
