//! Endpoints that simulate a slow dependency and a failing one.

use std::time::Duration;

use http::StatusCode;
use serde::Serialize;

use crate::Request;
use crate::response::{Json, Problem};

#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// `GET /api/slow`
///
/// Suspends on a timer for `delay`. The worker is free to run other requests
/// in the meantime.
pub async fn slow(_req: Request, delay: Duration) -> Json<Message> {
    tokio::time::sleep(delay).await;
    Json(Message { message: "This was a slow operation" })
}

/// `GET /api/error`
pub async fn error(_req: Request) -> Problem {
    Problem::new(StatusCode::INTERNAL_SERVER_ERROR).detail("Simulated error")
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::response::IntoResponse;

    #[tokio::test(start_paused = true)]
    async fn slow_waits_for_the_full_delay() {
        let start = tokio::time::Instant::now();
        let Json(body) = slow(Request::new(Method::GET, "/api/slow"), Duration::from_secs(2)).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(body.message, "This was a slow operation");
    }

    #[tokio::test]
    async fn error_is_a_500_problem() {
        let res = error(Request::new(Method::GET, "/api/error")).await.into_response();
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["detail"], "Simulated error");
        assert_eq!(body["status"], 500);
    }
}
