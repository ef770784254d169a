//! Synthetic user endpoints. Nothing is stored: every record is built for
//! the request that asked for it.

use std::time::Duration;

use http::StatusCode;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::response::{ContentType, IntoResponse, Json, Problem, Response};
use crate::{Capabilities, Request};

/// Upper bound (exclusive) for ids handed out by [`create`].
pub const ID_SPACE: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl User {
    fn new(id: i32, name: &str, email: &str) -> Self {
        Self { id, name: name.to_owned(), email: email.to_owned() }
    }

    /// The record served for `GET /api/users/{id}`.
    pub fn synthesize(id: i32) -> Self {
        Self { id, name: format!("User {id}"), email: format!("user{id}@example.com") }
    }
}

/// `GET /api/users`
pub async fn list(_req: Request) -> Json<Vec<User>> {
    Json(vec![
        User::new(1, "John Doe", "john@example.com"),
        User::new(2, "Jane Smith", "jane@example.com"),
        User::new(3, "Bob Johnson", "bob@example.com"),
    ])
}

/// `GET /api/users/{id:int}`
pub async fn get(req: Request) -> Response {
    match req.param_as::<i32>("id") {
        Some(id) => Json(User::synthesize(id)).into_response(),
        None => Problem::new(StatusCode::BAD_REQUEST)
            .detail("Missing or invalid parameter \"id\".")
            .into_response(),
    }
}

/// `POST /api/users`
///
/// Accepts any JSON document and echoes it back verbatim. Holds the worker
/// thread for `delay` with a blocking sleep before answering.
pub async fn create(req: Request, caps: Capabilities, delay: Duration) -> Response {
    let payload: Box<RawValue> = match serde_json::from_slice(req.body()) {
        Ok(payload) => payload,
        Err(e) => {
            return Problem::new(StatusCode::BAD_REQUEST)
                .detail(format!("Request body is not valid JSON: {e}"))
                .into_response();
        }
    };

    // Blocks the runtime worker on purpose: no `.await` here.
    std::thread::sleep(delay);

    let id = caps.ids.next_id(ID_SPACE);
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", &format!("/api/users/{id}"))
        .bytes(ContentType::Json, payload.get().to_owned())
}
