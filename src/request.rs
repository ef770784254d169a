//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;
use http_body_util::BodyExt;
use hyper::body::Incoming;

/// An incoming HTTP request.
///
/// Requests from the server arrive with their body still on the wire. It is
/// buffered inside the pipeline, below the middleware layers, so handlers see
/// the full body and middleware timing covers the upload.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Bytes,
    pub(crate) pending: Option<Incoming>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// A request with an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Bytes::new(),
            pending: None,
            params: HashMap::new(),
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Incoming) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            body: Bytes::new(),
            pending: Some(body),
            params: HashMap::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/users/{id:int}`, `req.param("id")` on `/api/users/42`
    /// returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a path parameter parsed as `T`.
    ///
    /// Typed route segments are already validated by the router, so this only
    /// yields `None` when the handler asks for a name the route does not have.
    pub fn param_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.param(key)?.parse().ok()
    }

    /// Reads a body still on the wire into memory. No-op for buffered bodies.
    pub(crate) async fn buffer_body(&mut self) -> Result<(), hyper::Error> {
        if let Some(incoming) = self.pending.take() {
            self.body = incoming.collect().await?.to_bytes();
        }
        Ok(())
    }
}
