//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Path segments may carry a
//! type constraint (`{id:int}`); a segment that fails its constraint is
//! rejected with `400` before any handler runs.
//!
//! The router is also where the middleware chain is attached. Layers wrap the
//! whole dispatcher, so they see matched routes, `404`s, `405`s and coercion
//! failures alike.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::{IntoResponse, Problem, Response};

/// Type constraint on a path parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamKind {
    /// A 32-bit signed integer.
    Int,
}

impl ParamKind {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            _ => None,
        }
    }

    fn accepts(self, value: &str) -> bool {
        match self {
            Self::Int => value.parse::<i32>().is_ok(),
        }
    }
}

struct Route {
    handler: BoxedHandler,
    constraints: Vec<(String, ParamKind)>,
}

/// The application router.
///
/// Build it once at startup, then turn it into a [`Service`] (done for you by
/// [`Server::serve`](crate::Server::serve)). Each builder call returns `self`
/// so registrations chain.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Route>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair.
    ///
    /// ```rust,no_run
    /// # use apiprobe::{Request, Response, Router};
    /// # use http::Method;
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/api/users/{id:int}", get_user)
    ///     .on(Method::POST, "/api/users",          create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting pattern, or an unknown constraint.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        let (pattern, constraints) = parse_pattern(path);
        let route = Route { handler: handler.into_boxed_handler(), constraints };
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern, route)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Append a middleware layer. The first layer added is the outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Freeze the routing table and wrap it in the middleware chain.
    ///
    /// The pipeline is `layers → body buffering → routing table`, so every
    /// layer observes body read failures and upload time too.
    pub fn into_service(self) -> Service {
        let table: BoxedHandler = Arc::new(Table { routes: self.routes });
        let endpoint: BoxedHandler = Arc::new(BufferBody { inner: table });
        Service(middleware::wrap(endpoint, &self.layers))
    }
}

/// Splits `{name:kind}` segments into a plain matchit pattern plus constraints.
fn parse_pattern(path: &str) -> (String, Vec<(String, ParamKind)>) {
    let mut constraints = Vec::new();
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| {
            let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
                return segment.to_owned();
            };
            match inner.split_once(':') {
                Some((name, kind)) => {
                    let kind = ParamKind::parse(kind)
                        .unwrap_or_else(|| panic!("unknown constraint `{kind}` in route `{path}`"));
                    constraints.push((name.to_owned(), kind));
                    format!("{{{name}}}")
                }
                None => segment.to_owned(),
            }
        })
        .collect();
    (segments.join("/"), constraints)
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Reads the request body off the connection before routing.
struct BufferBody {
    inner: BoxedHandler,
}

impl ErasedHandler for BufferBody {
    fn call(&self, mut req: Request) -> BoxFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if let Err(e) = req.buffer_body().await {
                tracing::warn!(method = %req.method, path = %req.path, "failed to read request body: {e}");
                return Problem::new(StatusCode::BAD_REQUEST)
                    .detail("Failed to read the request body.")
                    .into_response();
            }
            inner.call(req).await
        })
    }
}

/// Drops one trailing slash, so `/api/users/` routes like `/api/users`.
fn normalise(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    Rejected { name: String, value: String },
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

struct Table {
    routes: HashMap<Method, MatchitRouter<Route>>,
}

impl Table {
    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let path = normalise(path);
        let matched = self.routes.get(method).and_then(|tree| tree.at(path).ok());
        let Some(matched) = matched else {
            let mut allowed: Vec<Method> = self
                .routes
                .iter()
                .filter(|(_, tree)| tree.at(path).is_ok())
                .map(|(m, _)| m.clone())
                .collect();
            if allowed.is_empty() {
                return Lookup::NotFound;
            }
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            return Lookup::MethodNotAllowed(allowed);
        };

        let params: HashMap<String, String> = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        for (name, kind) in &matched.value.constraints {
            let value = params.get(name).map(String::as_str).unwrap_or_default();
            if !kind.accepts(value) {
                return Lookup::Rejected { name: name.clone(), value: value.to_owned() };
            }
        }

        Lookup::Found(Arc::clone(&matched.value.handler), params)
    }
}

impl ErasedHandler for Table {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(&req.method, &req.path) {
            Lookup::Found(handler, params) => {
                req.params = params;
                handler.call(req)
            }
            Lookup::Rejected { name, value } => {
                let res = Problem::new(StatusCode::BAD_REQUEST)
                    .detail(format!("Failed to bind parameter \"{name}\" from \"{value}\"."))
                    .into_response();
                Box::pin(async move { res })
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                let res = Response::builder()
                    .status(StatusCode::METHOD_NOT_ALLOWED)
                    .header("allow", &allow)
                    .no_body();
                Box::pin(async move { res })
            }
            Lookup::NotFound => Box::pin(async { Response::status(StatusCode::NOT_FOUND) }),
        }
    }
}

/// A frozen router with its middleware chain applied.
///
/// Cheap to clone; every clone shares the same routing table.
#[derive(Clone)]
pub struct Service(BoxedHandler);

impl Service {
    /// Run one request through the middleware chain and the router.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }
}
