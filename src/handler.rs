//! Handler trait and type erasure.
//!
//! The router stores handlers of different concrete types in one table, and
//! the middleware chain wraps "the rest of the pipeline" without knowing what
//! it is. Both go through the same trait object:
//!
//! ```text
//! async fn get_user(req: Request) -> Response { … }   ← handler
//!        ↓ router.on(Method::GET, "/api/users/{id:int}", get_user)
//! get_user.into_boxed_handler()                       ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(get_user))                       ← BoxedHandler
//!        ↓
//! handler.call(req)                                   ← BoxFuture
//! ```
//!
//! Closures work too, which is how handlers receive their
//! [`Capabilities`](crate::Capabilities):
//!
//! ```rust,ignore
//! let caps = caps.clone();
//! router.on(Method::GET, "/health", move |req| health::check(req, caps.clone()));
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe dispatch interface shared by handlers, the router and
/// middleware layers.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied by any `Fn(Request) -> impl Future<Output = impl IntoResponse>`,
/// named `async fn` items and capturing closures alike. Sealed: only the
/// blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

/// Bridges a concrete handler `F` to [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
