//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! A middleware layer has to accept *any* inner handler and hand back a new
//! one, and a [`Train`](crate::Train) has to fold an arbitrary number of
//! those layers together. Each layer produces a different concrete type, so
//! every handler is erased behind `dyn ErasedHandler` and carried around as
//! an [`Endpoint`].
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }   ← user writes this
//!        ↓ train.apply(hello)
//! hello.into_endpoint()                            ← Handler blanket impl
//!        ↓
//! Endpoint(Arc::new(FnHandler(hello)))             ← heap-allocated wrapper
//!        ↓ middleware.wrap(endpoint)  × n layers
//! endpoint.call(req)  at request time              ← one vtable dispatch per layer
//!        ↓
//! Box::pin(async { hello(req).await.into_response() })  ← BoxFuture
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::StatusCode;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` lets tokio move the future across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface. Never named outside this module.
trait ErasedHandler: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// A type-erased handler shared across concurrent requests.
///
/// Cloning is one atomic increment. This is what [`Train::apply`] returns,
/// what a [`Middleware`] receives as its inner handler, and what the
/// [`Server`] dispatches to.
///
/// [`Train::apply`]: crate::Train::apply
/// [`Middleware`]: crate::Middleware
/// [`Server`]: crate::Server
#[derive(Clone)]
pub struct Endpoint(Arc<dyn ErasedHandler>);

impl Endpoint {
    /// Erases `handler` into an `Endpoint`. An `Endpoint` passed in comes
    /// back unchanged.
    pub fn new(handler: impl Handler) -> Self {
        handler.into_endpoint()
    }

    /// Invokes the handler. Nothing runs until the returned future is polled.
    pub fn call(&self, req: Request) -> BoxFuture {
        self.0.call(req)
    }

    /// `true` when both values point at the same underlying handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid request handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure returning a future) with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and for [`Endpoint`], so a composed handler can be wrapped again or handed
/// to the [`Server`](crate::Server).
///
/// The trait is **sealed**: only the impls in this module can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_endpoint(self) -> Endpoint;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

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
    fn into_endpoint(self) -> Endpoint {
        Endpoint(Arc::new(FnHandler(self)))
    }
}

impl private::Sealed for Endpoint {}

impl Handler for Endpoint {
    fn into_endpoint(self) -> Endpoint {
        self
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Fallback ──────────────────────────────────────────────────────────────────

/// Default fallback handler: `404 Not Found` for every request.
///
/// [`Train::new`](crate::Train::new) uses this when
/// [`apply_or_default`](crate::Train::apply_or_default) gets no handler.
pub async fn not_found(_req: Request) -> Response {
    Response::status(StatusCode::NOT_FOUND)
}
