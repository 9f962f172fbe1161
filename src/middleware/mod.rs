//! Middleware layer.
//!
//! A [`Middleware`] is a function from handler to handler: it receives the
//! inner [`Endpoint`] and returns a new one that does something around it.
//! That is the right place for cross-cutting concerns: structured tracing,
//! request-id injection, and authentication-header inspection.
//!
//! Middleware is stacked with a [`Train`](crate::Train). The train decides
//! the order; a middleware only ever sees the one handler directly inside it.
//!
//! Built-in middleware:
//! - [`trace`] — per-request span with method and path; logs status and latency

mod trace;

pub use trace::trace;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::handler::{Endpoint, Handler};
use crate::request::Request;
use crate::response::IntoResponse;

type WrapFn = dyn Fn(Endpoint) -> Endpoint + Send + Sync + 'static;

/// A handler decorator.
///
/// Cloning is cheap: clones share the same wrapping function.
///
/// # Example
///
/// ```rust
/// use trainware::{Endpoint, Middleware, Request, Response};
/// use http::StatusCode;
///
/// let require_auth = Middleware::from_fn(|req: Request, next: Endpoint| async move {
///     if req.header("authorization").is_none() {
///         return Response::status(StatusCode::UNAUTHORIZED);
///     }
///     next.call(req).await
/// });
/// ```
#[derive(Clone)]
pub struct Middleware(Arc<WrapFn>);

impl Middleware {
    /// Builds a middleware from a function that wraps the inner handler.
    ///
    /// `wrap` runs once per [`Train::apply`](crate::Train::apply), not once per
    /// request. Per-request work belongs in the handler it returns.
    pub fn new<F, H>(wrap: F) -> Self
    where
        F: Fn(Endpoint) -> H + Send + Sync + 'static,
        H: Handler,
    {
        Self(Arc::new(move |next| wrap(next).into_endpoint()))
    }

    /// Builds a middleware from an async function that receives the request
    /// and the inner handler.
    ///
    /// Code before `next.call(req).await` runs on the way in, code after it on
    /// the way out. Returning without calling `next` short-circuits the layers
    /// inside.
    pub fn from_fn<F, Fut, R>(f: F) -> Self
    where
        F: Fn(Request, Endpoint) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next: Endpoint| {
            let f = Arc::clone(&f);
            move |req: Request| (*f)(req, next.clone())
        })
    }

    /// Wraps `next` in this layer.
    pub fn wrap(&self, next: impl Handler) -> Endpoint {
        (self.0)(next.into_endpoint())
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware")
            .field(&Arc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::{Method, StatusCode};

    use super::*;
    use crate::response::Response;

    async fn ok(_req: Request) -> &'static str {
        "ok"
    }

    fn require_header(name: &'static str) -> Middleware {
        Middleware::from_fn(move |req: Request, next: Endpoint| async move {
            if req.header(name).is_none() {
                return Response::status(StatusCode::UNAUTHORIZED);
            }
            next.call(req).await
        })
    }

    #[tokio::test]
    async fn from_fn_short_circuits() {
        let endpoint = require_header("authorization").wrap(ok);

        let denied = endpoint.call(Request::new(Method::GET, "/")).await;
        assert_eq!(denied.status_code(), StatusCode::UNAUTHORIZED);

        let allowed = endpoint
            .call(Request::new(Method::GET, "/").with_header("Authorization", "Bearer t"))
            .await;
        assert_eq!(allowed.status_code(), StatusCode::OK);
        assert_eq!(allowed.body(), b"ok");
    }

    #[tokio::test]
    async fn from_fn_can_edit_response_on_the_way_out() {
        let tag = Middleware::from_fn(|req: Request, next: Endpoint| async move {
            let mut res = next.call(req).await;
            res.insert_header("x-layer", "tag");
            res
        });

        let res = tag.wrap(ok).call(Request::new(Method::GET, "/")).await;
        assert_eq!(res.header("x-layer"), Some("tag"));
        assert_eq!(res.body(), b"ok");
    }

    #[tokio::test]
    async fn new_runs_once_per_wrap_not_per_request() {
        let wraps = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wraps);
        let mw = Middleware::new(move |next: Endpoint| {
            counter.fetch_add(1, Ordering::SeqCst);
            next
        });

        let endpoint = mw.wrap(ok);
        assert_eq!(wraps.load(Ordering::SeqCst), 1);

        for _ in 0..3 {
            endpoint.call(Request::new(Method::GET, "/")).await;
        }
        assert_eq!(wraps.load(Ordering::SeqCst), 1);
    }
}
