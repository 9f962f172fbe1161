//! # trainware
//!
//! Ordered, immutable middleware trains for async HTTP handlers.
//!
//! ## The contract
//!
//! A [`Middleware`] turns one handler into another. A [`Train`] is an ordered
//! list of them. [`Train::apply`] folds the list onto a terminal handler in
//! insertion order, so the **last** middleware added ends up outermost and
//! sees each request first.
//!
//! - `add` never mutates: it returns a new train, so one base train can be
//!   extended along several routes independently, from any thread.
//! - `add(None)` is a no-op; an absent middleware is never called.
//! - Applying an empty train returns the handler itself.
//! - [`Train::apply_or_default`] substitutes an explicitly injected fallback
//!   handler (`404 Not Found` unless set with [`Train::with_fallback`]).
//!
//! Routing, TLS, and request limits are not part of this crate. [`Server`]
//! is a thin hyper host for the composed handler.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use trainware::{middleware, Endpoint, Middleware, Request, Response, Server, Train};
//!
//! #[tokio::main]
//! async fn main() {
//!     let require_auth = Middleware::from_fn(|req: Request, next: Endpoint| async move {
//!         if req.header("authorization").is_none() {
//!             return Response::status(StatusCode::UNAUTHORIZED);
//!         }
//!         next.call(req).await
//!     });
//!
//!     // trace is added last, so it is outermost and also sees rejected requests.
//!     let app = Train::new()
//!         .add(require_auth)
//!         .add(middleware::trace())
//!         .apply(hello);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn hello(_req: Request) -> &'static str {
//!     "hello"
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod server;
mod train;

pub mod middleware;

pub use error::Error;
pub use handler::{not_found, BoxFuture, Endpoint, Handler};
pub use middleware::Middleware;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use server::Server;
pub use train::Train;
