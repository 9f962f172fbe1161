//! Minimal trainware example: one handler behind a three-layer train.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i -H 'authorization: Bearer demo' http://localhost:3000/

use std::sync::atomic::{AtomicU64, Ordering};

use http::StatusCode;
use trainware::{middleware, Endpoint, Middleware, Request, Response, Server, Train};

#[derive(Clone)]
struct RequestId(String);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    // Innermost first: auth sees the request id, trace (outermost) sees everything.
    let base = Train::new()
        .add(require_auth())
        .add(request_id());

    let app = base
        .add(middleware::trace())
        .apply(hello);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// Tags the request with an id and echoes it back as `x-request-id`.
fn request_id() -> Middleware {
    Middleware::from_fn(|mut req: Request, next: Endpoint| async move {
        let id = req.header("x-request-id")
            .map(str::to_owned)
            .unwrap_or_else(|| NEXT_ID.fetch_add(1, Ordering::Relaxed).to_string());
        req.insert_extension(RequestId(id.clone()));

        let mut res = next.call(req).await;
        res.insert_header("x-request-id", &id);
        res
    })
}

// 401 unless an authorization header is present.
fn require_auth() -> Middleware {
    Middleware::from_fn(|req: Request, next: Endpoint| async move {
        if req.header("authorization").is_none() {
            return Response::status(StatusCode::UNAUTHORIZED);
        }
        next.call(req).await
    })
}

async fn hello(req: Request) -> Response {
    let id = req.extension::<RequestId>().map_or("-", |r| r.0.as_str());
    Response::text(format!("hello, request {id}\n"))
}
