//! Request tracing middleware.

use std::time::Instant;

use tracing::{info, info_span, Instrument};

use super::Middleware;
use crate::handler::Endpoint;
use crate::request::Request;

/// Opens a `request` span (method, path) around every inner layer and logs
/// the status and latency once the response is ready.
///
/// The response passes through untouched. Put it last in the train so it
/// is the outermost layer and its latency covers every other layer.
pub fn trace() -> Middleware {
    Middleware::from_fn(|req: Request, next: Endpoint| async move {
        let method = req.method().clone();
        let path = req.path().to_owned();
        let span = info_span!("request", %method, %path);

        let start = Instant::now();
        let res = next.call(req).instrument(span.clone()).await;

        span.in_scope(|| {
            info!(
                status = res.status_code().as_u16(),
                latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                "request completed"
            );
        });
        res
    })
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::response::Response;

    async fn created(_req: Request) -> Response {
        Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/users/7")
            .json(br#"{"id":7}"#.to_vec())
    }

    #[tokio::test]
    async fn passes_response_through() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let res = trace()
            .wrap(created)
            .call(Request::new(Method::POST, "/users"))
            .await;

        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.header("location"), Some("/users/7"));
        assert_eq!(res.body(), br#"{"id":7}"#);
    }
}
