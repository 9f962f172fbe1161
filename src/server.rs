//! HTTP server and graceful shutdown.
//!
//! The server hosts one composed handler, usually the output of
//! [`Train::apply`](crate::Train::apply). It knows nothing about middleware:
//! every request goes straight to the outermost layer.
//!
//! # Graceful shutdown
//!
//! On shutdown the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Tells every open connection to shut down: idle keep-alive connections
//!    close at once, busy ones after their current request.
//! 3. Returns from [`Server::serve`] once every connection has closed.

use std::future::Future;
use std::net::SocketAddr;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::handler::{Endpoint, Handler};
use crate::request::Request;
use crate::response::Response;

enum Listen {
    Addr(String),
    Bound(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listen: Listen,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called. An invalid `host:port` string is reported by `serve`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use trainware::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { listen: Listen::Addr(addr.into()) }
    }

    /// Serves on a listener that is already bound, e.g. one bound to port 0
    /// whose address the caller needs to know.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listen: Listen::Bound(listener) }
    }

    /// Starts accepting connections and dispatching them to `handler`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve(self, handler: impl Handler) -> Result<(), Error> {
        self.serve_with_shutdown(handler, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but shuts down when `signal` resolves.
    pub async fn serve_with_shutdown<S>(self, handler: impl Handler, signal: S) -> Result<(), Error>
    where
        S: Future<Output = ()>,
    {
        let listener = match self.listen {
            Listen::Bound(listener) => listener,
            Listen::Addr(addr) => {
                let parsed: SocketAddr = addr.parse().map_err(|e| Error::InvalidAddr(addr, e))?;
                TcpListener::bind(parsed).await?
            }
        };
        let endpoint = handler.into_endpoint();

        info!(addr = %listener.local_addr()?, "trainware listening");

        let builder = ConnBuilder::new(TokioExecutor::new());
        let graceful = GracefulShutdown::new();
        let mut tasks = tokio::task::JoinSet::new();
        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a signal stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let endpoint = endpoint.clone();
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| dispatch(endpoint.clone(), req));
                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());

                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Idle keep-alive connections close now; busy ones finish their
        // current request first.
        graceful.shutdown().await;
        while tasks.join_next().await.is_some() {}

        info!("trainware stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Reads one request body and hands the request to the composed handler.
///
/// Never fails towards hyper: an unreadable body becomes `400 Bad Request`.
async fn dispatch(
    endpoint: Endpoint,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes().to_vec(),
        Err(e) => {
            warn!(method = %parts.method, path = parts.uri.path(), "failed to read request body: {e}");
            return Ok(Response::status(http::StatusCode::BAD_REQUEST).into_inner());
        }
    };

    debug!(method = %parts.method, path = parts.uri.path(), "dispatching request");
    let response = endpoint.call(Request::from_parts(parts, body)).await;

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available. A signal that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_addr_is_an_error() {
        async fn ok(_req: Request) -> &'static str { "ok" }

        let err = Server::bind("not-an-address")
            .serve_with_shutdown(ok, std::future::ready(()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidAddr(ref addr, _) if addr == "not-an-address"));
    }

    #[tokio::test]
    async fn resolved_signal_stops_immediately() {
        async fn ok(_req: Request) -> &'static str { "ok" }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Server::from_listener(listener)
            .serve_with_shutdown(ok, std::future::ready(()))
            .await
            .unwrap();
    }
}
