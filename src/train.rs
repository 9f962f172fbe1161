//! The middleware train.
//!
//! A [`Train`] is an ordered list of [`Middleware`] that is folded onto a
//! handler in one go. Every `add` hands back a fresh train, so one base can be
//! extended along several branches without the branches seeing each other.
//!
//! # Ordering
//!
//! [`Train::apply`] wraps in insertion order: the first middleware added wraps
//! the handler directly, the next one wraps that, and so on. The **last**
//! middleware added is therefore the outermost layer: it runs first on an
//! incoming request and last on the outgoing response.
//!
//! ```text
//! Train::new().add(a).add(b).add(c).apply(h)   ==   c(b(a(h)))
//!
//! request  ──▶ c ──▶ b ──▶ a ──▶ h
//! response ◀── c ◀── b ◀── a ◀──┘
//! ```

use std::fmt;

use tracing::debug;

use crate::handler::{not_found, Endpoint, Handler};
use crate::middleware::Middleware;

/// An ordered, immutable stack of middleware.
///
/// ```rust
/// use trainware::{middleware, Request, Train};
///
/// async fn hello(_req: Request) -> &'static str { "hello" }
///
/// let base = Train::new().add(middleware::trace());
/// let app = base.add(None).apply(hello);
/// ```
#[derive(Clone)]
pub struct Train {
    layers: Vec<Middleware>,
    fallback: Endpoint,
}

impl Train {
    /// An empty train whose fallback handler is [`not_found`].
    pub fn new() -> Self {
        Self::with_fallback(not_found)
    }

    /// An empty train that uses `fallback` when
    /// [`apply_or_default`](Train::apply_or_default) is given no handler.
    pub fn with_fallback(fallback: impl Handler) -> Self {
        Self { layers: Vec::new(), fallback: fallback.into_endpoint() }
    }

    /// Returns a new train with `middleware` appended as the new outermost
    /// layer. `None` yields an unchanged copy.
    ///
    /// `self` is never modified; the new train gets its own storage.
    pub fn add(&self, middleware: impl Into<Option<Middleware>>) -> Self {
        let Some(middleware) = middleware.into() else {
            return self.clone();
        };

        let mut layers = Vec::with_capacity(self.layers.len() + 1);
        layers.extend(self.layers.iter().cloned());
        layers.push(middleware);

        Self { layers, fallback: self.fallback.clone() }
    }

    /// Same as calling [`add`](Train::add) for each item in order. `None`
    /// items are skipped.
    pub fn add_many<I>(&self, middleware: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Option<Middleware>>,
    {
        middleware.into_iter().fold(self.clone(), |train, mw| train.add(mw))
    }

    /// Folds the train onto `handler` and returns the composed handler.
    ///
    /// Only wraps: no handler or per-request middleware code runs here.
    /// Applying an empty train returns `handler` itself.
    pub fn apply(&self, handler: impl Handler) -> Endpoint {
        debug!(layers = self.layers.len(), "applying middleware train");
        self.layers.iter().fold(handler.into_endpoint(), |inner, mw| mw.wrap(inner))
    }

    /// Like [`apply`](Train::apply), substituting the train's fallback handler
    /// when `handler` is `None`.
    pub fn apply_or_default(&self, handler: Option<Endpoint>) -> Endpoint {
        let handler = handler.unwrap_or_else(|| {
            debug!("no handler given, applying train to fallback");
            self.fallback.clone()
        });
        self.apply(handler)
    }

    /// Number of middleware in the train.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for Train {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for Train {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Train")
            .field("layers", &self.layers.len())
            .finish_non_exhaustive()
    }
}
