//! Incoming HTTP request type.

use http::{Extensions, Method};
use tracing::warn;

/// An incoming HTTP request with its body fully read.
///
/// Besides the wire data, every request carries typed [`Extensions`]: the
/// place where one middleware layer leaves values for the layers (and the
/// handler) inside it.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) extensions: Extensions,
}

impl Request {
    /// A request with no headers and an empty body.
    ///
    /// The server builds requests itself; this is for driving an
    /// [`Endpoint`](crate::Endpoint) directly, e.g. in tests.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
            extensions: Extensions::new(),
        }
    }

    pub(crate) fn from_parts(parts: http::request::Parts, body: Vec<u8>) -> Self {
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| match v.to_str() {
                Ok(v) => Some((k.as_str().to_owned(), v.to_owned())),
                Err(_) => {
                    warn!(header = %k, "dropping request header whose value is not visible ASCII");
                    None
                }
            })
            .collect();
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers,
            body,
            extensions: parts.extensions,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the extension of type `T`, if a layer inserted one.
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    /// Stores `value`, returning the previous value of the same type.
    pub fn insert_extension<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    pub fn extensions(&self) -> &Extensions { &self.extensions }
    pub fn extensions_mut(&mut self) -> &mut Extensions { &mut self.extensions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::GET, "/")
            .with_header("X-Request-Id", "abc");

        assert_eq!(req.header("x-request-id"), Some("abc"));
        assert_eq!(req.header("X-REQUEST-ID"), Some("abc"));
        assert_eq!(req.header("missing"), None);
    }

    #[test]
    fn extensions_replace_by_type() {
        #[derive(Clone, Debug, PartialEq)]
        struct User(&'static str);

        let mut req = Request::new(Method::GET, "/");
        assert!(req.extension::<User>().is_none());

        assert_eq!(req.insert_extension(User("alice")), None);
        assert_eq!(req.insert_extension(User("bob")), Some(User("alice")));
        assert_eq!(req.extension::<User>(), Some(&User("bob")));
    }

    #[test]
    fn from_parts_keeps_path_without_query() {
        let (parts, ()) = http::Request::builder()
            .method(Method::POST)
            .uri("/users?page=2")
            .header("content-type", "application/json")
            .body(())
            .unwrap()
            .into_parts();

        let req = Request::from_parts(parts, b"{}".to_vec());

        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.path(), "/users");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.body(), b"{}");
    }

    #[test]
    fn from_parts_drops_opaque_header_values() {
        let (parts, ()) = http::Request::builder()
            .uri("/")
            .header("authorization", "Bearer t")
            .header("x-raw", http::HeaderValue::from_bytes(b"caf\xe9").unwrap())
            .body(())
            .unwrap()
            .into_parts();

        let req = Request::from_parts(parts, Vec::new());

        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(req.header("x-raw"), None);
        assert_eq!(req.headers().len(), 1);
    }

    #[test]
    fn with_body_replaces_body() {
        let req = Request::new(Method::PUT, "/users/1")
            .with_body("first")
            .with_body(b"second".to_vec());

        assert_eq!(req.body(), b"second");
        assert_eq!(req.method(), &Method::PUT);
    }

    #[test]
    fn extensions_mut_is_shared_with_typed_lookup() {
        #[derive(Clone, Debug, PartialEq)]
        struct Tenant(u32);

        let mut req = Request::new(Method::GET, "/");
        req.extensions_mut().insert(Tenant(7));

        assert_eq!(req.extension::<Tenant>(), Some(&Tenant(7)));
        assert_eq!(req.extensions().len(), 1);

        req.extensions_mut().remove::<Tenant>();
        assert!(req.extension::<Tenant>().is_none());
    }
}
