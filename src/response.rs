//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`]; the host turns it into an
//! `http::Response` with [`Response::into_inner`] and writes it out.

use bytes::Bytes;
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// # Shortcuts (200 OK, no custom headers needed)
///
/// ```rust
/// use accord::Response;
/// use http::StatusCode;
///
/// Response::json(br#"{"id":1}"#.to_vec());
/// Response::text("hello");
/// Response::status(StatusCode::NOT_ACCEPTABLE);
/// ```
///
/// # Builder (custom status or headers)
///
/// ```rust
/// use accord::Response;
/// use http::StatusCode;
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .bytes("application/xml", b"<ok/>".to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK`, `application/json`.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Converts into the `http` crate's response, ready for a hyper service.
    pub fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut response = http::Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header. Names or values that are not valid HTTP are dropped
    /// with a `warn` event.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(name, "dropping invalid response header"),
        }
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(HeaderValue::from_static("application/json"), body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(
            HeaderValue::from_static("text/plain; charset=utf-8"),
            Bytes::from(body.into()),
        )
    }

    /// Terminate with a body of any media type, typically the one chosen by
    /// negotiation.
    pub fn bytes(self, content_type: &str, body: impl Into<Bytes>) -> Response {
        match HeaderValue::try_from(content_type) {
            Ok(value) => self.finish(value, body.into()),
            Err(_) => {
                tracing::warn!(content_type, "dropping invalid content-type");
                self.no_body_with(body.into())
            }
        }
    }

    /// Terminate with no body (e.g. `204 No Content`, `304 Not Modified`).
    pub fn no_body(self) -> Response {
        self.no_body_with(Bytes::new())
    }

    fn no_body_with(self, body: Bytes) -> Response {
        Response { status: self.status, headers: self.headers, body }
    }

    fn finish(mut self, content_type: HeaderValue, body: Bytes) -> Response {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.no_body_with(body)
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}
