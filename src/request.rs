//! Incoming HTTP request type.

use bytes::Bytes;
use http::header::{self, HeaderMap};
use http::{Method, Uri};

use crate::accept::{self, AcceptEntry};
use crate::conditionals::RequestConditionals;
use crate::entity_tag::EntityTag;
use crate::precondition::{self, Validation};
use crate::timestamp::{Clock, Timestamp};

/// An incoming HTTP request, already read into memory by the host.
pub struct Request {
    head: http::request::Parts,
    body: Bytes,
}

impl Request {
    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Header lookup. Values that are not visible ASCII read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name)?.to_str().ok()
    }

    /// Parsed `Accept` entries in header order. Empty when the header is
    /// missing or holds nothing usable.
    pub fn accept(&self) -> Vec<AcceptEntry> {
        self.head
            .headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(accept::parse)
            .collect()
    }

    /// Whether the client lists one of `media_types` with a non-zero weight.
    ///
    /// A request without an `Accept` header accepts none of them.
    pub fn accepts(&self, media_types: &[&str]) -> bool {
        self.accept().iter().any(|entry| {
            entry.quality() > 0.0
                && media_types.iter().any(|m| m.eq_ignore_ascii_case(entry.media_type()))
        })
    }

    /// Snapshot of the conditional headers; malformed ones read as absent.
    pub fn conditionals(&self) -> RequestConditionals {
        RequestConditionals::from_headers(&self.head.method, &self.head.headers)
    }

    /// Evaluates this request's preconditions against the current validators
    /// of the resource it targets.
    ///
    /// ```rust
    /// use accord::{EntityTag, Request, SystemClock};
    /// use bytes::Bytes;
    /// use http::StatusCode;
    ///
    /// let req = Request::from(
    ///     http::Request::get("/doc")
    ///         .header("if-none-match", "\"v1\"")
    ///         .body(Bytes::new())
    ///         .unwrap(),
    /// );
    /// let response = req
    ///     .validate_preconditions(Some(EntityTag::strong("v1")), None, &SystemClock)
    ///     .respond(|| "document body");
    /// assert_eq!(response.status_code(), StatusCode::NOT_MODIFIED);
    /// ```
    pub fn validate_preconditions(
        &self,
        etag: Option<EntityTag>,
        last_modified: Option<Timestamp>,
        clock: &impl Clock,
    ) -> Validation {
        let outcome = precondition::evaluate(
            etag.as_ref(),
            last_modified,
            &self.conditionals(),
            clock.now(),
        );
        Validation::new(outcome, etag, last_modified)
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (head, body) = req.into_parts();
        Self { head, body }
    }
}
