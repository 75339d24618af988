//! Snapshot of a request's conditional headers.

use http::header::{self, HeaderMap, HeaderName};
use http::Method;
use tracing::warn;

use crate::entity_tag::EntityTagList;
use crate::error::Error;
use crate::timestamp::Timestamp;

/// The request facts the precondition evaluator looks at.
///
/// Usually read from headers with [`from_headers`](Self::from_headers); the
/// `with_*` setters build one by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestConditionals {
    pub if_match: Option<EntityTagList>,
    pub if_unmodified_since: Option<Timestamp>,
    pub if_none_match: Option<EntityTagList>,
    pub if_modified_since: Option<Timestamp>,
    pub method: Method,
}

impl RequestConditionals {
    /// No conditional headers at all.
    pub fn new(method: Method) -> Self {
        Self {
            if_match: None,
            if_unmodified_since: None,
            if_none_match: None,
            if_modified_since: None,
            method,
        }
    }

    pub fn with_if_match(mut self, tags: impl Into<EntityTagList>) -> Self {
        self.if_match = Some(tags.into());
        self
    }

    pub fn with_if_unmodified_since(mut self, at: Timestamp) -> Self {
        self.if_unmodified_since = Some(at);
        self
    }

    pub fn with_if_none_match(mut self, tags: impl Into<EntityTagList>) -> Self {
        self.if_none_match = Some(tags.into());
        self
    }

    pub fn with_if_modified_since(mut self, at: Timestamp) -> Self {
        self.if_modified_since = Some(at);
        self
    }

    /// The `*-Modified-Since` and `If-None-Match` → 304 rules only apply to
    /// safe retrievals.
    pub fn is_get_or_head(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Reads the four conditional headers, failing on the first malformed one.
    pub fn try_from_headers(method: &Method, headers: &HeaderMap) -> Result<Self, Error> {
        Ok(Self {
            if_match: tag_list(headers, header::IF_MATCH)?,
            if_unmodified_since: date(headers, header::IF_UNMODIFIED_SINCE)?,
            if_none_match: tag_list(headers, header::IF_NONE_MATCH)?,
            if_modified_since: date(headers, header::IF_MODIFIED_SINCE)?,
            method: method.clone(),
        })
    }

    /// Reads the four conditional headers. A malformed header is logged and
    /// treated as if the client had not sent it.
    pub fn from_headers(method: &Method, headers: &HeaderMap) -> Self {
        Self {
            if_match: lenient(tag_list(headers, header::IF_MATCH)),
            if_unmodified_since: lenient(date(headers, header::IF_UNMODIFIED_SINCE)),
            if_none_match: lenient(tag_list(headers, header::IF_NONE_MATCH)),
            if_modified_since: lenient(date(headers, header::IF_MODIFIED_SINCE)),
            method: method.clone(),
        }
    }
}

fn lenient<T>(parsed: Result<Option<T>, Error>) -> Option<T> {
    parsed.unwrap_or_else(|e| {
        warn!(error = %e, "ignoring malformed conditional header");
        None
    })
}

/// All lines of a list-valued header, combined as RFC 7230 §3.2.2 allows.
fn tag_list(headers: &HeaderMap, name: HeaderName) -> Result<Option<EntityTagList>, Error> {
    let mut combined: Option<EntityTagList> = None;
    for value in headers.get_all(&name) {
        let value = value.to_str().map_err(|_| Error::NonAsciiHeader(name.clone()))?;
        let list: EntityTagList = value.parse()?;
        combined = Some(match combined {
            Some(prev) => prev.merge(list),
            None => list,
        });
    }
    Ok(combined)
}

fn date(headers: &HeaderMap, name: HeaderName) -> Result<Option<Timestamp>, Error> {
    let Some(value) = headers.get(&name) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| Error::NonAsciiHeader(name.clone()))?;
    Timestamp::parse_http_date(value).map(Some)
}
