//! Conditional request evaluation (RFC 7232 §6).
//!
//! # Precedence
//!
//! The four headers are checked in a fixed order, threading a single running
//! [`PreconditionOutcome`] through them:
//!
//! ```text
//! If-Match            → sets the running result
//! If-Unmodified-Since → only if still NoConditionsSpecified
//! If-None-Match       → combined; ConditionFailed / ResourceNotModified stick
//! If-Modified-Since   → only if still NoConditionsSpecified (GET/HEAD only)
//! ```
//!
//! The evaluator is a pure function of its arguments. "Now" is passed in so
//! the future-date rules can be tested deterministically.

use http::StatusCode;
use http::header::{self, HeaderValue};
use tracing::debug;

use crate::conditionals::RequestConditionals;
use crate::entity_tag::{EntityTag, EntityTagList};
use crate::response::{IntoResponse, Response};
use crate::timestamp::Timestamp;

/// Result of evaluating a request's preconditions.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PreconditionOutcome {
    /// The request carried no (non-empty) conditional headers.
    NoConditionsSpecified,
    /// Every condition holds; process the request normally.
    AllConditionsMet,
    /// Answer `412 Precondition Failed`.
    ConditionFailed,
    /// Answer `304 Not Modified`.
    ResourceNotModified,
}

impl PreconditionOutcome {
    /// The short-circuit status for this outcome, `None` meaning "continue".
    pub fn status(self) -> Option<StatusCode> {
        match self {
            Self::NoConditionsSpecified | Self::AllConditionsMet => None,
            Self::ConditionFailed => Some(StatusCode::PRECONDITION_FAILED),
            Self::ResourceNotModified => Some(StatusCode::NOT_MODIFIED),
        }
    }

    /// Runs `next` only while nothing has been decided yet.
    pub fn or_else_if_unspecified(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::NoConditionsSpecified => next(),
            decided => decided,
        }
    }

    /// Combines with a later step. `ConditionFailed` and
    /// `ResourceNotModified` are final; a later `NoConditionsSpecified`
    /// leaves the running result alone.
    pub fn then(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::ConditionFailed | Self::ResourceNotModified => self,
            running => match next() {
                Self::NoConditionsSpecified => running,
                step => step,
            },
        }
    }
}

/// Decides how to answer a conditional request.
///
/// `etag` and `last_modified` describe the current representation of the
/// target resource; `None` means the resource has no such validator.
///
/// ```rust
/// use accord::{EntityTag, PreconditionOutcome, RequestConditionals, Timestamp, evaluate};
/// use http::Method;
///
/// let etag = EntityTag::strong("v2");
/// let req = RequestConditionals::new(Method::GET).with_if_none_match(EntityTag::weak("v2"));
///
/// let outcome = evaluate(Some(&etag), None, &req, Timestamp::now());
/// assert_eq!(outcome, PreconditionOutcome::ResourceNotModified);
/// ```
pub fn evaluate(
    etag: Option<&EntityTag>,
    last_modified: Option<Timestamp>,
    conditionals: &RequestConditionals,
    now: Timestamp,
) -> PreconditionOutcome {
    let now = now.truncated();
    let last_modified = last_modified.map(Timestamp::truncated);

    let outcome = if_match(etag, conditionals)
        .or_else_if_unspecified(|| if_unmodified_since(last_modified, conditionals, now))
        .then(|| if_none_match(etag, conditionals))
        .or_else_if_unspecified(|| if_modified_since(last_modified, conditionals, now));

    debug!(?outcome, method = %conditionals.method, "evaluated preconditions");
    outcome
}

fn present(list: Option<&EntityTagList>) -> Option<&EntityTagList> {
    list.filter(|l| !l.is_empty())
}

/// RFC 7232 §3.1
fn if_match(etag: Option<&EntityTag>, c: &RequestConditionals) -> PreconditionOutcome {
    let Some(expected) = present(c.if_match.as_ref()) else {
        return PreconditionOutcome::NoConditionsSpecified;
    };
    match etag {
        Some(etag) if expected.matches_strong(etag) => PreconditionOutcome::AllConditionsMet,
        _ => PreconditionOutcome::ConditionFailed,
    }
}

/// RFC 7232 §3.4. A date in the future is taken as satisfied.
fn if_unmodified_since(
    last_modified: Option<Timestamp>,
    c: &RequestConditionals,
    now: Timestamp,
) -> PreconditionOutcome {
    let Some(since) = c.if_unmodified_since.map(Timestamp::truncated) else {
        return PreconditionOutcome::NoConditionsSpecified;
    };
    match last_modified {
        None => PreconditionOutcome::AllConditionsMet,
        Some(modified) if since > now || since >= modified => PreconditionOutcome::AllConditionsMet,
        Some(_) => PreconditionOutcome::ConditionFailed,
    }
}

/// RFC 7232 §3.2
fn if_none_match(etag: Option<&EntityTag>, c: &RequestConditionals) -> PreconditionOutcome {
    let Some(unwanted) = present(c.if_none_match.as_ref()) else {
        return PreconditionOutcome::NoConditionsSpecified;
    };
    match etag {
        Some(etag) if unwanted.matches_weak(etag) => {
            if c.is_get_or_head() {
                PreconditionOutcome::ResourceNotModified
            } else {
                PreconditionOutcome::ConditionFailed
            }
        }
        _ => PreconditionOutcome::AllConditionsMet,
    }
}

/// RFC 7232 §3.3
fn if_modified_since(
    last_modified: Option<Timestamp>,
    c: &RequestConditionals,
    now: Timestamp,
) -> PreconditionOutcome {
    if !c.is_get_or_head() {
        return PreconditionOutcome::NoConditionsSpecified;
    }
    let Some(since) = c.if_modified_since.map(Timestamp::truncated) else {
        return PreconditionOutcome::NoConditionsSpecified;
    };
    match last_modified {
        None => PreconditionOutcome::AllConditionsMet,
        Some(modified) if since <= now && since < modified => PreconditionOutcome::AllConditionsMet,
        Some(_) => PreconditionOutcome::ResourceNotModified,
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// An evaluated request together with the validators it was checked against.
///
/// Obtained from [`Request::validate_preconditions`](crate::Request::validate_preconditions).
/// Whatever the outcome, responses built through a `Validation` carry the
/// resource's `ETag` and `Last-Modified` headers.
#[derive(Clone, Debug)]
pub struct Validation {
    outcome: PreconditionOutcome,
    etag: Option<EntityTag>,
    last_modified: Option<Timestamp>,
}

impl Validation {
    pub(crate) fn new(
        outcome: PreconditionOutcome,
        etag: Option<EntityTag>,
        last_modified: Option<Timestamp>,
    ) -> Self {
        Self { outcome, etag, last_modified }
    }

    pub fn outcome(&self) -> PreconditionOutcome {
        self.outcome
    }

    /// Writes `ETag` and `Last-Modified` (whole seconds) onto `response`.
    pub fn stamp(&self, response: &mut Response) {
        let headers = response.headers_mut();
        if let Some(etag) = &self.etag {
            // `EntityTag` only holds etagc bytes, which are valid header bytes.
            if let Ok(value) = HeaderValue::from_bytes(etag.to_string().as_bytes()) {
                headers.insert(header::ETAG, value);
            }
        }
        if let Some(date) = self.last_modified.and_then(|t| t.truncated().to_http_date()) {
            if let Ok(value) = HeaderValue::from_str(&date) {
                headers.insert(header::LAST_MODIFIED, value);
            }
        }
    }

    /// Answers `304`/`412` without calling `produce`, or calls it and returns
    /// its response. Either way the validators are stamped on.
    pub fn respond<R: IntoResponse>(self, produce: impl FnOnce() -> R) -> Response {
        let mut response = match self.outcome.status() {
            Some(status) => Response::status(status),
            None => produce().into_response(),
        };
        self.stamp(&mut response);
        response
    }
}
