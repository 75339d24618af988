//! Unified error type.

use std::fmt;

/// The error type returned by accord's header parsers.
///
/// The decision engines themselves never fail: an absent header is `None`,
/// not an error. `Error` only surfaces when a raw header value cannot be
/// turned into an [`EntityTag`](crate::EntityTag),
/// [`Timestamp`](crate::Timestamp) or [`AcceptEntry`](crate::AcceptEntry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Not a valid `entity-tag` or `entity-tag` list.
    InvalidEntityTag(String),
    /// Not a valid HTTP-date.
    InvalidDate(String),
    /// Accept entry without a `type/subtype` media range.
    InvalidMediaType(String),
    /// `q` parameter that is not a number in `0..=1`.
    InvalidQuality(String),
    /// Header value with bytes outside visible ASCII.
    NonAsciiHeader(http::HeaderName),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntityTag(v) => write!(f, "invalid entity-tag: {v:?}"),
            Self::InvalidDate(v) => write!(f, "invalid HTTP-date: {v:?}"),
            Self::InvalidMediaType(v) => write!(f, "invalid media type: {v:?}"),
            Self::InvalidQuality(v) => write!(f, "invalid quality value: {v:?}"),
            Self::NonAsciiHeader(name) => write!(f, "non-ASCII value in header `{name}`"),
        }
    }
}

impl std::error::Error for Error {}
