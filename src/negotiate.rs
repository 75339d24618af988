//! Server-driven content negotiation (RFC 7231 §3.4.1).
//!
//! The server registers the media types it can produce, in order of its own
//! preference. For each request the client's `Accept` entries are scanned and
//! the registered type with the highest quality weight wins:
//!
//! - no `Accept` entries → the first registered type,
//! - equal weights → the entry listed first by the client,
//! - no entry names a registered type → the fallback (406 by default).
//!
//! Media types are matched by exact string; `*/*` only matches a rule that
//! was registered as `*/*`.

use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use crate::accept::AcceptEntry;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::Response;

// ── MimeRules ─────────────────────────────────────────────────────────────────

/// Insertion-ordered table from media type to whatever produces it.
///
/// Order matters only when the client states no preference: the first
/// inserted rule is the default.
///
/// Keys are normalized: surrounding whitespace is trimmed and the media type
/// is lower-cased, so `"Application/JSON"` and `"application/json"` name the
/// same rule. Accept entries are lower-cased the same way before lookup.
#[derive(Clone, Debug)]
pub struct MimeRules<T> {
    rules: Vec<(String, T)>,
}

impl<T> MimeRules<T> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule. Re-inserting a media type replaces its value in place and
    /// returns the old one; the rule keeps its original position.
    pub fn insert(&mut self, media_type: &str, value: T) -> Option<T> {
        let key = media_type.trim().to_ascii_lowercase();
        match self.rules.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.rules.push((key, value));
                None
            }
        }
    }

    /// Chaining form of [`insert`](Self::insert).
    pub fn with(mut self, media_type: &str, value: T) -> Self {
        self.insert(media_type, value);
        self
    }

    pub fn get(&self, media_type: &str) -> Option<&T> {
        self.rules
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(media_type))
            .map(|(_, v)| v)
    }

    /// The default rule.
    pub fn first(&self) -> Option<(&str, &T)> {
        self.rules.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn entry(&self, media_type: &str) -> Option<(&str, &T)> {
        self.rules
            .iter()
            .find(|(k, _)| k == media_type)
            .map(|(k, v)| (k.as_str(), v))
    }
}

impl<T> Default for MimeRules<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s, T> FromIterator<(&'s str, T)> for MimeRules<T> {
    fn from_iter<I: IntoIterator<Item = (&'s str, T)>>(iter: I) -> Self {
        let mut rules = Self::new();
        for (media_type, value) in iter {
            rules.insert(media_type, value);
        }
        rules
    }
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// What negotiation decided for one request.
#[derive(Debug, PartialEq)]
pub enum Selection<'a, T> {
    /// The client sent no usable `Accept` entries; the first rule applies.
    Default { media_type: &'a str, value: &'a T },
    /// The best registered type the client asked for.
    Matched { media_type: &'a str, quality: f32, value: &'a T },
    /// None of the client's entries names a registered media type.
    Unacceptable,
}

impl<'a, T> Selection<'a, T> {
    pub fn value(&self) -> Option<&'a T> {
        match *self {
            Self::Default { value, .. } | Self::Matched { value, .. } => Some(value),
            Self::Unacceptable => None,
        }
    }

    pub fn media_type(&self) -> Option<&'a str> {
        match *self {
            Self::Default { media_type, .. } | Self::Matched { media_type, .. } => Some(media_type),
            Self::Unacceptable => None,
        }
    }
}

/// Picks the rule to use for `accept`.
///
/// ```rust
/// use accord::{MimeRules, accept, select};
///
/// let rules: MimeRules<&str> = [("application/json", "json"), ("text/plain", "text")]
///     .into_iter()
///     .collect();
/// let entries = accept::parse("text/plain;q=0.5, application/json;q=0.9");
///
/// assert_eq!(select(&entries, &rules).value(), Some(&"json"));
/// ```
pub fn select<'a, T>(accept: &[AcceptEntry], rules: &'a MimeRules<T>) -> Selection<'a, T> {
    if accept.is_empty() {
        return match rules.first() {
            Some((media_type, value)) => Selection::Default { media_type, value },
            None => Selection::Unacceptable,
        };
    }

    // Strict `>` keeps the client's first entry on equal weights. Any
    // registered entry beats having none, `q=0` included.
    let mut best: Option<(f32, &'a str, &'a T)> = None;
    for entry in accept {
        let Some((media_type, value)) = rules.entry(entry.media_type()) else {
            continue;
        };
        if best.is_none_or(|(quality, _, _)| entry.quality() > quality) {
            best = Some((entry.quality(), media_type, value));
        }
    }
    match best {
        Some((quality, media_type, value)) => Selection::Matched { media_type, quality, value },
        None => Selection::Unacceptable,
    }
}

/// Resolves negotiation to exactly one of the rule values or `fallback`.
pub fn negotiate<'a, T>(
    accept: &[AcceptEntry],
    rules: &'a MimeRules<T>,
    fallback: &'a T,
) -> &'a T {
    select(accept, rules).value().unwrap_or(fallback)
}

// ── Negotiator ────────────────────────────────────────────────────────────────

/// Dispatches a request to the handler registered for the negotiated media
/// type.
///
/// Build it once at startup; it is shared read-only between requests.
///
/// ```rust,no_run
/// use accord::{Negotiator, Request, Response};
///
/// async fn as_json(_req: Request) -> Response { Response::json(&b"{}"[..]) }
/// async fn as_text(_req: Request) -> Response { Response::text("") }
///
/// let negotiator = Negotiator::new()
///     .on("application/json", as_json)
///     .on("text/plain", as_text);
/// ```
pub struct Negotiator {
    rules: MimeRules<BoxedHandler>,
    fallback: BoxedHandler,
}

impl Negotiator {
    /// No rules, and a fallback answering `406 Not Acceptable`.
    pub fn new() -> Self {
        Self {
            rules: MimeRules::new(),
            fallback: not_acceptable.into_boxed_handler(),
        }
    }

    /// Registers the handler producing `media_type`. Returns `self` for
    /// chaining. The first registration is the default for clients that send
    /// no `Accept` header.
    pub fn on(mut self, media_type: &str, handler: impl Handler) -> Self {
        self.rules.insert(media_type, handler.into_boxed_handler());
        self
    }

    /// Replaces the handler used when nothing registered is acceptable.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_boxed_handler();
        self
    }

    /// Media types in registration order.
    pub fn media_types(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(media_type, _)| media_type)
    }

    /// Invokes exactly one handler, once, and returns its response.
    pub async fn respond(&self, req: Request) -> Response {
        let accept = req.accept();
        let handler = match select(&accept, &self.rules) {
            Selection::Default { media_type, value }
            | Selection::Matched { media_type, value, .. } => {
                debug!(media_type, "negotiated response type");
                value
            }
            Selection::Unacceptable => {
                debug!(entries = accept.len(), "no acceptable response type");
                &self.fallback
            }
        };
        let handler = Arc::clone(handler);
        handler.call(req).await
    }

    /// Wraps the negotiator as a plain handler so it can be registered
    /// wherever one is expected, including inside another negotiator.
    pub fn into_handler(self) -> impl Handler {
        let this = Arc::new(self);
        move |req: Request| {
            let this = Arc::clone(&this);
            async move { this.respond(req).await }
        }
    }
}

impl Default for Negotiator {
    fn default() -> Self {
        Self::new()
    }
}

async fn not_acceptable(_req: Request) -> Response {
    Response::status(StatusCode::NOT_ACCEPTABLE)
}
