//! # accord
//!
//! Conditional requests and content negotiation for HTTP handlers.
//!
//! ## The contract
//!
//! The host server owns sockets, TLS, parsing and routing. accord owns two
//! decisions that every handler serving cacheable representations has to
//! make, and gets wrong in subtly different ways when written by hand:
//!
//! - **Preconditions**: should this request get the resource, a
//!   `304 Not Modified`, or a `412 Precondition Failed`? RFC 7232 §6
//!   precedence over `If-Match`, `If-Unmodified-Since`, `If-None-Match` and
//!   `If-Modified-Since`, with second-resolution date comparisons.
//! - **Negotiation**: which of the representations this handler can produce
//!   does the client prefer? Quality-weighted `Accept` matching, first entry
//!   wins ties, `406 Not Acceptable` when nothing fits.
//!
//! Both engines are pure functions over parsed header values
//! ([`evaluate`], [`select`]). [`Request`], [`Response`] and [`Negotiator`]
//! adapt them to `http` types.
//!
//! ## Quick start
//!
//! ```rust
//! use accord::{EntityTag, Negotiator, Request, Response, SystemClock, Timestamp};
//!
//! async fn get_user(req: Request) -> Response {
//!     let etag = EntityTag::strong("user-42-v7");
//!     let modified = Timestamp::from_unix_secs(1_700_000_000);
//!
//!     req.validate_preconditions(Some(etag), Some(modified), &SystemClock)
//!         .respond(|| Response::json(&br#"{"id":42}"#[..]))
//! }
//!
//! async fn get_user_text(_req: Request) -> Response {
//!     Response::text("user 42")
//! }
//!
//! let users = Negotiator::new()
//!     .on("application/json", get_user)
//!     .on("text/plain", get_user_text);
//! ```

mod conditionals;
mod entity_tag;
mod error;
mod handler;
mod negotiate;
mod precondition;
mod request;
mod response;
mod timestamp;

pub mod accept;

pub use accept::AcceptEntry;
pub use conditionals::RequestConditionals;
pub use entity_tag::{EntityTag, EntityTagList};
pub use error::Error;
pub use handler::Handler;
pub use negotiate::{MimeRules, Negotiator, Selection, negotiate, select};
pub use precondition::{PreconditionOutcome, Validation, evaluate};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use timestamp::{Clock, SystemClock, Timestamp};
