//! Minimal accord example: one negotiated resource with ETag revalidation.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! The requests below are built by hand; a real host would convert each
//! incoming `http::Request` with `Request::from` and send back
//! `Response::into_inner()`.

use accord::{EntityTag, Negotiator, Request, Response, SystemClock, Timestamp};
use bytes::Bytes;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let user = Negotiator::new()
        .on("application/json", user_json)
        .on("text/plain", user_text);

    let requests = [
        ("no Accept", vec![]),
        ("prefers text", vec![("accept", "application/json;q=0.5, text/plain")]),
        ("wants xml", vec![("accept", "application/xml")]),
        (
            "revalidating json",
            vec![("accept", "application/json"), ("if-none-match", "\"user-42-v7\"")],
        ),
    ];

    for (label, headers) in requests {
        let mut builder = http::Request::get("/users/42");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let req = Request::from(builder.body(Bytes::new()).expect("valid request"));

        let response = user.respond(req).await.into_inner();
        println!("{label:>18}: {} {:?}", response.status(), response.headers());
    }
}

// GET /users/42 as JSON, revalidated by ETag and Last-Modified.
async fn user_json(req: Request) -> Response {
    let etag = EntityTag::strong("user-42-v7");
    let modified = Timestamp::from_unix_secs(1_700_000_000);

    req.validate_preconditions(Some(etag), Some(modified), &SystemClock)
        .respond(|| Response::json(&br#"{"id":42,"name":"alice"}"#[..]))
}

// GET /users/42 as text. Weak tag: the rendering may change without the user changing.
async fn user_text(req: Request) -> Response {
    req.validate_preconditions(Some(EntityTag::weak("user-42-v7")), None, &SystemClock)
        .respond(|| "user 42: alice")
}
