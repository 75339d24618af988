use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use accord::{Handler, Negotiator, Request, Response};
use bytes::Bytes;
use http::StatusCode;
use http::header::{ACCEPT, CONTENT_TYPE};

fn request(accept: Option<&str>) -> Request {
    let mut builder = http::Request::get("/users/1");
    if let Some(accept) = accept {
        builder = builder.header(ACCEPT, accept);
    }
    Request::from(builder.body(Bytes::new()).unwrap())
}

async fn as_json(_req: Request) -> Response {
    Response::json(&br#"{"id":1}"#[..])
}

async fn as_text(_req: Request) -> Response {
    Response::text("user 1")
}

fn users() -> Negotiator {
    Negotiator::new()
        .on("application/json", as_json)
        .on("text/plain", as_text)
}

fn content_type(response: &Response) -> &str {
    response.headers()[CONTENT_TYPE].to_str().unwrap()
}

#[tokio::test]
async fn picks_highest_quality() {
    let response = users()
        .respond(request(Some("text/plain;q=0.5, application/json;q=0.9")))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");
}

#[tokio::test]
async fn zero_quality_registered_type_still_dispatches() {
    let response = users().respond(request(Some("application/json;q=0"))).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(content_type(&response), "application/json");

    let response = users()
        .respond(request(Some("application/json;q=0, text/plain;q=0.1")))
        .await;
    assert_eq!(content_type(&response), "text/plain; charset=utf-8");
}

#[tokio::test]
async fn quoted_commas_do_not_split_accept_entries() {
    let response = users()
        .respond(request(Some(r#"text/plain;foo="a,b";q=0.1, application/json;q=0.5"#)))
        .await;
    assert_eq!(content_type(&response), "application/json");
}

#[tokio::test]
async fn unknown_type_gets_406() {
    let response = users().respond(request(Some("application/xml"))).await;
    assert_eq!(response.status_code(), StatusCode::NOT_ACCEPTABLE);
    assert!(response.body().is_empty());
}

#[tokio::test]
async fn custom_fallback() {
    let negotiator = users().fallback(|req: Request| async move {
        Response::builder()
            .status(StatusCode::NOT_ACCEPTABLE)
            .text(format!("cannot produce {}", req.header("accept").unwrap_or("?")))
    });
    let response = negotiator.respond(request(Some("image/png"))).await;
    assert_eq!(response.status_code(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.body().as_ref(), b"cannot produce image/png");
}

#[tokio::test]
async fn missing_accept_uses_first_registration() {
    let negotiator = users();
    for _ in 0..3 {
        let response = negotiator.respond(request(None)).await;
        assert_eq!(content_type(&response), "application/json");
    }

    let reversed = Negotiator::new()
        .on("text/plain", as_text)
        .on("application/json", as_json);
    let response = reversed.respond(request(None)).await;
    assert_eq!(content_type(&response), "text/plain; charset=utf-8");
}

#[tokio::test]
async fn garbage_accept_behaves_like_missing() {
    let response = users().respond(request(Some("nonsense"))).await;
    assert_eq!(content_type(&response), "application/json");
}

#[tokio::test]
async fn invokes_exactly_one_handler_once() {
    let calls = Arc::new([AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)]);

    let counting = |i: usize| {
        let calls = Arc::clone(&calls);
        move |_req: Request| {
            calls[i].fetch_add(1, Ordering::SeqCst);
            async { StatusCode::OK }
        }
    };
    let negotiator = Negotiator::new()
        .on("application/json", counting(0))
        .on("text/plain", counting(1))
        .fallback(counting(2));

    negotiator.respond(request(Some("text/plain, application/json"))).await;
    negotiator.respond(request(Some("application/xml"))).await;

    let counts: Vec<_> = calls.iter().map(|c| c.load(Ordering::SeqCst)).collect();
    assert_eq!(counts, [0, 1, 1]);
}

#[tokio::test]
async fn negotiator_as_handler_is_shareable() {
    let handler = users().into_handler();
    let nested = Negotiator::new()
        .on("text/csv", |_req: Request| async {
            Response::builder().bytes("text/csv", "a,b")
        })
        .fallback(handler);

    let mut tasks = tokio::task::JoinSet::new();
    let nested = Arc::new(nested);
    for accept in ["text/csv", "text/plain", "application/json"] {
        let nested = Arc::clone(&nested);
        tasks.spawn(async move { nested.respond(request(Some(accept))).await });
    }

    let mut types = Vec::new();
    while let Some(response) = tasks.join_next().await {
        types.push(content_type(&response.unwrap()).to_owned());
    }
    types.sort();
    assert_eq!(
        types,
        ["application/json", "text/csv", "text/plain; charset=utf-8"]
    );
}

#[test]
fn lists_media_types_in_registration_order() {
    let types: Vec<_> = users().media_types().map(str::to_owned).collect();
    assert_eq!(types, ["application/json", "text/plain"]);
}

fn assert_handler(_: impl Handler) {}

#[test]
fn async_fns_are_handlers() {
    assert_handler(as_json);
    assert_handler(users().into_handler());
}
