use accord::{EntityTag, Negotiator, PreconditionOutcome, Request, Response, Timestamp};
use bytes::Bytes;
use http::header::{
    ACCEPT, ETAG, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE, LAST_MODIFIED,
};
use http::{Method, StatusCode};

fn now() -> Timestamp {
    Timestamp::from_unix_secs(1_700_000_000)
}

/// 2023-11-14T21:13:20Z, one hour before `now()`.
const MODIFIED_SECS: u64 = 1_699_996_400;

fn modified() -> Timestamp {
    Timestamp::from_unix_secs(MODIFIED_SECS)
}

fn request(method: Method, headers: &[(http::HeaderName, String)]) -> Request {
    let mut builder = http::Request::builder().method(method).uri("/doc");
    for (name, value) in headers {
        builder = builder.header(name, value.as_str());
    }
    Request::from(builder.body(Bytes::new()).unwrap())
}

fn date(t: Timestamp) -> String {
    t.to_http_date().unwrap()
}

fn respond(req: &Request) -> Response {
    req.validate_preconditions(Some(EntityTag::strong("v1")), Some(modified()), &now())
        .respond(|| Response::text("document"))
}

#[test]
fn plain_get_is_served_with_validators() {
    let response = respond(&request(Method::GET, &[]));
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.body().as_ref(), b"document");
    assert_eq!(response.headers()[ETAG], "\"v1\"");
    assert_eq!(response.headers()[LAST_MODIFIED], date(modified()).as_str());
}

#[test]
fn revalidation_by_etag() {
    let req = request(Method::GET, &[(IF_NONE_MATCH, "W/\"v0\", W/\"v1\"".into())]);
    let response = respond(&req);
    assert_eq!(response.status_code(), StatusCode::NOT_MODIFIED);
    assert!(response.body().is_empty());
    assert_eq!(response.headers()[ETAG], "\"v1\"");
}

#[test]
fn revalidation_by_date() {
    let fresh = request(Method::GET, &[(IF_MODIFIED_SINCE, date(modified()))]);
    assert_eq!(respond(&fresh).status_code(), StatusCode::NOT_MODIFIED);

    let stale = request(
        Method::GET,
        &[(IF_MODIFIED_SINCE, date(Timestamp::from_unix_secs(MODIFIED_SECS - 1)))],
    );
    assert_eq!(respond(&stale).status_code(), StatusCode::OK);
}

#[test]
fn lost_update_is_refused() {
    let req = request(Method::PUT, &[(IF_MATCH, "\"v0\"".into())]);
    let response = respond(&req);
    assert_eq!(response.status_code(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(response.headers()[ETAG], "\"v1\"");

    let req = request(
        Method::PUT,
        &[(IF_UNMODIFIED_SINCE, date(Timestamp::from_unix_secs(MODIFIED_SECS - 60)))],
    );
    assert_eq!(respond(&req).status_code(), StatusCode::PRECONDITION_FAILED);
}

#[test]
fn create_only_if_absent() {
    let req = request(Method::PUT, &[(IF_NONE_MATCH, "*".into())]);

    let exists = respond(&req);
    assert_eq!(exists.status_code(), StatusCode::PRECONDITION_FAILED);

    let outcome = req.validate_preconditions(None, None, &now()).outcome();
    assert_eq!(outcome, PreconditionOutcome::AllConditionsMet);
}

#[test]
fn if_match_failure_beats_if_none_match() {
    let req = request(
        Method::GET,
        &[(IF_MATCH, "\"v0\"".into()), (IF_NONE_MATCH, "\"v1\"".into())],
    );
    assert_eq!(respond(&req).status_code(), StatusCode::PRECONDITION_FAILED);
}

#[test]
fn malformed_headers_are_ignored() {
    let req = request(
        Method::GET,
        &[(IF_NONE_MATCH, "v1".into()), (IF_MODIFIED_SINCE, "last tuesday".into())],
    );
    assert_eq!(
        req.validate_preconditions(Some(EntityTag::strong("v1")), Some(modified()), &now())
            .outcome(),
        PreconditionOutcome::NoConditionsSpecified
    );
}

#[tokio::test]
async fn validation_inside_negotiated_handlers() {
    async fn as_text(req: Request) -> Response {
        req.validate_preconditions(Some(EntityTag::weak("text-v1")), None, &now())
            .respond(|| "v1")
    }

    let negotiator = Negotiator::new().on("text/plain", as_text);
    let req = request(
        Method::GET,
        &[(ACCEPT, "text/plain".into()), (IF_NONE_MATCH, "W/\"text-v1\"".into())],
    );
    let response = negotiator.respond(req).await;
    assert_eq!(response.status_code(), StatusCode::NOT_MODIFIED);
    assert_eq!(response.headers()[ETAG], "W/\"text-v1\"");
}
