//! Upstream client behavior against a mocked extraction API.

use serde_json::json;
use socialdl::upstream::{ExtractionResult, UpstreamClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> UpstreamClient {
    UpstreamClient::new(&server.uri()).expect("upstream client")
}

#[tokio::test]
async fn passes_source_url_and_extra_params_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ytdl"))
        .and(query_param("url", "https://youtu.be/abc"))
        .and(query_param("format", "mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .extract(
            "ytdl",
            "https://youtu.be/abc",
            &[("format".to_string(), "mp3".to_string())],
        )
        .await;

    match result {
        ExtractionResult::Success(payload) => assert_eq!(payload, json!({"success": true})),
        ExtractionResult::Failure(msg) => panic!("unexpected failure: {msg}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn success_payload_is_returned_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({
        "success": true,
        "urls": ["https://cdn.example/a.mp4"],
        "title": "clip"
    });
    Mock::given(method("GET"))
        .and(path("/insta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let result = client(&server)
        .extract("insta", "https://instagram.com/p/x", &[])
        .await;

    match result {
        ExtractionResult::Success(got) => assert_eq!(got, payload),
        ExtractionResult::Failure(msg) => panic!("unexpected failure: {msg}"),
    }
}

#[tokio::test]
async fn error_status_with_structured_body_surfaces_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fb"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "video not found"})),
        )
        .mount(&server)
        .await;

    let result = client(&server)
        .extract("fb", "https://facebook.com/watch/1", &[])
        .await;

    match result {
        ExtractionResult::Failure(msg) => assert_eq!(msg, "video not found"),
        ExtractionResult::Success(_) => panic!("expected failure"),
    }
}

#[tokio::test]
async fn error_status_with_opaque_body_falls_back_to_status_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fb"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client(&server)
        .extract("fb", "https://facebook.com/watch/1", &[])
        .await;

    match result {
        ExtractionResult::Failure(msg) => {
            assert!(msg.contains("500"), "got: {msg}");
        }
        ExtractionResult::Success(_) => panic!("expected failure"),
    }
}

#[tokio::test]
async fn success_status_with_invalid_json_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tiktok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client(&server)
        .extract("tiktok", "https://tiktok.com/@a/video/1", &[])
        .await;

    match result {
        ExtractionResult::Failure(msg) => {
            assert!(msg.contains("invalid response"), "got: {msg}");
        }
        ExtractionResult::Success(_) => panic!("expected failure"),
    }
}
