//! End-to-end behaviour of `POST /send-email` through the full middleware stack.

mod common;

use std::sync::Arc;

use http::StatusCode;

use common::{RecordingMailer, VALID, build, config, json, peer, post_json};

#[tokio::test]
async fn valid_submission_sends_exactly_one_mail() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let res = app.oneshot(post_json("/send-email", VALID), peer()).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    let body = json(&res);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "message sent");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let mail = &sent[0];
    assert_eq!(mail.reply_to.email.to_string(), "ana@example.com");
    assert_eq!(mail.to.email.to_string(), "owner@example.com");
    assert_eq!(mail.from.email.to_string(), "owner@example.com");
    assert_eq!(mail.from.name.as_deref(), Some("Ana"));
    assert_eq!(mail.subject, "New website contact: Hi");
    assert!(mail.html.contains("Hello"));
}

#[tokio::test]
async fn reply_to_keeps_the_submitted_address() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let body = r#"{"from_name":"Ana","from_email":"a&b@example.com","subject":"Hi","message":"Hello"}"#;
    let res = app.oneshot(post_json("/send-email", body), peer()).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    let sent = mailer.sent();
    assert_eq!(sent[0].reply_to.email.to_string(), "a&b@example.com");
    assert!(sent[0].html.contains("a&amp;b@example.com"));
}

#[tokio::test]
async fn dispatch_failure_is_a_generic_500() {
    let mailer = Arc::new(RecordingMailer::failing());
    let app = build(&config(), &mailer);

    let res = app.oneshot(post_json("/send-email", VALID), peer()).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&res);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "failed to send message");
    assert_eq!(mailer.sent().len(), 1, "dispatch attempted once, never retried");
}

#[tokio::test]
async fn malformed_email_is_rejected_without_dispatch() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let body = r#"{"from_name":"Ana","from_email":"not-an-email","subject":"Hi","message":"Hello"}"#;
    let res = app.oneshot(post_json("/send-email", body), peer()).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = json(&res);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid email");
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn missing_fields_are_rejected_without_dispatch() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let bodies = [
        r#"{"from_email":"ana@example.com","subject":"Hi","message":"Hello"}"#,
        r#"{"from_name":"Ana","subject":"Hi","message":"Hello"}"#,
        r#"{"from_name":"Ana","from_email":"ana@example.com","message":"Hello"}"#,
        r#"{"from_name":"Ana","from_email":"ana@example.com","subject":"Hi"}"#,
        r#"{"from_name":"","from_email":"ana@example.com","subject":"Hi","message":"Hello"}"#,
        r#"{}"#,
    ];
    for body in bodies {
        let res = app.oneshot(post_json("/send-email", body), peer()).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json(&res)["message"], "all fields are required", "{body}");
    }
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn non_json_body_counts_as_empty_form() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let req = http::Request::post("/send-email")
        .header("content-type", "text/plain")
        .body(bytes::Bytes::from_static(VALID.as_bytes()))
        .unwrap();
    let res = app.oneshot(req, peer()).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(json(&res)["message"], "all fields are required");
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn broken_json_is_rejected() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    for body in [r#"{"from_name":"Ana""#, r#"{"from_name":42}"#] {
        let res = app.oneshot(post_json("/send-email", body), peer()).await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(json(&res)["message"], "invalid request body", "{body}");
    }
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn markup_in_fields_never_reaches_the_email() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = build(&config(), &mailer);

    let body = r#"{
        "from_name": "<b>Ana</b>",
        "from_email": "ana@example.com",
        "subject": "<img src=x onerror=alert(1)>Hi",
        "message": "<script>alert(1)</script>Hello & bye"
    }"#;
    let res = app.oneshot(post_json("/send-email", body), peer()).await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let mail = &mailer.sent()[0];
    assert!(!mail.html.contains("<script"));
    assert!(!mail.html.contains("onerror"));
    assert!(mail.html.contains("Hello &amp; bye"));
    assert_eq!(mail.subject, "New website contact: Hi");
    assert_eq!(mail.from.name.as_deref(), Some("Ana"));
}
