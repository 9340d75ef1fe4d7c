use std::time::Duration;

use chrono::{TimeZone, Utc};
use monitor_engine::{
    FailureKind, JobStatusSnapshot, ReqwestStatusService, ServiceSettings, StatusService,
};
use pretty_assertions::assert_eq;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> ReqwestStatusService {
    let base_url = Url::parse(&format!("{}/api/", server.uri())).unwrap();
    ReqwestStatusService::new(ServiceSettings::new(base_url)).expect("client")
}

#[tokio::test]
async fn status_is_decoded_from_camel_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"status":"Fase 2: factual","message":"Analizando hechos","isCompleted":false,"isFailed":false,"progress":40}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let snapshot = service_for(&server).get_status("job-1").await.expect("status");
    assert_eq!(
        snapshot,
        JobStatusSnapshot {
            status: Some("Fase 2: factual".to_string()),
            message: Some("Analizando hechos".to_string()),
            is_completed: false,
            is_failed: false,
        }
    );
}

#[tokio::test]
async fn missing_status_fields_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1/status"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"isCompleted":true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let snapshot = service_for(&server).get_status("job-1").await.expect("status");
    assert_eq!(snapshot.status, None);
    assert_eq!(snapshot.message, None);
    assert!(snapshot.is_completed);
    assert!(!snapshot.is_failed);
}

#[tokio::test]
async fn metadata_carries_creation_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"id":"job-1","title":"Manuscrito","createdAt":"2026-10-18T12:00:00Z"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let metadata = service_for(&server).get_by_id("job-1").await.expect("metadata");
    assert_eq!(
        metadata.created_at,
        Some(Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn terminate_posts_to_job() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/job-1/terminate"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    service_for(&server).terminate("job-1").await.expect("terminate");
}

#[tokio::test]
async fn http_errors_are_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/projects/job-1/terminate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = service_for(&server).terminate("job-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert!(err.to_string().starts_with("http status 500"));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server).get_status("job-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1/status"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = ServiceSettings::new(Url::parse(&server.uri()).unwrap());
    settings.bearer_token = Some("secret".to_string());
    let service = ReqwestStatusService::new(settings).expect("client");
    service.get_status("job-1").await.expect("status");
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/projects/job-1/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("{}", "application/json"),
        )
        .mount(&server)
        .await;

    let mut settings = ServiceSettings::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    settings.request_timeout = Duration::from_millis(50);
    let service = ReqwestStatusService::new(settings).expect("client");
    let err = service.get_status("job-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}
