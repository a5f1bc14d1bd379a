use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ytmusic_api::auth::{Headers, UnauthorizedProvider, default_headers};
use ytmusic_api::http::HttpClient;
use ytmusic_api::{AuthReason, HttpConfig, YtMusicError};

fn fast_config(max_retries: u32) -> HttpConfig {
    HttpConfig::default()
        .with_max_retries(max_retries)
        .with_retry_base_delay(Duration::from_millis(1))
        .with_timeout(Duration::from_secs(5))
}

fn client(config: HttpConfig) -> HttpClient {
    HttpClient::new(config, Arc::new(UnauthorizedProvider::new(default_headers()))).unwrap()
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(fast_config(3))
        .post(&server.uri(), &json!({}), None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        YtMusicError::Auth {
            reason: AuthReason::Expired,
            ..
        }
    ));
}

#[tokio::test]
async fn forbidden_is_invalid_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(fast_config(3)).get(&server.uri(), None).await.unwrap_err();
    assert_eq!(err.auth_reason(), Some(AuthReason::Invalid));
}

#[tokio::test]
async fn rate_limit_then_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let value = client(fast_config(3)).get(&server.uri(), None).await.unwrap();
    assert_eq!(value, json!({ "ok": true }));
}

#[tokio::test]
async fn retryable_status_exhausts_budget_as_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(fast_config(2)).get(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, YtMusicError::Server { status: 503, ref message } if message == "busy"));
}

#[tokio::test]
async fn other_errors_are_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(fast_config(3)).get(&server.uri(), None).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn invalid_json_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(fast_config(3)).get(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, YtMusicError::Parse(_)));
}

#[tokio::test]
async fn raw_get_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let text = client(fast_config(0)).get_raw(&server.uri(), None).await.unwrap();
    assert!(text.is_empty());
}

#[tokio::test]
async fn unreachable_host_is_network_error_after_all_attempts() {
    let err = client(fast_config(2))
        .get("http://127.0.0.1:1/", None)
        .await
        .unwrap_err();
    assert!(matches!(err, YtMusicError::Network { attempts: 3, .. }));
}

#[tokio::test]
async fn slow_response_times_out_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = fast_config(1).with_timeout(Duration::from_millis(50));
    let err = client(config).get(&server.uri(), None).await.unwrap_err();
    assert!(matches!(err, YtMusicError::Network { attempts: 2, .. }));
}

#[tokio::test]
async fn concurrent_identical_posts_share_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/browse"))
        .and(body_json(json!({ "browseId": "x" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "n": 1 }))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(fast_config(0));
    let url = format!("{}/browse", server.uri());
    let body = json!({ "browseId": "x" });
    let (a, b) = tokio::join!(client.post(&url, &body, None), client.post(&url, &body, None));

    assert_eq!(a.unwrap(), json!({ "n": 1 }));
    assert_eq!(b.unwrap(), json!({ "n": 1 }));
    assert_eq!(client.inflight(), 0);
}

#[tokio::test]
async fn provider_and_extra_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("origin", "https://music.youtube.com"))
        .and(header("x-extra", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let mut extra = Headers::new();
    extra.insert("x-extra".into(), "1".into());
    client(fast_config(0))
        .get(&server.uri(), Some(&extra))
        .await
        .unwrap();
}
