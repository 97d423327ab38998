use project_files::{FallbackFetcher, FallbackLocation, FetchError, FetchSource, Fetcher};
use project_files_remote::HttpFetcher;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body.to_vec(), "application/zip"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn downloads_archive_bytes() {
    let server = MockServer::start().await;
    mount(&server, "/projects.zip", 200, b"PK\x03\x04payload").await;

    let bytes = HttpFetcher::new()
        .get(&format!("{}/projects.zip", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes, b"PK\x03\x04payload");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    mount(&server, "/projects.zip", 404, b"").await;

    let result = HttpFetcher::new()
        .get(&format!("{}/projects.zip", server.uri()))
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn handles_network_error() {
    let result = HttpFetcher::new().get("http://127.0.0.1:1/projects.zip").await;
    assert!(matches!(result, Err(FetchError::Network(_))));
}

#[tokio::test]
async fn falls_back_to_deployment_copy() {
    let server = MockServer::start().await;
    mount(&server, "/releases/projects.zip", 500, b"").await;
    mount(&server, "/web-ide/projects.zip", 200, b"bundled").await;

    let deployment = format!("{}/web-ide/chip", server.uri());
    let fallback = FallbackLocation::Deployment(deployment);
    let fetcher = FallbackFetcher::new(HttpFetcher::new(), fallback);

    let result = fetcher
        .fetch(&format!("{}/releases/projects.zip", server.uri()), true)
        .await
        .unwrap();

    assert_eq!(result.source, FetchSource::Fallback);
    assert_eq!(result.bytes, b"bundled");
}

#[tokio::test]
async fn both_locations_failing_is_exhausted() {
    let server = MockServer::start().await;
    mount(&server, "/releases/projects.zip", 503, b"").await;
    mount(&server, "/web-ide/projects.zip", 404, b"").await;

    let deployment = format!("{}/web-ide/", server.uri());
    let fallback = FallbackLocation::Deployment(deployment);
    let fetcher = FallbackFetcher::new(HttpFetcher::new(), fallback);

    let err = fetcher
        .fetch(&format!("{}/releases/projects.zip", server.uri()), true)
        .await
        .unwrap_err();

    match err {
        FetchError::Exhausted {
            primary, fallback, ..
        } => {
            assert!(matches!(*primary, FetchError::Status { status: 503, .. }));
            assert!(matches!(*fallback, FetchError::Status { status: 404, .. }));
        }
        other => panic!("expected Exhausted, got {other:?}"),
    }
}
