//! Benchmark client tests against a mock SecureSuite API.
//!
//! Covers the listing mirror, detail lookups, archive downloads and the
//! single refresh-and-retry on 401.

use securesuite::{BenchmarkClient, TokenManager, WorkbenchConfig, WorkbenchError};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

struct Fixture {
    dir: TempDir,
    config: WorkbenchConfig,
    license: PathBuf,
}

fn fixture(server: &MockServer) -> Fixture {
    let dir = TempDir::new().unwrap();
    let license = dir.path().join("license.xml");
    fs::write(&license, "<License><Key>member-key</Key></License>").unwrap();

    let config = WorkbenchConfig {
        token_file: dir.path().join("securesuite_token.json"),
        benchmark_list_file: dir.path().join("available_benchmarks.json"),
        download_dir: dir.path().join("downloads"),
        request_timeout: Duration::from_secs(5),
        ..WorkbenchConfig::with_base_url(server.uri())
    };

    Fixture {
        dir,
        config,
        license,
    }
}

async fn mount_license_exchange(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/license"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .expect(times)
        .mount(server)
        .await;
}

fn sample_listing() -> serde_json::Value {
    json!({
        "Total number of results": 2,
        "Benchmarks": [
            {
                "workbenchId": 42,
                "benchmarkTitle": "CIS Debian Linux 12 Benchmark",
                "benchmarkVersion": "1.1.0",
                "assessmentStatus": "Automated",
                "availableFormats": ["JSON", "YAML"],
                "profiles": [{"profileTitle": "Level 1 - Server"}]
            },
            {
                "workbenchId": 43,
                "benchmarkTitle": "CIS Übersicht Benchmark",
                "assessmentStatus": "Manual"
            }
        ]
    })
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_list_benchmarks_mirrors_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_listing()))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let listing = client.list_benchmarks(true, None).unwrap();
        assert_eq!(listing.count, 2);
        assert_eq!(listing.reported_total, Some(2));
        assert_eq!(listing.saved_to, fixture.config.benchmark_list_file);

        let written = fs::read_to_string(&listing.saved_to).unwrap();
        assert!(written.contains("Übersicht"));
        let mirrored: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(mirrored, sample_listing());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_without_benchmarks_field_writes_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"Total number of results": 0})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let result = client.list_benchmarks(false, Some("token"));
        assert!(matches!(result, Err(WorkbenchError::MalformedResponse(_))));
        assert!(!fixture.config.benchmark_list_file.exists());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_server_error_is_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "unused", 0).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(matches!(
            client.list_benchmarks(true, Some("token")),
            Err(WorkbenchError::UnexpectedStatus { status: 500, .. })
        ));
        assert!(!fixture.config.benchmark_list_file.exists());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_retries_once_after_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .and(header("X-SecureSuite-Token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .and(header("X-SecureSuite-Token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_listing()))
        .expect(1)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);
        assert_eq!(client.list_benchmarks(false, Some("stale")).unwrap().count, 2);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_keeps_entries_outside_the_typed_shape() {
    let server = MockServer::start().await;
    let listing = json!({
        "Total number of results": "2",
        "Benchmarks": [
            {"workbenchId": 1, "profiles": null},
            {"workbenchId": 2, "benchmarkVersion": 1.3, "availableFormats": [{"name": "JSON"}]}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let saved = client.list_benchmarks(true, None).unwrap();
        assert_eq!(saved.count, 2);
        assert_eq!(saved.reported_total, None);

        let written = fs::read_to_string(&saved.saved_to).unwrap();
        let mirrored: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(mirrored, listing);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_second_401_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(matches!(
            client.list_benchmarks(false, Some("stale")),
            Err(WorkbenchError::Unauthorized)
        ));
        assert!(!fixture.config.benchmark_list_file.exists());
    })
    .await
    .unwrap();
}

// ============================================================================
// Details
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_details_refreshes_and_retries_with_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/42"))
        .and(header("X-SecureSuite-Token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/benchmarks/42"))
        .and(header("X-SecureSuite-Token", "fresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"workbenchId": 42, "benchmarkVersion": "1.1.0"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let details = client.benchmark_details("42", "stale").unwrap();
        assert_eq!(details["benchmarkVersion"], "1.1.0");
        assert_eq!(manager.store().load().unwrap().token, "fresh");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_second_401_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/42"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(matches!(
            client.benchmark_details("42", "stale"),
            Err(WorkbenchError::Unauthorized)
        ));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_details_not_found_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .expect(1)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 0).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(matches!(
            client.benchmark_details("999", "token"),
            Err(WorkbenchError::UnexpectedStatus { status: 404, .. })
        ));
    })
    .await
    .unwrap();
}

// ============================================================================
// Downloads
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_dated_archive() {
    let server = MockServer::start().await;
    let archive: &[u8] = b"PK\x03\x04benchmark-archive";

    Mock::given(method("GET"))
        .and(path("/benchmarks/42/JSON"))
        .and(header("X-SecureSuite-Token", "token"))
        .and(header("Accept", "application/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let saved = client.download_benchmark("42", "token").unwrap();
        let name = saved.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("benchmark_42_"));
        assert!(name.ends_with(".zip"));
        // benchmark_42_YYYYMMDD.zip
        assert_eq!(name.len(), "benchmark_42_".len() + 8 + ".zip".len());
        assert_eq!(saved.parent().unwrap(), fixture.config.download_dir);
        assert_eq!(fs::read(&saved).unwrap(), b"PK\x03\x04benchmark-archive");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_download_leaves_no_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/42/JSON"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(client.download_benchmark("42", "token").is_err());
        let leftovers: Vec<_> = fs::read_dir(&fixture.config.download_dir)
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
        drop(fixture.dir);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_retries_after_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/42/JSON"))
        .and(header("X-SecureSuite-Token", "stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/benchmarks/42/JSON"))
        .and(header("X-SecureSuite-Token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        let saved = client.download_benchmark("42", "stale").unwrap();
        assert_eq!(fs::read(saved).unwrap(), b"PK");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_second_401_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/benchmarks/42/JSON"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_license_exchange(&server, "fresh", 1).await;

    let fixture = fixture(&server);

    tokio::task::spawn_blocking(move || {
        let manager = TokenManager::new(fixture.config.clone()).unwrap();
        let client = BenchmarkClient::new(&manager, &fixture.license);

        assert!(matches!(
            client.download_benchmark("42", "stale"),
            Err(WorkbenchError::Unauthorized)
        ));
        // Neither the archive nor its .zip.part staging file remains
        let leftovers: Vec<_> = fs::read_dir(&fixture.config.download_dir)
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    })
    .await
    .unwrap();
}
