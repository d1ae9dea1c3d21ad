//! End-to-end tests for the Gradebook HTTP API.
//!
//! These tests start the real router on an ephemeral port, backed by a JSON
//! data file in a temporary directory, and drive it over HTTP.

use std::path::{Path, PathBuf};

use gradebook_api::{create_router, AppState, Config, Students};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

/// A running server and the data file it persists to.
struct TestServer {
    base_url: String,
    data_file: PathBuf,
    handle: JoinHandle<()>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a server persisting to `data_file`.
async fn spawn_test_server(data_file: &Path) -> TestServer {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 4000,
        data_file: data_file.display().to_string(),
    };
    let router = create_router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        data_file: data_file.to_path_buf(),
        handle,
    }
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .expect("Request failed");
    let status = response.status();
    (status, response.json().await.expect("Body is not JSON"))
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let response = client.get(url).send().await.expect("Request failed");
    let status = response.status();
    (status, response.json().await.expect("Body is not JSON"))
}

fn read_data_file(path: &Path) -> Students {
    let raw = std::fs::read_to_string(path).expect("Data file missing");
    serde_json::from_str(&raw).expect("Data file is not valid JSON")
}

/// Tests the complete student and teacher workflow against a file store.
#[tokio::test]
async fn test_full_workflow_persists_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = spawn_test_server(&dir.path().join("students.json")).await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        server.url("/api/students/signup"),
        json!({"id": "s100", "name": "Ada Lovelace", "password": "engine"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student created");

    let (status, body) = post(
        &client,
        server.url("/api/students/login"),
        json!({"id": "s100", "password": "engine"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "s100", "name": "Ada Lovelace"}));

    let (status, _) = post(
        &client,
        server.url("/api/teacher/test"),
        json!({"id": "s100", "score": 60}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &client,
        server.url("/api/teacher/attendance"),
        json!({"id": "s100", "present": 8, "total": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, record) = post(
        &client,
        server.url("/api/teacher/homework"),
        json!({"id": "s100", "done": 9, "total": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["academic"].as_f64(), Some(7.2));

    let (status, fetched) = get(&client, server.url("/api/students/s100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, record);

    let on_disk = read_data_file(&server.data_file);
    let stored = &on_disk["s100"];
    assert_eq!(stored.test, Some(60.0));
    assert_eq!((stored.att, stored.att_total), (8, 10));
    assert_eq!((stored.hw, stored.hw_total), (9, 10));
    assert_eq!(stored.academic(), Some(7.2));
}

/// Tests that the data file is pretty-printed with two-space indentation.
#[tokio::test]
async fn test_data_file_format() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = spawn_test_server(&dir.path().join("students.json")).await;
    let client = reqwest::Client::new();

    post(
        &client,
        server.url("/api/students/signup"),
        json!({"id": "a", "name": "Ada", "password": "pw"}),
    )
    .await;

    let raw = std::fs::read_to_string(&server.data_file).expect("Data file missing");
    assert!(raw.starts_with("{\n  \"a\": {\n    \"name\": \"Ada\","));
    assert!(raw.contains("\"test\": null"));
    assert!(raw.contains("\"attTotal\": 0"));
    assert!(raw.contains("\"academic\": null"));
}

/// Tests that records survive a server restart on the same data file.
#[tokio::test]
async fn test_records_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_file = dir.path().join("students.json");
    let client = reqwest::Client::new();

    {
        let server = spawn_test_server(&data_file).await;
        post(
            &client,
            server.url("/api/students/signup"),
            json!({"id": "s1", "name": "Ada", "password": "pw"}),
        )
        .await;
        post(
            &client,
            server.url("/api/teacher/test"),
            json!({"id": "s1", "score": 100}),
        )
        .await;
    }

    let server = spawn_test_server(&data_file).await;
    let (status, record) = get(&client, server.url("/api/students/s1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["test"], 100);
    assert_eq!(record["academic"], 5);
}

/// Tests that a corrupt data file is served as an empty store and then replaced.
#[tokio::test]
async fn test_corrupt_data_file_treated_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data_file = dir.path().join("students.json");
    std::fs::write(&data_file, "this is not json").expect("write");

    let server = spawn_test_server(&data_file).await;
    let client = reqwest::Client::new();

    let (status, all) = get(&client, server.url("/api/students")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all, json!({}));

    let (status, _) = post(
        &client,
        server.url("/api/students/signup"),
        json!({"id": "s1", "name": "Ada", "password": "pw"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read_data_file(&data_file).len(), 1);
}

/// Tests that concurrent signups are all kept.
#[tokio::test]
async fn test_concurrent_signups_are_not_lost() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = spawn_test_server(&dir.path().join("students.json")).await;
    let client = reqwest::Client::new();

    let requests = (0..20).map(|i| {
        let client = client.clone();
        let url = server.url("/api/students/signup");
        tokio::spawn(async move {
            post(
                &client,
                url,
                json!({"id": format!("s{i}"), "name": format!("Student {i}"), "password": "pw"}),
            )
            .await
        })
    });

    for request in requests.collect::<Vec<_>>() {
        let (status, _) = request.await.expect("Task panicked");
        assert_eq!(status, StatusCode::OK);
    }

    let (_, all) = get(&client, server.url("/api/students")).await;
    assert_eq!(all.as_object().map(serde_json::Map::len), Some(20));
    assert_eq!(read_data_file(&server.data_file).len(), 20);
}

/// Tests error responses over the wire.
#[tokio::test]
async fn test_error_responses() {
    let dir = tempfile::tempdir().expect("tempdir");
    let server = spawn_test_server(&dir.path().join("students.json")).await;
    let client = reqwest::Client::new();

    post(
        &client,
        server.url("/api/students/signup"),
        json!({"id": "s1", "name": "Ada", "password": "pw"}),
    )
    .await;

    let cases = [
        (
            "/api/students/signup",
            json!({"id": "s1", "name": "Ada", "password": "pw"}),
            StatusCode::CONFLICT,
            "Student already exists",
        ),
        (
            "/api/students/signup",
            json!({"id": "s2"}),
            StatusCode::BAD_REQUEST,
            "Missing fields",
        ),
        (
            "/api/students/login",
            json!({"id": "s1", "password": "wrong"}),
            StatusCode::UNAUTHORIZED,
            "Invalid credentials",
        ),
        (
            "/api/teacher/test",
            json!({"id": "s1", "score": 101}),
            StatusCode::BAD_REQUEST,
            "Score must be 0–100",
        ),
        (
            "/api/teacher/attendance",
            json!({"id": "s1", "present": 3, "total": 0}),
            StatusCode::BAD_REQUEST,
            "Bad attendance values",
        ),
        (
            "/api/teacher/homework",
            json!({"id": "s1", "done": 4, "total": 3}),
            StatusCode::BAD_REQUEST,
            "Bad homework values",
        ),
        (
            "/api/teacher/homework",
            json!({"id": "nobody", "done": 1, "total": 3}),
            StatusCode::NOT_FOUND,
            "Student not found",
        ),
    ];

    for (path, body, expected_status, expected_error) in cases {
        let (status, response) = post(&client, server.url(path), body).await;
        assert_eq!(status, expected_status, "{path}");
        assert_eq!(response["error"], expected_error, "{path}");
    }

    let (status, response) = get(&client, server.url("/api/students/nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(response["error"], "Not found");
}
