//! Integration tests for the HTTP surface.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lb_echo::http::server::{serve_http, AppState};
use lb_echo::identity::ServerIdentity;
use lb_echo::scoreboard::Scoreboard;
use tokio::net::TcpListener;

/// Start a backend on an ephemeral port, returning its base URL and the
/// shared state for direct assertions.
async fn start_backend(id: &str) -> (String, AppState) {
    let state = AppState {
        identity: Arc::new(ServerIdentity::new(id).unwrap()),
        scoreboard: Scoreboard::new(),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server_state = state.clone();
    tokio::spawn(async move {
        let _ = serve_http(listener, server_state).await;
    });

    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn echo_returns_id_and_session_cookie() {
    let (url, _) = start_backend("backend-1").await;
    let client = reqwest::Client::new();

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok()),
        Some("JSESSIONID=backend-1")
    );
    // Verbatim body, no trailing newline.
    assert_eq!(response.text().await.unwrap(), "backend-1");
}

#[tokio::test]
async fn every_endpoint_carries_the_cookie() {
    let (url, _) = start_backend("backend-2").await;
    let client = reqwest::Client::new();

    for path in ["/", "/slow?delay=10ms", "/stats", "/reset"] {
        let response = client.get(format!("{url}{path}")).send().await.unwrap();
        assert_eq!(
            response
                .headers()
                .get("set-cookie")
                .and_then(|v| v.to_str().ok()),
            Some("JSESSIONID=backend-2"),
            "missing cookie on {path}"
        );
    }
}

#[tokio::test]
async fn any_method_is_accepted() {
    let (url, _) = start_backend("backend-3").await;
    let client = reqwest::Client::new();

    let response = client.post(&url).body("ignored").send().await.unwrap();
    assert_eq!(response.text().await.unwrap(), "backend-3");

    let response = client.put(format!("{url}/stats")).send().await.unwrap();
    assert!(response.status().is_success());
}

#[tokio::test]
async fn unknown_paths_get_404() {
    let (url, _) = start_backend("backend-4").await;
    let response = reqwest::get(format!("{url}/nope")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stats_and_reset_do_not_count_themselves() {
    let (url, _) = start_backend("backend-5").await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        client.get(format!("{url}/stats")).send().await.unwrap();
    }
    client.get(format!("{url}/reset")).send().await.unwrap();

    let body = client
        .get(format!("{url}/stats"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "maxConn=0\ntotalConn=0\n");
}

#[tokio::test]
async fn concurrent_requests_drive_the_scoreboard() {
    let (url, _) = start_backend("backend-6").await;
    let client = reqwest::Client::new();

    let concurrency = 5;
    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let slow_url = format!("{url}/slow?delay=800ms");
        tasks.push(tokio::spawn(async move {
            client.get(&slow_url).send().await.unwrap()
        }));
    }
    for task in tasks {
        let response = task.await.unwrap();
        assert_eq!(response.text().await.unwrap(), "backend-6");
    }

    let body = client
        .get(format!("{url}/stats"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, format!("maxConn={concurrency}\ntotalConn={concurrency}\n"));
}

#[tokio::test]
async fn slow_honors_requested_delay() {
    let (url, _) = start_backend("backend-7").await;
    let start = Instant::now();

    let response = reqwest::get(format!("{url}/slow?delay=500ms")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "backend-7");
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn slow_substitutes_default_for_garbage_delay() {
    let (url, _) = start_backend("backend-8").await;
    let start = Instant::now();

    let response = reqwest::get(format!("{url}/slow?delay=abc")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn malformed_query_strings_never_produce_errors() {
    let (url, _) = start_backend("backend-10").await;
    let client = reqwest::Client::new();

    // A duplicated parameter is not an error; the first value wins.
    let start = Instant::now();
    let response = client
        .get(format!("{url}/slow?delay=100ms&delay=5s"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "backend-10");
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100) && elapsed < Duration::from_secs(5));

    // Unparseable duplicates fall back to the default delay, never a 400.
    let response = client
        .get(format!("{url}/slow?delay=abc&delay=def"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok()),
        Some("JSESSIONID=backend-10")
    );
}

#[tokio::test]
async fn reset_does_not_disturb_in_flight_requests() {
    let (url, state) = start_backend("backend-9").await;
    let client = reqwest::Client::new();

    let slow_url = format!("{url}/slow?delay=600ms");
    let slow_client = client.clone();
    let in_flight = tokio::spawn(async move { slow_client.get(&slow_url).send().await });

    // Let the slow request open its slot, then wipe the counters under it.
    tokio::time::sleep(Duration::from_millis(150)).await;
    client.get(format!("{url}/reset")).send().await.unwrap();
    assert_eq!(state.scoreboard.stats(), (0, 0));

    let response = in_flight.await.unwrap().unwrap();
    assert_eq!(response.text().await.unwrap(), "backend-9");

    // The surviving request closed after the reset: its close sampled the
    // still-positive current count into peak, while total stayed at zero.
    assert_eq!(state.scoreboard.stats(), (1, 0));
}
