use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn minimal_config(port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[game]
seed = 7
"#,
        port
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Spawn the server and return a handle
async fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketrush"))
        .env("TICKETRUSH_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Read envelopes until one carries an event of type `kind`.
async fn next_event(ws: &mut WsStream, kind: &str) -> Value {
    loop {
        let message = timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for {}", kind))
            .expect("WebSocket stream ended")
            .expect("WebSocket error");
        if let Message::Text(text) = message {
            let envelope: Value = serde_json::from_str(text.as_str()).expect("Invalid envelope");
            if envelope["event"]["type"] == kind {
                return envelope;
            }
        }
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "ok");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_endpoint_reflects_file() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let json: serde_json::Value = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["game"]["seed"], 7);
    assert_eq!(json["game"]["difficulty"], "normal");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_play_one_ticket_over_http() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let created: serde_json::Value = client
        .post(format!("{}/sessions", base))
        .json(&serde_json::json!({}))
        .send()
        .await
        .expect("Failed to create session")
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let started: serde_json::Value = client
        .post(format!("{}/sessions/{}/start", base, id))
        .send()
        .await
        .expect("Failed to start session")
        .json()
        .await
        .unwrap();
    let ticket = &started["pending"][0];
    let ticket_id = ticket["id"].as_u64().unwrap();

    let response = client
        .post(format!(
            "{}/sessions/{}/tickets/{}/categorize",
            base, id, ticket_id
        ))
        .json(&serde_json::json!({ "category": ticket["category"] }))
        .send()
        .await
        .expect("Failed to categorize");
    assert!(response.status().is_success());

    let result: serde_json::Value = response.json().await.unwrap();
    assert_eq!(result["outcome"], "processed");
    assert_eq!(result["score"]["current_score"], 100);

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketrush"))
            .env("TICKETRUSH_CONFIG", "/nonexistent/config.toml")
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_invalid_config_exits_with_error() {
    let invalid = r#"
[server]
port = 8080

[game]
tickets_limit = 2
compact_tickets_limit = 5
"#;
    let temp_file = write_config(invalid);

    let result = timeout(
        Duration::from_secs(5),
        tokio::process::Command::new(env!("CARGO_BIN_EXE_ticketrush"))
            .env("TICKETRUSH_CONFIG", temp_file.path())
            .env("RUST_LOG", "error")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_websocket_streams_events_until_session_deleted() {
    let port = get_available_port();
    let temp_file = write_config(&minimal_config(port));

    let mut server = spawn_server(temp_file.path()).await;

    assert!(
        wait_for_server(port, 40).await,
        "Server did not start in time"
    );

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}/api/v1", port);

    let created: Value = client
        .post(format!("{}/sessions", base))
        .send()
        .await
        .expect("Failed to create session")
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let (mut ws, _) = connect_async(format!("ws://127.0.0.1:{}/api/v1/sessions/{}/ws", port, id))
        .await
        .expect("Failed to open WebSocket");

    // Subscribed during the handshake, so the first ticket is not missed
    let response = client
        .post(format!("{}/sessions/{}/start", base, id))
        .send()
        .await
        .expect("Failed to start session");
    assert!(response.status().is_success());

    let created_event = next_event(&mut ws, "ticket_created").await;
    let ticket = &created_event["event"]["ticket"];
    let ticket_id = ticket["id"].as_u64().unwrap();

    let response = client
        .post(format!(
            "{}/sessions/{}/tickets/{}/categorize",
            base, id, ticket_id
        ))
        .json(&serde_json::json!({ "category": ticket["category"] }))
        .send()
        .await
        .expect("Failed to categorize");
    assert!(response.status().is_success());

    let processed = next_event(&mut ws, "ticket_processed").await;
    assert_eq!(processed["event"]["ticket_id"], ticket_id);
    assert_eq!(processed["event"]["points"], 100);

    let response = client
        .delete(format!("{}/sessions/{}", base, id))
        .send()
        .await
        .expect("Failed to delete session");
    assert_eq!(response.status().as_u16(), 204);

    let ended = next_event(&mut ws, "session_ended").await;
    assert_eq!(ended["event"]["score"]["current_score"], 100);

    let closed = timeout(Duration::from_secs(5), async {
        while let Some(message) = ws.next().await {
            match message {
                Ok(Message::Close(_)) => return true,
                Ok(_) => continue,
                Err(_) => return false,
            }
        }
        false
    })
    .await
    .expect("WebSocket stayed open after the session was deleted");
    assert!(closed, "Expected a close frame");

    server.kill().await.ok();
}
