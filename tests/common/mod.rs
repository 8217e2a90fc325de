#![allow(dead_code)]

use chrono::Utc;
use deluge_rs::session::AuthSnapshot;
use deluge_rs::{DelugeClient, DelugeConfig, SessionCookie, SessionSnapshot};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{json, Value};

pub const SESSION_HEADER: &str = "_session_id=abc123; Max-Age=3600; Path=/json";
pub const SESSION_COOKIE: &str = "_session_id=abc123";

pub fn test_config(server: &ServerGuard) -> DelugeConfig {
    DelugeConfig {
        base_url: server.url(),
        password: "deluge".to_string(),
        ..Default::default()
    }
}

pub fn snapshot(header: &str, message_id: u32) -> SessionSnapshot {
    SessionSnapshot {
        auth: Some(AuthSnapshot {
            cookie: SessionCookie::parse(header, Utc::now()).unwrap(),
            message_id,
        }),
    }
}

/// A client with a live session cookie, so no login happens
pub fn authed_client(server: &ServerGuard) -> DelugeClient {
    DelugeClient::with_state(test_config(server), snapshot(SESSION_HEADER, 0)).unwrap()
}

pub fn rpc_body(result: Value) -> String {
    json!({"id": 1, "result": result, "error": null}).to_string()
}

pub fn method(name: &str) -> Matcher {
    Matcher::PartialJson(json!({ "method": name }))
}

pub async fn mock_rpc(server: &mut ServerGuard, name: &str, result: Value) -> Mock {
    server
        .mock("POST", "/json")
        .match_body(method(name))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(rpc_body(result))
        .create_async()
        .await
}

/// `web.connected` answering true, for calls that auto-connect
pub async fn mock_connected(server: &mut ServerGuard) -> Mock {
    mock_rpc(server, "web.connected", json!(true)).await
}
