mod common;

use common::*;
use deluge_rs::{
    AddTorrentOptions, AddTorrentsResult, DelugeError, NormalizedAddOptions, TorrentSource,
    TorrentState,
};
use mockito::{Matcher, Server};
use serde_json::{json, Map};
use std::io::Write;

const TEMP_PATH: &str = "/tmp/delugeweb-DfEsgR/tmpD3rujY.torrent";
const HASH: &str = "e84213a794f3ccd890382a54a64ca68b7e925433";
const MAGNET: &str = "magnet:?xt=urn:btih:B0B81206633C42874173D22E564D293DAEFC45E2&dn=ubuntu";
const MAGNET_HASH: &str = "b0b81206633c42874173d22e564d293daefc45e2";

fn torrent_status(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "state": "Downloading",
        "progress": 12.5,
        "ratio": 0.0,
        "time_added": 1539389437,
        "label": "",
        "save_path": "/downloads",
        "queue": 0,
        "eta": 120,
        "num_peers": 2,
        "num_seeds": 5,
        "total_wanted": 100,
        "total_size": 100,
        "total_done": 12
    })
}

async fn mock_upload(
    server: &mut mockito::ServerGuard,
    body: serde_json::Value,
) -> mockito::Mock {
    server
        .mock("POST", "/upload")
        .match_header("cookie", SESSION_COOKIE)
        .match_body(Matcher::Regex(r#"name="file"; filename="temp.torrent""#.to_string()))
        .with_body(body.to_string())
        .create_async()
        .await
}

#[tokio::test]
async fn test_add_torrent_uploads_then_adds() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let upload = mock_upload(&mut server, json!({"files": [TEMP_PATH], "success": true})).await;
    let add = server
        .mock("POST", "/json")
        .match_body(Matcher::AllOf(vec![
            method("web.add_torrents"),
            Matcher::Regex(format!(r#""path":"{TEMP_PATH}""#)),
            Matcher::Regex(r#""add_paused":true"#.to_string()),
            Matcher::Regex(r#""max_connections":-1"#.to_string()),
            Matcher::Regex(r#""file_priorities":\[\]"#.to_string()),
        ]))
        .with_body(rpc_body(json!([[true, HASH]])))
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let options = AddTorrentOptions {
        add_paused: Some(true),
        ..Default::default()
    };
    let added = client
        .add_torrent(&TorrentSource::Bytes(b"d4:infod".to_vec()), &options)
        .await
        .unwrap();

    upload.assert_async().await;
    add.assert_async().await;
    assert_eq!(added.path, TEMP_PATH);
    assert_eq!(added.result.first_hash(), Some(HASH));
}

#[tokio::test]
async fn test_add_torrent_from_file() {
    // Anything under /tmp/ is taken for a Web UI temp path.
    let mut file = tempfile::NamedTempFile::new_in(env!("CARGO_TARGET_TMPDIR")).unwrap();
    file.write_all(b"d4:infod").unwrap();

    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let upload = server
        .mock("POST", "/upload")
        .match_body(Matcher::Regex("d4:infod".to_string()))
        .with_body(json!({"files": [TEMP_PATH], "success": true}).to_string())
        .expect(1)
        .create_async()
        .await;
    mock_rpc(&mut server, "web.add_torrents", json!(true)).await;

    let client = authed_client(&server);
    let source = TorrentSource::detect(file.path().to_str().unwrap());
    let added = client
        .add_torrent(&source, &AddTorrentOptions::default())
        .await
        .unwrap();

    upload.assert_async().await;
    assert_eq!(added.result, AddTorrentsResult::Accepted(true));
}

#[tokio::test]
async fn test_add_torrent_temp_path_skips_upload() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let upload = server
        .mock("POST", "/upload")
        .expect(0)
        .create_async()
        .await;
    mock_rpc(&mut server, "web.add_torrents", json!([[true, HASH]])).await;

    let client = authed_client(&server);
    let added = client
        .add_torrent(&TorrentSource::detect(TEMP_PATH), &AddTorrentOptions::default())
        .await
        .unwrap();

    upload.assert_async().await;
    assert_eq!(added.path, TEMP_PATH);
}

#[tokio::test]
async fn test_failed_upload_stops_add() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_upload(&mut server, json!({"files": [], "success": false})).await;
    let add = server
        .mock("POST", "/json")
        .match_body(method("web.add_torrents"))
        .expect(0)
        .create_async()
        .await;

    let client = authed_client(&server);
    let err = client
        .add_torrent(
            &TorrentSource::Bytes(b"d4:infod".to_vec()),
            &AddTorrentOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DelugeError::Upload(_)));
    add.assert_async().await;
}

#[tokio::test]
async fn test_rejected_add_is_error() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(&mut server, "web.add_torrents", json!(false)).await;

    let client = authed_client(&server);
    let err = client
        .add_torrent(&TorrentSource::detect(TEMP_PATH), &AddTorrentOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, DelugeError::AddTorrent(ref msg) if msg == "Failed to add torrent"));
}

#[tokio::test]
async fn test_rejected_torrent_entry_skips_label() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(
        &mut server,
        "web.add_torrents",
        json!([[false, "Torrent already in session"]]),
    )
    .await;
    let label = server
        .mock("POST", "/json")
        .match_body(method("label.set_torrent"))
        .expect(0)
        .create_async()
        .await;

    let client = authed_client(&server);
    let err = client
        .normalized_add_torrent(
            &TorrentSource::detect(TEMP_PATH),
            &NormalizedAddOptions {
                start_paused: false,
                label: Some("linux".to_string()),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DelugeError::AddTorrent(ref msg) if msg == "Failed to add torrent"));
    label.assert_async().await;
}

#[tokio::test]
async fn test_normalized_add_magnet_with_label() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let add = server
        .mock("POST", "/json")
        .match_body(Matcher::AllOf(vec![
            method("core.add_torrent_magnet"),
            Matcher::Regex(r#""add_paused":true"#.to_string()),
        ]))
        .with_body(rpc_body(json!(MAGNET_HASH)))
        .expect(1)
        .create_async()
        .await;
    let label = server
        .mock("POST", "/json")
        .match_body(Matcher::PartialJson(json!({
            "method": "label.set_torrent",
            "params": [MAGNET_HASH, "linux"]
        })))
        .with_body(rpc_body(json!(null)))
        .expect(1)
        .create_async()
        .await;
    let mut status = torrent_status("ubuntu.iso");
    status["label"] = json!("linux");
    server
        .mock("POST", "/json")
        .match_body(Matcher::AllOf(vec![
            method("web.get_torrent_status"),
            Matcher::Regex(format!(r#""params":\["{MAGNET_HASH}","#)),
        ]))
        .with_body(rpc_body(status))
        .create_async()
        .await;

    let client = authed_client(&server);
    let torrent = client
        .normalized_add_torrent(
            &TorrentSource::detect(MAGNET),
            &NormalizedAddOptions {
                start_paused: true,
                label: Some("linux".to_string()),
            },
        )
        .await
        .unwrap();

    add.assert_async().await;
    label.assert_async().await;
    assert_eq!(torrent.id, MAGNET_HASH);
    assert_eq!(torrent.label.as_deref(), Some("linux"));
    assert_eq!(torrent.state, TorrentState::Downloading);
    assert_eq!(torrent.progress, 0.125);
}

#[tokio::test]
async fn test_magnet_without_hash_is_rejected() {
    let mut server = Server::new_async().await;
    let add = server
        .mock("POST", "/json")
        .match_body(method("core.add_torrent_magnet"))
        .expect(0)
        .create_async()
        .await;

    let client = authed_client(&server);
    let err = client
        .normalized_add_torrent(
            &TorrentSource::Magnet("magnet:?dn=nothing".to_string()),
            &NormalizedAddOptions::default(),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, DelugeError::InvalidTorrent(ref msg) if msg == "Magnet did not contain hash")
    );
    add.assert_async().await;
}

#[tokio::test]
async fn test_normalized_add_without_hash_uses_torrent_info() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_upload(&mut server, json!({"files": [TEMP_PATH], "success": true})).await;
    mock_rpc(&mut server, "web.add_torrents", json!(true)).await;
    mock_rpc(
        &mut server,
        "web.get_torrent_info",
        json!({"name": "ubuntu.iso", "info_hash": HASH, "files_tree": {}}),
    )
    .await;
    let status = server
        .mock("POST", "/json")
        .match_body(Matcher::AllOf(vec![
            method("web.get_torrent_status"),
            Matcher::Regex(format!(r#""params":\["{HASH}","#)),
        ]))
        .with_body(rpc_body(torrent_status("ubuntu.iso")))
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let torrent = client
        .normalized_add_torrent(
            &TorrentSource::Base64("ZDQ6aW5mb2Q=".to_string()),
            &NormalizedAddOptions::default(),
        )
        .await
        .unwrap();

    status.assert_async().await;
    assert_eq!(torrent.id, HASH);
    assert_eq!(torrent.name, "ubuntu.iso");
}

#[tokio::test]
async fn test_missing_torrent_is_not_found() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(&mut server, "web.get_torrent_status", json!({})).await;

    let client = authed_client(&server);
    let err = client.get_torrent("abc123hash").await.unwrap_err();

    assert!(matches!(err, DelugeError::NotFound(ref msg) if msg == "Torrent not found"));
}

#[tokio::test]
async fn test_null_status_is_not_found() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(&mut server, "web.get_torrent_status", json!(null)).await;

    let client = authed_client(&server);
    let err = client.get_torrent_status("abc123hash", &[]).await.unwrap_err();

    assert!(matches!(err, DelugeError::NotFound(_)));
}

#[tokio::test]
async fn test_list_torrents_sends_unique_fields_and_filter() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let list = server
        .mock("POST", "/json")
        .match_body(Matcher::AllOf(vec![
            method("web.update_ui"),
            Matcher::Regex(
                r#""upload_payload_rate","label","comment"\],\{"state":"Seeding"\}\]"#.to_string(),
            ),
        ]))
        .with_body(rpc_body(json!({
            "connected": true,
            "stats": {"upload_rate": 0},
            "torrents": {HASH: torrent_status("ubuntu.iso")},
            "filters": {
                "state": [["All", 1], ["Seeding", 1]],
                "tracker_host": [["All", 1]],
                "label": [["", 1]]
            }
        })))
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let mut filter = Map::new();
    filter.insert("state".to_string(), json!("Seeding"));
    let result = client
        .list_torrents(&["label", "comment"], &filter)
        .await
        .unwrap();

    list.assert_async().await;
    assert!(result.connected);
    assert_eq!(result.torrents[HASH].name, "ubuntu.iso");
    assert_eq!(result.filters.state[1], ("Seeding".to_string(), 1));
}

#[tokio::test]
async fn test_get_all_data() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(
        &mut server,
        "web.update_ui",
        json!({
            "connected": true,
            "stats": {},
            "torrents": {HASH: torrent_status("ubuntu.iso")},
            "filters": {
                "state": [["All", 1]],
                "tracker_host": [["All", 1]],
                "label": [["linux", 1], ["movies", 0]]
            }
        }),
    )
    .await;

    let client = authed_client(&server);
    let data = client.get_all_data().await.unwrap();

    assert_eq!(data.torrents.len(), 1);
    assert_eq!(data.torrents[0].id, HASH);
    assert_eq!(data.torrents[0].queue_position, 1);
    assert_eq!(data.labels.len(), 2);
    assert_eq!(data.labels[0].id, "linux");
    assert_eq!(data.labels[0].name, "linux");
    assert_eq!(data.labels[1].count, 0);
}

#[tokio::test]
async fn test_download_from_url() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    server
        .mock("POST", "/json")
        .match_body(Matcher::PartialJson(json!({
            "method": "web.download_torrent_from_url",
            "params": ["https://example.com/ubuntu.torrent", ""]
        })))
        .with_body(rpc_body(json!(TEMP_PATH)))
        .create_async()
        .await;

    let client = authed_client(&server);
    let path = client
        .download_from_url("https://example.com/ubuntu.torrent", "")
        .await
        .unwrap();

    assert_eq!(path, TEMP_PATH);
}

#[tokio::test]
async fn test_download_from_url_failure() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(&mut server, "web.download_torrent_from_url", json!("")).await;

    let client = authed_client(&server);
    let err = client
        .download_from_url("https://example.com/missing.torrent", "")
        .await
        .unwrap_err();

    assert!(matches!(err, DelugeError::AddTorrent(ref msg) if msg == "Failed to download torrent"));
}

#[tokio::test]
async fn test_torrent_actions_send_id_batches() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    let mut mocks = Vec::new();
    for name in [
        "core.pause_torrent",
        "core.resume_torrent",
        "core.force_reannounce",
        "core.force_recheck",
        "core.queue_top",
        "core.queue_bottom",
        "core.queue_up",
        "core.queue_down",
    ] {
        let mock = server
            .mock("POST", "/json")
            .match_body(Matcher::PartialJson(json!({"method": name, "params": [[HASH]]})))
            .with_body(rpc_body(json!(null)))
            .expect(1)
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = authed_client(&server);
    client.pause_torrent(HASH).await.unwrap();
    client.resume_torrent(HASH).await.unwrap();
    client.update_torrent_trackers(HASH).await.unwrap();
    client.verify_torrent(HASH).await.unwrap();
    client.queue_top(HASH).await.unwrap();
    client.queue_bottom(HASH).await.unwrap();
    client.queue_up(HASH).await.unwrap();
    client.queue_down(HASH).await.unwrap();

    for mock in mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_remove_torrent() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    server
        .mock("POST", "/json")
        .match_body(Matcher::PartialJson(json!({
            "method": "core.remove_torrent",
            "params": [HASH, false]
        })))
        .with_body(rpc_body(json!(true)))
        .create_async()
        .await;

    let client = authed_client(&server);
    assert!(client.remove_torrent(HASH, false).await.unwrap());
}

#[tokio::test]
async fn test_plugins() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(
        &mut server,
        "web.get_plugins",
        json!({"enabled_plugins": ["Label"], "available_plugins": ["Label", "Stats"]}),
    )
    .await;
    let enable = server
        .mock("POST", "/json")
        .match_body(Matcher::PartialJson(
            json!({"method": "core.enable_plugin", "params": ["Stats"]}),
        ))
        .with_body(rpc_body(json!(null)))
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let plugins = client.get_plugins().await.unwrap();
    client.enable_plugin(&["Stats"]).await.unwrap();

    assert_eq!(plugins.enabled_plugins, vec!["Label"]);
    assert_eq!(plugins.available_plugins.len(), 2);
    enable.assert_async().await;
}

#[tokio::test]
async fn test_config_round_trip() {
    let mut server = Server::new_async().await;
    mock_connected(&mut server).await;
    mock_rpc(
        &mut server,
        "core.get_config",
        json!({"dht": true, "max_connections_global": 200, "cache_size": 512}),
    )
    .await;
    let set = server
        .mock("POST", "/json")
        .match_body(Matcher::PartialJson(
            json!({"method": "core.set_config", "params": [{"dht": false}]}),
        ))
        .with_body(rpc_body(json!(null)))
        .expect(1)
        .create_async()
        .await;

    let client = authed_client(&server);
    let config = client.get_config().await.unwrap();
    assert_eq!(config.dht, Some(true));
    assert_eq!(config.max_connections_global, Some(200));

    let update = deluge_rs::DelugeSettings {
        dht: Some(false),
        ..Default::default()
    };
    client.set_config(&update).await.unwrap();
    set.assert_async().await;
}
