use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::lenient;

/// Raw torrent status as returned by `web.update_ui` / `web.get_torrent_status`.
///
/// Only the fields requested by this client are mapped; everything else the
/// daemon sends is kept in `extra` so callers can reach undocumented fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Torrent {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub state: String,
    /// Percentage in the 0-100 range
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub progress: f64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub ratio: f64,
    /// Epoch seconds
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub time_added: f64,
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub save_path: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub tracker_host: String,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub upload_payload_rate: f64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub download_payload_rate: f64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub max_download_speed: f64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub max_upload_speed: f64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub eta: i64,
    /// 0-based queue position, -1 when the torrent is not queued
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub queue: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub num_peers: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub num_seeds: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_peers: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_seeds: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_wanted: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_size: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_uploaded: i64,
    #[serde(deserialize_with = "lenient::deserialize_i64")]
    pub total_done: i64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub seeds_peers_ratio: f64,
    #[serde(deserialize_with = "lenient::deserialize_f64")]
    pub distributed_copies: f64,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub is_auto_managed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentList {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub stats: Map<String, Value>,
    pub connected: bool,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub torrents: HashMap<String, Torrent>,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub filters: TorrentFilters,
}

/// Filter buckets from `web.update_ui`, each entry is `(value, count)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentFilters {
    pub state: Vec<(String, i64)>,
    pub tracker_host: Vec<(String, i64)>,
    /// Only present when the Label plugin is enabled
    pub label: Option<Vec<(String, i64)>>,
}

/// Metadata of an uploaded, not yet added, torrent file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentInfo {
    pub name: String,
    pub info_hash: String,
    #[serde(default)]
    pub files_tree: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tracker {
    pub tier: u32,
    pub url: String,
}

/// Body of the `/upload` endpoint, e.g.
/// `{"files": ["/tmp/delugeweb-5Q9ttR/tmpL7xhth.torrent"], "success": true}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub files: Vec<String>,
    pub success: bool,
}

/// Result of `web.add_torrents`.
///
/// Deluge 1.x only reports overall success, 2.x reports `[success, hash]`
/// per submitted torrent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AddTorrentsResult {
    Accepted(bool),
    Torrents(Vec<(bool, String)>),
}

impl AddTorrentsResult {
    /// Hash of the first torrent, only when the daemon accepted it. A
    /// rejected 2.x entry carries the error message in the hash slot.
    pub fn first_hash(&self) -> Option<&str> {
        match self {
            AddTorrentsResult::Accepted(_) => None,
            AddTorrentsResult::Torrents(torrents) => match torrents.first() {
                Some((true, hash)) => Some(hash.as_str()),
                _ => None,
            },
        }
    }

    /// `false` for a 1.x `false` or a 2.x list whose first entry failed.
    pub fn is_accepted(&self) -> bool {
        match self {
            AddTorrentsResult::Accepted(accepted) => *accepted,
            AddTorrentsResult::Torrents(torrents) => {
                torrents.first().map_or(true, |(success, _)| *success)
            }
        }
    }
}

/// What [`crate::DelugeClient::add_torrent`] hands back.
#[derive(Debug, Clone)]
pub struct AddedTorrent {
    /// Server side temp path the torrent was registered from
    pub path: String,
    pub result: AddTorrentsResult,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub count: i64,
}
