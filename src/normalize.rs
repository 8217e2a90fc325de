//! Client agnostic view of a torrent.
//!
//! [`normalize_torrent`] maps the daemon's raw status record onto
//! [`NormalizedTorrent`]. It is pure: the same input always produces the
//! same output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::{Label, Torrent};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TorrentState {
    Queued,
    Checking,
    Downloading,
    Seeding,
    Paused,
    Error,
    Unknown,
}

impl TorrentState {
    /// Case-insensitive lookup of a daemon state string; anything unrecognized
    /// is [`TorrentState::Unknown`].
    pub fn from_daemon(state: &str) -> Self {
        match state.trim().to_lowercase().as_str() {
            "queued" => TorrentState::Queued,
            "checking" => TorrentState::Checking,
            "downloading" => TorrentState::Downloading,
            "seeding" => TorrentState::Seeding,
            "paused" => TorrentState::Paused,
            "error" => TorrentState::Error,
            _ => TorrentState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedTorrent {
    pub id: String,
    pub name: String,
    pub state: TorrentState,
    /// The daemon's state string as sent, e.g. `Allocating` or `Moving`
    pub state_message: String,
    pub is_completed: bool,
    /// Fraction in the 0-1 range
    pub progress: f64,
    pub ratio: f64,
    pub date_added: DateTime<Utc>,
    /// Not reported by the daemon
    pub date_completed: Option<DateTime<Utc>>,
    pub label: Option<String>,
    pub save_path: String,
    /// Bytes per second
    pub upload_speed: f64,
    /// Bytes per second
    pub download_speed: f64,
    /// Seconds, 0 when unknown or finished
    pub eta: i64,
    /// 1-based; 0 when the torrent is not queued
    pub queue_position: i64,
    pub connected_peers: i64,
    pub connected_seeds: i64,
    pub total_peers: i64,
    pub total_seeds: i64,
    pub total_selected: i64,
    pub total_size: i64,
    pub total_uploaded: i64,
    pub total_downloaded: i64,
    pub raw: Torrent,
}

/// Everything the Web UI currently lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AllClientData {
    pub torrents: Vec<NormalizedTorrent>,
    pub labels: Vec<Label>,
}

pub fn normalize_torrent(id: &str, torrent: &Torrent) -> NormalizedTorrent {
    NormalizedTorrent {
        id: id.to_string(),
        name: torrent.name.clone(),
        state: TorrentState::from_daemon(&torrent.state),
        state_message: torrent.state.clone(),
        is_completed: torrent.progress >= 100.0,
        progress: torrent.progress / 100.0,
        ratio: torrent.ratio,
        date_added: epoch_to_utc(torrent.time_added),
        date_completed: None,
        label: torrent.label.clone(),
        save_path: torrent.save_path.clone(),
        upload_speed: torrent.upload_payload_rate,
        download_speed: torrent.download_payload_rate,
        eta: torrent.eta,
        queue_position: torrent.queue + 1,
        connected_peers: torrent.num_peers,
        connected_seeds: torrent.num_seeds,
        total_peers: torrent.total_peers,
        total_seeds: torrent.total_seeds,
        total_selected: torrent.total_wanted,
        total_size: torrent.total_size,
        total_uploaded: torrent.total_uploaded,
        total_downloaded: torrent.total_done,
        raw: torrent.clone(),
    }
}

// Out of range or non-finite values fall back to the epoch.
fn epoch_to_utc(seconds: f64) -> DateTime<Utc> {
    if !seconds.is_finite() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    let secs = seconds.floor() as i64;
    let nanos = ((seconds - seconds.floor()) * 1e9) as u32;
    DateTime::from_timestamp(secs, nanos).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
