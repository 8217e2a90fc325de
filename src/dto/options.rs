use serde::{Deserialize, Serialize};

/// Options for `web.add_torrents` / `core.add_torrent_magnet`.
///
/// Every field is optional. Unset fields are not sent, so the daemon applies
/// its own defaults; [`AddTorrentOptions::merge_defaults`] fills in the
/// documented client defaults before a torrent is submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddTorrentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_priorities: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compact_allocation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_download_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_slots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritize_first_last_pieces: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_allocate_storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequential_download: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_seeding: Option<bool>,
}

impl AddTorrentOptions {
    /// The defaults submitted with every add request.
    ///
    /// `download_location` and `move_completed_path` stay unset so the
    /// daemon's configured directories are used.
    pub fn daemon_defaults() -> Self {
        Self {
            file_priorities: Some(Vec::new()),
            add_paused: Some(false),
            compact_allocation: Some(false),
            download_location: None,
            max_connections: Some(-1),
            max_download_speed: Some(-1.0),
            max_upload_slots: Some(-1),
            max_upload_speed: Some(-1.0),
            prioritize_first_last_pieces: Some(false),
            move_completed: Some(false),
            move_completed_path: None,
            pre_allocate_storage: Some(false),
            seed_mode: Some(false),
            sequential_download: Some(false),
            super_seeding: Some(false),
        }
    }

    /// Returns these options laid over [`AddTorrentOptions::daemon_defaults`].
    pub fn merge_defaults(&self) -> Self {
        let defaults = Self::daemon_defaults();
        Self {
            file_priorities: self.file_priorities.clone().or(defaults.file_priorities),
            add_paused: self.add_paused.or(defaults.add_paused),
            compact_allocation: self.compact_allocation.or(defaults.compact_allocation),
            download_location: self.download_location.clone().or(defaults.download_location),
            max_connections: self.max_connections.or(defaults.max_connections),
            max_download_speed: self.max_download_speed.or(defaults.max_download_speed),
            max_upload_slots: self.max_upload_slots.or(defaults.max_upload_slots),
            max_upload_speed: self.max_upload_speed.or(defaults.max_upload_speed),
            prioritize_first_last_pieces: self
                .prioritize_first_last_pieces
                .or(defaults.prioritize_first_last_pieces),
            move_completed: self.move_completed.or(defaults.move_completed),
            move_completed_path: self
                .move_completed_path
                .clone()
                .or(defaults.move_completed_path),
            pre_allocate_storage: self.pre_allocate_storage.or(defaults.pre_allocate_storage),
            seed_mode: self.seed_mode.or(defaults.seed_mode),
            sequential_download: self.sequential_download.or(defaults.sequential_download),
            super_seeding: self.super_seeding.or(defaults.super_seeding),
        }
    }
}

/// Client agnostic add options used by [`crate::DelugeClient::normalized_add_torrent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormalizedAddOptions {
    #[serde(default)]
    pub start_paused: bool,
    #[serde(default)]
    pub label: Option<String>,
}

/// Per torrent options for `core.set_torrent_options`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TorrentOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_download_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_slots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prioritize_first_last: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_managed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_at_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_at_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub super_seeding: Option<bool>,
}
