use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Daemon preferences as read by `core.get_config` and written by `core.set_config`.
///
/// Only the commonly tuned keys are typed; the rest of the preferences
/// round-trip through `extra`. Unset fields are left out of `set_config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DelugeSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_completed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_ports: Option<[u16; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_port: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing_ports: Option<[u16; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_outgoing_ports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_interface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dht: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upnp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natpmp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utpex: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lsd: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections_global: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_download_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_upload_slots_global: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_active_seeding: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_active_downloading: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_active_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue_new_to_top: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_seed_at_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_seed_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_ratio_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_plugins: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
