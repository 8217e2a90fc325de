use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A daemon known to the Web UI, as listed by `web.get_hosts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "HostRow")]
pub struct Host {
    pub id: String,
    pub ip: String,
    pub port: u16,
    /// Status on 1.x, username on 2.x
    pub name: String,
}

#[derive(Deserialize)]
struct HostRow(String, String, u16, String);

impl From<HostRow> for Host {
    fn from(HostRow(id, ip, port, name): HostRow) -> Self {
        Self { id, ip, port, name }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HostState {
    Online,
    Offline,
    Connected,
}

impl HostState {
    fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "Online" => Some(HostState::Online),
            "Offline" => Some(HostState::Offline),
            "Connected" => Some(HostState::Connected),
            _ => None,
        }
    }
}

/// Result of `web.get_host_status`.
///
/// 1.x answers `[id, ip, port, status, version]`, 2.x answers
/// `[id, status, version]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<Value>")]
pub struct HostStatus {
    pub id: String,
    pub state: HostState,
    pub version: Option<String>,
}

impl TryFrom<Vec<Value>> for HostStatus {
    type Error = String;

    fn try_from(row: Vec<Value>) -> Result<Self, Self::Error> {
        let id = row
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| format!("host status without id: {row:?}"))?
            .to_string();

        let (position, state) = row
            .iter()
            .enumerate()
            .skip(1)
            .find_map(|(i, value)| HostState::from_value(value).map(|state| (i, state)))
            .ok_or_else(|| format!("host status without state: {row:?}"))?;

        let version = row
            .get(position + 1..)
            .and_then(|rest| rest.iter().rev().find_map(Value::as_str))
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Self { id, state, version })
    }
}

/// Result of `web.disconnect`.
///
/// 1.x returns a boolean, 2.x returns a message such as
/// `"Connection was closed cleanly."`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DisconnectResult {
    Closed(bool),
    Message(String),
}

impl DisconnectResult {
    pub fn closed(&self) -> bool {
        match self {
            DisconnectResult::Closed(closed) => *closed,
            DisconnectResult::Message(message) => message.contains("closed cleanly"),
        }
    }
}
