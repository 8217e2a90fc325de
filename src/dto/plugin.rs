use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PluginsList {
    pub enabled_plugins: Vec<String>,
    pub available_plugins: Vec<String>,
}

/// Plugin metadata from `web.get_plugin_info`, keys as the daemon sends them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PluginInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "License")]
    pub license: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Home-page")]
    pub home_page: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Platform")]
    pub platform: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Author-email")]
    pub author_email: String,
    #[serde(rename = "Description")]
    pub description: String,
}
