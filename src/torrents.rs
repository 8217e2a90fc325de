use reqwest::header::COOKIE;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::client::DelugeClient;
use crate::dto::*;
use crate::error::{DelugeError, Result};
use crate::magnet;
use crate::normalize::{normalize_torrent, AllClientData, NormalizedTorrent};
use crate::source::TorrentSource;

/// File name the upload endpoint receives, the daemon ignores it.
const UPLOAD_FILE_NAME: &str = "temp.torrent";

/// Fields requested by [`DelugeClient::list_torrents`].
pub const LIST_FIELDS: &[&str] = &[
    "distributed_copies",
    "download_payload_rate",
    "eta",
    "is_auto_managed",
    "max_download_speed",
    "max_upload_speed",
    "name",
    "num_peers",
    "num_seeds",
    "progress",
    "queue",
    "ratio",
    "save_path",
    "seeds_peers_ratio",
    "state",
    "time_added",
    "total_done",
    "total_peers",
    "total_seeds",
    "total_uploaded",
    "total_wanted",
    "tracker_host",
    "upload_payload_rate",
    // answered with nothing when the Label plugin is disabled
    "label",
];

/// Fields requested by [`DelugeClient::get_torrent_status`].
pub const STATUS_FIELDS: &[&str] = &[
    "total_done",
    "total_payload_download",
    "total_uploaded",
    "total_payload_upload",
    "next_announce",
    "tracker_status",
    "tracker",
    "comment",
    "num_pieces",
    "piece_length",
    "is_auto_managed",
    "active_time",
    "seeding_time",
    "seed_rank",
    "queue",
    "name",
    "total_wanted",
    "state",
    "progress",
    "num_seeds",
    "total_seeds",
    "num_peers",
    "total_peers",
    "download_payload_rate",
    "upload_payload_rate",
    "eta",
    "ratio",
    "distributed_copies",
    "time_added",
    "tracker_host",
    "save_path",
    "total_size",
    "num_files",
    "max_download_speed",
    "max_upload_speed",
    "seeds_peers_ratio",
    "label",
];

/// `base` followed by `extra`, first occurrence wins.
pub fn merge_fields(base: &[&str], extra: &[&str]) -> Vec<String> {
    let mut seen = HashSet::new();
    base.iter()
        .chain(extra.iter())
        .filter(|field| seen.insert(**field))
        .map(|field| field.to_string())
        .collect()
}

fn id_batch(torrent_id: &str) -> Value {
    json!([torrent_id])
}

impl DelugeClient {
    // ========================================================================
    // Torrent Add Workflow
    // ========================================================================

    /// Uploads a `.torrent` file to the Web UI's temp directory.
    ///
    /// The upload endpoint sits outside the JSON-RPC envelope and answers
    /// with JSON in a text body.
    pub async fn upload(&self, source: &TorrentSource) -> Result<UploadResponse> {
        self.validate_auth().await?;
        if !self.connected().await? {
            self.connect(None, 0).await?;
        }

        let bytes = source.read_bytes().await?;
        debug!("Uploading {} bytes to {}", bytes.len(), self.upload_url());
        let form = Form::new().part("file", Part::bytes(bytes).file_name(UPLOAD_FILE_NAME));

        let mut builder = self.http().post(self.upload_url().clone()).multipart(form);
        if let Some(cookie) = self.cookie_header() {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder.send().await?.error_for_status()?;
        let response_text = response.text().await?;
        let upload: UploadResponse = serde_json::from_str(&response_text)?;

        if !upload.success {
            return Err(DelugeError::Upload(format!(
                "upload endpoint rejected the file: {response_text}"
            )));
        }
        Ok(upload)
    }

    /// Registers a torrent file with the daemon.
    ///
    /// Anything but a [`TorrentSource::TempPath`] is uploaded first. Caller
    /// options are laid over [`AddTorrentOptions::daemon_defaults`].
    pub async fn add_torrent(
        &self,
        source: &TorrentSource,
        options: &AddTorrentOptions,
    ) -> Result<AddedTorrent> {
        let path = match source {
            TorrentSource::TempPath(path) => path.clone(),
            TorrentSource::Magnet(_) => {
                return Err(DelugeError::InvalidTorrent(
                    "magnet links are added with add_torrent_magnet".to_string(),
                ))
            }
            _ => {
                let upload = self.upload(source).await?;
                upload
                    .files
                    .into_iter()
                    .next()
                    .ok_or_else(|| DelugeError::Upload("Failed to upload".to_string()))?
            }
        };

        let options = options.merge_defaults();
        let params = [json!([{ "path": path, "options": options }])];
        let reply = self.request("web.add_torrents", &params, true, true).await?;

        if !is_truthy(reply.result()) {
            return Err(DelugeError::AddTorrent("Failed to add torrent".to_string()));
        }

        let result: AddTorrentsResult = serde_json::from_value(reply.into_result())?;
        if !result.is_accepted() {
            warn!("Daemon rejected torrent from {}: {:?}", path, result);
            return Err(DelugeError::AddTorrent("Failed to add torrent".to_string()));
        }
        info!("Added torrent from {}", path);
        Ok(AddedTorrent { path, result })
    }

    /// Adds a magnet link; returns the daemon's result (the info hash on 2.x).
    pub async fn add_torrent_magnet(
        &self,
        uri: &str,
        options: &AddTorrentOptions,
    ) -> Result<Value> {
        let options = options.merge_defaults();
        let reply = self
            .request(
                "core.add_torrent_magnet",
                &[Value::from(uri), serde_json::to_value(options)?],
                true,
                true,
            )
            .await?;
        Ok(reply.into_result())
    }

    /// Adds a torrent file or magnet link and returns it normalized.
    ///
    /// A requested label is set once. The daemon can take a few seconds to
    /// report it, so the returned record may not carry it yet.
    pub async fn normalized_add_torrent(
        &self,
        source: &TorrentSource,
        options: &NormalizedAddOptions,
    ) -> Result<NormalizedTorrent> {
        let add_options = AddTorrentOptions {
            add_paused: options.start_paused.then_some(true),
            ..Default::default()
        };

        let hash = match source {
            TorrentSource::Magnet(uri) => {
                let hash = magnet::info_hash(uri).ok_or_else(|| {
                    DelugeError::InvalidTorrent("Magnet did not contain hash".to_string())
                })?;
                self.add_torrent_magnet(uri, &add_options).await?;
                hash
            }
            _ => {
                let added = self.add_torrent(source, &add_options).await?;
                match added.result.first_hash() {
                    Some(hash) => hash.to_string(),
                    None => self.get_torrent_info(&added.path).await?.info_hash,
                }
            }
        };

        if let Some(label) = &options.label {
            self.set_torrent_label(&hash, label).await?;
        }

        self.get_torrent(&hash).await
    }

    /// Metadata of an uploaded torrent, before it is added
    pub async fn get_torrent_info(&self, tmp_path: &str) -> Result<TorrentInfo> {
        self.call("web.get_torrent_info", &[Value::from(tmp_path)]).await
    }

    /// Has the Web UI fetch a torrent file, returning its temp path for
    /// [`Self::add_torrent`].
    pub async fn download_from_url(&self, url: &str, cookies: &str) -> Result<String> {
        let reply = self
            .request(
                "web.download_torrent_from_url",
                &[Value::from(url), Value::from(cookies)],
                true,
                true,
            )
            .await?;

        match reply.into_result() {
            Value::String(path) if !path.is_empty() => Ok(path),
            _ => Err(DelugeError::AddTorrent(
                "Failed to download torrent".to_string(),
            )),
        }
    }

    // ========================================================================
    // Torrent Operations
    // ========================================================================

    pub async fn remove_torrent(&self, torrent_id: &str, remove_data: bool) -> Result<bool> {
        let reply = self
            .request(
                "core.remove_torrent",
                &[Value::from(torrent_id), Value::Bool(remove_data)],
                true,
                true,
            )
            .await?;
        Ok(is_truthy(reply.result()))
    }

    /// Raw torrent list from `web.update_ui`
    pub async fn list_torrents(
        &self,
        additional_fields: &[&str],
        filter: &Map<String, Value>,
    ) -> Result<TorrentList> {
        let fields = merge_fields(LIST_FIELDS, additional_fields);
        self.call("web.update_ui", &[json!(fields), Value::Object(filter.clone())])
            .await
    }

    pub async fn get_all_data(&self) -> Result<AllClientData> {
        let list = self.list_torrents(&[], &Map::new()).await?;

        let torrents = list
            .torrents
            .iter()
            .map(|(id, torrent)| normalize_torrent(id, torrent))
            .collect();

        let labels = list
            .filters
            .label
            .unwrap_or_default()
            .into_iter()
            .map(|(name, count)| Label {
                id: name.clone(),
                name,
                count,
            })
            .collect();

        Ok(AllClientData { torrents, labels })
    }

    pub async fn get_torrent(&self, torrent_id: &str) -> Result<NormalizedTorrent> {
        let torrent = self.get_torrent_status(torrent_id, &[]).await?;
        Ok(normalize_torrent(torrent_id, &torrent))
    }

    pub async fn get_torrent_status(
        &self,
        torrent_id: &str,
        additional_fields: &[&str],
    ) -> Result<Torrent> {
        let fields = merge_fields(STATUS_FIELDS, additional_fields);
        let reply = self
            .request(
                "web.get_torrent_status",
                &[Value::from(torrent_id), json!(fields)],
                true,
                true,
            )
            .await?;

        match reply.into_result() {
            Value::Object(status) if !status.is_empty() => {
                Ok(serde_json::from_value(Value::Object(status))?)
            }
            _ => Err(DelugeError::NotFound("Torrent not found".to_string())),
        }
    }

    /// File tree of a torrent, as the daemon sends it
    pub async fn get_torrent_files(&self, torrent_id: &str) -> Result<Value> {
        self.call("web.get_torrent_files", &[Value::from(torrent_id)])
            .await
    }

    pub async fn pause_torrent(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.pause_torrent", &[id_batch(torrent_id)]).await
    }

    pub async fn resume_torrent(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.resume_torrent", &[id_batch(torrent_id)]).await
    }

    pub async fn set_torrent_options(
        &self,
        torrent_id: &str,
        options: &TorrentOptions,
    ) -> Result<Value> {
        self.call(
            "core.set_torrent_options",
            &[id_batch(torrent_id), serde_json::to_value(options)?],
        )
        .await
    }

    pub async fn set_torrent_trackers(
        &self,
        torrent_id: &str,
        trackers: &[Tracker],
    ) -> Result<Value> {
        self.call(
            "core.set_torrent_trackers",
            &[id_batch(torrent_id), serde_json::to_value(trackers)?],
        )
        .await
    }

    /// Forces a reannounce to all trackers
    pub async fn update_torrent_trackers(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.force_reannounce", &[id_batch(torrent_id)])
            .await
    }

    /// Forces a recheck of the downloaded data
    pub async fn verify_torrent(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.force_recheck", &[id_batch(torrent_id)]).await
    }

    // ========================================================================
    // Label Operations (Label plugin)
    // ========================================================================

    pub async fn set_torrent_label(&self, torrent_id: &str, label: &str) -> Result<Value> {
        self.call(
            "label.set_torrent",
            &[Value::from(torrent_id), Value::from(label)],
        )
        .await
    }

    pub async fn add_label(&self, label: &str) -> Result<Value> {
        self.call("label.add", &[Value::from(label)]).await
    }

    pub async fn remove_label(&self, label: &str) -> Result<Value> {
        self.call("label.remove", &[Value::from(label)]).await
    }

    pub async fn get_labels(&self) -> Result<Vec<String>> {
        self.call("label.get_labels", &[]).await
    }

    // ========================================================================
    // Queue Operations
    // ========================================================================

    pub async fn queue_top(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.queue_top", &[id_batch(torrent_id)]).await
    }

    pub async fn queue_bottom(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.queue_bottom", &[id_batch(torrent_id)]).await
    }

    pub async fn queue_up(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.queue_up", &[id_batch(torrent_id)]).await
    }

    pub async fn queue_down(&self, torrent_id: &str) -> Result<Value> {
        self.call("core.queue_down", &[id_batch(torrent_id)]).await
    }

    // ========================================================================
    // Daemon Config and Plugins
    // ========================================================================

    pub async fn get_config(&self) -> Result<DelugeSettings> {
        self.call("core.get_config", &[]).await
    }

    /// Writes only the fields that are set
    pub async fn set_config(&self, settings: &DelugeSettings) -> Result<Value> {
        self.call("core.set_config", &[serde_json::to_value(settings)?])
            .await
    }

    pub async fn get_plugins(&self) -> Result<PluginsList> {
        self.call("web.get_plugins", &[]).await
    }

    pub async fn get_plugin_info(&self, plugins: &[&str]) -> Result<PluginInfo> {
        self.call("web.get_plugin_info", &plugin_params(plugins)).await
    }

    pub async fn enable_plugin(&self, plugins: &[&str]) -> Result<Value> {
        self.call("core.enable_plugin", &plugin_params(plugins)).await
    }

    pub async fn disable_plugin(&self, plugins: &[&str]) -> Result<Value> {
        self.call("core.disable_plugin", &plugin_params(plugins)).await
    }
}

fn plugin_params(plugins: &[&str]) -> Vec<Value> {
    plugins.iter().map(|plugin| Value::from(*plugin)).collect()
}
