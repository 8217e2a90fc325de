use base64::{engine::general_purpose, Engine as _};
use std::path::{Path, PathBuf};

use crate::error::{DelugeError, Result};
use crate::magnet;

/// Prefix of the temp files the Web UI's upload endpoint writes to.
pub const TEMP_PATH_PREFIX: &str = "/tmp/";

/// Torrent input accepted by the upload and add operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TorrentSource {
    /// A `.torrent` file on the local file system
    Path(PathBuf),
    /// Base64 encoded `.torrent` contents
    Base64(String),
    /// Raw `.torrent` contents
    Bytes(Vec<u8>),
    /// A file already uploaded to the Web UI, e.g.
    /// `/tmp/delugeweb-DfEsgR/tmpD3rujY.torrent`
    TempPath(String),
    Magnet(String),
}

impl TorrentSource {
    /// Classifies a single string argument.
    ///
    /// Magnet URIs and server temp paths are recognized by prefix, an
    /// existing local file is read from disk and anything else is treated as
    /// base64.
    pub fn detect(input: &str) -> Self {
        if magnet::is_magnet(input) {
            TorrentSource::Magnet(input.trim().to_string())
        } else if input.starts_with(TEMP_PATH_PREFIX) {
            TorrentSource::TempPath(input.to_string())
        } else if Path::new(input).is_file() {
            TorrentSource::Path(PathBuf::from(input))
        } else {
            TorrentSource::Base64(input.to_string())
        }
    }

    /// Resolves the `.torrent` contents to upload.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            TorrentSource::Path(path) => Ok(tokio::fs::read(path).await?),
            TorrentSource::Base64(encoded) => general_purpose::STANDARD
                .decode(encoded.trim())
                .map_err(|e| DelugeError::InvalidTorrent(format!("invalid base64: {e}"))),
            TorrentSource::Bytes(bytes) => Ok(bytes.clone()),
            TorrentSource::TempPath(path) => Err(DelugeError::InvalidTorrent(format!(
                "{path} is already on the server"
            ))),
            TorrentSource::Magnet(_) => Err(DelugeError::InvalidTorrent(
                "magnet links carry no torrent file".to_string(),
            )),
        }
    }
}

impl From<Vec<u8>> for TorrentSource {
    fn from(bytes: Vec<u8>) -> Self {
        TorrentSource::Bytes(bytes)
    }
}

impl From<&[u8]> for TorrentSource {
    fn from(bytes: &[u8]) -> Self {
        TorrentSource::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for TorrentSource {
    fn from(path: PathBuf) -> Self {
        TorrentSource::Path(path)
    }
}

impl From<&str> for TorrentSource {
    fn from(input: &str) -> Self {
        TorrentSource::detect(input)
    }
}

impl From<String> for TorrentSource {
    fn from(input: String) -> Self {
        TorrentSource::detect(&input)
    }
}
