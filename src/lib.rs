//! # deluge-rs
//!
//! An async Rust client for the JSON-RPC API of the Deluge BitTorrent
//! Web UI, with transparent login, automatic daemon connection and
//! version-independent torrent records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use deluge_rs::{DelugeClient, Config, TorrentSource, NormalizedAddOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Load configuration from config.toml
//! let config = Config::new()?;
//! let client = DelugeClient::new(config.deluge)?;
//!
//! // Logs in and connects to the first daemon on first use
//! let data = client.get_all_data().await?;
//! for torrent in &data.torrents {
//!     println!("{} {:?} {:.0}%", torrent.name, torrent.state, torrent.progress * 100.0);
//! }
//!
//! // Add a magnet link with a label
//! let torrent = client
//!     .normalized_add_torrent(
//!         &TorrentSource::detect("magnet:?xt=urn:btih:b0b81206633c42874173d22e564d293daefc45e2"),
//!         &NormalizedAddOptions {
//!             start_paused: false,
//!             label: Some("linux".to_string()),
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Create a `config.toml` file, every key is optional:
//!
//! ```toml
//! [deluge]
//! base_url = "http://localhost:8112/"
//! path = "/json"
//! password = "deluge"
//! timeout_ms = 5000
//! # proxy = "http://127.0.0.1:3128"
//! ```
//!
//! ## Sessions
//!
//! The session cookie and message counter can be exported and restored, so
//! a short-lived process does not have to log in on every run:
//!
//! ```no_run
//! use deluge_rs::{DelugeClient, DelugeConfig, SessionSnapshot};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DelugeClient::new(DelugeConfig::default())?;
//! client.login().await?;
//! let saved = serde_json::to_string(&client.export_state())?;
//!
//! let snapshot: SessionSnapshot = serde_json::from_str(&saved)?;
//! let resumed = DelugeClient::with_state(DelugeConfig::default(), snapshot)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod magnet;
pub mod normalize;
pub mod session;
pub mod source;
pub mod torrents;

// Re-export commonly used types at the crate root
pub use client::DelugeClient;
pub use config::{Config, DelugeConfig};
pub use dto::*;
pub use error::{DelugeError, Result};
pub use normalize::{normalize_torrent, AllClientData, NormalizedTorrent, TorrentState};
pub use session::{SessionCookie, SessionSnapshot};
pub use source::TorrentSource;
