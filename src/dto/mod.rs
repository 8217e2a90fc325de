pub mod host;
pub mod lenient;
pub mod options;
pub mod plugin;
pub mod rpc;
pub mod settings;
pub mod torrent;

// Re-export commonly used types for convenience
pub use host::{DisconnectResult, Host, HostState, HostStatus};
pub use options::{AddTorrentOptions, NormalizedAddOptions, TorrentOptions};
pub use plugin::{PluginInfo, PluginsList};
pub use rpc::{is_truthy, RpcReply, RpcRequest, RpcResponse};
pub use settings::DelugeSettings;
pub use torrent::{
    AddTorrentsResult, AddedTorrent, Label, Torrent, TorrentFilters, TorrentInfo, TorrentList,
    Tracker, UploadResponse,
};
