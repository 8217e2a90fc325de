use anyhow::Result;
use clap::{Parser, Subcommand};
use deluge_rs::{
    normalize_torrent, Config, DelugeClient, NormalizedAddOptions, NormalizedTorrent,
    TorrentSource,
};
use serde_json::Map;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deluge")]
#[command(about = "Deluge Web UI CLI", long_about = None)]
struct Cli {
    /// Path to the config file (default: config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daemon version
    Version,
    /// List the daemons known to the Web UI
    Hosts,
    /// List all torrents
    List,
    /// Add a torrent file, base64 payload, server temp path or magnet link
    Add {
        source: String,
        /// Label to set after adding (requires the Label plugin)
        #[arg(short, long)]
        label: Option<String>,
        /// Add the torrent paused
        #[arg(short, long)]
        paused: bool,
    },
    /// Remove a torrent
    Remove {
        id: String,
        /// Keep the downloaded data on disk
        #[arg(long)]
        keep_data: bool,
    },
    /// Pause a torrent
    Pause { id: String },
    /// Resume a torrent
    Resume { id: String },
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_path(path)?,
        None if std::path::Path::new("config.toml").exists() => Config::new()?,
        None => Config::default(),
    };

    if let Ok(url) = std::env::var("DELUGE_URL") {
        config.deluge.base_url = url;
    }
    if let Ok(password) = std::env::var("DELUGE_PASSWORD") {
        config.deluge.password = password;
    }
    Ok(config)
}

fn print_torrent(torrent: &NormalizedTorrent) {
    println!(
        "{}  {:<12} {:>6.1}%  {:<10} {}",
        torrent.id,
        torrent.state_message,
        torrent.progress * 100.0,
        torrent.label.as_deref().unwrap_or("-"),
        torrent.name
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    info!("Using Deluge Web UI at {}", config.deluge.base_url);
    let client = DelugeClient::new(config.deluge)?;

    match cli.command {
        Commands::Version => {
            println!("{}", client.get_version().await?);
        }
        Commands::Hosts => {
            for host in client.get_hosts().await? {
                let status = client.get_host_status(&host.id).await?;
                println!(
                    "{}  {}:{}  {:?}  {}",
                    host.id,
                    host.ip,
                    host.port,
                    status.state,
                    status.version.as_deref().unwrap_or("-")
                );
            }
        }
        Commands::List => {
            let list = client.list_torrents(&[], &Map::new()).await?;
            let mut torrents: Vec<NormalizedTorrent> = list
                .torrents
                .iter()
                .map(|(id, torrent)| normalize_torrent(id, torrent))
                .collect();
            torrents.sort_by_key(|torrent| torrent.date_added);
            torrents.iter().for_each(print_torrent);
        }
        Commands::Add {
            source,
            label,
            paused,
        } => {
            let options = NormalizedAddOptions {
                start_paused: paused,
                label,
            };
            let torrent = client
                .normalized_add_torrent(&TorrentSource::detect(&source), &options)
                .await?;
            print_torrent(&torrent);
        }
        Commands::Remove { id, keep_data } => {
            let removed = client.remove_torrent(&id, !keep_data).await?;
            println!("{}", if removed { "removed" } else { "not removed" });
        }
        Commands::Pause { id } => {
            client.pause_torrent(&id).await?;
        }
        Commands::Resume { id } => {
            client.resume_torrent(&id).await?;
        }
    }

    Ok(())
}
