//! Ranger server binary.
//!
//! Two modes:
//!
//! ```text
//! ranger serve              # serve the JSON API over HTTP
//! ranger import <file>      # bulk-load a delimited observation export
//! ```
//!
//! Configuration comes from `config.toml` (or the path given with
//! `--config`), overridable through `RANGER_`-prefixed environment
//! variables.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use ranger_import::ImportOptions;
use ranger_store_sqlite::SqliteStore;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Ranger biodiversity records server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API over HTTP.
  Serve,

  /// Import a delimited-text observation export into the store.
  Import {
    /// Path to the export file.
    file:   PathBuf,
    /// Override the configured local offset, in whole hours east of UTC.
    #[arg(long)]
    offset: Option<i32>,
  },
}

/// Runtime configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:             String,
  #[serde(default = "default_port")]
  port:             u16,
  #[serde(default = "default_db_path")]
  db_path:          PathBuf,
  /// Local offset applied to export timestamps, in whole hours east of UTC.
  #[serde(default = "default_utc_offset_hours")]
  utc_offset_hours: i32,
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}
fn default_port() -> u16 {
  8080
}
fn default_db_path() -> PathBuf {
  PathBuf::from("ranger.db")
}
fn default_utc_offset_hours() -> i32 {
  10
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("RANGER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let db_path = expand_tilde(&server_cfg.db_path);
  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open store at {db_path:?}"))?;
  let store = Arc::new(store);

  match cli.command {
    Command::Serve => serve(store, &server_cfg).await,
    Command::Import { file, offset } => {
      let hours = offset.unwrap_or(server_cfg.utc_offset_hours);
      import(&store, &file, hours).await
    }
  }
}

async fn serve(
  store: Arc<SqliteStore>,
  config: &ServerConfig,
) -> anyhow::Result<()> {
  let app = axum::Router::new()
    .nest("/api", ranger_api::api_router(store))
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", config.host, config.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

async fn import(
  store: &SqliteStore,
  file: &Path,
  offset_hours: i32,
) -> anyhow::Result<()> {
  let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
    .context("utc offset out of range")?;
  let options = ImportOptions { utc_offset };

  let inserted = ranger_import::import_file(store, file, &options)
    .await
    .with_context(|| format!("import of {file:?} failed"))?;

  tracing::info!(inserted, "import complete");
  println!("imported {inserted} observations");
  Ok(())
}

/// Expand a leading `~/` using `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
