//! Personas API server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens an
//! in-process SQLite store, seeds the demo data on first run, and serves the
//! REST API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for a `[[credentials]]` entry in
//! config.toml:
//!
//! ```
//! cargo run -p personas-api --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use personas_api::{
  AppState, ServerConfig,
  auth::{Credential, JwtAuth, StaticCredentials},
};
use personas_core::service::PersonService;
use personas_store_sqlite::{SqliteStore, seed};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Personas record service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let hash = personas_api::auth::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PERSONAS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the SQLite store and seed it on first run.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  if seed::seed_demo_data(&store).await? {
    tracing::info!("seeded demo catalog and persons");
  }

  // Build the credential directory: config entries, or the demo pair.
  let credentials = if server_cfg.credentials.is_empty() {
    tracing::warn!("no credentials configured; using the demo pair");
    StaticCredentials::demo()
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
  } else {
    StaticCredentials::new(server_cfg.credentials.iter().map(|entry| {
      (
        entry.username.clone(),
        Credential {
          password_hash: entry.password_hash.clone(),
          role:          entry.role,
        },
      )
    }))
  };

  // Build application state.
  let state = AppState {
    service:     PersonService::new(Arc::new(store)),
    auth:        Arc::new(JwtAuth::new(
      &server_cfg.jwt.secret,
      server_cfg.jwt.issuer.clone(),
      server_cfg.jwt.audience.clone(),
      server_cfg.jwt.token_ttl_secs,
    )),
    credentials: Arc::new(credentials),
  };

  let app = personas_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
