//! JSON REST API for the Personas record service.
//!
//! Exposes an axum [`Router`] backed by any
//! [`personas_core::store::PersonStore`]. The `server` binary wires it to
//! the SQLite backend.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = personas_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::{CredentialDirectory, JwtAuth, Role};
use personas_core::{service::PersonService, store::PersonStore};

#[cfg(test)]
mod tests;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` merged with
/// `PERSONAS_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub jwt:        JwtConfig,
  /// Optional credential entries; the demo pair is used when empty.
  #[serde(default)]
  pub credentials: Vec<CredentialEntry>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:        default_host(),
      port:        default_port(),
      store_path:  default_store_path(),
      jwt:         JwtConfig::default(),
      credentials: Vec::new(),
    }
  }
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
  #[serde(default = "default_jwt_secret")]
  pub secret:   String,
  #[serde(default = "default_jwt_issuer")]
  pub issuer:   String,
  #[serde(default = "default_jwt_audience")]
  pub audience: String,
  /// Token lifetime in seconds.
  #[serde(default = "default_jwt_ttl")]
  pub token_ttl_secs: u64,
}

impl Default for JwtConfig {
  fn default() -> Self {
    Self {
      secret:   default_jwt_secret(),
      issuer:   default_jwt_issuer(),
      audience: default_jwt_audience(),
      token_ttl_secs: default_jwt_ttl(),
    }
  }
}

/// One credential directory entry, as written in config.
#[derive(Deserialize, Clone)]
pub struct CredentialEntry {
  pub username:      String,
  /// PHC string produced by argon2; see the server's `--hash-password`
  /// helper.
  pub password_hash: String,
  pub role:          Role,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 3000 }
fn default_store_path() -> PathBuf { PathBuf::from("personas.db") }
// Demo fallback only; override in any real deployment.
fn default_jwt_secret() -> String { "personas-demo-secret".to_owned() }
fn default_jwt_issuer() -> String { "personas".to_owned() }
fn default_jwt_audience() -> String { "personas-users".to_owned() }
fn default_jwt_ttl() -> u64 { 24 * 60 * 60 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S: PersonStore> {
  pub service:     PersonService<S>,
  pub auth:        Arc<JwtAuth>,
  pub credentials: Arc<dyn CredentialDirectory>,
}

impl<S: PersonStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      service:     self.service.clone(),
      auth:        Arc::clone(&self.auth),
      credentials: Arc::clone(&self.credentials),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Personas API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PersonStore + 'static,
{
  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/auth/login", post(handlers::login::login::<S>))
    .route(
      "/api/personas",
      get(handlers::personas::list::<S>)
        .post(handlers::personas::create::<S>),
    )
    .route(
      "/api/personas/search",
      post(handlers::personas::search::<S>),
    )
    .route(
      "/api/personas/validate-identificacion/{value}",
      get(handlers::personas::validate_identification::<S>),
    )
    .route(
      "/api/personas/{id}",
      get(handlers::personas::get_one::<S>)
        .put(handlers::personas::update::<S>)
        .delete(handlers::personas::delete_one::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive())
    .with_state(state)
}
