//! Server assembly for the bulletin board: configuration and the
//! top-level router.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use axum::Router;
use bbs_api::{ApiState, AuthConfig, api_router};
use bbs_core::store::BoardStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `BBS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub store_path:          PathBuf,
  pub jwt_secret:          String,
  #[serde(default = "default_ttl")]
  pub token_ttl_minutes:   i64,
  #[serde(default = "default_admin")]
  pub admin_username:      String,
  #[serde(default = "default_admin_email")]
  pub admin_email:         String,
  /// argon2 PHC string; no administrator is bootstrapped when absent.
  #[serde(default)]
  pub admin_password_hash: Option<String>,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_ttl() -> i64 { 24 * 60 }

fn default_admin() -> String { "admin".into() }

fn default_admin_email() -> String { "admin@localhost".into() }

impl ServerConfig {
  pub fn auth(&self) -> AuthConfig {
    AuthConfig::new(
      self.jwt_secret.clone(),
      chrono::Duration::minutes(self.token_ttl_minutes),
    )
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Ensure the configured administrator exists, then build the full router
/// with the API under `/api` and request tracing.
pub async fn build_app<S>(config: &ServerConfig, store: Arc<S>) -> anyhow::Result<Router>
where
  S: BoardStore + 'static,
{
  anyhow::ensure!(!config.jwt_secret.is_empty(), "jwt_secret must not be empty");
  let state = ApiState::new(store, config.auth());

  if let Some(hash) = &config.admin_password_hash {
    let admin = state
      .forum
      .bootstrap_admin(&config.admin_username, &config.admin_email, hash.clone())
      .await
      .context("failed to bootstrap administrator")?;
    info!(username = %admin.username, "administrator ready");
  }

  Ok(
    Router::new()
      .nest("/api", api_router(state))
      .layer(TraceLayer::new_for_http()),
  )
}
