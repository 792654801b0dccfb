mod config;

use anyhow::{Context, Result};
use frag_auth::BasicAuth;
use frag_axum::{FragmentsApp, FragmentsState};
use frag_blob::FragmentDb;
use frag_core::Fragments;
use tracing::info;

pub use config::ServerConfig;

/// Wire storage, credentials and routes from `config`
pub async fn build(config: &ServerConfig) -> Result<FragmentsApp> {
    let auth = BasicAuth::from_file(&config.htpasswd_file)
        .with_context(|| format!("loading {}", config.htpasswd_file.display()))?;

    let db = FragmentDb::from_config(config.store.clone())
        .await
        .context("initializing fragment storage")?;

    let mut state = FragmentsState::new(Fragments::new(db), auth);
    if let Some(api_url) = &config.api_url {
        state = state.with_api_url(api_url);
    }

    info!(
        store = config.store.name(),
        max_body_bytes = config.max_body_bytes,
        "fragments app built"
    );
    Ok(FragmentsApp::with_body_limit(state, config.max_body_bytes))
}
