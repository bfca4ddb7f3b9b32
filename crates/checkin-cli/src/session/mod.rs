//! Connecting the CLI to the backend with the stored session.

pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use checkin_client::{CheckinApi, ClientConfig};
use checkin_core::ApiUrl;

use crate::cli::{DEFAULT_API_URL, GlobalArgs};
use storage::FileCredentialStore;

/// Build an API handle whose tokens live in the session file.
///
/// The backend URL comes from `--api-url`, then from the stored session,
/// then the built-in default.
pub fn connect(global: &GlobalArgs) -> Result<CheckinApi> {
    let path = storage::session_path()?;

    let api_url = match global.api_url {
        Some(ref url) => url.clone(),
        None => storage::load_session(&path)?
            .and_then(|session| session.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
    };
    let api_url = ApiUrl::new(&api_url).context("Invalid API URL")?;
    debug!(api_url = %api_url, session = %path.display(), "Connecting");

    let mut config = ClientConfig::new(api_url.clone())
        .with_user_agent(concat!("checkin-cli/", env!("CHECKIN_VERSION")));
    if let Some(secs) = global.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let store = Arc::new(FileCredentialStore::new(path, api_url));
    let client = checkin_client::AuthClient::new(config, store)
        .context("Failed to initialise HTTP client")?;
    Ok(CheckinApi::new(client))
}

/// Like [`connect`], but fails early when nobody is logged in.
pub async fn connect_logged_in(global: &GlobalArgs) -> Result<CheckinApi> {
    let api = connect(global)?;
    let logged_in = api.client().refresh_token().await?.is_some()
        || api.client().access_token().await?.is_some();
    anyhow::ensure!(logged_in, "No active session. Run 'checkin login' first.");
    Ok(api)
}
