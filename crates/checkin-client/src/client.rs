//! Authenticated request client.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info, instrument, trace, warn};

use checkin_core::error::{AuthError, Error, TransportError};
use checkin_core::{AccessToken, CredentialKey, CredentialStore, RefreshToken, Result};

use crate::config::ClientConfig;
use crate::endpoints::{REFRESH, RefreshRequest, RefreshResponse};
use crate::refresh::{self, LeaderGuard, RefreshCoordinator, Ticket};
use crate::request::{ApiRequest, ApiResponse, Attempt};

/// HTTP client that attaches the stored access token and recovers from
/// its expiry.
///
/// On a 401 from a non-exempt endpoint the client refreshes the access
/// token once, shared by every request that failed in the meantime, and
/// replays each failed request once with the new token. A request that is
/// rejected again after its replay fails with [`AuthError::SessionExpired`].
///
/// Cloning is cheap and clones share credentials and refresh state.
/// Independently constructed clients never share refresh state.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn CredentialStore>,
    refresh: RefreshCoordinator,
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

impl AuthClient {
    /// Create a client for the configured backend using `store` for tokens.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be initialised
    /// (for example when no TLS backend is available).
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            // Redirects are surfaced to callers; the bearer token never
            // follows one to another host.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                store,
                refresh: RefreshCoordinator::new(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// The currently stored access token, if any.
    pub async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self
            .inner
            .store
            .get(CredentialKey::AccessToken)
            .await?
            .map(AccessToken::new))
    }

    /// The currently stored refresh token, if any.
    pub async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self
            .inner
            .store
            .get(CredentialKey::RefreshToken)
            .await?
            .map(RefreshToken::new))
    }

    /// Whether a token refresh is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_in_flight()
    }

    /// Send a request, transparently recovering once from an expired access
    /// token.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed path
    /// - `Transport` for network failures, never retried
    /// - `Protocol` for non-2xx responses other than a recoverable 401
    /// - `Auth` when the session cannot be recovered
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        request.validate()?;

        let mut attempt = Attempt::first(&request);
        loop {
            let (response, sent_with) = self.dispatch(attempt).await?;

            if response.status() != StatusCode::UNAUTHORIZED || request.is_refresh_exempt() {
                return response.error_for_status();
            }

            if attempt.retried {
                warn!("Request rejected again after token refresh");
                return Err(AuthError::SessionExpired.into());
            }

            self.renew(sent_with).await?;
            attempt = attempt.retry();
        }
    }

    /// Refresh the access token now, joining a refresh already in flight.
    ///
    /// # Errors
    ///
    /// Returns `Auth(NotLoggedIn)` without a network call when no refresh
    /// token is stored, `Auth(RefreshFailed)` when the backend rejects it.
    /// Stored credentials are cleared on failure.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        match self.inner.refresh.join() {
            Ticket::Waiter(rx) => Ok(refresh::wait(rx).await?),
            Ticket::Leader(guard) => self.lead_refresh(guard).await,
        }
    }

    /// Make sure a token newer than `sent_with` is stored, refreshing if
    /// nobody else already did.
    async fn renew(&self, sent_with: Option<AccessToken>) -> Result<()> {
        match self.inner.refresh.join() {
            Ticket::Waiter(rx) => Ok(refresh::wait(rx).await?),
            Ticket::Leader(guard) => {
                let current = self.access_token().await?;
                if current.is_some() && current != sent_with {
                    // A refresh settled between our 401 and joining.
                    debug!("Access token already rotated, replaying");
                    guard.finish(Ok(()));
                    return Ok(());
                }
                self.lead_refresh(guard).await
            }
        }
    }

    async fn lead_refresh(&self, guard: LeaderGuard<'_>) -> Result<()> {
        info!("Refreshing access token");

        let outcome = self.call_refresh().await;

        if let Err(ref e) = outcome {
            warn!(error = %e, "Token refresh failed, clearing stored credentials");
            if let Err(clear_err) = self.inner.store.clear().await {
                warn!(error = %clear_err, "Failed to clear stored credentials");
            }
        }

        let released = guard.finish(outcome.clone());
        debug!(released, ok = outcome.is_ok(), "Refresh settled");

        outcome.map_err(Error::from)
    }

    /// POST the stored refresh token and store what comes back.
    async fn call_refresh(&self) -> std::result::Result<(), AuthError> {
        let refresh_token = self
            .refresh_token()
            .await
            .map_err(into_auth_error)?
            .ok_or(AuthError::NotLoggedIn)?;

        let request = ApiRequest::post(REFRESH)
            .json(&RefreshRequest {
                refresh_token: refresh_token.as_str(),
            })
            .map_err(into_auth_error)?;

        let (response, _) = self
            .dispatch(Attempt::first(&request))
            .await
            .map_err(|e| AuthError::RefreshFailed {
                status: None,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let error = response.protocol_error();
            let message = match error.error {
                Some(ref message) => message.clone(),
                None => error.to_string(),
            };
            return Err(AuthError::RefreshFailed {
                status: Some(error.status),
                message,
            });
        }

        let body: RefreshResponse = response.json().map_err(|e| AuthError::RefreshFailed {
            status: Some(response.status().as_u16()),
            message: e.to_string(),
        })?;

        let store = &self.inner.store;
        store
            .set(CredentialKey::AccessToken, &body.access_token)
            .await
            .map_err(into_auth_error)?;
        if let Some(ref rotated) = body.refresh_token {
            store
                .set(CredentialKey::RefreshToken, rotated)
                .await
                .map_err(into_auth_error)?;
        }

        debug!(rotated = body.refresh_token.is_some(), "Access token refreshed");
        Ok(())
    }

    /// Send one attempt. Returns the response and the token it carried.
    async fn dispatch(&self, attempt: Attempt<'_>) -> Result<(ApiResponse, Option<AccessToken>)> {
        let request = attempt.request;
        let url = self.inner.config.base_url().endpoint(request.path());

        let token = if request.is_refresh_exempt() {
            None
        } else {
            self.access_token().await?
        };

        let mut builder = self
            .inner
            .http
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(ref token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }

        debug!(
            retried = attempt.retried,
            authenticated = token.is_some(),
            "Sending request"
        );

        let response = builder.send().await.map_err(transport_error)?;
        let response = ApiResponse::read(response).await.map_err(transport_error)?;
        trace!(status = %response.status(), "Response received");

        Ok((response, token))
    }
}

fn into_auth_error(err: Error) -> AuthError {
    match err {
        Error::Auth(e) => e,
        other => AuthError::Store {
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("base_url", self.inner.config.base_url())
            .field("refreshing", &self.inner.refresh.is_in_flight())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::{ApiUrl, MemoryCredentialStore};

    fn client() -> AuthClient {
        let config = ClientConfig::new(ApiUrl::new("https://checkin.example.com").unwrap());
        AuthClient::new(config, Arc::new(MemoryCredentialStore::with_tokens("access-1", Some("refresh-1"))))
            .unwrap()
    }

    #[tokio::test]
    async fn reads_tokens_from_store() {
        let client = client();
        assert_eq!(
            client.access_token().await.unwrap(),
            Some(AccessToken::new("access-1"))
        );
        assert_eq!(
            client.refresh_token().await.unwrap(),
            Some(RefreshToken::new("refresh-1"))
        );
    }

    #[tokio::test]
    async fn invalid_path_is_rejected_before_sending() {
        let err = client()
            .send(ApiRequest::get("https://elsewhere.example.com/api"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn debug_hides_tokens() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("checkin.example.com"));
        assert!(!debug.contains("access-1"));
    }

    #[test]
    fn clones_share_refresh_state_but_new_clients_do_not() {
        let a = client();
        let b = a.clone();
        let c = client();

        let ticket = a.inner.refresh.join();
        assert!(b.is_refreshing());
        assert!(!c.is_refreshing());
        drop(ticket);
        assert!(!b.is_refreshing());
    }
}
