//! Typed wrappers for the check-in backend endpoints.

use reqwest::Url;
use reqwest::header::LOCATION;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use checkin_core::error::{AuthError, Error, InvalidInputError, ProtocolError};
use checkin_core::{
    CheckIn, CheckinFilter, CredentialKey, Credentials, MyCheckinsQuery, NewCheckIn, NewUser,
    Registration, Result, User, UserUpdate,
};

use crate::client::AuthClient;
use crate::endpoints::{self, *};
use crate::request::ApiRequest;

/// Check-in backend API. Every call goes through [`AuthClient::send`] and
/// so benefits from transparent token refresh.
#[derive(Debug, Clone)]
pub struct CheckinApi {
    client: AuthClient,
}

impl CheckinApi {
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Log in and store the issued access and refresh tokens.
    ///
    /// # Errors
    ///
    /// Returns `Auth(InvalidCredentials)` when the backend answers 401.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        info!("Logging in");

        let request = ApiRequest::post(LOGIN).json(&LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        })?;

        let response = match self.client.send(request).await {
            Ok(response) => response,
            Err(Error::Protocol(e)) if e.is_auth_error() => {
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let body: LoginResponse = response.json()?;
        let store = self.client.store();
        store
            .set(CredentialKey::AccessToken, &body.access_token)
            .await?;
        store
            .set(CredentialKey::RefreshToken, &body.refresh_token)
            .await?;

        debug!(user_id = %body.user.id, role = %body.user.role, "Logged in");
        Ok(body.user)
    }

    /// Create an account. The backend emails a verification link; the
    /// account cannot log in until it is verified.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<()> {
        let request = ApiRequest::post(REGISTER).json(registration)?;
        self.client.send(request).await?;
        Ok(())
    }

    /// Log out on the backend and forget the stored tokens.
    ///
    /// Local credentials are cleared even if the backend call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self.client.send(ApiRequest::post(LOGOUT)).await {
            warn!(error = %e, "Logout request failed, clearing local credentials anyway");
        }
        self.client.store().clear().await
    }

    /// The logged-in user.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User> {
        let response = self.client.send(ApiRequest::get(ME)).await?;
        let body: MeResponse = response.json()?;
        Ok(body.user)
    }

    /// Confirm an email address with the token from the verification link.
    ///
    /// The backend answers with a redirect meant for a browser; its target
    /// carries `error=` when the token was not accepted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an unknown or already used token.
    #[instrument(skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(InvalidInputError::Other {
                message: "verification token is required".to_string(),
            }
            .into());
        }

        let request = ApiRequest::get(VERIFY).query([("token", token)]);
        let response = self.client.send(request).await?;
        if !response.status().is_redirection() {
            return Ok(());
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        debug!(location, "Verification redirected");

        match verification_error(self.client.config().base_url().as_url(), location) {
            None => Ok(()),
            Some(reason) if reason == "invalid" => Err(InvalidInputError::Other {
                message: "verification link is invalid or has already been used".to_string(),
            }
            .into()),
            Some(reason) => Err(ProtocolError::new(
                response.status().as_u16(),
                Some(format!("email verification failed: {}", reason)),
                None,
            )
            .into()),
        }
    }

    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let request = ApiRequest::post(FORGOT_PASSWORD).json(&ForgotPasswordRequest { email })?;
        self.client.send(request).await?;
        Ok(())
    }

    #[instrument(skip(self, token, password))]
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<()> {
        let request =
            ApiRequest::post(RESET_PASSWORD).json(&ResetPasswordRequest { token, password })?;
        self.client.send(request).await?;
        Ok(())
    }

    // ========================================================================
    // Check-ins
    // ========================================================================

    /// Submit a visit.
    #[instrument(skip(self, checkin), fields(business = %checkin.business_name))]
    pub async fn create_checkin(&self, checkin: &NewCheckIn) -> Result<CheckIn> {
        if checkin.business_name.trim().is_empty() || checkin.contact_name.trim().is_empty() {
            return Err(InvalidInputError::Other {
                message: "business name and contact name are required".to_string(),
            }
            .into());
        }

        let request = ApiRequest::post(CHECKINS).json(checkin)?;
        let created: CreatedCheckIn<CheckIn> = self.data(request).await?;
        Ok(created.checkin)
    }

    /// The logged-in rep's own check-ins, newest first.
    #[instrument(skip(self))]
    pub async fn my_checkins(&self, query: MyCheckinsQuery) -> Result<Vec<CheckIn>> {
        let request = ApiRequest::get(MY_CHECKINS).query(query.query_pairs());
        self.data(request).await
    }

    /// Every rep's check-ins matching `filter` (supervisor or admin).
    #[instrument(skip(self))]
    pub async fn all_checkins(&self, filter: &CheckinFilter) -> Result<Vec<CheckIn>> {
        let request = ApiRequest::get(ALL_CHECKINS).query(filter.query_pairs());
        self.data(request).await
    }

    /// Delete a check-in and its photo (admin).
    #[instrument(skip(self))]
    pub async fn delete_checkin(&self, id: &str) -> Result<()> {
        let path = endpoints::checkin(path_segment(id)?);
        self.client.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ========================================================================
    // Users (admin)
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.data(ApiRequest::get(USERS)).await
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser) -> Result<User> {
        let request = ApiRequest::post(USERS).json(user)?;
        self.data(request).await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` without a request when `update` sets no field.
    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<User> {
        if update.is_empty() {
            return Err(InvalidInputError::Other {
                message: "no fields to update".to_string(),
            }
            .into());
        }
        let request = ApiRequest::patch(endpoints::user(path_segment(id)?)).json(update)?;
        self.data(request).await
    }

    /// All check-ins of one user (admin).
    #[instrument(skip(self))]
    pub async fn user_checkins(&self, id: &str) -> Result<Vec<CheckIn>> {
        let request = ApiRequest::get(endpoints::user_checkins(path_segment(id)?));
        self.data(request).await
    }

    /// Send and unwrap a `{ "data": ... }` envelope.
    async fn data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let response = self.client.send(request).await?;
        let envelope: DataEnvelope<T> = response.json()?;
        Ok(envelope.data)
    }
}

/// The `error` query parameter of a verification redirect target.
fn verification_error(base: &Url, location: &str) -> Option<String> {
    let target = Url::options().base_url(Some(base)).parse(location).ok()?;
    target
        .query_pairs()
        .find(|(key, _)| key == "error")
        .map(|(_, value)| value.into_owned())
}

fn path_segment(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(id)
    } else {
        Err(InvalidInputError::Other {
            message: format!("invalid id '{}'", id),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_single_segments() {
        assert!(path_segment("42").is_ok());
        assert!(path_segment("8d1e4c2a-3b5f-4b1e-9a77-1f0c2d3e4f5a").is_ok());
        assert!(path_segment("").is_err());
        assert!(path_segment("1/../../users").is_err());
        assert!(path_segment("1?x=y").is_err());
    }

    #[test]
    fn verification_error_reads_redirect_target() {
        let base = Url::parse("http://localhost:3001").unwrap();
        assert_eq!(
            verification_error(&base, "http://localhost:5173/verify?error=invalid").as_deref(),
            Some("invalid")
        );
        assert_eq!(
            verification_error(&base, "/verify?error=server").as_deref(),
            Some("server")
        );
        assert!(verification_error(&base, "http://localhost:5173/login?verified=true").is_none());
    }
}
