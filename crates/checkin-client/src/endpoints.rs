//! Backend endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};

use checkin_core::User;

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const LOGIN: &str = "/api/auth/login";
pub const REGISTER: &str = "/api/auth/register";
pub const REFRESH: &str = "/api/auth/refresh";
pub const LOGOUT: &str = "/api/auth/logout";
pub const ME: &str = "/api/auth/me";
pub const VERIFY: &str = "/api/auth/verify";
pub const FORGOT_PASSWORD: &str = "/api/auth/forgot-password";
pub const RESET_PASSWORD: &str = "/api/auth/reset-password";

pub const CHECKINS: &str = "/api/checkins";
pub const MY_CHECKINS: &str = "/api/checkins/my";
pub const ALL_CHECKINS: &str = "/api/checkins/all";

pub const USERS: &str = "/api/users";

/// Endpoints that never carry a bearer token and never trigger a refresh.
/// A 401 from any of them means the submitted credentials are wrong.
pub const REFRESH_EXEMPT: [&str; 3] = [LOGIN, REGISTER, REFRESH];

/// Returns true if `path` is one of [`REFRESH_EXEMPT`].
pub fn is_refresh_exempt(path: &str) -> bool {
    let path = path.trim_end_matches('/');
    REFRESH_EXEMPT.contains(&path)
}

pub fn checkin(id: &str) -> String {
    format!("{}/{}", CHECKINS, id)
}

pub fn user(id: &str) -> String {
    format!("{}/{}", USERS, id)
}

pub fn user_checkins(id: &str) -> String {
    format!("{}/{}/checkins", USERS, id)
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Request body for refresh. The refresh token travels in the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Response from refresh. The backend may rotate the refresh token.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Response from `/api/auth/me`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: User,
}

/// `{ "success": true, "data": ... }` wrapper used by list and create endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Wrapper for `POST /api/checkins`, whose data is `{ "checkin": {...} }`.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedCheckIn<T> {
    pub checkin: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct ForgotPasswordRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

/// Error body format: `{ "error": "..." }`, sometimes with a `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exempt_paths() {
        assert!(is_refresh_exempt(LOGIN));
        assert!(is_refresh_exempt("/api/auth/refresh/"));
        assert!(is_refresh_exempt(REGISTER));
        assert!(!is_refresh_exempt(LOGOUT));
        assert!(!is_refresh_exempt(ME));
        assert!(!is_refresh_exempt(MY_CHECKINS));
    }

    #[test]
    fn id_paths() {
        assert_eq!(checkin("42"), "/api/checkins/42");
        assert_eq!(user("7"), "/api/users/7");
        assert_eq!(user_checkins("7"), "/api/users/7/checkins");
    }

    #[test]
    fn refresh_response_without_rotation() {
        let response: RefreshResponse =
            serde_json::from_str(r#"{"success":true,"accessToken":"a2"}"#).unwrap();
        assert_eq!(response.access_token, "a2");
        assert!(response.refresh_token.is_none());
    }
}
