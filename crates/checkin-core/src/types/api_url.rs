//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL of the check-in backend.
///
/// Must use HTTPS, or HTTP when the host is localhost. A trailing slash is
/// normalised away so endpoint paths can be appended directly.
///
/// # Example
///
/// ```
/// use checkin_core::ApiUrl;
///
/// let api = ApiUrl::new("https://checkin.example.com/").unwrap();
/// assert_eq!(api.endpoint("/api/auth/login"),
///            "https://checkin.example.com/api/auth/login");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint path such as `/api/checkins`.
    pub fn endpoint(&self, path: &str) -> String {
        // The URL crate always adds a trailing slash to root paths
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str().trim_end_matches('/'))
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://checkin.example.com").unwrap();
        assert_eq!(api.host(), Some("checkin.example.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://localhost:3001").unwrap();
        assert_eq!(api.host(), Some("localhost"));
        let api = ApiUrl::new("http://127.0.0.1:3001").unwrap();
        assert_eq!(api.endpoint("/api/auth/me"), "http://127.0.0.1:3001/api/auth/me");
    }

    #[test]
    fn endpoint_construction_ignores_trailing_slash() {
        let api = ApiUrl::new("https://checkin.example.com/").unwrap();
        assert_eq!(
            api.endpoint("/api/checkins/my"),
            "https://checkin.example.com/api/checkins/my"
        );
        assert_eq!(api.to_string(), "https://checkin.example.com");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let api = ApiUrl::new("https://example.com/backend/").unwrap();
        assert_eq!(
            api.endpoint("/api/users"),
            "https://example.com/backend/api/users"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://checkin.example.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/api/auth/login").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ApiUrl::new("https://checkin.example.com/?x=1").is_err());
    }

    #[test]
    fn serde_round_trip_uses_display_form() {
        let api = ApiUrl::new("https://checkin.example.com/").unwrap();
        let json = serde_json::to_string(&api).unwrap();
        assert_eq!(json, "\"https://checkin.example.com\"");
        let back: ApiUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back.endpoint("/x"), api.endpoint("/x"));
    }
}
