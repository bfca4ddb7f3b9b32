//! Request and response descriptors.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use checkin_core::Result;
use checkin_core::error::{Error, InvalidInputError, ProtocolError};

use crate::endpoints::{self, ErrorBody};

/// An outbound API call: method, path relative to the API base URL, query
/// pairs, optional JSON body and extra headers.
///
/// The `Authorization` header is managed by the client; a request that sets
/// it is rejected when sent.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the value cannot be represented as JSON
    /// (for example a map with non-string keys).
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| InvalidInputError::Other {
            message: format!("request body is not serialisable: {}", e),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append query-string pairs.
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add an extra header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether this request targets an endpoint that must not recurse into
    /// the refresh flow.
    pub fn is_refresh_exempt(&self) -> bool {
        endpoints::is_refresh_exempt(&self.path)
    }

    /// Checks that the path is a plain absolute path on the API host and
    /// that no `Authorization` header is set.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.headers.contains_key(AUTHORIZATION) {
            return Err(InvalidInputError::Other {
                message: "the Authorization header is managed by the client".to_string(),
            }
            .into());
        }

        let reason = if !self.path.starts_with('/') {
            Some("must start with '/'")
        } else if self.path.starts_with("//") || self.path.contains("://") {
            Some("must not name a scheme or host")
        } else if self.path.contains(['?', '#']) {
            Some("query and fragment belong in query pairs")
        } else if self.path.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(InvalidInputError::Path {
                value: self.path.clone(),
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

/// One attempt at sending a request. The retry marker is fixed for the
/// lifetime of the attempt; a replay is a new attempt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Attempt<'a> {
    pub request: &'a ApiRequest,
    pub retried: bool,
}

impl<'a> Attempt<'a> {
    pub fn first(request: &'a ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    pub fn retry(self) -> Self {
        Self {
            request: self.request,
            retried: true,
        }
    }
}

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> reqwest::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as UTF-8 text, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| Error::Decode {
            message: format!("{} (HTTP {})", e, self.status.as_u16()),
        })
    }

    /// Turn an error status into a protocol error carrying the backend's
    /// error message. Redirects are not followed and pass through as
    /// responses.
    pub(crate) fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() || self.status.is_redirection() {
            return Ok(self);
        }
        Err(Error::Protocol(self.protocol_error()))
    }

    pub(crate) fn protocol_error(&self) -> ProtocolError {
        let status = self.status.as_u16();
        match serde_json::from_slice::<ErrorBody>(&self.body) {
            Ok(body) => ProtocolError::new(status, body.error, body.message),
            Err(_) => ProtocolError::new(status, None, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn path_validation() {
        assert!(ApiRequest::get("/api/auth/me").validate().is_ok());
        assert!(ApiRequest::get("api/auth/me").validate().is_err());
        assert!(ApiRequest::get("//evil.example.com/x").validate().is_err());
        assert!(ApiRequest::get("/redirect?to=https://x").validate().is_err());
        assert!(ApiRequest::get("/api/checkins/my?month=3").validate().is_err());
        assert!(ApiRequest::get("/api/has space").validate().is_err());
    }

    #[test]
    fn caller_authorization_header_is_rejected() {
        let request = ApiRequest::get("/api/auth/me")
            .header(AUTHORIZATION, HeaderValue::from_static("Bearer mine"));
        assert!(matches!(request.validate(), Err(Error::InvalidInput(_))));

        let request = ApiRequest::get("/api/auth/me").header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("abc"),
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn exempt_detection_uses_path() {
        assert!(ApiRequest::post("/api/auth/login").is_refresh_exempt());
        assert!(!ApiRequest::post("/api/auth/logout").is_refresh_exempt());
    }

    #[test]
    fn retry_marker_is_set_on_replay_only() {
        let request = ApiRequest::get("/api/auth/me");
        let first = Attempt::first(&request);
        assert!(!first.retried);
        let replay = first.retry();
        assert!(replay.retried);
        assert!(!first.retried);
    }

    #[test]
    fn error_body_is_parsed() {
        let err = response(403, r#"{"error":"Insufficient permissions"}"#)
            .error_for_status()
            .unwrap_err();
        match err {
            Error::Protocol(e) => {
                assert_eq!(e.status, 403);
                assert_eq!(e.error.as_deref(), Some("Insufficient permissions"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn redirect_is_a_response() {
        let response = response(302, "").error_for_status().unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
    }

    #[test]
    fn non_json_error_body_is_tolerated() {
        let err = response(502, "Bad Gateway").error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn query_pairs_accumulate() {
        let request = ApiRequest::get("/api/checkins/all")
            .query([("region", "North")])
            .query(vec![("category".to_string(), "Retail".to_string())]);
        assert_eq!(request.query_pairs().len(), 2);
    }
}
