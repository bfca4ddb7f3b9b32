//! checkin-client - Authenticated HTTP client for the check-in backend.
//!
//! [`AuthClient`] attaches the stored access token to every request and,
//! when the backend answers 401, performs one coordinated token refresh no
//! matter how many requests failed at the same time, then replays each of
//! them once. [`CheckinApi`] layers typed endpoint wrappers on top.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use checkin_client::{AuthClient, CheckinApi, ClientConfig};
//! use checkin_core::{ApiUrl, Credentials, MemoryCredentialStore, MyCheckinsQuery};
//!
//! # async fn example() -> Result<(), checkin_core::Error> {
//! let config = ClientConfig::new(ApiUrl::new("https://checkin.example.com")?);
//! let client = AuthClient::new(config, Arc::new(MemoryCredentialStore::new()))?;
//! let api = CheckinApi::new(client);
//!
//! let user = api.login(Credentials::new("rep@example.com", "secret")).await?;
//! let visits = api
//!     .my_checkins(MyCheckinsQuery::Month { month: 3, year: 2025 })
//!     .await?;
//! println!("{} has {} check-ins", user.name, visits.len());
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod config;
pub mod endpoints;
mod refresh;
pub mod report;
mod request;

pub use api::CheckinApi;
pub use client::AuthClient;
pub use config::ClientConfig;
pub use request::{ApiRequest, ApiResponse};

pub use reqwest::{Method, StatusCode};
