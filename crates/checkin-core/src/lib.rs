//! checkin-core - Core types and traits for the field check-in client.
//!
//! Shared by the HTTP client and the CLI: credential and token types, the
//! error taxonomy, the validated API base URL, domain models exchanged with
//! the backend, and the [`CredentialStore`] abstraction.

pub mod credentials;
pub mod error;
pub mod model;
pub mod store;
pub mod tokens;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use model::{
    CheckIn, CheckinFilter, MyCheckinsQuery, NewCheckIn, NewUser, Registration, Role, User,
    UserUpdate,
};
pub use store::{CredentialKey, CredentialStore, MemoryCredentialStore};
pub use tokens::{AccessToken, RefreshToken};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
