//! Domain models exchanged with the check-in backend.
//!
//! Field names follow the backend's snake_case JSON. Numeric columns that
//! Postgres returns as strings (`NUMERIC`, `BIGINT`) are accepted in either
//! form.

mod checkin;
mod de;
mod user;

pub use checkin::{CheckIn, CheckinFilter, MyCheckinsQuery, NewCheckIn};
pub use user::{NewUser, Registration, Role, User, UserUpdate};
