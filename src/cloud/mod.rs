//! Composter cloud integration module
//!
//! - `auth`: Identity-provider login (password grant → bearer token)
//! - `directory`: Device listing for the authenticated account
//! - `session`: In-memory token holder tying the two together
//! - `models`: Typed device entries decoded at the boundary

pub mod auth;
pub mod credentials;
pub mod directory;
pub mod models;
pub mod session;

pub use auth::TokenKind;
pub use credentials::Credentials;
pub use models::DeviceEntry;
pub use session::{CloudSession, DeviceSource};
