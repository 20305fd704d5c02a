//! Data models owned by the web service.

pub mod session;

pub use session::{SessionUser, TokenSet, keys as session_keys};
