//! Endpoint helpers built on [`MiniProgramClient`](crate::MiniProgramClient).
//!
//! Each helper only selects a path, attaches the app secret or an access token, and decodes
//! the payload; caching and the token-expiry retry live in the client core.

pub mod phone;
pub mod scheme;
pub mod session;

pub use phone::*;
pub use scheme::*;
pub use session::*;
