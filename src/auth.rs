//! Credential and token models shared by the cache, dispatcher, and endpoints.

pub mod credentials;
pub mod secret;
pub mod token;

pub use credentials::*;
pub use secret::*;
pub use token::*;
