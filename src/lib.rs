#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

//! Session-token authentication against the Parse REST API.
//!
//! A strategy reads the `x-parse-session-token` header from an incoming
//! request, asks the Parse "current user" endpoint whether the token is
//! valid, and hands the resulting credentials back to the hosting server
//! as a single [`AuthOutcome`].

pub mod auth;
pub mod credentials;
pub mod error;
pub mod request_ext;
pub mod secret;

pub use auth::parse_token::{Config, ParseTokenValidator};
pub use auth::{AuthConfig, AuthOutcome, AuthScheme, Authenticator, PostValidationHook};
pub use credentials::Credentials;
pub use error::Error;
pub use secret::Secret;
