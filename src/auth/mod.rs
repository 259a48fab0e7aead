//! Authentication module
//!
//! Supports: anonymous access, static bearer tokens and the OAuth2
//! client-credentials flow used for application-only Reddit access.
//!
//! The `Authenticator` applies credentials to outgoing requests and caches
//! OAuth2 access tokens until shortly before they expire.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, ClientAuth};
