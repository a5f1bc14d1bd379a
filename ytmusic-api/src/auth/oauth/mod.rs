//! OAuth device flow: token records, the token wrapper and the credential
//! exchanger that talks to Google's token endpoint.
//!
//! Flow:
//!
//! 1. [`CredentialExchanger::get_code`] → show `user_code` and
//!    `verification_url` to the user
//! 2. poll [`CredentialExchanger::token_from_code`] every `interval` seconds
//!    until the user approves → [`RefreshableToken`], persist it
//! 3. later sessions load it and refresh through
//!    [`CredentialExchanger::refresh_token`] when it is about to expire

mod credentials;
mod token;

pub use credentials::{OAUTH_CODE_URL, OAUTH_SCOPE, OAUTH_TOKEN_URL, OAuthCredentials};
pub use token::OAuthToken;
pub(crate) use token::unix_now;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Access-only token, as returned by a refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseToken {
    pub access_token: String,
    /// Lifetime in seconds from issuance.
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

/// Full token including the refresh token; this is the persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshableToken {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Absolute expiry, unix seconds. `0` when the endpoint omitted it.
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default)]
    pub expires_in: i64,
}

/// Device code response, first step of the device flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Minimum polling interval in seconds.
    pub interval: u64,
    /// Seconds until `device_code` stops being accepted.
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

/// Exchanges OAuth grants for tokens.
#[async_trait]
pub trait CredentialExchanger: Send + Sync {
    /// Request a device/user code pair.
    async fn get_code(&self) -> Result<AuthCode>;

    /// Exchange an approved device code for a full token.
    async fn token_from_code(&self, device_code: &str) -> Result<RefreshableToken>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<BaseToken>;
}
