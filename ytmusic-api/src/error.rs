//! Error types for the YouTube Music client.
//!
//! Every failure the request layer can surface is a variant of
//! [`YtMusicError`]. Callers distinguish failures by kind (auth, network,
//! server, parse) rather than by wrapping depth:
//!
//! | Variant                        | Raised when                                   | Retried here |
//! |--------------------------------|-----------------------------------------------|--------------|
//! | [`Auth`](YtMusicError::Auth)   | backend answered 401 / 403                    | never        |
//! | [`Network`](YtMusicError::Network) | transport kept failing until the budget ran out | yes, before raising |
//! | [`Server`](YtMusicError::Server) | any other HTTP status >= 400                | 429 / 503 only |
//! | [`Parse`](YtMusicError::Parse) | a successful response was not valid JSON      | never        |
//! | [`UnauthorizedOAuthClient`](YtMusicError::UnauthorizedOAuthClient) / [`BadOAuthClient`](YtMusicError::BadOAuthClient) | OAuth token endpoint rejected the client | never |

use std::fmt;

use thiserror::Error;

/// Why an authentication attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthReason {
    /// Credentials timed out; re-authenticating and retrying can succeed.
    Expired,
    /// Credentials were withdrawn (e.g. OAuth client/token mismatch).
    Revoked,
    /// Credentials are wrong or misconfigured.
    Invalid,
}

impl AuthReason {
    /// Whether the caller may retry after re-authenticating.
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Expired)
    }
}

impl fmt::Display for AuthReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::Invalid => "invalid",
        })
    }
}

/// Errors that can occur when talking to the YouTube Music backend.
#[derive(Debug, Error)]
pub enum YtMusicError {
    /// The backend rejected the request credentials (HTTP 401 / 403).
    #[error("authentication failed ({reason}): {message}")]
    Auth {
        /// `Expired` for 401, `Invalid` for 403.
        reason: AuthReason,
        message: String,
    },

    /// The OAuth token endpoint answered `unauthorized_client`: the refresh
    /// token does not belong to this client.
    #[error("token refresh error, most likely client/token mismatch: {0}")]
    UnauthorizedOAuthClient(String),

    /// The OAuth token endpoint answered `invalid_client`: the client id or
    /// secret is wrong, or the YouTube Data API is not enabled for it.
    #[error("OAuth client failure, most likely client_id/client_secret mismatch: {0}")]
    BadOAuthClient(String),

    /// Transport-level failure (DNS, connection reset, timeout) that
    /// persisted through every retry.
    #[error("network request failed after {attempts} attempts: {message}")]
    Network {
        /// Total number of attempts made, including the first.
        attempts: u32,
        /// Message of the last underlying error.
        message: String,
    },

    /// The backend answered with a non-retryable HTTP error status, or kept
    /// answering with a retryable one until the budget ran out.
    #[error("server returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// A successful response could not be decoded, or lacked a value the
    /// protocol requires.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The call needs an authenticated session.
    #[error("please provide authentication before using this function")]
    NotAuthenticated,

    /// The browser cookie string lacks a required cookie.
    #[error("cookie missing required value {0}")]
    MissingCookie(&'static str),

    /// OAuth was configured but the token storage is empty.
    #[error("no OAuth token found in storage")]
    NoStoredToken,

    /// A header name or value produced by a credential provider is not valid
    /// HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// HTTP client construction or OAuth endpoint transport error.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// File I/O error (token / header / config persistence).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error on persisted records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all (e.g. missing config directory, malformed request body).
    #[error("{0}")]
    Other(String),
}

impl YtMusicError {
    /// The auth reason for the auth family of errors, `None` otherwise.
    pub fn auth_reason(&self) -> Option<AuthReason> {
        match self {
            Self::Auth { reason, .. } => Some(*reason),
            Self::UnauthorizedOAuthClient(_) => Some(AuthReason::Revoked),
            Self::BadOAuthClient(_) => Some(AuthReason::Invalid),
            _ => None,
        }
    }

    /// HTTP status carried by a [`Server`](Self::Server) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience alias for `Result<T, YtMusicError>`.
pub type Result<T> = std::result::Result<T, YtMusicError>;
