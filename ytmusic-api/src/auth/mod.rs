//! Credential material: the four ways a session can authenticate.
//!
//! An [`AuthConfig`] is chosen once when the session is built and turned
//! into a [`HeaderProvider`]. The transport calls the provider before every
//! attempt and never inspects which variant it is talking to.
//!
//! | Variant          | Headers produced                                          |
//! |------------------|-----------------------------------------------------------|
//! | `Unauthorized`   | static base headers                                       |
//! | `Browser`        | base + `cookie` + fresh `authorization: SAPISIDHASH ...` (+ `x-goog-authuser`) |
//! | `OAuth`          | base + `authorization: Bearer ...` + `x-goog-request-time`, refreshed when expiring |
//! | `OAuthHeaders`   | the caller's header map, verbatim                         |

pub mod browser;
pub mod oauth;
mod provider;
pub mod sha1;
pub mod storage;

pub use browser::{BrowserHeaders, parse_browser_headers, sapisid_from_cookie, sapisid_hash};
pub use oauth::{CredentialExchanger, OAuthCredentials, OAuthToken};
pub use provider::{BrowserProvider, OAuthHeadersProvider, OAuthProvider, UnauthorizedProvider};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

use crate::client::{USER_AGENT, YTM_DOMAIN};
use crate::error::{Result, YtMusicError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Header name → value. Names are lowercase.
pub type Headers = BTreeMap<String, String>;

/// Produces the complete header map for the next request.
///
/// Called once per transport attempt; implementations may perform network
/// I/O (token refresh) before answering.
#[async_trait]
pub trait HeaderProvider: Send + Sync {
    async fn headers(&self) -> Result<Headers>;
}

/// Notification hook invoked on OAuth token refresh / expiry.
pub type TokenCallback = Arc<dyn Fn() + Send + Sync>;

/// Collaborators for a self-refreshing OAuth session.
pub struct OAuthSettings {
    pub credentials: Arc<dyn CredentialExchanger>,
    pub storage: Arc<dyn TokenStorage>,
    /// Invoked after a refreshed token has been persisted.
    pub on_refreshed: Option<TokenCallback>,
    /// Invoked when a refresh fails, just before the error propagates.
    pub on_expired: Option<TokenCallback>,
}

impl OAuthSettings {
    pub fn new(credentials: Arc<dyn CredentialExchanger>, storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            credentials,
            storage,
            on_refreshed: None,
            on_expired: None,
        }
    }

    pub fn on_refreshed(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_refreshed = Some(Arc::new(f));
        self
    }

    pub fn on_expired(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_expired = Some(Arc::new(f));
        self
    }
}

/// How a session authenticates. Immutable once the session is built.
pub enum AuthConfig {
    /// No credentials; public endpoints only.
    Unauthorized,
    /// Logged-in browser session identified by its raw cookie string.
    Browser {
        cookie: String,
        /// Account index sent as `x-goog-authuser`.
        auth_user: Option<String>,
        /// Origin signed into the SAPISIDHASH (default `https://music.youtube.com`).
        origin: Option<String>,
    },
    /// OAuth device-flow token managed and refreshed by this library.
    OAuth(OAuthSettings),
    /// Caller-managed OAuth headers, sent as-is.
    OAuthHeaders(Headers),
}

/// Discriminant of [`AuthConfig`], kept by the session after the config has
/// been consumed into a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Unauthorized,
    Browser,
    OAuthCustomClient,
    OAuthCustomFull,
}

impl AuthConfig {
    /// Browser auth from a cookie string with default account and origin.
    pub fn browser(cookie: impl Into<String>) -> Self {
        Self::Browser {
            cookie: cookie.into(),
            auth_user: None,
            origin: None,
        }
    }

    /// Browser auth from headers copied out of devtools (see
    /// [`parse_browser_headers`]).
    pub fn from_browser_headers(headers: &Headers) -> Result<Self> {
        let cookie = headers
            .get("cookie")
            .ok_or_else(|| YtMusicError::Other("browser headers contain no cookie".into()))?;
        Ok(Self::Browser {
            cookie: cookie.clone(),
            auth_user: headers.get("x-goog-authuser").cloned(),
            origin: headers.get("origin").cloned(),
        })
    }

    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::Unauthorized => AuthType::Unauthorized,
            Self::Browser { .. } => AuthType::Browser,
            Self::OAuth(_) => AuthType::OAuthCustomClient,
            Self::OAuthHeaders(_) => AuthType::OAuthCustomFull,
        }
    }

    /// Build the header provider for this config.
    ///
    /// Fails fast for a browser cookie lacking `__Secure-3PAPISID`.
    pub fn into_provider(self, base: Headers) -> Result<Arc<dyn HeaderProvider>> {
        Ok(match self {
            Self::Unauthorized => Arc::new(UnauthorizedProvider::new(base)),
            Self::Browser {
                cookie,
                auth_user,
                origin,
            } => Arc::new(BrowserProvider::new(base, cookie, auth_user, origin)?),
            Self::OAuth(settings) => Arc::new(OAuthProvider::new(base, settings)),
            Self::OAuthHeaders(headers) => Arc::new(OAuthHeadersProvider::new(headers)),
        })
    }
}

/// Default headers sent with every request.
pub fn default_headers() -> Headers {
    [
        ("user-agent", USER_AGENT),
        ("accept", "*/*"),
        ("accept-encoding", "gzip, deflate"),
        ("content-type", "application/json"),
        ("origin", YTM_DOMAIN),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}
