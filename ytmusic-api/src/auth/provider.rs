use crate::auth::browser::{default_origin, sapisid_from_cookie, sapisid_hash};
use crate::auth::oauth::OAuthToken;
use crate::auth::oauth::unix_now;
use crate::auth::{HeaderProvider, Headers, OAuthSettings};
use crate::error::{Result, YtMusicError};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Static base headers, no credentials.
pub struct UnauthorizedProvider {
    base: Headers,
}

impl UnauthorizedProvider {
    pub fn new(base: Headers) -> Self {
        Self { base }
    }
}

#[async_trait]
impl HeaderProvider for UnauthorizedProvider {
    async fn headers(&self) -> Result<Headers> {
        Ok(self.base.clone())
    }
}

/// Cookie auth with a SAPISIDHASH recomputed on every call.
pub struct BrowserProvider {
    base: Headers,
    cookie: String,
    sapisid: String,
    auth_user: Option<String>,
    origin: Option<String>,
}

impl BrowserProvider {
    /// Fails with [`YtMusicError::MissingCookie`] when the cookie carries no
    /// `__Secure-3PAPISID`.
    pub fn new(
        base: Headers,
        cookie: String,
        auth_user: Option<String>,
        origin: Option<String>,
    ) -> Result<Self> {
        let sapisid = sapisid_from_cookie(&cookie)?;
        Ok(Self {
            base,
            cookie,
            sapisid,
            auth_user,
            origin,
        })
    }
}

#[async_trait]
impl HeaderProvider for BrowserProvider {
    async fn headers(&self) -> Result<Headers> {
        let origin = self.origin.as_deref().unwrap_or(default_origin());
        let mut headers = self.base.clone();
        headers.insert("authorization".into(), sapisid_hash(&self.sapisid, origin));
        headers.insert("cookie".into(), self.cookie.clone());
        if let Some(user) = &self.auth_user {
            headers.insert("x-goog-authuser".into(), user.clone());
        }
        Ok(headers)
    }
}

/// Library-managed OAuth token, refreshed and persisted when it is about to
/// expire.
///
/// The token lock is held across load, refresh and persist, so concurrent
/// requests observe at most one refresh.
pub struct OAuthProvider {
    base: Headers,
    settings: OAuthSettings,
    token: Mutex<Option<OAuthToken>>,
}

impl OAuthProvider {
    pub fn new(base: Headers, settings: OAuthSettings) -> Self {
        Self {
            base,
            settings,
            token: Mutex::new(None),
        }
    }

    async fn refresh(&self, token: &mut OAuthToken) -> Result<()> {
        let fresh = match self.settings.credentials.refresh_token(token.refresh_token()).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "oauth token refresh failed");
                if let Some(cb) = &self.settings.on_expired {
                    cb();
                }
                return Err(e);
            }
        };

        // Persist before swapping in, so a failed save leaves the old token
        // cached and the next call refreshes again.
        let next = token.refreshed(&fresh);
        self.settings.storage.save(&next.to_record()).await?;
        *token = next;
        info!(expires_at = token.expires_at(), "oauth token refreshed");
        if let Some(cb) = &self.settings.on_refreshed {
            cb();
        }
        Ok(())
    }
}

#[async_trait]
impl HeaderProvider for OAuthProvider {
    async fn headers(&self) -> Result<Headers> {
        let mut slot = self.token.lock().await;
        if slot.is_none() {
            *slot = self.settings.storage.load().await?.map(OAuthToken::from_record);
        }
        let Some(token) = slot.as_mut() else {
            return Err(YtMusicError::NoStoredToken);
        };

        if token.is_expiring() {
            self.refresh(token).await?;
        }

        let mut headers = self.base.clone();
        headers.insert("authorization".into(), token.as_auth());
        headers.insert("x-goog-request-time".into(), unix_now().to_string());
        Ok(headers)
    }
}

/// Caller-supplied OAuth headers, returned verbatim.
pub struct OAuthHeadersProvider {
    headers: Headers,
}

impl OAuthHeadersProvider {
    pub fn new(headers: Headers) -> Self {
        Self { headers }
    }
}

#[async_trait]
impl HeaderProvider for OAuthHeadersProvider {
    async fn headers(&self) -> Result<Headers> {
        Ok(self.headers.clone())
    }
}
