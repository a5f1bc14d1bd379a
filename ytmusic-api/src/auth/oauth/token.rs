use super::{BaseToken, RefreshableToken};
use secrecy::{ExposeSecret, Secret};
use std::fmt;

/// Tokens expiring within this many seconds are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A live OAuth token. Mutated in place on refresh; `Debug` redacts secrets.
pub struct OAuthToken {
    access_token: Secret<String>,
    refresh_token: Secret<String>,
    token_type: String,
    scope: String,
    expires_at: i64,
}

impl OAuthToken {
    /// Wrap a persisted record. A record without `expires_at` (fresh from
    /// the device flow) expires `expires_in` seconds from now.
    pub fn from_record(record: RefreshableToken) -> Self {
        let expires_at = if record.expires_at > 0 {
            record.expires_at
        } else {
            unix_now() + record.expires_in
        };
        Self {
            access_token: Secret::new(record.access_token),
            refresh_token: Secret::new(record.refresh_token),
            token_type: record.token_type,
            scope: record.scope,
            expires_at,
        }
    }

    /// Record suitable for persisting.
    pub fn to_record(&self) -> RefreshableToken {
        RefreshableToken {
            access_token: self.access_token.expose_secret().clone(),
            refresh_token: self.refresh_token.expose_secret().clone(),
            scope: self.scope.clone(),
            token_type: self.token_type.clone(),
            expires_at: self.expires_at,
            expires_in: self.expires_at - unix_now(),
        }
    }

    /// True when the token expires in less than 60 seconds.
    pub fn is_expiring(&self) -> bool {
        self.is_expiring_at(unix_now())
    }

    pub fn is_expiring_at(&self, now: i64) -> bool {
        self.expires_at - now < EXPIRY_MARGIN_SECS
    }

    /// This token with access token and expiry taken from a refresh result.
    /// The refresh token is kept.
    #[must_use]
    pub fn refreshed(&self, fresh: &BaseToken) -> Self {
        Self {
            access_token: Secret::new(fresh.access_token.clone()),
            refresh_token: Secret::new(self.refresh_token.expose_secret().clone()),
            token_type: self.token_type.clone(),
            scope: self.scope.clone(),
            expires_at: unix_now() + fresh.expires_in,
        }
    }

    /// `Authorization` header value, e.g. `Bearer ya29...`.
    pub fn as_auth(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }

    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_at: i64) -> RefreshableToken {
        RefreshableToken {
            access_token: "access123".into(),
            refresh_token: "refresh456".into(),
            scope: "https://www.googleapis.com/auth/youtube".into(),
            token_type: "Bearer".into(),
            expires_at,
            expires_in: 3600,
        }
    }

    #[test]
    fn expiring_within_margin() {
        let now = unix_now();
        assert!(OAuthToken::from_record(record(now + 30)).is_expiring());
        assert!(OAuthToken::from_record(record(now - 100)).is_expiring());
        assert!(!OAuthToken::from_record(record(now + 3600)).is_expiring());
    }

    #[test]
    fn refresh_replaces_access_token_and_keeps_refresh_token() {
        let old = OAuthToken::from_record(record(unix_now() + 10));
        assert!(old.is_expiring());

        let token = old.refreshed(&BaseToken {
            access_token: "newAccess".into(),
            expires_in: 7200,
            scope: "https://www.googleapis.com/auth/youtube".into(),
            token_type: "Bearer".into(),
        });

        assert!(!token.is_expiring());
        assert_eq!(token.as_auth(), "Bearer newAccess");
        assert_eq!(token.refresh_token(), "refresh456");
        assert_eq!(old.as_auth(), "Bearer access123");
    }

    #[test]
    fn missing_expires_at_is_derived_from_expires_in() {
        let mut rec = record(0);
        rec.expires_in = 3600;
        let token = OAuthToken::from_record(rec);
        assert!((token.expires_at() - unix_now() - 3600).abs() <= 1);
    }

    #[test]
    fn record_round_trip_keeps_credentials() {
        let token = OAuthToken::from_record(record(unix_now() + 3600));
        let restored = OAuthToken::from_record(token.to_record());
        assert_eq!(restored.as_auth(), "Bearer access123");
        assert_eq!(restored.refresh_token(), "refresh456");
        assert_eq!(restored.scope(), token.scope());
    }

    #[test]
    fn debug_hides_secrets() {
        let token = OAuthToken::from_record(record(unix_now() + 3600));
        let dbg = format!("{token:?}");
        assert!(!dbg.contains("access123"));
        assert!(!dbg.contains("refresh456"));
    }
}
