//! Browser-session authentication.
//!
//! A logged-in browser is identified by its cookie string. Each request is
//! signed with a SAPISIDHASH derived from the `__Secure-3PAPISID` cookie:
//!
//! ```text
//! authorization: SAPISIDHASH <unix_seconds>_<sha1("<unix_seconds> <sapisid> <origin>")>
//! ```
//!
//! The timestamp makes every value single-use, so it is recomputed per
//! request. Headers copied from devtools can be imported with
//! [`parse_browser_headers`] and persisted to
//! `~/.config/ytmusic/browser.json` with [`BrowserHeaders`].

use crate::auth::sha1::sha1_hex;
use crate::auth::{Headers, default_headers};
use crate::client::YTM_DOMAIN;
use crate::config::config_path;
use crate::error::{Result, YtMusicError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SAPISID_COOKIE: &str = "__Secure-3PAPISID";
const IGNORED_HEADERS: [&str; 3] = ["host", "content-length", "accept-encoding"];

/// Extract the `__Secure-3PAPISID` value from a raw cookie string.
pub fn sapisid_from_cookie(cookie: &str) -> Result<String> {
    cookie
        .replace('"', "")
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| name.trim() == SAPISID_COOKIE)
        .map(|(_, value)| value.to_owned())
        .ok_or(YtMusicError::MissingCookie(SAPISID_COOKIE))
}

/// SAPISIDHASH authorization value for the current time.
pub fn sapisid_hash(sapisid: &str, origin: &str) -> String {
    sapisid_hash_at(chrono::Utc::now().timestamp(), sapisid, origin)
}

/// SAPISIDHASH authorization value for a fixed timestamp.
pub fn sapisid_hash_at(timestamp: i64, sapisid: &str, origin: &str) -> String {
    let hash = sha1_hex(&format!("{timestamp} {sapisid} {origin}"));
    format!("SAPISIDHASH {timestamp}_{hash}")
}

/// Parse raw request headers copied from browser devtools.
///
/// Lines are `name: value`. Pseudo-headers (`:method`), `sec-*`, `host`,
/// `content-length` and `accept-encoding` are dropped; names are
/// lowercased; any default header not present is filled in.
pub fn parse_browser_headers(raw: &str) -> Headers {
    let mut headers: Headers = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(':'))
        .filter_map(|line| line.split_once(": "))
        .map(|(name, value)| (name.to_lowercase(), value.to_owned()))
        .filter(|(name, _)| !name.starts_with("sec-") && !IGNORED_HEADERS.contains(&name.as_str()))
        .collect();

    for (name, value) in default_headers() {
        headers.entry(name).or_insert(value);
    }
    headers
}

/// Browser headers persisted to `~/.config/ytmusic/browser.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowserHeaders(pub Headers);

impl BrowserHeaders {
    /// Load from the default location, `None` if nothing was saved.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&config_path("browser.json")?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&data)?))
    }

    /// Save to the default location, creating parent directories if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path("browser.json")?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;

        // The cookie is a live session credential.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Delete the saved headers file.
    pub fn clear() -> Result<()> {
        let path = config_path("browser.json")?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Origin used when the config does not name one.
pub(crate) fn default_origin() -> &'static str {
    YTM_DOMAIN
}
