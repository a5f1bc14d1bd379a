//! YouTube Music web API client library.
//!
//! Wraps the private `youtubei/v1` JSON API behind a session that retries
//! rate-limited and failed requests, shares identical in-flight requests,
//! signs or refreshes credentials per request and follows continuation
//! tokens across pages.
//!
//! # Authentication
//!
//! A session is built from one [`AuthConfig`] variant: no credentials, a
//! browser cookie (SAPISIDHASH-signed), a library-managed OAuth token
//! (device flow, refreshed and persisted automatically) or caller-managed
//! OAuth headers. Tokens and headers are persisted under
//! `~/.config/ytmusic/`.
//!
//! ```no_run
//! use std::sync::Arc;
//! use ytmusic_api::auth::{FileTokenStorage, OAuthCredentials, OAuthSettings};
//! use ytmusic_api::{AuthConfig, YtMusic};
//!
//! # async fn run() -> ytmusic_api::Result<()> {
//! let credentials = Arc::new(OAuthCredentials::new("CLIENT_ID", "CLIENT_SECRET")?);
//! let storage = Arc::new(FileTokenStorage::new()?);
//! let session = YtMusic::new(AuthConfig::OAuth(OAuthSettings::new(credentials, storage)))?;
//!
//! for song in session.get_library_songs(Some(100)).await? {
//!     println!("{}", song.title.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API endpoint mapping
//!
//! | Method                             | Endpoint                         | Pagination        |
//! |------------------------------------|----------------------------------|-------------------|
//! | [`YtMusic::get_home`]              | `browse` `FEmusic_home`          | query continuation |
//! | [`YtMusic::get_library_songs`]     | `browse` `FEmusic_liked_videos`  | query continuation |
//! | [`YtMusic::get_playlist_items`]    | `browse` `VL<id>`                | body continuation |
//! | [`YtMusic::get_watch_playlist`]    | `next`                           | query continuation (radio path) |
//! | [`YtMusic::send_request`]          | any POST endpoint                | none              |
//!
//! # Failures
//!
//! See [`YtMusicError`]: auth rejections are never retried, 429 / 503 and
//! transport failures are retried with exponential backoff and jitter.

pub mod auth;
mod browsing;
pub mod client;
pub mod config;
pub mod continuations;
pub mod error;
pub mod http;
mod library;
mod playlist;
pub mod types;
mod watch;

pub use auth::{AuthConfig, AuthType};
pub use client::YtMusic;
pub use config::{ClientConfig, HttpConfig};
pub use error::{AuthReason, Result, YtMusicError};
pub use types::{HomeSection, ListItem};
