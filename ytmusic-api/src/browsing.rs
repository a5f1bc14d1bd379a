//! Home feed.
//!
//! Endpoint: `POST /youtubei/v1/browse`
//!
//! Request: `{ "browseId": "FEmusic_home" }`
//!
//! Response (trimmed):
//! ```json
//! {
//!   "contents": { "singleColumnBrowseResultsRenderer": { "tabs": [{ "tabRenderer": { "content": {
//!     "sectionListRenderer": {
//!       "contents": [ { "musicCarouselShelfRenderer": { "header": {...}, "contents": [...] } }, ... ],
//!       "continuations": [{ "nextContinuationData": { "continuation": "..." } }]
//!     }
//!   } } }] } }
//! }
//! ```
//!
//! Further shelves arrive as `continuationContents.sectionListContinuation`.

use crate::client::YtMusic;
use crate::continuations::get_continuations;
use crate::error::{Result, YtMusicError};
use crate::types::{HomeSection, parse_home_sections};
use serde_json::json;

const SECTION_LIST: &str =
    "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer";

impl YtMusic {
    /// Get home-feed shelves, fetching more pages until at least `limit`
    /// shelves are collected or the feed ends.
    ///
    /// Works without authentication; the feed is personalised when
    /// authenticated.
    pub async fn get_home(&self, limit: usize) -> Result<Vec<HomeSection>> {
        let body = json!({ "browseId": "FEmusic_home" });
        let response = self.send_request("browse", body.clone(), "").await?;
        let section_list = response
            .pointer(SECTION_LIST)
            .ok_or_else(|| YtMusicError::Parse("home response has no section list".into()))?;

        get_continuations(
            section_list,
            "sectionListContinuation",
            Some(limit),
            |params| {
                let body = body.clone();
                async move { self.send_request("browse", body, &params).await }
            },
            parse_home_sections,
            "",
            None,
        )
        .await
    }
}
