//! Playlist tracks.
//!
//! Endpoint: `POST /youtubei/v1/browse`
//!
//! Request: `{ "browseId": "VL<playlistId>" }`
//!
//! Tracks sit in
//! `contents.twoColumnBrowseResultsRenderer.secondaryContents.sectionListRenderer.contents[0].musicPlaylistShelfRenderer.contents`.
//! When more exist the list ends in a `continuationItemRenderer`; the next
//! page is requested with `{ "continuation": "<token>" }` as the body and
//! comes back under
//! `onResponseReceivedActions[0].appendContinuationItemsAction.continuationItems`.

use crate::client::YtMusic;
use crate::continuations::get_body_continuations;
use crate::error::{Result, YtMusicError};
use crate::types::{ListItem, parse_list_items};
use serde_json::{Value, json};

const PLAYLIST_SHELF: &str = "/contents/twoColumnBrowseResultsRenderer/secondaryContents/sectionListRenderer/contents/0/musicPlaylistShelfRenderer";

impl YtMusic {
    /// Get the tracks of a playlist. Accepts IDs with or without the `VL`
    /// prefix. Public playlists do not need authentication.
    pub async fn get_playlist_items(
        &self,
        playlist_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ListItem>> {
        let browse_id = if playlist_id.starts_with("VL") {
            playlist_id.to_owned()
        } else {
            format!("VL{playlist_id}")
        };
        let response = self
            .send_request("browse", json!({ "browseId": browse_id }), "")
            .await?;

        let contents = response
            .pointer(PLAYLIST_SHELF)
            .and_then(|shelf| shelf.get("contents"))
            .and_then(Value::as_array)
            .ok_or_else(|| YtMusicError::Parse(format!("playlist {playlist_id} has no track list")))?;

        get_body_continuations(
            contents,
            limit,
            |body| async move { self.send_request("browse", body, "").await },
            parse_list_items,
        )
        .await
    }
}
