//! Watch queue ("up next" / radio).
//!
//! Endpoint: `POST /youtubei/v1/next`
//!
//! Request:
//! ```json
//! {
//!   "enablePersistentPlaylistPanel": true,
//!   "isAudioOnly": true,
//!   "tunerSettingValue": "AUTOMIX_SETTING_NORMAL",
//!   "videoId": "...",
//!   "playlistId": "RDAMVM<videoId>"
//! }
//! ```
//!
//! The queue is a `playlistPanelRenderer` under the first watch-next tab.
//! Generated radios link pages through `nextRadioContinuationData`,
//! regular playlists (`PL...`, `OLA...`) through `nextContinuationData`;
//! both return `continuationContents.playlistPanelContinuation`.

use crate::client::YtMusic;
use crate::continuations::get_continuations;
use crate::error::{Result, YtMusicError};
use crate::types::{ListItem, parse_watch_items};
use serde_json::{Map, Value, json};

const PLAYLIST_PANEL: &str = "/contents/singleColumnMusicWatchNextResultsRenderer/tabbedRenderer/watchNextTabbedResultsRenderer/tabs/0/tabRenderer/content/musicQueueRenderer/content/playlistPanelRenderer";

impl YtMusic {
    /// Get the watch queue for a video, a playlist, or a video within a
    /// playlist. Without a playlist the video's radio (`RDAMVM<videoId>`)
    /// is used.
    pub async fn get_watch_playlist(
        &self,
        video_id: Option<&str>,
        playlist_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ListItem>> {
        let (body, is_playlist) = watch_body(video_id, playlist_id)?;
        let response = self.send_request("next", body.clone(), "").await?;
        let panel = response
            .pointer(PLAYLIST_PANEL)
            .ok_or_else(|| YtMusicError::Parse("watch response has no playlist panel".into()))?;

        get_continuations(
            panel,
            "playlistPanelContinuation",
            Some(limit),
            |params| {
                let body = body.clone();
                async move { self.send_request("next", body, &params).await }
            },
            parse_watch_items,
            if is_playlist { "" } else { "Radio" },
            None,
        )
        .await
    }
}

/// Request body and whether the queue is a regular playlist.
fn watch_body(video_id: Option<&str>, playlist_id: Option<&str>) -> Result<(Value, bool)> {
    let mut body = Map::new();
    body.insert("enablePersistentPlaylistPanel".into(), json!(true));
    body.insert("isAudioOnly".into(), json!(true));
    body.insert("tunerSettingValue".into(), json!("AUTOMIX_SETTING_NORMAL"));

    let playlist_id = match (video_id, playlist_id) {
        (None, None) => {
            return Err(YtMusicError::Other(
                "either a video id or a playlist id is required".into(),
            ));
        }
        (Some(video_id), playlist_id) => {
            body.insert("videoId".into(), json!(video_id));
            body.insert(
                "watchEndpointMusicSupportedConfigs".into(),
                json!({ "watchEndpointMusicConfig": {
                    "hasPersistentPlaylistPanel": true,
                    "musicVideoType": "MUSIC_VIDEO_TYPE_ATV",
                } }),
            );
            playlist_id.map_or_else(|| format!("RDAMVM{video_id}"), str::to_owned)
        }
        (None, Some(playlist_id)) => playlist_id.to_owned(),
    };

    let playlist_id = playlist_id
        .strip_prefix("VL")
        .map_or(playlist_id.clone(), str::to_owned);
    let is_playlist = playlist_id.starts_with("PL") || playlist_id.starts_with("OLA");
    body.insert("playlistId".into(), json!(playlist_id));
    Ok((Value::Object(body), is_playlist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_gets_radio_playlist() {
        let (body, is_playlist) = watch_body(Some("abc"), None).unwrap();
        assert_eq!(body["playlistId"], "RDAMVMabc");
        assert_eq!(body["videoId"], "abc");
        assert!(!is_playlist);
    }

    #[test]
    fn playlist_prefix_is_trimmed() {
        let (body, is_playlist) = watch_body(None, Some("VLPL123")).unwrap();
        assert_eq!(body["playlistId"], "PL123");
        assert!(body.get("videoId").is_none());
        assert!(is_playlist);
    }

    #[test]
    fn needs_video_or_playlist() {
        assert!(watch_body(None, None).is_err());
    }
}
