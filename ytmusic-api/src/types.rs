//! Light records for endpoint results.
//!
//! Full renderer parsing is not attempted: each record pulls out the two
//! fields every list view needs and keeps the renderer JSON in `raw` for
//! callers that want more.

use serde::{Deserialize, Serialize};
use serde_json::Value;

const MRLIR: &str = "musicResponsiveListItemRenderer";
const PPVR: &str = "playlistPanelVideoRenderer";
const PPVWR: &str = "playlistPanelVideoWrapperRenderer";

/// A row in a song list (library, playlist, watch queue).
///
/// Built from `musicResponsiveListItemRenderer` or
/// `playlistPanelVideoRenderer` JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    /// Video ID; absent for unavailable or deleted entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// First text run of the title column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The renderer object this item was built from.
    pub raw: Value,
}

/// A home-feed shelf (carousel, mixed list, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeSection {
    /// Renderer key, e.g. `musicCarouselShelfRenderer`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Raw shelf items.
    pub contents: Vec<Value>,
}

/// Parse `musicResponsiveListItemRenderer` rows; other entries (including
/// continuation markers) are skipped.
pub(crate) fn parse_list_items(items: &[Value]) -> Vec<ListItem> {
    items
        .iter()
        .filter_map(|item| item.get(MRLIR))
        .map(|data| {
            let video_id = data
                .pointer("/playlistItemData/videoId")
                .or_else(|| {
                    data.pointer(
                        "/overlay/musicItemThumbnailOverlayRenderer/content/musicPlayButtonRenderer/playNavigationEndpoint/watchEndpoint/videoId",
                    )
                })
                .and_then(Value::as_str)
                .map(String::from);
            let title = data
                .pointer("/flexColumns/0/musicResponsiveListItemFlexColumnRenderer/text/runs/0/text")
                .and_then(Value::as_str)
                .map(String::from);
            ListItem {
                video_id,
                title,
                raw: data.clone(),
            }
        })
        .collect()
}

/// Parse watch-queue entries, unwrapping `playlistPanelVideoWrapperRenderer`
/// and skipping unplayable tracks.
pub(crate) fn parse_watch_items(items: &[Value]) -> Vec<ListItem> {
    items
        .iter()
        .filter_map(|item| {
            item.pointer(&format!("/{PPVWR}/primaryRenderer/{PPVR}"))
                .or_else(|| item.get(PPVR))
        })
        .filter(|data| data.get("unplayableText").is_none())
        .map(|data| ListItem {
            video_id: data["videoId"].as_str().map(String::from),
            title: data
                .pointer("/title/runs/0/text")
                .and_then(Value::as_str)
                .map(String::from),
            raw: data.clone(),
        })
        .collect()
}

/// Parse section-list rows into [`HomeSection`]s.
pub(crate) fn parse_home_sections(rows: &[Value]) -> Vec<HomeSection> {
    rows.iter()
        .filter_map(Value::as_object)
        .filter_map(|row| row.iter().next())
        .map(|(kind, renderer)| HomeSection {
            kind: kind.clone(),
            title: renderer
                .pointer("/header/musicCarouselShelfBasicHeaderRenderer/title/runs/0/text")
                .or_else(|| renderer.pointer("/title/runs/0/text"))
                .and_then(Value::as_str)
                .map(String::from),
            contents: renderer["contents"].as_array().cloned().unwrap_or_default(),
        })
        .collect()
}
