//! Library endpoints (authentication required).
//!
//! Endpoint: `POST /youtubei/v1/browse`
//!
//! Request: `{ "browseId": "FEmusic_liked_videos" }`
//!
//! The songs shelf is a `musicShelfRenderer` under the first tab's section
//! list, either directly or wrapped in an `itemSectionRenderer`. Its first
//! row is a "shuffle all" entry when the library has more than one song.
//! Further rows arrive as `continuationContents.musicShelfContinuation`.

use crate::client::YtMusic;
use crate::continuations::get_continuations;
use crate::error::Result;
use crate::types::{ListItem, parse_list_items};
use serde_json::{Value, json};

const SECTIONS: &str =
    "/contents/singleColumnBrowseResultsRenderer/tabs/0/tabRenderer/content/sectionListRenderer/contents";

impl YtMusic {
    /// Get songs saved in the library, up to roughly `limit` (whole pages
    /// are kept). `None` fetches everything.
    pub async fn get_library_songs(&self, limit: Option<usize>) -> Result<Vec<ListItem>> {
        self.check_auth()?;
        let body = json!({ "browseId": "FEmusic_liked_videos" });
        let response = self.send_request("browse", body.clone(), "").await?;

        let Some(shelf) = library_shelf(&response) else {
            return Ok(Vec::new());
        };

        let mut first_page = true;
        get_continuations(
            shelf,
            "musicShelfContinuation",
            limit,
            |params| {
                let body = body.clone();
                async move { self.send_request("browse", body, &params).await }
            },
            |items: &[Value]| {
                let skip = usize::from(std::mem::take(&mut first_page) && items.len() >= 2);
                parse_list_items(&items[skip..])
            },
            "",
            None,
        )
        .await
    }
}

fn library_shelf(response: &Value) -> Option<&Value> {
    let sections = response.pointer(SECTIONS)?.as_array()?;
    sections
        .iter()
        .find_map(|s| s.pointer("/itemSectionRenderer/contents/0/musicShelfRenderer"))
        .or_else(|| sections.first()?.get("musicShelfRenderer"))
}
