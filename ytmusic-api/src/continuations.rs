//! Continuation pagination.
//!
//! Large result sets come back one bounded page at a time plus an opaque
//! token for the next page. Three linking protocols are in use:
//!
//! | Protocol     | Token location                                              | Next request carries              | Ends when |
//! |--------------|-------------------------------------------------------------|-----------------------------------|-----------|
//! | query        | `continuations[0].next<Path>ContinuationData.continuation`  | `&ctoken=<t>&continuation=<t>`    | page has no `continuations` |
//! | reloadable   | first `continuations[0].reloadContinuationData.continuation`, then as query | same as query            | same as query |
//! | body         | last item's `continuationItemRenderer...continuationCommand.token` | `{"continuation": <t>}` body | no trailing continuation item |
//!
//! Every engine returns the first page's items followed by each fetched
//! page's items, stops early on a page that parses to nothing, and checks
//! the limit between pages only (pages are never cut).

use crate::error::{Result, YtMusicError};
use serde_json::{Value, json};
use std::future::Future;
use tracing::debug;

const CONTINUATION_ITEMS: &str =
    "/onResponseReceivedActions/0/appendContinuationItemsAction/continuationItems";

/// `&ctoken=<t>&continuation=<t>` with `t` URI-component encoded.
pub fn continuation_string(ctoken: &str) -> String {
    let encoded = urlencoding::encode(ctoken);
    format!("&ctoken={encoded}&continuation={encoded}")
}

/// Query fragment for the next page of a query-protocol page.
///
/// `ctoken_path` selects `next<ctoken_path>ContinuationData`: `""` for most
/// endpoints, `"Radio"` for radio-style watch playlists.
pub fn continuation_params(results: &Value, ctoken_path: &str) -> Result<String> {
    let key = format!("next{ctoken_path}ContinuationData");
    results
        .pointer("/continuations/0")
        .and_then(|c| c.get(&key))
        .and_then(|c| c.get("continuation"))
        .and_then(Value::as_str)
        .map(continuation_string)
        .ok_or_else(|| YtMusicError::Parse(format!("continuation token missing at {key}")))
}

/// Query fragment from a `reloadContinuationData` cursor.
pub fn reloadable_continuation_params(results: &Value) -> Result<String> {
    results
        .pointer("/continuations/0/reloadContinuationData/continuation")
        .and_then(Value::as_str)
        .map(continuation_string)
        .ok_or_else(|| YtMusicError::Parse("reload continuation token missing".into()))
}

/// Token of a trailing `continuationItemRenderer`, if the list ends in one.
pub fn continuation_token(items: &[Value]) -> Option<String> {
    items
        .last()?
        .pointer("/continuationItemRenderer/continuationEndpoint/continuationCommand/token")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Parse the `contents` (or, failing that, `items`) array of a page.
pub fn continuation_contents<T, P>(page: &Value, parse: &mut P) -> Vec<T>
where
    P: FnMut(&[Value]) -> Vec<T>,
{
    ["contents", "items"]
        .iter()
        .find_map(|term| page.get(*term).and_then(Value::as_array))
        .map(|items| parse(items))
        .unwrap_or_default()
}

fn under_limit(len: usize, limit: Option<usize>) -> bool {
    limit.is_none_or(|limit| len < limit)
}

/// Query-protocol pagination.
///
/// `results` is the first page (e.g. a `musicShelfRenderer`). Each fetched
/// response is expected to carry `continuationContents[continuation_type]`;
/// a response without it ends the loop. `additional_params`, when given,
/// replaces the token lookup for the first fetch only.
pub async fn get_continuations<T, F, Fut, P>(
    results: &Value,
    continuation_type: &str,
    limit: Option<usize>,
    mut request: F,
    mut parse: P,
    ctoken_path: &str,
    additional_params: Option<String>,
) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value>>,
    P: FnMut(&[Value]) -> Vec<T>,
{
    let mut items = continuation_contents(results, &mut parse);
    let mut current = results.clone();
    let mut params = additional_params;

    while current.get("continuations").is_some() && under_limit(items.len(), limit) {
        let query = match params.take() {
            Some(query) => query,
            None => continuation_params(&current, ctoken_path)?,
        };
        let mut response = request(query).await?;
        let Some(next) = response
            .get_mut("continuationContents")
            .and_then(|c| c.get_mut(continuation_type))
            .map(Value::take)
        else {
            break;
        };

        let page = continuation_contents(&next, &mut parse);
        debug!(continuation_type, page = page.len(), total = items.len(), "continuation page");
        if page.is_empty() {
            break;
        }
        items.extend(page);
        current = next;
    }

    Ok(items)
}

/// Reloadable-protocol pagination: the first fetch uses the
/// `reloadContinuationData` cursor, later fetches follow the query protocol.
pub async fn get_reloadable_continuations<T, F, Fut, P>(
    results: &Value,
    continuation_type: &str,
    limit: Option<usize>,
    request: F,
    parse: P,
) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value>>,
    P: FnMut(&[Value]) -> Vec<T>,
{
    let first = reloadable_continuation_params(results)?;
    get_continuations(
        results,
        continuation_type,
        limit,
        request,
        parse,
        "",
        Some(first),
    )
    .await
}

/// Body-protocol pagination.
///
/// `items` is the first page's item list. While it ends in a continuation
/// item, `{"continuation": <token>}` is sent as the request body and the
/// items appended under `onResponseReceivedActions` become the next page.
pub async fn get_body_continuations<T, F, Fut, P>(
    items: &[Value],
    limit: Option<usize>,
    mut request: F,
    mut parse: P,
) -> Result<Vec<T>>
where
    F: FnMut(Value) -> Fut,
    Fut: Future<Output = Result<Value>>,
    P: FnMut(&[Value]) -> Vec<T>,
{
    let mut out = parse(items);
    let mut token = continuation_token(items);

    while let Some(ctoken) = token.take() {
        if !under_limit(out.len(), limit) {
            break;
        }
        let mut response = request(json!({ "continuation": ctoken })).await?;
        let Some(next) = response.pointer_mut(CONTINUATION_ITEMS).map(Value::take) else {
            break;
        };
        let next = match next {
            Value::Array(next) => next,
            _ => break,
        };

        let page = parse(&next);
        debug!(page = page.len(), total = out.len(), "body continuation page");
        if page.is_empty() {
            break;
        }
        out.extend(page);
        token = continuation_token(&next);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[Value]) -> Vec<i64> {
        items.iter().filter_map(|i| i["id"].as_i64()).collect()
    }

    fn shelf(ids: &[i64], next: Option<&str>) -> Value {
        let contents: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        match next {
            Some(token) => json!({
                "contents": contents,
                "continuations": [{ "nextContinuationData": { "continuation": token } }],
            }),
            None => json!({ "contents": contents }),
        }
    }

    fn page(ids: &[i64], next: Option<&str>) -> Value {
        json!({ "continuationContents": { "musicShelfContinuation": shelf(ids, next) } })
    }

    fn body_items(ids: &[i64], next: Option<&str>) -> Vec<Value> {
        let mut items: Vec<Value> = ids.iter().map(|id| json!({ "id": id })).collect();
        if let Some(token) = next {
            items.push(json!({
                "continuationItemRenderer": {
                    "continuationEndpoint": { "continuationCommand": { "token": token } }
                }
            }));
        }
        items
    }

    fn body_page(ids: &[i64], next: Option<&str>) -> Value {
        json!({
            "onResponseReceivedActions": [{
                "appendContinuationItemsAction": { "continuationItems": body_items(ids, next) }
            }]
        })
    }

    #[test]
    fn continuation_string_encodes_both_params() {
        assert_eq!(
            continuation_string("tok123"),
            "&ctoken=tok123&continuation=tok123"
        );
        assert_eq!(
            continuation_string("a+b=c"),
            "&ctoken=a%2Bb%3Dc&continuation=a%2Bb%3Dc"
        );
    }

    #[test]
    fn params_follow_ctoken_path() {
        let results = json!({ "continuations": [{ "nextRadioContinuationData": { "continuation": "radio123" } }] });
        assert_eq!(
            continuation_params(&results, "Radio").unwrap(),
            "&ctoken=radio123&continuation=radio123"
        );
        assert!(matches!(
            continuation_params(&results, ""),
            Err(YtMusicError::Parse(_))
        ));

        let reload = json!({ "continuations": [{ "reloadContinuationData": { "continuation": "r1" } }] });
        assert_eq!(
            reloadable_continuation_params(&reload).unwrap(),
            "&ctoken=r1&continuation=r1"
        );
    }

    #[test]
    fn token_only_from_trailing_item() {
        assert_eq!(
            continuation_token(&body_items(&[1], Some("abc123"))).as_deref(),
            Some("abc123")
        );
        assert_eq!(continuation_token(&body_items(&[1], None)), None);
        assert_eq!(continuation_token(&[]), None);
    }

    #[test]
    fn contents_falls_back_to_items() {
        let mut parse = ids;
        assert_eq!(continuation_contents(&json!({ "items": [{ "id": 7 }] }), &mut parse), vec![7]);
        assert!(continuation_contents(&json!({}), &mut parse).is_empty());
    }

    #[tokio::test]
    async fn query_protocol_concatenates_pages_in_order() {
        let first = shelf(&[1, 2], Some("c1"));
        let mut pages = vec![page(&[3, 4], None)].into_iter();
        let mut sent = Vec::new();

        let items = get_continuations(
            &first,
            "musicShelfContinuation",
            None,
            |params| {
                sent.push(params);
                let next = pages.next();
                async move { next.ok_or_else(|| YtMusicError::Other("unexpected fetch".into())) }
            },
            ids,
            "",
            None,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(sent, vec!["&ctoken=c1&continuation=c1".to_owned()]);
    }

    #[tokio::test]
    async fn limit_is_checked_between_pages() {
        let first = shelf(&[1, 2], Some("c1"));
        let mut pages = vec![page(&[3, 4], Some("c2")), page(&[5, 6], Some("c3"))].into_iter();
        let mut calls = 0;

        let items = get_continuations(
            &first,
            "musicShelfContinuation",
            Some(3),
            |_| {
                calls += 1;
                let next = pages.next();
                async move { next.ok_or_else(|| YtMusicError::Other("unexpected fetch".into())) }
            },
            ids,
            "",
            None,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn empty_page_stops_even_with_continuations() {
        let first = shelf(&[1], Some("c1"));
        let mut calls = 0;

        let items = get_continuations(
            &first,
            "musicShelfContinuation",
            None,
            |_| {
                calls += 1;
                async { Ok::<_, YtMusicError>(page(&[], Some("forever"))) }
            },
            ids,
            "",
            None,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1]);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn missing_continuation_contents_ends_quietly() {
        let first = shelf(&[1], Some("c1"));
        let items = get_continuations(
            &first,
            "musicShelfContinuation",
            None,
            |_| async { Ok::<_, YtMusicError>(json!({ "responseContext": {} })) },
            ids,
            "",
            None,
        )
        .await
        .unwrap();
        assert_eq!(items, vec![1]);
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let first = shelf(&[1], Some("c1"));
        let result = get_continuations(
            &first,
            "musicShelfContinuation",
            None,
            |_| async {
                Err::<Value, _>(YtMusicError::Server {
                    status: 500,
                    message: "boom".into(),
                })
            },
            ids,
            "",
            None,
        )
        .await;
        assert_eq!(result.unwrap_err().status(), Some(500));
    }

    #[tokio::test]
    async fn reloadable_uses_reload_cursor_first() {
        let first = json!({
            "contents": [{ "id": 1 }],
            "continuations": [{ "reloadContinuationData": { "continuation": "reload" } }],
        });
        let mut pages = vec![page(&[2], Some("next")), page(&[3], None)].into_iter();
        let mut sent = Vec::new();

        let items = get_reloadable_continuations(
            &first,
            "musicShelfContinuation",
            None,
            |params| {
                sent.push(params);
                let next = pages.next();
                async move { next.ok_or_else(|| YtMusicError::Other("unexpected fetch".into())) }
            },
            ids,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(
            sent,
            vec![
                "&ctoken=reload&continuation=reload".to_owned(),
                "&ctoken=next&continuation=next".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn body_protocol_sends_token_in_body() {
        let first = body_items(&[1, 2], Some("t1"));
        let mut pages = vec![body_page(&[3], Some("t2")), body_page(&[4], None)].into_iter();
        let mut bodies = Vec::new();

        let items = get_body_continuations(
            &first,
            None,
            |body| {
                bodies.push(body);
                let next = pages.next();
                async move { next.ok_or_else(|| YtMusicError::Other("unexpected fetch".into())) }
            },
            ids,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            bodies,
            vec![json!({ "continuation": "t1" }), json!({ "continuation": "t2" })]
        );
    }

    #[tokio::test]
    async fn body_protocol_stops_on_empty_page() {
        let first = body_items(&[1, 2], Some("t1"));
        let mut calls = 0;

        let items = get_body_continuations(
            &first,
            None,
            |_| {
                calls += 1;
                async { Ok::<_, YtMusicError>(body_page(&[], None)) }
            },
            ids,
        )
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2]);
        assert_eq!(calls, 1);
    }
}
