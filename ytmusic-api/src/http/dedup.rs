//! Collapses concurrent identical requests into one transport call.
//!
//! Two requests are identical when their `(url, body)` pair matches. The
//! first caller starts the call on the runtime; later callers with the same
//! key join it and each receive their own clone of the settled result. The
//! record is removed before any waiter is released, so a call issued after
//! settlement always hits the transport again.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinError;
use tracing::debug;

type InflightCall<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;
type InflightMap<T, E> = Arc<Mutex<HashMap<String, InflightCall<T, E>>>>;

/// Keyed store of in-flight calls. One per session; nothing is shared
/// across instances.
pub struct RequestDeduplicator<T, E> {
    inflight: InflightMap<T, E>,
}

impl<T, E> RequestDeduplicator<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Deduplication key for a request.
    pub fn key(url: &str, body: Option<&str>) -> String {
        match body {
            Some(body) => format!("{url}::{body}"),
            None => url.to_owned(),
        }
    }

    /// Run `perform` unless an identical request is already outstanding, in
    /// which case wait for that one instead.
    ///
    /// `perform` is only invoked by the caller that starts the call.
    /// Dropping the returned future stops waiting but does not cancel the
    /// underlying call, which other callers may still be sharing.
    pub async fn execute<F, Fut>(&self, url: &str, body: Option<&str>, perform: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let call = self.join_or_start(Self::key(url, body), perform);
        call.await
    }

    /// Number of calls currently in flight.
    pub fn len(&self) -> usize {
        lock(&self.inflight).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn join_or_start<F, Fut>(&self, key: String, perform: F) -> InflightCall<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        // Lookup and insert happen under one lock with no await in between.
        let mut inflight = lock(&self.inflight);
        if let Some(existing) = inflight.get(&key) {
            debug!(key = %key, "joining in-flight request");
            return existing.clone();
        }

        let settle = Settle {
            map: Arc::clone(&self.inflight),
            key: key.clone(),
        };
        let fut = perform();
        let task = tokio::spawn(async move {
            // Dropped when the call settles (or panics), before the join
            // handle wakes any waiter.
            let _settle = settle;
            fut.await
        });
        let call = async move { task.await.unwrap_or_else(|e| Err(E::from(e))) }
            .boxed()
            .shared();
        inflight.insert(key, call.clone());
        call
    }
}

impl<T, E> Default for RequestDeduplicator<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<JoinError> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the in-flight record for `key` when dropped.
struct Settle<T, E> {
    map: InflightMap<T, E>,
    key: String,
}

impl<T, E> Drop for Settle<T, E> {
    fn drop(&mut self) {
        lock(&self.map).remove(&self.key);
    }
}

fn lock<V>(map: &Mutex<V>) -> MutexGuard<'_, V> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}
