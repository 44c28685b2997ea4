//! In-memory image cache with request coalescing.
//!
//! Every key has at most one fetch in flight. Callers asking for a key that is
//! already being fetched register as waiters on that fetch and all receive the
//! same outcome. Each caller brings its own [`CancellationToken`]; the fetch is
//! aborted only once every waiter has withdrawn.
//!
//! Successful results are kept (optionally LRU-bounded), failures never are.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::FutureExt;
use lru::LruCache;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;
use tracing::{debug, error, info, trace, warn};

use crate::domain::cancellation::CancellationToken;
use crate::domain::entities::ImageBytes;
use crate::domain::errors::FetchError;
use crate::domain::ports::HttpTransport;

/// What a waiter eventually receives.
pub type ImageOutcome = Result<ImageBytes, FetchError>;

/// Configuration for the image cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageCacheConfig {
    /// Maximum resolved images kept, least recently used evicted first.
    /// `None` keeps every image for the lifetime of the cache.
    pub capacity: Option<NonZeroUsize>,
}

impl ImageCacheConfig {
    /// Keeps every resolved image.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self { capacity: None }
    }

    /// Keeps at most `capacity` resolved images.
    #[must_use]
    pub const fn bounded(capacity: NonZeroUsize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }
}

/// State of a key in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// A fetch is in flight.
    Pending,
    /// The image is stored.
    Resolved,
}

/// Message sent when an image requested through [`ImageCache::load_async`] settles.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The requested key.
    pub key: String,
    /// The image, or why it could not be loaded.
    pub result: ImageOutcome,
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests served from stored images.
    pub hits: u64,
    /// Requests that started a new fetch.
    pub misses: u64,
    /// Requests that joined a fetch already in flight.
    pub coalesced: u64,
    /// Stored images.
    pub size: usize,
    /// Fetches in flight.
    pub pending: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {} images, {} in flight ({} hits, {} misses, {} coalesced)",
            self.size, self.pending, self.hits, self.misses, self.coalesced
        )
    }
}

struct PendingFetch {
    fetch_id: u64,
    abort: AbortHandle,
    waiters: HashMap<u64, oneshot::Sender<ImageOutcome>>,
    store_result: bool,
}

struct Entries {
    resolved: LruCache<String, ImageBytes>,
    pending: HashMap<String, PendingFetch>,
}

struct Shared {
    transport: Arc<dyn HttpTransport>,
    entries: Mutex<Entries>,
    next_id: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
}

impl Shared {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Settles fetch `fetch_id` and fans the outcome out to its waiters.
    fn complete(&self, key: &str, fetch_id: u64, outcome: ImageOutcome) {
        let pending = {
            let mut entries = self.entries.lock();
            if !matches!(entries.pending.get(key), Some(p) if p.fetch_id == fetch_id) {
                trace!(key, "Discarding result of untracked fetch");
                return;
            }
            let Some(pending) = entries.pending.remove(key) else {
                return;
            };

            match &outcome {
                Ok(image) if pending.store_result => {
                    debug!(key, bytes = image.len(), "Storing image in cache");
                    entries.resolved.put(key.to_owned(), image.clone());
                }
                Ok(_) => debug!(key, "Cache was evicted during fetch, not storing"),
                Err(e) => warn!(key, error = %e, transport_kind = ?e.transport_kind(), "Image fetch failed"),
            }
            pending
        };

        for tx in pending.waiters.into_values() {
            let _ = tx.send(outcome.clone());
        }
    }

    /// Removes one waiter; aborts the fetch if it was the last.
    fn withdraw(&self, key: &str, fetch_id: u64, waiter_id: u64) {
        let mut entries = self.entries.lock();
        let Some(pending) = entries.pending.get_mut(key) else {
            return;
        };
        if pending.fetch_id != fetch_id {
            return;
        }

        pending.waiters.remove(&waiter_id);
        if !pending.waiters.is_empty() {
            trace!(key, remaining = pending.waiters.len(), "Waiter withdrew");
            return;
        }

        if let Some(pending) = entries.pending.remove(key) {
            pending.abort.abort();
            debug!(key, "Last waiter withdrew, cancelled image fetch");
        }
    }
}

/// Withdraws a waiter when its `resolve` call ends without an outcome.
struct WaiterGuard {
    shared: Arc<Shared>,
    key: String,
    fetch_id: u64,
    waiter_id: u64,
    armed: bool,
}

impl Drop for WaiterGuard {
    fn drop(&mut self) {
        if self.armed {
            self.shared
                .withdraw(&self.key, self.fetch_id, self.waiter_id);
        }
    }
}

enum Lookup {
    Ready(ImageBytes),
    Waiting {
        rx: oneshot::Receiver<ImageOutcome>,
        guard: WaiterGuard,
    },
}

/// Session-wide image cache.
///
/// Cloning is cheap and yields a handle to the same cache.
#[derive(Clone)]
pub struct ImageCache {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl ImageCache {
    /// Creates an unbounded cache fetching through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_config(transport, ImageCacheConfig::default())
    }

    /// Creates a cache with the given configuration.
    #[must_use]
    pub fn with_config(transport: Arc<dyn HttpTransport>, config: ImageCacheConfig) -> Self {
        let resolved = config
            .capacity
            .map_or_else(LruCache::unbounded, LruCache::new);

        Self {
            shared: Arc::new(Shared {
                transport,
                entries: Mutex::new(Entries {
                    resolved,
                    pending: HashMap::new(),
                }),
                next_id: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
                coalesced: AtomicU64::new(0),
            }),
        }
    }

    /// Resolves the image for `key`.
    ///
    /// Returns `None` if `token` is cancelled before an outcome is delivered;
    /// a cancelled caller never sees a result. Dropping the returned future
    /// withdraws the caller the same way.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn resolve(&self, key: &str, token: &CancellationToken) -> Option<ImageOutcome> {
        if token.is_cancelled() {
            return None;
        }

        let (rx, mut guard) = match self.lookup(key) {
            Lookup::Ready(image) => return Some(Ok(image)),
            Lookup::Waiting { rx, guard } => (rx, guard),
        };

        tokio::select! {
            biased;
            () = token.cancelled() => {
                trace!(key, "Image request cancelled by caller");
                None
            }
            received = rx => {
                guard.armed = false;
                if token.is_cancelled() {
                    None
                } else {
                    Some(received.unwrap_or_else(|_| {
                        Err(FetchError::transport("image fetch ended without a result"))
                    }))
                }
            }
        }
    }

    /// Atomically finds a stored image, joins an in-flight fetch, or starts one.
    fn lookup(&self, key: &str) -> Lookup {
        let shared = &self.shared;
        let mut entries = shared.entries.lock();

        if let Some(image) = entries.resolved.get(key) {
            shared.hits.fetch_add(1, Ordering::Relaxed);
            trace!(key, "Image cache hit");
            return Lookup::Ready(image.clone());
        }

        let waiter_id = shared.next_id();
        let (tx, rx) = oneshot::channel();

        let fetch_id = if let Some(pending) = entries.pending.get_mut(key) {
            pending.waiters.insert(waiter_id, tx);
            shared.coalesced.fetch_add(1, Ordering::Relaxed);
            trace!(key, waiters = pending.waiters.len(), "Joined in-flight image fetch");
            pending.fetch_id
        } else {
            shared.misses.fetch_add(1, Ordering::Relaxed);
            let fetch_id = shared.next_id();
            debug!(key, "Image cache miss, starting fetch");

            // Spawned under the lock: the task cannot settle before its entry exists.
            let task = tokio::spawn(Self::run_fetch(
                Arc::clone(shared),
                key.to_owned(),
                fetch_id,
            ));
            entries.pending.insert(
                key.to_owned(),
                PendingFetch {
                    fetch_id,
                    abort: task.abort_handle(),
                    waiters: HashMap::from([(waiter_id, tx)]),
                    store_result: true,
                },
            );
            fetch_id
        };

        Lookup::Waiting {
            rx,
            guard: WaiterGuard {
                shared: Arc::clone(shared),
                key: key.to_owned(),
                fetch_id,
                waiter_id,
                armed: true,
            },
        }
    }

    async fn run_fetch(shared: Arc<Shared>, key: String, fetch_id: u64) {
        // A panic must still settle the entry, or the key stays pending forever.
        let outcome = AssertUnwindSafe(fetch_image(shared.transport.as_ref(), &key))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!(key, "Image fetch panicked");
                Err(FetchError::transport("image fetch panicked"))
            });
        shared.complete(&key, fetch_id, outcome);
    }

    /// Starts resolving `key` in the background.
    /// The outcome is sent via `events` unless `token` is cancelled first.
    pub fn load_async(
        &self,
        key: String,
        token: CancellationToken,
        events: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) {
        let cache = self.clone();
        tokio::spawn(async move {
            let Some(result) = cache.resolve(&key, &token).await else {
                return;
            };
            if token.is_cancelled() {
                return;
            }
            if events.send(ImageLoadedEvent { key, result }).is_err() {
                trace!("Image event receiver dropped");
            }
        });
    }

    /// Warms the cache for `keys` without anyone waiting on the results.
    pub fn prefetch<I, S>(&self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            let key = key.into();
            let cache = self.clone();
            tokio::spawn(async move {
                let _ = cache.resolve(&key, &CancellationToken::new()).await;
            });
        }
    }

    /// Drops every stored image.
    ///
    /// Fetches already in flight keep running and still answer their waiters,
    /// but their results are not stored. Their pending entries stay, so
    /// `is_loading` remains true for them and callers arriving after the evict
    /// join the running fetch instead of starting a second one.
    pub fn evict_all(&self) {
        let mut entries = self.shared.entries.lock();
        let dropped = entries.resolved.len();
        entries.resolved.clear();
        for pending in entries.pending.values_mut() {
            pending.store_result = false;
        }
        info!(
            dropped,
            in_flight = entries.pending.len(),
            "Evicted all cached images"
        );
    }

    /// Returns true if an image is stored for `key`. Does not affect LRU order.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.shared.entries.lock().resolved.contains(key)
    }

    /// Returns true if a fetch for `key` is in flight.
    #[must_use]
    pub fn is_loading(&self, key: &str) -> bool {
        self.shared.entries.lock().pending.contains_key(key)
    }

    /// Returns the state of `key`, or `None` if the cache knows nothing about it.
    #[must_use]
    pub fn entry_state(&self, key: &str) -> Option<EntryState> {
        let entries = self.shared.entries.lock();
        if entries.pending.contains_key(key) {
            Some(EntryState::Pending)
        } else if entries.resolved.contains(key) {
            Some(EntryState::Resolved)
        } else {
            None
        }
    }

    /// Returns the number of fetches in flight.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.entries.lock().pending.len()
    }

    /// Returns the number of stored images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.lock().resolved.len()
    }

    /// Returns true if no image is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let (size, pending) = {
            let entries = self.shared.entries.lock();
            (entries.resolved.len(), entries.pending.len())
        };
        CacheStats {
            hits: self.shared.hits.load(Ordering::Relaxed),
            misses: self.shared.misses.load(Ordering::Relaxed),
            coalesced: self.shared.coalesced.load(Ordering::Relaxed),
            size,
            pending,
        }
    }
}

async fn fetch_image(transport: &dyn HttpTransport, key: &str) -> ImageOutcome {
    let response = transport.get(key).await?;
    if !response.is_success() {
        return Err(FetchError::HttpStatus(response.status));
    }
    ImageBytes::decode(response.body)
}
