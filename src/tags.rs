use crate::backend::BackendClient;
use crate::models::Tag;
use crate::sequence::RequestSequence;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info, warn};

pub const FETCH_FAILED: &str = "Failed to fetch tags";
pub const CREATE_FAILED: &str = "Failed to create tag";
pub const DELETE_FAILED: &str = "Failed to delete tag";
pub const UNKNOWN_TAG: &str = "unknown";

#[derive(Debug, Default)]
struct TagState {
    tags: Vec<Tag>,
    error: Option<String>,
    fetches: RequestSequence,
}

/// Point-in-time copy of a [`TagCache`] for rendering.
#[derive(Debug, Clone, Default)]
pub struct TagSnapshot {
    pub tags: Vec<Tag>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TagSnapshot {
    /// Display name for a tag id, "unknown" when the cache does not hold it.
    pub fn tag_name(&self, id: &str) -> &str {
        self.tags
            .iter()
            .find(|tag| tag.id == id)
            .map(|tag| tag.name.as_str())
            .unwrap_or(UNKNOWN_TAG)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tags.iter().any(|tag| tag.id == id)
    }

    /// The first `count` tags in cache order.
    pub fn recent(&self, count: usize) -> &[Tag] {
        &self.tags[..self.tags.len().min(count)]
    }
}

/// One session's tags, kept in step with the backend.
///
/// The list only changes after the backend confirms a fetch, create or
/// delete. A fetch response older than one already applied is dropped.
/// Fetches run on their own task, so a caller that goes away mid-request
/// cannot leave the cache loading.
pub struct TagCache {
    backend: BackendClient,
    token: String,
    state: Mutex<TagState>,
    rejected: AtomicBool,
}

impl TagCache {
    pub fn new(backend: BackendClient, token: impl Into<String>) -> Self {
        Self {
            backend,
            token: token.into(),
            state: Mutex::new(TagState::default()),
            rejected: AtomicBool::new(false),
        }
    }

    /// True once the backend has refused this cache's token.
    pub fn is_rejected(&self) -> bool {
        self.rejected.load(Ordering::Relaxed)
    }

    pub async fn snapshot(&self) -> TagSnapshot {
        let state = self.state.lock().await;
        TagSnapshot {
            tags: state.tags.clone(),
            loading: state.fetches.pending(),
            error: state.error.clone(),
        }
    }

    pub async fn refresh_tags(self: &Arc<Self>) {
        let ticket = {
            let mut state = self.state.lock().await;
            state.error = None;
            state.fetches.issue()
        };
        self.fetch(ticket).await;
    }

    /// Waits for the fetch holding `ticket`, which runs to completion even if
    /// this future is dropped.
    async fn fetch(self: &Arc<Self>, ticket: u64) {
        let cache = Arc::clone(self);
        let task = tokio::spawn(async move { cache.complete_fetch(ticket).await });
        if let Err(err) = task.await {
            warn!("tag fetch task failed: {err}");
        }
    }

    async fn complete_fetch(&self, ticket: u64) {
        let result = self.backend.list_tags(&self.token).await;
        if let Err(err) = &result {
            if err.is_rejected_token() {
                self.rejected.store(true, Ordering::Relaxed);
            }
        }

        let mut state = self.state.lock().await;
        if !state.fetches.accept(ticket) {
            debug!(ticket, "discarding stale tag list");
            return;
        }
        match result {
            Ok(tags) => {
                debug!(count = tags.len(), "tag list loaded");
                state.tags = tags;
            }
            Err(err) => {
                warn!("failed to fetch tags: {err}");
                state.error = Some(FETCH_FAILED.to_string());
            }
        }
    }

    /// Returns the created tag, or `None` after recording the failure in the
    /// cache's error.
    pub async fn create_tag(&self, name: &str) -> Option<Tag> {
        match self.backend.create_tag(&self.token, name).await {
            Ok(tag) => {
                info!(id = %tag.id, "tag created");
                self.state.lock().await.tags.push(tag.clone());
                Some(tag)
            }
            Err(err) => {
                warn!("failed to create tag: {err}");
                self.state.lock().await.error = Some(CREATE_FAILED.to_string());
                None
            }
        }
    }

    pub async fn delete_tag(&self, id: &str) -> bool {
        match self.backend.delete_tag(&self.token, id).await {
            Ok(()) => {
                info!(id, "tag deleted");
                self.state.lock().await.tags.retain(|tag| tag.id != id);
                true
            }
            Err(err) => {
                warn!("failed to delete tag: {err}");
                self.state.lock().await.error = Some(DELETE_FAILED.to_string());
                false
            }
        }
    }
}

/// Bounds on how many tag caches are kept and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLimits {
    pub capacity: usize,
    pub idle: Duration,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            capacity: 1024,
            idle: Duration::from_secs(30 * 60),
        }
    }
}

struct CacheSlot {
    cache: Arc<TagCache>,
    last_used: Instant,
}

/// Tag caches keyed by session token, shared by every handler.
///
/// A cache lives until its session logs out, the backend refuses its token,
/// it sits unused for longer than `idle`, or it is the least recently used
/// one when a new token needs room.
pub struct TagCaches {
    backend: BackendClient,
    limits: CacheLimits,
    caches: Mutex<HashMap<String, CacheSlot>>,
}

impl TagCaches {
    pub fn new(backend: BackendClient, limits: CacheLimits) -> Self {
        Self {
            backend,
            limits: CacheLimits {
                capacity: limits.capacity.max(1),
                ..limits
            },
            caches: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cache for `token`, loading it from the backend the first
    /// time the token is seen.
    pub async fn for_token(&self, token: &str) -> Arc<TagCache> {
        let (cache, first_fetch) = {
            let mut caches = self.caches.lock().await;
            let now = Instant::now();
            let existing = caches
                .get_mut(token)
                .filter(|slot| !slot.cache.is_rejected() && !self.is_idle(slot, now))
                .map(|slot| {
                    slot.last_used = now;
                    Arc::clone(&slot.cache)
                });

            match existing {
                Some(cache) => (cache, None),
                None => {
                    caches.remove(token);
                    self.make_room(&mut caches, now);
                    let mut cache = TagCache::new(self.backend.clone(), token);
                    // Issued before the cache is shared so concurrent readers
                    // already see it loading.
                    let ticket = cache.state.get_mut().fetches.issue();
                    let cache = Arc::new(cache);
                    caches.insert(
                        token.to_string(),
                        CacheSlot {
                            cache: Arc::clone(&cache),
                            last_used: now,
                        },
                    );
                    (cache, Some(ticket))
                }
            }
        };

        if let Some(ticket) = first_fetch {
            cache.fetch(ticket).await;
            if cache.is_rejected() {
                self.evict_cache(token, &cache).await;
            }
        }
        cache
    }

    pub async fn evict(&self, token: &str) -> bool {
        self.caches.lock().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.caches.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn is_idle(&self, slot: &CacheSlot, now: Instant) -> bool {
        now.duration_since(slot.last_used) >= self.limits.idle
    }

    /// Drops refused and idle caches, then least recently used ones until a
    /// new cache fits.
    fn make_room(&self, caches: &mut HashMap<String, CacheSlot>, now: Instant) {
        let before = caches.len();
        caches.retain(|_, slot| !slot.cache.is_rejected() && !self.is_idle(slot, now));

        while caches.len() >= self.limits.capacity {
            let oldest = caches
                .iter()
                .min_by_key(|(_, slot)| slot.last_used)
                .map(|(token, _)| token.clone());
            match oldest {
                Some(token) => {
                    caches.remove(&token);
                }
                None => break,
            }
        }

        if caches.len() < before {
            debug!(evicted = before - caches.len(), "tag caches evicted");
        }
    }

    async fn evict_cache(&self, token: &str, cache: &Arc<TagCache>) {
        let mut caches = self.caches.lock().await;
        if caches
            .get(token)
            .is_some_and(|slot| Arc::ptr_eq(&slot.cache, cache))
        {
            caches.remove(token);
            debug!("tag cache dropped after the backend refused its token");
        }
    }
}
