use crate::backend::BackendClient;
use crate::tags::{CacheLimits, TagCaches};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub tags: Arc<TagCaches>,
}

impl AppState {
    pub fn new(backend: BackendClient) -> Self {
        Self::with_cache_limits(backend, CacheLimits::default())
    }

    pub fn with_cache_limits(backend: BackendClient, limits: CacheLimits) -> Self {
        Self {
            tags: Arc::new(TagCaches::new(backend.clone(), limits)),
            backend,
        }
    }
}
