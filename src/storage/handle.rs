//! Shared, swappable reference to the current catalog.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::CatalogStore;

/// Cheap-to-clone handle to the catalog currently being served.
///
/// Readers take a [`snapshot`](Self::snapshot) and work against that `Arc`
/// for the whole request. [`replace`](Self::replace) swaps in a new store
/// atomically; requests already holding the old snapshot finish against it.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    current: Arc<RwLock<Arc<CatalogStore>>>,
}

impl CatalogHandle {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// The store serving new requests.
    pub fn snapshot(&self) -> Arc<CatalogStore> {
        // The lock only guards a pointer swap, so a poisoned lock still holds a valid store.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Swap in a freshly loaded store, returning the one it replaces.
    pub fn replace(&self, store: CatalogStore) -> Arc<CatalogStore> {
        let next = Arc::new(store);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!("Swapping catalog: {} -> {} components", guard.len(), next.len());
        std::mem::replace(&mut *guard, next)
    }
}
