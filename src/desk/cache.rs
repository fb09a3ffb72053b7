//! Keyed read-through cache over the remote collections
//!
//! Each key holds the last loaded value in a `watch` channel so every
//! reader sees the same data and is notified when it changes. A key is
//! fresh only while its value was loaded after the latest invalidation;
//! otherwise the next read waits for a load that started after it.
//! [`QueryCache::invalidate`] marks a key stale and starts a background
//! refetch; concurrent loads of one key share a single request.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use super::error::DeskResult;
use super::remote::RemoteStore;
use crate::models::{Book, Holder};

/// Cached collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Books,
    Holders,
}

/// What readers of a key currently see
#[derive(Debug)]
pub enum QueryState<T> {
    /// Never requested
    Idle,
    /// First load in flight
    Loading,
    Ready(Arc<T>),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Idle | QueryState::Loading)
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            QueryState::Idle => QueryState::Idle,
            QueryState::Loading => QueryState::Loading,
            QueryState::Ready(data) => QueryState::Ready(Arc::clone(data)),
            QueryState::Failed(message) => QueryState::Failed(message.clone()),
        }
    }
}

struct Slot<T> {
    state: watch::Sender<QueryState<T>>,
    /// Bumped by every invalidation
    generation: AtomicU64,
    /// Generation the published `Ready` value was loaded for
    loaded: AtomicU64,
    load: Mutex<()>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            state,
            generation: AtomicU64::new(1),
            loaded: AtomicU64::new(0),
            load: Mutex::new(()),
        }
    }

    /// Current data, unless an invalidation happened since it was loaded
    fn fresh(&self) -> Option<Arc<T>> {
        if self.loaded.load(Ordering::SeqCst) != self.generation.load(Ordering::SeqCst) {
            return None;
        }
        self.state.borrow().data().cloned()
    }

    async fn fetch<F, Fut>(&self, key: CacheKey, load: F) -> DeskResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DeskResult<T>>,
    {
        if let Some(data) = self.fresh() {
            return Ok(data);
        }

        let _guard = self.load.lock().await;
        // Another reader may have finished the load while we waited
        if let Some(data) = self.fresh() {
            return Ok(data);
        }

        let generation = self.generation.load(Ordering::SeqCst);
        self.state.send_if_modified(|state| match state {
            QueryState::Ready(_) => false,
            _ => {
                *state = QueryState::Loading;
                true
            }
        });

        tracing::debug!(?key, generation, "Loading cache entry");
        match load().await {
            Ok(value) => {
                let data = Arc::new(value);
                self.state.send_replace(QueryState::Ready(Arc::clone(&data)));
                // Published before marking fresh; an invalidation during the
                // load leaves the slot stale
                self.loaded.store(generation, Ordering::SeqCst);
                Ok(data)
            }
            Err(e) => {
                tracing::warn!(?key, "Cache load failed: {}", e);
                self.state.send_replace(QueryState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

struct Inner {
    store: Arc<dyn RemoteStore>,
    books: Slot<Vec<Book>>,
    holders: Slot<Vec<Holder>>,
}

/// Shared cache of the books and holders collections
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                books: Slot::new(),
                holders: Slot::new(),
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.inner.store
    }

    /// Books, from memory when fresh
    pub async fn books(&self) -> DeskResult<Arc<Vec<Book>>> {
        let store = &self.inner.store;
        self.inner
            .books
            .fetch(CacheKey::Books, || store.list_books())
            .await
    }

    /// Holders, from memory when fresh
    pub async fn holders(&self) -> DeskResult<Arc<Vec<Holder>>> {
        let store = &self.inner.store;
        self.inner
            .holders
            .fetch(CacheKey::Holders, || store.list_holders())
            .await
    }

    /// Make sure `key` holds fresh data
    pub async fn fetch(&self, key: CacheKey) -> DeskResult<()> {
        match key {
            CacheKey::Books => self.books().await.map(|_| ()),
            CacheKey::Holders => self.holders().await.map(|_| ()),
        }
    }

    /// Mark `key` stale and refetch it in the background.
    ///
    /// Readers keep seeing the previous value until the refetch lands, but
    /// any read issued after this call waits for new data. Outside a tokio
    /// runtime no refetch is spawned; the next read loads instead.
    pub fn invalidate(&self, key: CacheKey) {
        match key {
            CacheKey::Books => self.inner.books.invalidate(),
            CacheKey::Holders => self.inner.holders.invalidate(),
        }
        tracing::debug!(?key, "Cache entry invalidated");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let cache = self.clone();
            handle.spawn(async move {
                // Failure is already published to subscribers
                let _ = cache.fetch(key).await;
            });
        }
    }

    pub fn books_state(&self) -> QueryState<Vec<Book>> {
        self.inner.books.state.borrow().clone()
    }

    pub fn holders_state(&self) -> QueryState<Vec<Holder>> {
        self.inner.holders.state.borrow().clone()
    }

    pub fn subscribe_books(&self) -> watch::Receiver<QueryState<Vec<Book>>> {
        self.inner.books.state.subscribe()
    }

    pub fn subscribe_holders(&self) -> watch::Receiver<QueryState<Vec<Holder>>> {
        self.inner.holders.state.subscribe()
    }
}
