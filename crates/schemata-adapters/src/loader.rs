//! # Module Loader Cache
//!
//! Lazy, memoized acquisition of library runtimes ("modules"). A module is
//! produced by an async [`Loader`] registered under a [`ModuleId`]; the
//! first [`ModuleCache::acquire`] runs the loader and later calls reuse the
//! handle.
//!
//! ## Failure semantics
//!
//! A failing loader reports its [`LoadError`] to every caller waiting on
//! that acquisition and leaves no trace in the cache, so the next call
//! retries. Nothing is retried automatically.
//!
//! ## Reset
//!
//! [`ModuleCache::clear`] discards every handle and in-flight load.
//! Replacing a loader with [`ModuleCache::register`] does not evict a handle
//! that is already loaded; the replacement is used from the next load on.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};
use parking_lot::RwLock;
use schemata_core::LoadError;

use crate::memo::MemoCache;

/// Type-erased handle to a loaded module.
pub type ModuleHandle = Arc<dyn Any + Send + Sync>;

/// Async factory producing a module handle.
pub type Loader = Arc<dyn Fn() -> BoxFuture<'static, Result<ModuleHandle, LoadError>> + Send + Sync>;

/// Name of a loadable module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(&'static str);

impl ModuleId {
    /// Create a module id.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// The module name.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Registry of loaders plus the memoized handles they produced.
///
/// Cloning shares both the loaders and the cache.
#[derive(Clone, Default)]
pub struct ModuleCache {
    loaders: Arc<RwLock<HashMap<ModuleId, Loader>>>,
    handles: MemoCache<ModuleId, ModuleHandle, LoadError>,
}

impl fmt::Debug for ModuleCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<&'static str> =
            self.loaders.read().keys().map(ModuleId::name).collect();
        registered.sort_unstable();
        f.debug_struct("ModuleCache")
            .field("registered", &registered)
            .field("cached", &self.handles.len())
            .finish()
    }
}

impl ModuleCache {
    /// Create a cache with no loaders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the loader for `id`.
    pub fn register(&self, id: ModuleId, loader: Loader) {
        self.loaders.write().insert(id, loader);
    }

    /// Install or replace the loader for `id` from an async closure.
    ///
    /// The closure runs without any cache lock held and may inspect or
    /// register modules on this cache.
    pub fn register_fn<F, Fut>(&self, id: ModuleId, load: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ModuleHandle, LoadError>> + Send + 'static,
    {
        self.register(id, Arc::new(move || load().boxed()));
    }

    /// Returns true if a loader is registered for `id`.
    pub fn is_registered(&self, id: ModuleId) -> bool {
        self.loaders.read().contains_key(&id)
    }

    /// Acquire the module handle for `id`, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::NotFound` if no loader is registered, or the
    /// loader's own error if loading fails.
    pub async fn acquire(&self, id: ModuleId) -> Result<ModuleHandle, LoadError> {
        self.handles
            .get_or_load(id, || {
                let loader = self.loaders.read().get(&id).cloned();
                match loader {
                    Some(loader) => {
                        tracing::debug!(module = %id, "loading module");
                        let load = loader();
                        async move {
                            let outcome = load.await;
                            match &outcome {
                                Ok(_) => tracing::info!(module = %id, "module loaded"),
                                Err(e) => {
                                    tracing::warn!(module = %id, error = %e, "module load failed")
                                }
                            }
                            outcome
                        }
                        .boxed()
                    }
                    None => future::ready(Err(LoadError::NotFound(id.to_string()))).boxed(),
                }
            })
            .await
    }

    /// Acquire the module for `id` and downcast it to `T`.
    ///
    /// # Errors
    ///
    /// As [`ModuleCache::acquire`], plus `LoadError::UnexpectedHandle` if the
    /// loaded module is not a `T`.
    pub async fn acquire_as<T>(&self, id: ModuleId) -> Result<Arc<T>, LoadError>
    where
        T: Any + Send + Sync,
    {
        self.acquire(id)
            .await?
            .downcast::<T>()
            .map_err(|_| LoadError::UnexpectedHandle {
                module: id.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Returns true if the module for `id` is loaded.
    pub fn is_loaded(&self, id: ModuleId) -> bool {
        self.handles.is_ready(&id)
    }

    /// Discard every loaded handle and in-flight load.
    pub fn clear(&self) {
        self.handles.clear();
    }
}
