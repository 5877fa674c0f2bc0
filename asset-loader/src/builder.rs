use std::sync::Arc;

use log::trace;
use texture_store::TextureStore;

use crate::fetch::Fetcher;
use crate::loader::AssetLoader;

// --- Constants ---

// fetch
const MAX_CONCURRENT_FETCHES: Option<usize> = None;

// --- Builder ---

pub struct AssetLoaderBuilder<F: Fetcher> {
    pub(crate) fetcher: F,
    pub(crate) texture_store: Option<Arc<TextureStore>>,
    pub(crate) max_concurrent_fetches: Option<usize>,
}

impl<F: Fetcher> AssetLoaderBuilder<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            texture_store: None,
            max_concurrent_fetches: MAX_CONCURRENT_FETCHES,
        }
    }

    // --- Settings ---

    /// Store to populate. Without one the loader creates a default store.
    pub fn texture_store(mut self, store: Arc<TextureStore>) -> Self {
        self.texture_store = Some(store);
        self
    }

    /// Bounds how many requests are in flight at once. `0` is treated as `1`.
    pub fn max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = Some(limit.max(1));
        self
    }

    /// Lets every request of the batch run at once.
    pub fn unbounded_fetches(mut self) -> Self {
        self.max_concurrent_fetches = None;
        self
    }

    // --- Build ---

    pub fn build(self) -> AssetLoader<F> {
        let texture_store = match self.texture_store {
            Some(store) => store,
            None => {
                trace!("AssetLoaderBuilder::build: creating a default texture store");
                Arc::new(TextureStore::new())
            }
        };
        AssetLoader::from_parts(self.fetcher, texture_store, self.max_concurrent_fetches)
    }
}
