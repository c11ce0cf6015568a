use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::{Catalog, SimilarityMatrix},
    services::{ArtworkProvider, QueryService, Recommender},
};

const DEFAULT_ARTWORK_TIMEOUT: Duration = Duration::from_millis(2000);

/// Shared application state
///
/// Everything behind the `Arc` is read-only once built, so handlers share it
/// without locking.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

/// Frozen catalog, index and the components serving from them
pub struct AppStateInner {
    pub queries: QueryService,
    pub recommender: Recommender,
    pub artwork: Option<Arc<dyn ArtworkProvider>>,
    pub artwork_timeout: Duration,
}

/// Collects the loaded inputs and optional collaborators before freezing them
pub struct AppStateBuilder {
    catalog: Catalog,
    matrix: SimilarityMatrix,
    artwork: Option<Arc<dyn ArtworkProvider>>,
    artwork_timeout: Duration,
}

impl AppStateBuilder {
    pub fn artwork(mut self, provider: Arc<dyn ArtworkProvider>) -> Self {
        self.artwork = Some(provider);
        self
    }

    pub fn artwork_timeout(mut self, timeout: Duration) -> Self {
        self.artwork_timeout = timeout;
        self
    }

    pub fn build(self) -> AppState {
        let catalog = Arc::new(self.catalog);
        let matrix = Arc::new(self.matrix);

        AppState {
            inner: Arc::new(AppStateInner {
                queries: QueryService::new(catalog.clone()),
                recommender: Recommender::new(catalog, matrix),
                artwork: self.artwork,
                artwork_timeout: self.artwork_timeout,
            }),
        }
    }
}

impl AppState {
    pub fn builder(catalog: Catalog, matrix: SimilarityMatrix) -> AppStateBuilder {
        AppStateBuilder {
            catalog,
            matrix,
            artwork: None,
            artwork_timeout: DEFAULT_ARTWORK_TIMEOUT,
        }
    }

    /// State without artwork lookups
    pub fn new(catalog: Catalog, matrix: SimilarityMatrix) -> Self {
        Self::builder(catalog, matrix).build()
    }
}
