//! Shared application state: the read-only catalog and the narrator.
use std::sync::Arc;
use typhoon_game::{CatalogSource, ChoiceCatalog, EmbeddedCatalog};

use crate::catalog::{FileCatalog, load_or_fallback};
use crate::config::Config;
use crate::narration::{HttpNarrator, Narrator, StaticNarrator};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ChoiceCatalog>,
    pub narrator: Arc<dyn Narrator>,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: ChoiceCatalog, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            narrator,
        }
    }

    /// Build state from configuration; never fails, degrading to fallbacks.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let catalog = match &config.catalog {
            Some(path) => load_or_fallback(&FileCatalog::new(path)),
            None => load_or_fallback(&EmbeddedCatalog),
        };
        let narrator: Arc<dyn Narrator> = match &config.narration_url {
            Some(url) => {
                log::info!("narration via {url}");
                Arc::new(HttpNarrator::new(
                    url.clone(),
                    config.narration_api_key.clone(),
                    config.narration_timeout(),
                ))
            }
            None => {
                log::info!("narration service not configured, using offline scenes");
                Arc::new(StaticNarrator)
            }
        };
        Self::new(catalog, narrator)
    }

    /// Offline state over `source`, used by tests and tooling.
    pub fn offline<S: CatalogSource>(source: &S) -> Self {
        Self::new(load_or_fallback(source), Arc::new(StaticNarrator))
    }
}
