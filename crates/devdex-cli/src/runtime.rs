// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use devdex_api::{CatalogFetcher, CatalogSource};
use devdex_app::{Catalog, CatalogError};
use std::sync::Arc;
use tracing::info;

pub struct ClientRuntime<S> {
    fetcher: CatalogFetcher<S>,
}

impl<S: CatalogSource> ClientRuntime<S> {
    pub fn new(source: S) -> Self {
        Self {
            fetcher: CatalogFetcher::new(source),
        }
    }
}

impl<S: CatalogSource> devdex_tui::AppRuntime for ClientRuntime<S> {
    fn load_catalog(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        self.fetcher.load()
    }

    fn reload_catalog(&mut self) -> Result<Arc<Catalog>, CatalogError> {
        info!(source = %self.fetcher.source().describe(), "reloading catalog");
        self.fetcher.invalidate();
        self.fetcher.load()
    }
}
