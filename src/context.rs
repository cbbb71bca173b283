//! Asset context
//!
//! Everything a request needs to resolve and serve assets, built once from a
//! configuration snapshot and shared by reference. Replacing the
//! configuration goes through `reload`, which rebuilds every component and
//! empties the store.

use crate::config::Config;
use crate::error::DandelionResult;
use crate::locator::{Locator, LocatorRegistry};
use crate::merge::MergingStrategy;
use crate::processor::{ProcessorPipeline, ProcessorRegistry};
use crate::storage::{create_storage, AssetStorage};
use crate::version::{Versioner, VersioningStrategy};
use std::sync::Arc;
use tracing::info;

pub struct AssetContext {
    config: Arc<Config>,
    locators: LocatorRegistry,
    /// Locators registered on top of the built-in ones, kept across reloads
    extra_locators: Vec<Arc<dyn Locator>>,
    pipeline: ProcessorPipeline,
    storage: Arc<dyn AssetStorage>,
    versioner: Versioner,
    merging: MergingStrategy,
}

impl AssetContext {
    /// Build a context from `config`; invalid settings fail here, not per request
    pub fn new(config: Config) -> DandelionResult<Self> {
        let config = Arc::new(config);
        let locators = LocatorRegistry::standard(&config);
        let pipeline = ProcessorPipeline::from_config(&config.asset, &ProcessorRegistry::standard()?)?;
        let storage = create_storage(&config.cache)?;
        let versioning = &config.asset.versioning;
        let versioner = Versioner::new(versioning.enabled, VersioningStrategy::from_config(versioning)?);
        let merging = MergingStrategy::from_name(&config.asset.merging)?;

        info!(
            "Asset context ready: profile={}, storage={}, merging={}, processors=[{}]",
            config.profile,
            storage.name(),
            merging.name(),
            pipeline.stage_names().join(", ")
        );

        Ok(Self {
            config,
            locators,
            extra_locators: Vec::new(),
            pipeline,
            storage,
            versioner,
            merging,
        })
    }

    /// Register an additional locator, replacing the built-in one of the same kind
    pub fn with_locator(mut self, locator: Arc<dyn Locator>) -> Self {
        self.locators.register(Arc::clone(&locator));
        self.extra_locators.push(locator);
        self
    }

    /// Swap in a new configuration; stored entries are dropped
    pub fn reload(&mut self, config: Config) -> DandelionResult<()> {
        let mut next = Self::new(config)?;
        for locator in &self.extra_locators {
            next = next.with_locator(Arc::clone(locator));
        }

        self.storage.clear();
        *self = next;
        info!("Asset context reloaded");
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn locators(&self) -> &LocatorRegistry {
        &self.locators
    }

    pub fn pipeline(&self) -> &ProcessorPipeline {
        &self.pipeline
    }

    pub fn storage(&self) -> &Arc<dyn AssetStorage> {
        &self.storage
    }

    pub fn versioner(&self) -> &Versioner {
        &self.versioner
    }

    pub fn merging(&self) -> MergingStrategy {
        self.merging
    }
}

impl std::fmt::Debug for AssetContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetContext")
            .field("profile", &self.config.profile)
            .field("locators", &self.locators)
            .field("pipeline", &self.pipeline)
            .field("storage", &self.storage.name())
            .field("merging", &self.merging)
            .finish()
    }
}
