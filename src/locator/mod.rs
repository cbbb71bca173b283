//! Asset locators
//!
//! A locator turns the raw location of one location kind into a public URL
//! and, when the pipeline needs it, into the asset's bytes. Locators are
//! registered explicitly in a `LocatorRegistry` at context construction.

pub mod api;
pub mod jar;
pub mod remote;
pub mod webapp;

pub use api::{ApiLocator, ContentGenerator};
pub use jar::JarLocator;
pub use remote::RemoteLocator;
pub use webapp::WebappLocator;

use crate::asset::AssetDeclaration;
use crate::config::Config;
use crate::error::DandelionResult;
use crate::request::RequestContext;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Source of asset locations and contents for one location kind
#[async_trait]
pub trait Locator: Send + Sync {
    /// Location kind this locator serves (key in bundle definitions)
    fn kind(&self) -> &'static str;

    /// Whether the locator currently participates in fetching and caching
    fn is_active(&self) -> bool {
        true
    }

    /// Whether contents must be stored even when global caching is off
    fn is_caching_forced(&self) -> bool {
        false
    }

    /// Public-facing location of the asset
    fn location_for(&self, asset: &AssetDeclaration, request: &RequestContext) -> String;

    /// Read the asset's bytes
    async fn content_for(
        &self,
        asset: &AssetDeclaration,
        request: &RequestContext,
    ) -> DandelionResult<Vec<u8>>;
}

/// Raw location of the locator's kind, or an empty string
pub(crate) fn raw_location<'a>(asset: &'a AssetDeclaration, kind: &str) -> &'a str {
    asset.location(kind).unwrap_or_default()
}

/// Explicit location kind to locator table
#[derive(Clone, Default)]
pub struct LocatorRegistry {
    locators: BTreeMap<&'static str, Arc<dyn Locator>>,
}

impl LocatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in locators configured from `config`
    pub fn standard(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(WebappLocator::new(PathBuf::from(
            &config.asset.webapp_root,
        ))));
        registry.register(Arc::new(JarLocator::new()));
        registry.register(Arc::new(RemoteLocator::new(Duration::from_millis(
            config.asset.remote_timeout_ms,
        ))));
        registry.register(Arc::new(ApiLocator::new()));
        registry
    }

    /// Register a locator, replacing any previous one of the same kind
    pub fn register(&mut self, locator: Arc<dyn Locator>) {
        self.locators.insert(locator.kind(), locator);
    }

    /// Locator for a kind
    pub fn get(&self, kind: &str) -> Option<&Arc<dyn Locator>> {
        self.locators.get(kind)
    }

    /// Whether a kind is registered
    pub fn contains(&self, kind: &str) -> bool {
        self.locators.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&'static str> {
        self.locators.keys().copied().collect()
    }
}

impl std::fmt::Debug for LocatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocatorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
