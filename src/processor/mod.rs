//! Asset content processors
//!
//! A processor is a text-in/text-out transform. The pipeline applies the
//! configured processors supporting an asset's type in configuration order,
//! each stage consuming the previous stage's full output, then overwrites the
//! asset's store entry with the result. A failing stage aborts the pass and
//! nothing is stored.

pub mod css_url;
pub mod cssmin;
pub mod jsmin;

pub use css_url::CssUrlRewriter;
pub use cssmin::CssMinifier;
pub use jsmin::JsMinifier;

use crate::asset::{AssetType, ResolvedAsset};
use crate::config::schema::AssetConfig;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use crate::storage::{AssetStorage, StoreEntry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Inputs available to a processor besides the content itself
#[derive(Debug, Clone, Copy)]
pub struct ProcessingContext<'a> {
    pub asset: &'a ResolvedAsset,
    pub request: &'a RequestContext,
    /// Public location the asset is loaded from by the locator
    pub location: &'a str,
}

/// A named content transform
pub trait AssetProcessor: Send + Sync {
    /// Name used in `asset.processors`
    fn name(&self) -> &'static str;

    /// Whether the processor applies to assets of this type
    fn supports(&self, asset_type: AssetType) -> bool;

    /// Minifiers only run when minification is enabled
    fn is_minifier(&self) -> bool {
        false
    }

    /// Transform `content`; the error string describes the failure
    fn process(&self, content: &str, context: &ProcessingContext<'_>) -> Result<String, String>;
}

/// Known processors by name
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: BTreeMap<&'static str, Arc<dyn AssetProcessor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in processors
    pub fn standard() -> DandelionResult<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(CssUrlRewriter::new()?));
        registry.register(Arc::new(JsMinifier));
        registry.register(Arc::new(CssMinifier));
        Ok(registry)
    }

    pub fn register(&mut self, processor: Arc<dyn AssetProcessor>) {
        self.processors.insert(processor.name(), processor);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn AssetProcessor>> {
        self.processors.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        self.processors.keys().copied().collect()
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Ordered processor chain built from the configuration
#[derive(Clone)]
pub struct ProcessorPipeline {
    chain: Vec<Arc<dyn AssetProcessor>>,
}

impl ProcessorPipeline {
    /// Resolve `config.processors` against `registry`.
    ///
    /// Minifiers are dropped when minification is off. Unknown names and
    /// encodings other than UTF-8 are configuration errors.
    pub fn from_config(config: &AssetConfig, registry: &ProcessorRegistry) -> DandelionResult<Self> {
        let encoding = config.processors_encoding.trim().to_ascii_uppercase();
        if encoding != "UTF-8" && encoding != "UTF8" {
            return Err(DandelionError::UnsupportedEncoding(
                config.processors_encoding.clone(),
            ));
        }

        let mut chain = Vec::with_capacity(config.processors.len());
        for name in &config.processors {
            let processor = registry
                .get(name.trim())
                .ok_or_else(|| DandelionError::UnknownProcessor {
                    name: name.clone(),
                    valid: registry.names().join(", "),
                })?;
            if processor.is_minifier() && !config.minification {
                continue;
            }
            chain.push(Arc::clone(processor));
        }

        Ok(Self { chain })
    }

    /// Names of the active stages, in order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|p| p.name()).collect()
    }

    /// Run the chain over `raw` and return the final content without storing it
    pub fn apply(&self, raw: &[u8], context: &ProcessingContext<'_>) -> DandelionResult<String> {
        let asset = context.asset;
        let mut content = String::from_utf8(raw.to_vec())
            .map_err(|e| DandelionError::processing("decode", asset.to_log(), e.to_string()))?;

        for processor in self.chain.iter().filter(|p| p.supports(asset.asset_type)) {
            debug!("Applying {} to {}", processor.name(), asset.to_log());
            content = processor
                .process(&content, context)
                .map_err(|reason| DandelionError::processing(processor.name(), asset.to_log(), reason))?;
        }

        Ok(content)
    }

    /// Run the chain and overwrite the asset's store entry with the result
    pub fn process(
        &self,
        raw: &[u8],
        context: &ProcessingContext<'_>,
        storage: &dyn AssetStorage,
    ) -> DandelionResult<String> {
        let content = self.apply(raw, context)?;
        storage.update(
            &context.asset.cache_key,
            StoreEntry::Single {
                asset: context.asset.clone(),
                content: Some(content.clone()),
            },
        );
        Ok(content)
    }
}

impl std::fmt::Debug for ProcessorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
