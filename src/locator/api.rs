//! Locator for contents produced in-process
//!
//! Contents come either from inline content attached to the request or from
//! a generator registered for the asset's location.

use super::{raw_location, Locator};
use crate::asset::AssetDeclaration;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Produces an asset's content for a request
pub type ContentGenerator = Arc<dyn Fn(&RequestContext) -> String + Send + Sync>;

/// Serves `api` locations
#[derive(Clone, Default)]
pub struct ApiLocator {
    generators: HashMap<String, ContentGenerator>,
}

impl ApiLocator {
    pub const KIND: &'static str = "api";

    /// Create a locator with no generators
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator for a location
    pub fn with_generator<F>(mut self, location: impl Into<String>, generator: F) -> Self
    where
        F: Fn(&RequestContext) -> String + Send + Sync + 'static,
    {
        self.generators.insert(location.into(), Arc::new(generator));
        self
    }
}

impl std::fmt::Debug for ApiLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiLocator")
            .field("generators", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl Locator for ApiLocator {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn is_caching_forced(&self) -> bool {
        true
    }

    fn location_for(&self, asset: &AssetDeclaration, _request: &RequestContext) -> String {
        raw_location(asset, Self::KIND).to_string()
    }

    async fn content_for(
        &self,
        asset: &AssetDeclaration,
        request: &RequestContext,
    ) -> DandelionResult<Vec<u8>> {
        if let Some(inline) = request.inline_content(&asset.effective_name()) {
            return Ok(inline.as_bytes().to_vec());
        }

        let location = raw_location(asset, Self::KIND);
        self.generators
            .get(location)
            .map(|generate| generate(request).into_bytes())
            .ok_or_else(|| {
                DandelionError::fetch(asset.to_log(), location, "no inline content or generator")
            })
    }
}
