//! Locator for resources packaged into the binary
//!
//! Packaged resources cannot be served directly, so their contents are always
//! stored and served from the asset URL.

use super::{raw_location, Locator};
use crate::asset::AssetDeclaration;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use async_trait::async_trait;
use std::borrow::Cow;
use std::collections::HashMap;

/// Serves `jar` locations from an in-binary resource table
#[derive(Debug, Clone, Default)]
pub struct JarLocator {
    resources: HashMap<String, Cow<'static, [u8]>>,
}

impl JarLocator {
    pub const KIND: &'static str = "jar";

    /// Create a locator with no packaged resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, e.g. `with_resource("js/lib.js", include_bytes!("lib.js"))`
    pub fn with_resource(
        mut self,
        path: impl AsRef<str>,
        bytes: impl Into<Cow<'static, [u8]>>,
    ) -> Self {
        self.resources
            .insert(normalize(path.as_ref()).to_string(), bytes.into());
        self
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches("classpath:").trim_start_matches('/')
}

#[async_trait]
impl Locator for JarLocator {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn is_caching_forced(&self) -> bool {
        true
    }

    fn location_for(&self, asset: &AssetDeclaration, _request: &RequestContext) -> String {
        normalize(raw_location(asset, Self::KIND)).to_string()
    }

    async fn content_for(
        &self,
        asset: &AssetDeclaration,
        _request: &RequestContext,
    ) -> DandelionResult<Vec<u8>> {
        let location = raw_location(asset, Self::KIND);
        self.resources
            .get(normalize(location))
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| {
                DandelionError::fetch(asset.to_log(), location, "no packaged resource at this path")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_resource() {
        let locator = JarLocator::new().with_resource("/js/lib.js", b"lib();".as_slice());
        let decl = AssetDeclaration::new("lib", "main").with_location("jar", "classpath:js/lib.js");

        assert_eq!(locator.location_for(&decl, &RequestContext::default()), "js/lib.js");
        let content = locator
            .content_for(&decl, &RequestContext::default())
            .await
            .unwrap();
        assert_eq!(content, b"lib();");
    }

    #[tokio::test]
    async fn unknown_resource_is_fetch_error() {
        let locator = JarLocator::new();
        let decl = AssetDeclaration::new("lib", "main").with_location("jar", "js/none.js");
        let err = locator
            .content_for(&decl, &RequestContext::default())
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
