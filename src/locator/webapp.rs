//! Locator for files of the web application itself

use super::{raw_location, Locator};
use crate::asset::AssetDeclaration;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Serves `webapp` locations: paths relative to the application root
#[derive(Debug, Clone)]
pub struct WebappLocator {
    root: PathBuf,
}

impl WebappLocator {
    pub const KIND: &'static str = "webapp";

    /// Create a locator reading from `root`
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a location against the root, rejecting traversal outside it
    fn file_path(&self, location: &str) -> Option<PathBuf> {
        let path = location.split(['?', '#']).next().unwrap_or(location);
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl Locator for WebappLocator {
    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn location_for(&self, asset: &AssetDeclaration, request: &RequestContext) -> String {
        request.absolute_path(raw_location(asset, Self::KIND))
    }

    async fn content_for(
        &self,
        asset: &AssetDeclaration,
        _request: &RequestContext,
    ) -> DandelionResult<Vec<u8>> {
        let location = raw_location(asset, Self::KIND);
        let path = self.file_path(location).ok_or_else(|| {
            DandelionError::fetch(asset.to_log(), location, "location escapes the webapp root")
        })?;

        debug!("Reading {} from {}", asset.to_log(), path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| DandelionError::fetch(asset.to_log(), path.display().to_string(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn declaration(location: &str) -> AssetDeclaration {
        AssetDeclaration::new("app", "main").with_location("webapp", location)
    }

    #[test]
    fn location_prefixed_with_context_path() {
        let locator = WebappLocator::new(PathBuf::from("."));
        let request = RequestContext::new("/shop", "/shop/");
        assert_eq!(
            locator.location_for(&declaration("/js/app.js"), &request),
            "/shop/js/app.js"
        );
    }

    #[tokio::test]
    async fn reads_file_under_root() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("js")).unwrap();
        std::fs::write(temp.path().join("js/app.js"), "var a = 1;").unwrap();

        let locator = WebappLocator::new(temp.path().to_path_buf());
        let content = locator
            .content_for(&declaration("/js/app.js?v=3"), &RequestContext::default())
            .await
            .unwrap();
        assert_eq!(content, b"var a = 1;");
    }

    #[tokio::test]
    async fn missing_file_is_fetch_error() {
        let temp = TempDir::new().unwrap();
        let locator = WebappLocator::new(temp.path().to_path_buf());
        let err = locator
            .content_for(&declaration("/js/missing.js"), &RequestContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DandelionError::Fetch { .. }));
    }

    #[tokio::test]
    async fn rejects_traversal() {
        let temp = TempDir::new().unwrap();
        let locator = WebappLocator::new(temp.path().to_path_buf());
        let err = locator
            .content_for(&declaration("/../etc/passwd"), &RequestContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("escapes"));
    }
}
