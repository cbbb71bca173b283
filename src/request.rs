//! Per-request information handed to locators and processors

use std::collections::HashMap;

/// Request-scoped inputs of one rendering pass
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    context_path: String,
    request_uri: String,
    inline_contents: HashMap<String, String>,
}

impl RequestContext {
    /// Create a request context for an application mounted at `context_path`
    pub fn new(context_path: impl Into<String>, request_uri: impl Into<String>) -> Self {
        let context_path = context_path.into();
        Self {
            context_path: context_path.trim_end_matches('/').to_string(),
            request_uri: request_uri.into(),
            inline_contents: HashMap::new(),
        }
    }

    /// Attach inline content served by the `api` locator for the named asset
    pub fn with_inline_content(mut self, asset: impl Into<String>, content: impl Into<String>) -> Self {
        self.inline_contents.insert(asset.into(), content.into());
        self
    }

    /// Application context path without trailing slash (empty for root)
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// URI of the page being rendered
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// Inline content registered for an asset name
    pub fn inline_content(&self, asset: &str) -> Option<&str> {
        self.inline_contents.get(asset).map(String::as_str)
    }

    /// Scope component of cache keys: assets are shared by every request of an application
    pub fn cache_scope(&self) -> &str {
        &self.context_path
    }

    /// Prefix a root-relative path with the context path
    pub fn absolute_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.context_path, path)
        } else {
            format!("{}/{}", self.context_path, path)
        }
    }
}
