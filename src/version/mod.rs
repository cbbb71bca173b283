//! Asset versions and cache keys
//!
//! Versions resolve in priority order:
//! 1. The version declared on the asset
//! 2. The active strategy, when auto-versioning is enabled
//! 3. `UNDEFINED_VERSION`, so a missing setting shows up in generated URLs
//!
//! Cache keys do not depend on versions: they are derived from the asset's
//! identity before any content is fetched.

pub mod strategy;

pub use strategy::{short_hash, VersioningStrategy};

use crate::asset::{AssetType, ResolvedAsset, UNDEFINED_VERSION};
use crate::locator::ApiLocator;
use crate::request::RequestContext;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Computes asset and group versions
#[derive(Debug, Clone)]
pub struct Versioner {
    auto: bool,
    strategy: VersioningStrategy,
}

impl Versioner {
    /// Create a versioner; `auto` enables the strategy
    pub fn new(auto: bool, strategy: VersioningStrategy) -> Self {
        Self { auto, strategy }
    }

    /// Whether auto-versioning is enabled
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Whether versioning this asset requires its content
    pub fn needs_content(&self) -> bool {
        self.auto && self.strategy.needs_content()
    }

    /// Version of a single asset
    pub fn version_of(&self, explicit: Option<&str>, content: Option<&[u8]>) -> String {
        if let Some(version) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
            return version.to_string();
        }

        if !self.auto {
            return UNDEFINED_VERSION.to_string();
        }

        match (&self.strategy, content) {
            (VersioningStrategy::Fixed(value), _) => value.clone(),
            (VersioningStrategy::Content, Some(bytes)) => short_hash(bytes),
            (VersioningStrategy::Content, None) => {
                warn!("Content versioning requested without fetched content");
                UNDEFINED_VERSION.to_string()
            }
        }
    }

    /// Version of a merged group, derived from its constituents' versions
    pub fn group_version(&self, constituents: &[ResolvedAsset]) -> String {
        if !self.auto {
            return UNDEFINED_VERSION.to_string();
        }

        match &self.strategy {
            VersioningStrategy::Fixed(value) => value.clone(),
            VersioningStrategy::Content => {
                let mut hasher = Sha256::new();
                for asset in constituents {
                    hasher.update(asset.cache_key.as_bytes());
                    hasher.update(b":");
                    hasher.update(asset.version.as_bytes());
                    hasher.update(b"\n");
                }
                hex::encode(&hasher.finalize()[..6])
            }
        }
    }
}

/// Cache key of one asset: request scope, bundle, name, type and location kind
///
/// `api` contents belong to the rendered page, so their keys are also scoped
/// by the request URI.
pub fn cache_key_of(
    request: &RequestContext,
    name: &str,
    bundle: &str,
    asset_type: AssetType,
    location_kind: &str,
) -> String {
    let scope = if location_kind == ApiLocator::KIND {
        format!("{}|{}", request.cache_scope(), request.request_uri())
    } else {
        request.cache_scope().to_string()
    };
    let identity = format!(
        "{}|{}|{}|{}|{}",
        scope,
        bundle,
        name,
        asset_type,
        location_kind
    );
    short_hash(identity.as_bytes())
}

/// Cache key of a merge group: request scope plus each constituent's key, in order
pub fn group_key_of(request: &RequestContext, constituents: &[ResolvedAsset]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.cache_scope().as_bytes());
    for asset in constituents {
        hasher.update(b"|");
        hasher.update(asset.cache_key.as_bytes());
    }
    hex::encode(&hasher.finalize()[..6])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::DomPosition;

    fn resolved(name: &str, key: &str, version: &str) -> ResolvedAsset {
        ResolvedAsset {
            name: name.to_string(),
            asset_type: AssetType::Js,
            bundle: "b".to_string(),
            location_kind: Some("webapp".to_string()),
            location: Some(format!("/{name}.js")),
            cache_key: key.to_string(),
            version: version.to_string(),
            final_url: String::new(),
            dom: DomPosition::Body,
            vendor: false,
            declaration: None,
        }
    }

    #[test]
    fn explicit_version_wins_over_auto() {
        let versioner = Versioner::new(true, VersioningStrategy::Content);
        assert_eq!(versioner.version_of(Some("1.2.3"), Some(b"x")), "1.2.3");

        let versioner = Versioner::new(true, VersioningStrategy::Fixed("f".to_string()));
        assert_eq!(versioner.version_of(Some("1.2.3"), None), "1.2.3");
    }

    #[test]
    fn disabled_auto_yields_undefined() {
        let versioner = Versioner::new(false, VersioningStrategy::Content);
        assert_eq!(versioner.version_of(None, Some(b"x")), "UNDEFINED_VERSION");
        assert_eq!(versioner.version_of(Some(""), None), "UNDEFINED_VERSION");
    }

    #[test]
    fn content_version_tracks_content() {
        let versioner = Versioner::new(true, VersioningStrategy::Content);
        let v1 = versioner.version_of(None, Some(b"var a;"));
        let v2 = versioner.version_of(None, Some(b"var b;"));
        assert_ne!(v1, v2);
        assert_eq!(v1, short_hash(b"var a;"));
    }

    #[test]
    fn fixed_version_needs_no_content() {
        let versioner = Versioner::new(true, VersioningStrategy::Fixed("2024".to_string()));
        assert!(!versioner.needs_content());
        assert_eq!(versioner.version_of(None, None), "2024");
    }

    #[test]
    fn cache_key_ignores_request_uri() {
        let r1 = RequestContext::new("/app", "/app/page1");
        let r2 = RequestContext::new("/app", "/app/page2");
        assert_eq!(
            cache_key_of(&r1, "a", "b", AssetType::Js, "webapp"),
            cache_key_of(&r2, "a", "b", AssetType::Js, "webapp")
        );
    }

    #[test]
    fn api_cache_key_scoped_by_page() {
        let r1 = RequestContext::new("/app", "/app/page1");
        let r2 = RequestContext::new("/app", "/app/page2");
        assert_ne!(
            cache_key_of(&r1, "init", "b", AssetType::Js, "api"),
            cache_key_of(&r2, "init", "b", AssetType::Js, "api")
        );
    }

    #[test]
    fn cache_key_depends_on_identity() {
        let request = RequestContext::new("/app", "/");
        let key = cache_key_of(&request, "a", "b", AssetType::Js, "webapp");
        assert_ne!(key, cache_key_of(&request, "a", "b", AssetType::Js, "cdn"));
        assert_ne!(key, cache_key_of(&request, "a", "c", AssetType::Js, "webapp"));
        assert_ne!(key, cache_key_of(&request, "a", "b", AssetType::Css, "webapp"));
        assert_ne!(
            key,
            cache_key_of(&RequestContext::new("/other", "/"), "a", "b", AssetType::Js, "webapp")
        );
    }

    #[test]
    fn group_key_deterministic() {
        let request = RequestContext::new("/app", "/");
        let group = vec![resolved("a", "k1", "v"), resolved("b", "k2", "v")];
        assert_eq!(group_key_of(&request, &group), group_key_of(&request, &group));

        let other = vec![resolved("a", "k1", "v")];
        assert_ne!(group_key_of(&request, &group), group_key_of(&request, &other));
    }

    #[test]
    fn group_version_changes_with_constituents() {
        let versioner = Versioner::new(true, VersioningStrategy::Content);
        let v1 = versioner.group_version(&[resolved("a", "k1", "v1")]);
        let v2 = versioner.group_version(&[resolved("a", "k1", "v2")]);
        assert_ne!(v1, v2);

        let versioner = Versioner::new(false, VersioningStrategy::Content);
        assert_eq!(versioner.group_version(&[resolved("a", "k1", "v1")]), UNDEFINED_VERSION);
    }
}
