//! Merging strategies
//!
//! `None` emits every asset on its own. `Dynamic` replaces all non-vendor
//! assets of a request with one synthetic asset whose store entry lists the
//! constituents; the merged content is assembled when the asset is served.

use crate::asset::{final_url, process_asset, ResolvedAsset};
use crate::asset::filter::partition_vendor;
use crate::context::AssetContext;
use crate::error::{DandelionError, DandelionResult};
use crate::locator::ApiLocator;
use crate::request::RequestContext;
use crate::storage::StoreEntry;
use crate::version::group_key_of;
use tracing::{debug, warn};

/// Name of every merged asset
pub const MERGED_ASSET_NAME: &str = "merged";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergingStrategy {
    #[default]
    None,
    Dynamic,
}

impl MergingStrategy {
    /// Strategy named in the configuration
    pub fn from_name(name: &str) -> DandelionResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "dynamic" => Ok(Self::Dynamic),
            _ => Err(DandelionError::UnknownMergingStrategy(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Dynamic => "dynamic",
        }
    }

    /// Final asset list of one request
    pub async fn apply(
        &self,
        context: &AssetContext,
        request: &RequestContext,
        assets: Vec<ResolvedAsset>,
    ) -> DandelionResult<Vec<ResolvedAsset>> {
        match self {
            Self::None => Ok(assets),
            Self::Dynamic => merge_group(context, request, assets).await,
        }
    }
}

/// Merge the non-vendor assets of `assets` into one.
///
/// Returns the vendor assets in order followed by the merged asset, which
/// takes its type from the first constituent.
pub async fn merge_group(
    context: &AssetContext,
    request: &RequestContext,
    assets: Vec<ResolvedAsset>,
) -> DandelionResult<Vec<ResolvedAsset>> {
    let (mut output, own) = partition_vendor(assets);

    let storage = context.storage();
    for asset in &own {
        if asset.location_kind.as_deref() == Some(ApiLocator::KIND) {
            // Inline content only exists for the current request
            process_asset(context, request, asset).await?;
        } else {
            storage.put(
                &asset.cache_key,
                StoreEntry::Single {
                    asset: asset.clone(),
                    content: None,
                },
            );
        }
    }

    let Some(first) = own.first() else {
        return Ok(output);
    };

    if own.iter().any(|a| a.asset_type != first.asset_type) {
        warn!(
            "Merging assets of different types, the merged asset is typed {}",
            first.asset_type
        );
    }

    let cache_key = group_key_of(request, &own);
    let version = context.versioner().group_version(&own);
    let merged = ResolvedAsset {
        name: MERGED_ASSET_NAME.to_string(),
        asset_type: first.asset_type,
        bundle: first.bundle.clone(),
        location_kind: None,
        location: None,
        final_url: final_url(
            &context.config().asset.url_prefix,
            &cache_key,
            MERGED_ASSET_NAME,
            &version,
            first.asset_type,
        ),
        cache_key,
        version,
        dom: first.dom,
        vendor: false,
        declaration: None,
    };

    debug!("Merged {} assets into {}", own.len(), merged.cache_key);
    storage.put(
        &merged.cache_key,
        StoreEntry::Merged {
            asset: merged.clone(),
            constituents: own,
        },
    );

    output.push(merged);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{map_asset, AssetDeclaration, AssetType};
    use crate::config::Config;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dynamic_context(root: &TempDir) -> AssetContext {
        let mut config = Config::default();
        config.asset.webapp_root = root.path().display().to_string();
        config.asset.merging = "dynamic".to_string();
        config.asset.locations_resolution_strategy = vec!["webapp".to_string()];
        AssetContext::new(config).unwrap()
    }

    async fn resolve(
        context: &AssetContext,
        request: &RequestContext,
        declarations: Vec<AssetDeclaration>,
    ) -> Vec<ResolvedAsset> {
        let mut assets = Vec::new();
        for decl in declarations {
            assets.push(map_asset(context, request, Arc::new(decl)).await.unwrap());
        }
        assets
    }

    fn scenario(root: &TempDir) -> Vec<AssetDeclaration> {
        std::fs::write(root.path().join("a.js"), "var a;").unwrap();
        std::fs::write(root.path().join("b.js"), "var b;").unwrap();
        vec![
            AssetDeclaration::new("A", "main")
                .with_type(AssetType::Js)
                .with_location("webapp", "a.js"),
            AssetDeclaration::new("B", "main")
                .with_type(AssetType::Js)
                .with_location("webapp", "b.js")
                .vendor(),
        ]
    }

    #[test]
    fn strategy_names() {
        assert_eq!(MergingStrategy::from_name("dynamic").unwrap(), MergingStrategy::Dynamic);
        assert_eq!(MergingStrategy::from_name("NONE").unwrap(), MergingStrategy::None);
        assert!(MergingStrategy::from_name("static").unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn vendor_passes_through_and_own_assets_merge() {
        let root = TempDir::new().unwrap();
        let context = dynamic_context(&root);
        let request = RequestContext::new("", "/");
        let assets = resolve(&context, &request, scenario(&root)).await;
        let a = assets[0].clone();

        let output = context.merging().apply(&context, &request, assets).await.unwrap();
        let names: Vec<_> = output.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B", MERGED_ASSET_NAME]);
        assert_eq!(output[0].final_url, "/b.js");

        let merged = &output[1];
        assert!(merged.is_merged());
        assert_eq!(merged.asset_type, AssetType::Js);
        assert!(merged.final_url.starts_with(&format!("/dandelion-assets/{}/merged-", merged.cache_key)));

        assert!(matches!(
            context.storage().get(&a.cache_key).as_deref(),
            Some(StoreEntry::Single { .. })
        ));
        match context.storage().get(&merged.cache_key).as_deref() {
            Some(StoreEntry::Merged { constituents, .. }) => {
                assert_eq!(constituents.len(), 1);
                assert_eq!(constituents[0].name, "A");
            }
            other => panic!("expected merged entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn vendor_never_in_merged_constituents() {
        let root = TempDir::new().unwrap();
        let context = dynamic_context(&root);
        let request = RequestContext::new("", "/");
        let mut assets = resolve(&context, &request, scenario(&root)).await;
        assets.reverse();

        let output = merge_group(&context, &request, assets).await.unwrap();
        let merged = output.last().unwrap();
        match context.storage().get(&merged.cache_key).as_deref() {
            Some(StoreEntry::Merged { constituents, .. }) => {
                assert!(constituents.iter().all(|c| !c.vendor));
            }
            other => panic!("expected merged entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_group_across_requests_shares_entry() {
        let root = TempDir::new().unwrap();
        let context = dynamic_context(&root);

        let first = RequestContext::new("", "/page1");
        let assets = resolve(&context, &first, scenario(&root)).await;
        let out1 = merge_group(&context, &first, assets).await.unwrap();
        let size = context.storage().len();

        let second = RequestContext::new("", "/page2");
        let assets = resolve(&context, &second, scenario(&root)).await;
        let out2 = merge_group(&context, &second, assets).await.unwrap();

        assert_eq!(out1.last().unwrap().cache_key, out2.last().unwrap().cache_key);
        assert_eq!(context.storage().len(), size);
    }

    #[tokio::test]
    async fn only_vendor_assets_create_no_merged_entry() {
        let root = TempDir::new().unwrap();
        let context = dynamic_context(&root);
        let request = RequestContext::new("", "/");
        let assets = resolve(&context, &request, scenario(&root)).await;
        let vendor: Vec<_> = assets.into_iter().filter(|a| a.vendor).collect();
        let size = context.storage().len();

        let output = merge_group(&context, &request, vendor).await.unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(context.storage().len(), size);
    }

    #[tokio::test]
    async fn mixed_types_merge_into_one_after_vendor() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("a.js"), "var a;").unwrap();
        std::fs::write(root.path().join("v.css"), "v{}").unwrap();
        std::fs::write(root.path().join("s.css"), "s{}").unwrap();
        let context = dynamic_context(&root);
        let request = RequestContext::new("", "/");

        let declarations = vec![
            AssetDeclaration::new("A", "main").with_location("webapp", "a.js"),
            AssetDeclaration::new("V", "main").with_location("webapp", "v.css").vendor(),
            AssetDeclaration::new("S", "main").with_location("webapp", "s.css"),
        ];
        let assets = resolve(&context, &request, declarations).await;
        let size = context.storage().len();

        let output = context.merging().apply(&context, &request, assets).await.unwrap();
        let summary: Vec<_> = output.iter().map(|a| (a.name.as_str(), a.asset_type)).collect();
        assert_eq!(
            summary,
            vec![("V", AssetType::Css), (MERGED_ASSET_NAME, AssetType::Js)]
        );

        match context.storage().get(&output[1].cache_key).as_deref() {
            Some(StoreEntry::Merged { constituents, .. }) => {
                let names: Vec<_> = constituents.iter().map(|c| c.name.as_str()).collect();
                assert_eq!(names, vec!["A", "S"]);
            }
            other => panic!("expected merged entry, got {other:?}"),
        }
        assert_eq!(context.storage().len(), size + 1);
    }

    #[tokio::test]
    async fn api_assets_fetched_eagerly() {
        let root = TempDir::new().unwrap();
        let mut config = Config::default();
        config.asset.webapp_root = root.path().display().to_string();
        config.asset.merging = "dynamic".to_string();
        let context = AssetContext::new(config).unwrap();
        let request = RequestContext::new("", "/").with_inline_content("init", "start();");

        let decl = AssetDeclaration::new("init", "main")
            .with_type(AssetType::Js)
            .with_location("api", "init");
        let assets = resolve(&context, &request, vec![decl]).await;
        let key = assets[0].cache_key.clone();
        context.storage().clear();

        merge_group(&context, &request, assets).await.unwrap();
        assert_eq!(context.storage().content(&key).as_deref(), Some("start();"));
    }
}
