//! Entry points used by the rendering and serving layers

use crate::asset::filter::filter_excluded;
use crate::asset::{map_asset, process_asset, AssetCatalog, AssetDeclaration, ResolvedAsset};
use crate::context::AssetContext;
use crate::error::{DandelionError, DandelionResult};
use crate::request::RequestContext;
use crate::storage::StoreEntry;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::debug;

/// Final ordered asset list for a set of declarations.
///
/// Declarations are mapped concurrently; the first failure aborts the whole
/// list so a misconfigured asset is never silently dropped.
pub async fn assets_for(
    context: &AssetContext,
    request: &RequestContext,
    declarations: &[Arc<AssetDeclaration>],
) -> DandelionResult<Vec<ResolvedAsset>> {
    let declarations = filter_excluded(declarations, &context.config().asset);
    let assets = try_join_all(
        declarations
            .into_iter()
            .map(|declaration| map_asset(context, request, declaration)),
    )
    .await?;

    debug!("Resolved {} assets for {}", assets.len(), request.request_uri());
    context.merging().apply(context, request, assets).await
}

/// Final ordered asset list for catalog scopes
pub async fn assets_for_scopes(
    context: &AssetContext,
    request: &RequestContext,
    catalog: &AssetCatalog,
    scopes: &[&str],
) -> DandelionResult<Vec<ResolvedAsset>> {
    let declarations = catalog.assets_for(scopes)?;
    assets_for(context, request, &declarations).await
}

/// Content served for a store key
pub async fn content_for(
    context: &AssetContext,
    request: &RequestContext,
    cache_key: &str,
) -> DandelionResult<String> {
    let entry = context
        .storage()
        .get(cache_key)
        .ok_or_else(|| DandelionError::EntryNotFound(cache_key.to_string()))?;

    match entry.as_ref() {
        StoreEntry::Single { asset, content } => match content {
            Some(content) => Ok(content.clone()),
            None => process_asset(context, request, asset).await,
        },
        StoreEntry::Merged { constituents, .. } => {
            let mut parts = Vec::with_capacity(constituents.len());
            for asset in constituents {
                parts.push(constituent_content(context, request, asset).await?);
            }
            Ok(parts.join("\n"))
        }
    }
}

async fn constituent_content(
    context: &AssetContext,
    request: &RequestContext,
    asset: &ResolvedAsset,
) -> DandelionResult<String> {
    if let Some(content) = context.storage().content(&asset.cache_key) {
        return Ok(content);
    }
    process_asset(context, request, asset).await
}
