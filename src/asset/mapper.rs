//! Maps declarations to resolved assets
//!
//! For one declaration: resolve the location kind, derive the cache key, then
//! either reuse the stored entry or fetch, version and process the content.

use super::{
    final_url, name_from_location, AssetDeclaration, AssetType, ResolvedAsset, UNDEFINED_VERSION,
};
use crate::context::AssetContext;
use crate::error::{DandelionError, DandelionResult};
use crate::locator::{ApiLocator, Locator};
use crate::processor::ProcessingContext;
use crate::request::RequestContext;
use crate::resolve::resolve_location_kind;
use crate::storage::StoreEntry;
use crate::version::cache_key_of;
use std::sync::Arc;
use tracing::debug;

/// Resolve one declaration for the current request
pub async fn map_asset(
    context: &AssetContext,
    request: &RequestContext,
    declaration: Arc<AssetDeclaration>,
) -> DandelionResult<ResolvedAsset> {
    let config = &context.config().asset;
    let kind = resolve_location_kind(
        &declaration,
        &config.locations_resolution_strategy,
        context.locators(),
    )?;
    let locator = locator_for(context, &declaration, kind)?;

    let raw = declaration.location(kind).unwrap_or_default();
    let location = if locator.is_active() {
        locator.location_for(&declaration, request)
    } else {
        raw.to_string()
    };

    let name = match declaration.name.trim() {
        "" => name_from_location(raw),
        name => name.to_string(),
    };
    let asset_type = declaration
        .asset_type
        .or_else(|| AssetType::type_of(raw))
        .ok_or_else(|| DandelionError::UnknownAssetType {
            asset: declaration.to_log(),
            location: raw.to_string(),
        })?;

    let cache_key = cache_key_of(request, &name, &declaration.bundle, asset_type, kind);
    let explicit = declaration.explicit_version();
    let mut asset = ResolvedAsset {
        name,
        asset_type,
        bundle: declaration.bundle.clone(),
        location_kind: Some(kind.to_string()),
        location: Some(raw.to_string()),
        cache_key,
        version: UNDEFINED_VERSION.to_string(),
        final_url: location.clone(),
        dom: declaration.dom.unwrap_or_else(|| asset_type.default_dom()),
        vendor: declaration.vendor,
        declaration: Some(Arc::clone(&declaration)),
    };

    if asset.vendor {
        asset.version = explicit.unwrap_or(UNDEFINED_VERSION).to_string();
        return Ok(asset);
    }

    let versioner = context.versioner();

    // Images are linked where they live; only their version may need the bytes
    if asset_type == AssetType::Img {
        let content = if explicit.is_none() && versioner.needs_content() {
            Some(locator.content_for(&declaration, request).await?)
        } else {
            None
        };
        asset.version = versioner.version_of(explicit, content.as_deref());
        return Ok(asset);
    }

    let caching = config.caching || locator.is_caching_forced();
    if !(versioner.is_auto() || caching || config.minification) {
        asset.version = versioner.version_of(explicit, None);
        return Ok(asset);
    }

    // Inline contents are captured again on every request
    if caching && kind != ApiLocator::KIND {
        if let Some(entry) = context.storage().get(&asset.cache_key) {
            if let StoreEntry::Single {
                asset: stored,
                content: Some(_),
            } = entry.as_ref()
            {
                debug!("Cache hit for {}", stored.to_log());
                return Ok(stored.clone());
            }
        }
    }

    debug!("Fetching {} from {}", asset.to_log(), kind);
    let raw_content = locator.content_for(&declaration, request).await?;
    asset.version = versioner.version_of(explicit, Some(&raw_content));
    asset.final_url = final_url(
        &config.url_prefix,
        &asset.cache_key,
        &asset.name,
        &asset.version,
        asset.asset_type,
    );

    let processing = ProcessingContext {
        asset: &asset,
        request,
        location: &location,
    };
    context
        .pipeline()
        .process(&raw_content, &processing, context.storage().as_ref())?;

    Ok(asset)
}

/// Fetch and process the content of an already resolved asset, overwriting its entry
pub async fn process_asset(
    context: &AssetContext,
    request: &RequestContext,
    asset: &ResolvedAsset,
) -> DandelionResult<String> {
    let (Some(declaration), Some(kind)) = (&asset.declaration, &asset.location_kind) else {
        return Err(DandelionError::Internal(format!(
            "{} has no source location",
            asset.to_log()
        )));
    };
    let locator = locator_for(context, declaration, kind)?;

    let raw = locator.content_for(declaration, request).await?;
    let location = locator.location_for(declaration, request);
    let processing = ProcessingContext {
        asset,
        request,
        location: &location,
    };
    context
        .pipeline()
        .process(&raw, &processing, context.storage().as_ref())
}

fn locator_for<'a>(
    context: &'a AssetContext,
    declaration: &AssetDeclaration,
    kind: &str,
) -> DandelionResult<&'a Arc<dyn Locator>> {
    context
        .locators()
        .get(kind)
        .ok_or_else(|| DandelionError::UnknownLocationKind {
            kind: kind.to_string(),
            asset: declaration.effective_name(),
            bundle: declaration.bundle.clone(),
            valid: context.locators().kinds().join(", "),
        })
}
