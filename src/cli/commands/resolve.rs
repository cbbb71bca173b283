//! Resolve command - print the assets a page of the given scopes would reference

use crate::asset::filter::{filter_by_dom_position, filter_by_type};
use crate::asset::{AssetCatalog, DomPosition, ResolvedAsset};
use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::context::AssetContext;
use crate::error::DandelionResult;
use crate::pipeline::{assets_for, content_for};
use crate::request::RequestContext;
use console::style;
use serde::Serialize;

/// Serializable view of a resolved asset
#[derive(Debug, Serialize)]
struct AssetRow<'a> {
    name: &'a str,
    bundle: &'a str,
    #[serde(rename = "type")]
    asset_type: String,
    dom: String,
    version: &'a str,
    url: &'a str,
    vendor: bool,
    merged: bool,
}

impl<'a> From<&'a ResolvedAsset> for AssetRow<'a> {
    fn from(asset: &'a ResolvedAsset) -> Self {
        Self {
            name: &asset.name,
            bundle: &asset.bundle,
            asset_type: asset.asset_type.to_string(),
            dom: asset.dom.to_string(),
            version: &asset.version,
            url: &asset.final_url,
            vendor: asset.vendor,
            merged: asset.is_merged(),
        }
    }
}

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> DandelionResult<()> {
    let catalog = AssetCatalog::load(&args.bundles).await?;

    let mut config = config.clone();
    if let Some(root) = &args.webapp_root {
        config.asset.webapp_root = root.display().to_string();
    }
    let context = AssetContext::new(config)?;
    let request = RequestContext::new(args.context_path.as_str(), args.uri.as_str());

    let scopes: Vec<&str> = args.scopes.iter().map(String::as_str).collect();
    let mut declarations = catalog.assets_for(&scopes)?;
    if !args.types.is_empty() {
        declarations = filter_by_type(&declarations, &args.types);
    }

    let assets = assets_for(&context, &request, &declarations).await?;

    match args.format {
        OutputFormat::Table => print_table(&assets),
        OutputFormat::Json => print_json(&assets)?,
        OutputFormat::Plain => print_plain(&assets),
    }

    if args.content {
        print_contents(&context, &request, &assets).await?;
    }

    Ok(())
}

fn print_table(assets: &[ResolvedAsset]) {
    for dom in [DomPosition::Head, DomPosition::Body] {
        let section = filter_by_dom_position(assets, dom);
        if section.is_empty() {
            continue;
        }

        println!("{}", style(format!("<{dom}>")).bold());
        println!(
            "  {:<20} {:<5} {:<18} {}",
            style("NAME").bold(),
            style("TYPE").bold(),
            style("VERSION").bold(),
            style("URL").bold()
        );
        for asset in &section {
            let name = if asset.vendor {
                style(asset.name.clone()).dim()
            } else if asset.is_merged() {
                style(asset.name.clone()).cyan()
            } else {
                style(asset.name.clone())
            };
            println!(
                "  {:<20} {:<5} {:<18} {}",
                name, asset.asset_type, asset.version, asset.final_url
            );
        }
    }

    println!();
    println!("{} asset(s)", assets.len());
}

fn print_json(assets: &[ResolvedAsset]) -> DandelionResult<()> {
    let rows: Vec<AssetRow<'_>> = assets.iter().map(AssetRow::from).collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn print_plain(assets: &[ResolvedAsset]) {
    for asset in assets {
        println!("{}", asset.final_url);
    }
}

async fn print_contents(
    context: &AssetContext,
    request: &RequestContext,
    assets: &[ResolvedAsset],
) -> DandelionResult<()> {
    for asset in assets {
        if context.storage().get(&asset.cache_key).is_none() {
            continue;
        }
        let content = content_for(context, request, &asset.cache_key).await?;
        println!();
        println!("{}", style(format!("// {}", asset.final_url)).dim());
        println!("{content}");
    }
    Ok(())
}
