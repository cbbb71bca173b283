//! Asset list filters

use super::{AssetDeclaration, AssetType, DomPosition, ResolvedAsset};
use crate::config::schema::AssetConfig;
use std::sync::Arc;

/// Declarations of the given types
pub fn filter_by_type(
    declarations: &[Arc<AssetDeclaration>],
    types: &[AssetType],
) -> Vec<Arc<AssetDeclaration>> {
    declarations
        .iter()
        .filter(|d| d.effective_type().is_some_and(|t| types.contains(&t)))
        .cloned()
        .collect()
}

/// Drop declarations listed in `js_excludes` / `css_excludes` (names compared lower-cased)
pub fn filter_excluded(
    declarations: &[Arc<AssetDeclaration>],
    config: &AssetConfig,
) -> Vec<Arc<AssetDeclaration>> {
    fn excluded(names: &[String], name: &str) -> bool {
        names.iter().any(|n| n.trim().to_lowercase() == name)
    }

    declarations
        .iter()
        .filter(|d| {
            let name = d.effective_name().to_lowercase();
            match d.effective_type() {
                Some(AssetType::Js) => !excluded(&config.js_excludes, &name),
                Some(AssetType::Css) => !excluded(&config.css_excludes, &name),
                _ => true,
            }
        })
        .cloned()
        .collect()
}

/// Assets rendered at `dom`: everything but scripts first, then scripts
pub fn filter_by_dom_position(assets: &[ResolvedAsset], dom: DomPosition) -> Vec<ResolvedAsset> {
    let (scripts, others): (Vec<_>, Vec<_>) = assets
        .iter()
        .filter(|a| a.dom == dom)
        .cloned()
        .partition(|a| a.asset_type == AssetType::Js);
    others.into_iter().chain(scripts).collect()
}

/// Split assets into (vendor, own), keeping relative order
pub fn partition_vendor(assets: Vec<ResolvedAsset>) -> (Vec<ResolvedAsset>, Vec<ResolvedAsset>) {
    assets.into_iter().partition(|a| a.vendor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(name: &str, location: &str) -> Arc<AssetDeclaration> {
        Arc::new(AssetDeclaration::new(name, "b").with_location("webapp", location))
    }

    fn resolved(name: &str, asset_type: AssetType, dom: DomPosition, vendor: bool) -> ResolvedAsset {
        ResolvedAsset {
            name: name.to_string(),
            asset_type,
            bundle: "b".to_string(),
            location_kind: None,
            location: None,
            cache_key: name.to_string(),
            version: "v".to_string(),
            final_url: String::new(),
            dom,
            vendor,
            declaration: None,
        }
    }

    #[test]
    fn excludes_by_name_and_type() {
        let config = AssetConfig {
            js_excludes: vec!["JQuery".to_string()],
            ..AssetConfig::default()
        };
        let declarations = vec![decl("jquery", "/jquery.js"), decl("jquery", "/jquery.css"), decl("app", "/app.js")];

        let kept = filter_excluded(&declarations, &config);
        let names: Vec<_> = kept.iter().map(|d| d.location("webapp").unwrap()).collect();
        assert_eq!(names, vec!["/jquery.css", "/app.js"]);
    }

    #[test]
    fn filters_by_type() {
        let declarations = vec![decl("a", "/a.js"), decl("b", "/b.css"), decl("c", "/c.png")];
        let kept = filter_by_type(&declarations, &[AssetType::Css, AssetType::Img]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn scripts_last_in_dom_position() {
        let assets = vec![
            resolved("a", AssetType::Js, DomPosition::Head, false),
            resolved("b", AssetType::Css, DomPosition::Head, false),
            resolved("c", AssetType::Js, DomPosition::Body, false),
            resolved("d", AssetType::Img, DomPosition::Head, false),
        ];
        let head: Vec<_> = filter_by_dom_position(&assets, DomPosition::Head)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(head, vec!["b", "d", "a"]);
    }

    #[test]
    fn vendor_partition_keeps_order() {
        let assets = vec![
            resolved("a", AssetType::Js, DomPosition::Body, true),
            resolved("b", AssetType::Js, DomPosition::Body, false),
            resolved("c", AssetType::Js, DomPosition::Body, true),
        ];
        let (vendor, own) = partition_vendor(assets);
        assert_eq!(vendor.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(own[0].name, "b");
    }
}
