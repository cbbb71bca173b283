//! Location resolution
//!
//! Picks which of an asset's candidate locations is used:
//! 1. A single candidate is always selected, whatever the priority list says
//! 2. Otherwise the first kind of the priority list with a non-empty location wins
//! 3. The selected kind must be registered in the locator registry

use crate::asset::AssetDeclaration;
use crate::error::{DandelionError, DandelionResult};
use crate::locator::LocatorRegistry;
use tracing::trace;

/// Select the location kind to use for `asset`
pub fn resolve_location_kind<'a>(
    asset: &'a AssetDeclaration,
    priority: &[String],
    registry: &LocatorRegistry,
) -> DandelionResult<&'a str> {
    trace!("Resolving location for the asset {}", asset.to_log());

    let mut candidates = asset.locations.iter();
    let kind = match (candidates.next(), candidates.next()) {
        (None, _) => {
            return Err(DandelionError::NoLocationConfigured {
                asset: asset.effective_name(),
                bundle: asset.bundle.clone(),
            })
        }
        (Some((kind, _)), None) => kind.as_str(),
        _ => select_by_priority(asset, priority)?,
    };

    if !registry.contains(kind) {
        return Err(DandelionError::UnknownLocationKind {
            kind: kind.to_string(),
            asset: asset.effective_name(),
            bundle: asset.bundle.clone(),
            valid: registry.kinds().join(", "),
        });
    }

    trace!("Location key '{}' selected for the asset {}", kind, asset.to_log());
    Ok(kind)
}

fn select_by_priority<'a>(
    asset: &'a AssetDeclaration,
    priority: &[String],
) -> DandelionResult<&'a str> {
    for wanted in priority {
        if let Some((kind, location)) = asset.locations.get_key_value(wanted.as_str()) {
            if !location.trim().is_empty() {
                return Ok(kind.as_str());
            }
        }
    }

    Err(DandelionError::NoResolvableLocation {
        asset: asset.effective_name(),
        bundle: asset.bundle.clone(),
        searched: priority.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn registry() -> LocatorRegistry {
        LocatorRegistry::standard(&Config::default())
    }

    fn priority(kinds: &[&str]) -> Vec<String> {
        kinds.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn single_candidate_ignores_priority() {
        let decl = AssetDeclaration::new("a", "b").with_location("cdn", "//x/a.js");

        assert_eq!(resolve_location_kind(&decl, &[], &registry()).unwrap(), "cdn");
        assert_eq!(
            resolve_location_kind(&decl, &priority(&["webapp"]), &registry()).unwrap(),
            "cdn"
        );
    }

    #[test]
    fn first_priority_match_wins() {
        let decl = AssetDeclaration::new("a", "b")
            .with_location("cdn", "x.js")
            .with_location("jar", "y.js");

        let kind =
            resolve_location_kind(&decl, &priority(&["webapp", "jar", "cdn"]), &registry())
                .unwrap();
        assert_eq!(kind, "jar");
    }

    #[test]
    fn empty_location_is_skipped() {
        let decl = AssetDeclaration::new("a", "b")
            .with_location("webapp", "")
            .with_location("cdn", "x.js");

        let kind =
            resolve_location_kind(&decl, &priority(&["webapp", "cdn"]), &registry()).unwrap();
        assert_eq!(kind, "cdn");
    }

    #[test]
    fn no_location_is_fatal() {
        let decl = AssetDeclaration::new("a", "b");
        let err = resolve_location_kind(&decl, &priority(&["webapp"]), &registry()).unwrap_err();
        assert!(matches!(err, DandelionError::NoLocationConfigured { .. }));
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn unmatched_priority_is_fatal() {
        let decl = AssetDeclaration::new("a", "b")
            .with_location("cdn", "x.js")
            .with_location("jar", "y.js");
        let err = resolve_location_kind(&decl, &priority(&["webapp"]), &registry()).unwrap_err();
        assert!(matches!(err, DandelionError::NoResolvableLocation { .. }));
    }

    #[test]
    fn unregistered_kind_lists_valid_kinds() {
        let decl = AssetDeclaration::new("a", "b").with_location("webjar", "x.js");
        let err = resolve_location_kind(&decl, &[], &registry()).unwrap_err();
        match err {
            DandelionError::UnknownLocationKind { kind, valid, .. } => {
                assert_eq!(kind, "webjar");
                assert_eq!(valid, "api, cdn, jar, webapp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
