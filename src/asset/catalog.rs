//! Scoped catalog of asset declarations
//!
//! Each bundle is a scope; a scope may name a parent scope whose assets are
//! included before its own. Bundle files are TOML:
//!
//! ```toml
//! [[scope]]
//! name = "app"
//! parent = "jquery"
//!
//! [[asset]]
//! name = "app"
//! bundle = "app"
//! [asset.locations]
//! webapp = "/js/app.js"
//! ```

use super::{AssetDeclaration, AssetType};
use crate::error::{DandelionError, DandelionResult};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// A named group of declarations
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub name: String,
    pub parent: Option<String>,
    pub assets: Vec<Arc<AssetDeclaration>>,
}

impl Scope {
    fn contains(&self, name: &str, asset_type: Option<AssetType>) -> bool {
        self.assets
            .iter()
            .any(|a| a.effective_name() == name && a.effective_type() == asset_type)
    }
}

#[derive(Debug, Deserialize)]
struct ScopeDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BundleFile {
    #[serde(default)]
    scope: Vec<ScopeDef>,
    #[serde(default)]
    asset: Vec<AssetDeclaration>,
}

/// All declarations known to the application, by scope
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    scopes: BTreeMap<String, Scope>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty scope, or set the parent of an existing one
    pub fn add_scope(&mut self, name: &str, parent: Option<&str>) {
        let scope = self.scopes.entry(name.to_string()).or_insert_with(|| Scope {
            name: name.to_string(),
            ..Scope::default()
        });
        if parent.is_some() {
            scope.parent = parent.map(str::to_string);
        }
    }

    /// Add a declaration to a scope; a scope holds one asset per name and type
    pub fn add_asset(&mut self, scope: &str, asset: AssetDeclaration) -> DandelionResult<()> {
        let target = self
            .scopes
            .get_mut(scope)
            .ok_or_else(|| DandelionError::ScopeNotFound(scope.to_string()))?;

        let name = asset.effective_name();
        if target.contains(&name, asset.effective_type()) {
            return Err(DandelionError::AssetAlreadyExistsInScope {
                asset: name,
                scope: scope.to_string(),
            });
        }
        target.assets.push(Arc::new(asset));
        Ok(())
    }

    pub fn scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.get(name)
    }

    pub fn scope_names(&self) -> Vec<&str> {
        self.scopes.keys().map(String::as_str).collect()
    }

    /// Declarations of `scopes` and their ancestors, ancestors first.
    ///
    /// An asset redeclared by a descendant scope replaces the ancestor's
    /// declaration in place.
    pub fn assets_for(&self, scopes: &[&str]) -> DandelionResult<Vec<Arc<AssetDeclaration>>> {
        let mut result: Vec<Arc<AssetDeclaration>> = Vec::new();
        let mut visited = HashSet::new();

        for &name in scopes {
            for scope in self.ancestry(name)? {
                if !visited.insert(scope.name.as_str()) {
                    continue;
                }
                for asset in &scope.assets {
                    let identity = (asset.effective_name(), asset.effective_type());
                    match result
                        .iter_mut()
                        .find(|a| (a.effective_name(), a.effective_type()) == identity)
                    {
                        Some(existing) => *existing = Arc::clone(asset),
                        None => result.push(Arc::clone(asset)),
                    }
                }
            }
        }

        Ok(result)
    }

    /// `name` and its ancestors, root first
    fn ancestry(&self, name: &str) -> DandelionResult<Vec<&Scope>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name);

        while let Some(scope_name) = current {
            if !seen.insert(scope_name) {
                warn!("Scope cycle detected at {}", scope_name);
                break;
            }
            let scope = self
                .scopes
                .get(scope_name)
                .ok_or_else(|| DandelionError::ScopeNotFound(scope_name.to_string()))?;
            chain.push(scope);
            current = scope.parent.as_deref();
        }

        chain.reverse();
        Ok(chain)
    }

    /// Parse a TOML bundle file; every asset's bundle becomes a scope
    pub fn from_toml_str(content: &str) -> DandelionResult<Self> {
        let file: BundleFile = toml::from_str(content)?;
        let mut catalog = Self::new();

        for def in &file.scope {
            catalog.add_scope(&def.name, def.parent.as_deref());
        }
        for asset in &file.asset {
            catalog.add_scope(&asset.bundle, None);
        }
        for def in &file.scope {
            if let Some(parent) = &def.parent {
                if !catalog.scopes.contains_key(parent) {
                    return Err(DandelionError::ScopeNotFound(parent.clone()));
                }
            }
        }

        for asset in file.asset {
            let bundle = asset.bundle.clone();
            catalog.add_asset(&bundle, asset)?;
        }

        debug!("Loaded {} scopes", catalog.scopes.len());
        Ok(catalog)
    }

    /// Load a TOML bundle file
    pub async fn load(path: &Path) -> DandelionResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DandelionError::io(format!("reading bundles {}", path.display()), e))?;
        Self::from_toml_str(&content)
    }
}
