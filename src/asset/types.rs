//! Asset data model
//!
//! `AssetDeclaration` is authored data loaded once per bundle; `ResolvedAsset`
//! is derived from it for a single rendering pass.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Marker emitted when no version could be determined
pub const UNDEFINED_VERSION: &str = "UNDEFINED_VERSION";

/// Supported asset types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// JavaScript
    Js,
    /// Cascading style sheet
    Css,
    /// Image
    Img,
}

impl AssetType {
    /// File extension used in generated URLs
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Css => "css",
            Self::Img => "img",
        }
    }

    /// Default DOM position when the declaration does not set one
    pub fn default_dom(&self) -> DomPosition {
        match self {
            Self::Js => DomPosition::Body,
            Self::Css | Self::Img => DomPosition::Head,
        }
    }

    /// Infer the type from a location's extension, ignoring query and fragment
    pub fn type_of(location: &str) -> Option<Self> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or(location);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file.rsplit_once('.')?;

        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" => Some(Self::Js),
            "css" => Some(Self::Css),
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "ico" | "webp" => Some(Self::Img),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Where an asset reference is rendered in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomPosition {
    Head,
    Body,
}

impl fmt::Display for DomPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// An asset as declared in a bundle definition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssetDeclaration {
    /// Logical name; inferred from the selected location when empty
    #[serde(default)]
    pub name: String,

    /// Bundle the asset belongs to
    #[serde(default)]
    pub bundle: String,

    /// Explicit type, otherwise inferred from the location extension
    #[serde(default, rename = "type")]
    pub asset_type: Option<AssetType>,

    /// Explicit version, overrides any versioning strategy
    #[serde(default)]
    pub version: Option<String>,

    /// Location kind to raw location
    #[serde(default)]
    pub locations: BTreeMap<String, String>,

    /// Third-party asset: never merged, cached or auto-versioned
    #[serde(default)]
    pub vendor: bool,

    /// DOM position hint
    #[serde(default)]
    pub dom: Option<DomPosition>,
}

impl AssetDeclaration {
    /// Create a declaration with no locations
    pub fn new(name: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bundle: bundle.into(),
            ..Self::default()
        }
    }

    /// Add a location candidate
    pub fn with_location(mut self, kind: impl Into<String>, location: impl Into<String>) -> Self {
        self.locations.insert(kind.into(), location.into());
        self
    }

    /// Set the explicit type
    pub fn with_type(mut self, asset_type: AssetType) -> Self {
        self.asset_type = Some(asset_type);
        self
    }

    /// Set the explicit version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the DOM position
    pub fn with_dom(mut self, dom: DomPosition) -> Self {
        self.dom = Some(dom);
        self
    }

    /// Mark the asset as vendor
    pub fn vendor(mut self) -> Self {
        self.vendor = true;
        self
    }

    /// Raw location configured for a kind
    pub fn location(&self, kind: &str) -> Option<&str> {
        self.locations.get(kind).map(String::as_str)
    }

    /// Explicit version if it is not blank
    pub fn explicit_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Name used for display and identity, falling back to the first location's stem
    pub fn effective_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }
        self.locations
            .values()
            .next()
            .map(|l| name_from_location(l))
            .unwrap_or_default()
    }

    /// Type used for identity, falling back to the first inferable location
    pub fn effective_type(&self) -> Option<AssetType> {
        self.asset_type
            .or_else(|| self.locations.values().find_map(|l| AssetType::type_of(l)))
    }

    /// Short description for log and error messages
    pub fn to_log(&self) -> String {
        format!("{} ({})", self.effective_name(), self.bundle)
    }
}

/// Lower-cased file stem of a location, e.g. `/js/App.min.js` -> `app.min`
pub fn name_from_location(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let file = path.rsplit('/').next().unwrap_or(path);
    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };
    stem.to_lowercase()
}

/// An asset resolved for one request's rendering pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub name: String,
    pub asset_type: AssetType,
    pub bundle: String,

    /// Selected location kind, `None` for merged assets
    pub location_kind: Option<String>,

    /// Raw location of the selected kind, `None` for merged assets
    pub location: Option<String>,

    /// Store key and URL segment
    pub cache_key: String,

    pub version: String,

    /// Ready-to-emit URL
    pub final_url: String,

    pub dom: DomPosition,
    pub vendor: bool,

    /// Source declaration, `None` for merged assets
    pub declaration: Option<Arc<AssetDeclaration>>,
}

impl ResolvedAsset {
    /// Whether this asset stands for a group of merged assets
    pub fn is_merged(&self) -> bool {
        self.declaration.is_none()
    }

    /// Short description for log and error messages
    pub fn to_log(&self) -> String {
        format!("{}.{} ({})", self.name, self.asset_type, self.bundle)
    }
}

/// Build the public URL of an asset served from the store:
/// `{prefix}{cache_key}/{name}-{version}.{type}`
pub fn final_url(
    prefix: &str,
    cache_key: &str,
    name: &str,
    version: &str,
    asset_type: AssetType,
) -> String {
    format!("{prefix}{cache_key}/{name}-{version}.{}", asset_type.extension())
}
