//! Configuration schema for Dandelion
//!
//! Configuration is stored at `~/.config/dandelion/config.toml`

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Default number of entries kept by the bounded asset store
pub const DEFAULT_ASSET_MAX_SIZE: usize = 50;

/// Deployment profile selecting the default toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Development: no minification, no caching, no merging
    #[default]
    Dev,
    /// Production: everything enabled
    Prod,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Profile the defaults were derived from
    pub profile: Profile,

    /// General settings
    pub general: GeneralConfig,

    /// Asset pipeline settings
    pub asset: AssetConfig,

    /// Content store settings
    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Dev)
    }
}

impl Config {
    /// Build the default configuration for a profile
    pub fn for_profile(profile: Profile) -> Self {
        let prod = profile == Profile::Prod;
        Self {
            profile,
            general: GeneralConfig::default(),
            asset: AssetConfig {
                minification: prod,
                caching: prod,
                merging: if prod { "dynamic" } else { "none" }.to_string(),
                ..AssetConfig::default()
            },
            cache: CacheConfig::default(),
        }
    }
}

/// Sections as authored in TOML, each optional so profile defaults can fill gaps
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    profile: Profile,
    general: Option<GeneralConfig>,
    asset: Option<toml::Table>,
    cache: Option<CacheConfig>,
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawConfig::deserialize(deserializer)?;
        let mut config = Config::for_profile(raw.profile);

        if let Some(general) = raw.general {
            config.general = general;
        }
        if let Some(cache) = raw.cache {
            config.cache = cache;
        }
        if let Some(table) = raw.asset {
            // Overlay authored keys on the profile defaults
            let mut base = match toml::Value::try_from(&config.asset)
                .map_err(serde::de::Error::custom)?
            {
                toml::Value::Table(base) => base,
                _ => return Err(serde::de::Error::custom("asset section must be a table")),
            };
            for (key, value) in table {
                base.insert(key, value);
            }
            config.asset = AssetConfig::deserialize(toml::Value::Table(base))
                .map_err(serde::de::Error::custom)?;
        }

        Ok(config)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Asset pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Prefix of every generated asset URL
    pub url_prefix: String,

    /// Location kinds in resolution priority order
    pub locations_resolution_strategy: Vec<String>,

    /// Processor names, applied in this order
    pub processors: Vec<String>,

    /// Encoding of asset contents fed to processors
    pub processors_encoding: String,

    /// Enable minification processors
    pub minification: bool,

    /// Reuse stored contents across requests
    pub caching: bool,

    /// Merging strategy: "none" or "dynamic"
    pub merging: String,

    /// Script names never emitted
    pub js_excludes: Vec<String>,

    /// Stylesheet names never emitted
    pub css_excludes: Vec<String>,

    /// Root directory of webapp-relative locations
    pub webapp_root: String,

    /// Timeout for remote fetches in milliseconds
    pub remote_timeout_ms: u64,

    /// Versioning settings
    pub versioning: VersioningConfig,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            url_prefix: "/dandelion-assets/".to_string(),
            locations_resolution_strategy: vec![
                "webapp".to_string(),
                "jar".to_string(),
                "cdn".to_string(),
                "api".to_string(),
            ],
            processors: vec![
                "cssurlrewriting".to_string(),
                "jsmin".to_string(),
                "cssmin".to_string(),
            ],
            processors_encoding: "UTF-8".to_string(),
            minification: false,
            caching: false,
            merging: "none".to_string(),
            js_excludes: vec![],
            css_excludes: vec![],
            webapp_root: ".".to_string(),
            remote_timeout_ms: 5000,
            versioning: VersioningConfig::default(),
        }
    }
}

/// Asset versioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Compute versions automatically when no explicit version is declared
    pub enabled: bool,

    /// Active strategy: "content" or "fixed"
    pub strategy: String,

    /// Fixed version kind: "string" or "date"
    pub fixed_type: String,

    /// Fixed version value (a date in `date_format` when `fixed_type = "date"`)
    pub fixed_value: String,

    /// strftime pattern used by date versions
    pub date_format: String,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: "content".to_string(),
            fixed_type: "string".to_string(),
            fixed_value: String::new(),
            date_format: "%Y%m%d".to_string(),
        }
    }
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Store implementation: "memory" or "lru"
    pub storage: String,

    /// Maximum entries kept by the "lru" store
    #[serde(deserialize_with = "lenient_size")]
    pub asset_max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage: "memory".to_string(),
            asset_max_size: DEFAULT_ASSET_MAX_SIZE,
        }
    }
}

/// Accept integers or numeric strings; anything else falls back to the default
fn lenient_size<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = toml::Value::deserialize(deserializer)?;
    let parsed = match &value {
        toml::Value::Integer(n) => usize::try_from(*n).ok(),
        toml::Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };

    Ok(parsed.unwrap_or_else(|| {
        warn!(
            "Invalid cache.asset_max_size {}, falling back to {}",
            value, DEFAULT_ASSET_MAX_SIZE
        );
        DEFAULT_ASSET_MAX_SIZE
    }))
}
