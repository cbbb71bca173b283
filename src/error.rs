//! Error types for Dandelion
//!
//! All modules use `DandelionResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Dandelion operations
pub type DandelionResult<T> = Result<T, DandelionError>;

/// All errors that can occur while resolving, processing or serving assets
#[derive(Error, Debug)]
pub enum DandelionError {
    // Location errors
    #[error("No location is configured for the asset '{asset}' of bundle '{bundle}'")]
    NoLocationConfigured { asset: String, bundle: String },

    #[error("No location of the asset '{asset}' of bundle '{bundle}' matches the resolution strategy [{searched}]")]
    NoResolvableLocation {
        asset: String,
        bundle: String,
        searched: String,
    },

    #[error("The location key '{kind}' of the asset '{asset}' of bundle '{bundle}' is not valid. Valid keys: [{valid}]")]
    UnknownLocationKind {
        kind: String,
        asset: String,
        bundle: String,
        valid: String,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Unknown asset processor '{name}'. Valid processors: [{valid}]")]
    UnknownProcessor { name: String, valid: String },

    #[error("Unknown versioning strategy '{0}'. Use \"content\" or \"fixed\"")]
    UnknownVersioningStrategy(String),

    #[error("Unknown merging strategy '{0}'. Use \"none\" or \"dynamic\"")]
    UnknownMergingStrategy(String),

    #[error("Unknown asset storage '{0}'. Use \"memory\" or \"lru\"")]
    UnknownStorage(String),

    #[error("Invalid fixed version '{value}' for format '{format}'")]
    InvalidFixedVersion { value: String, format: String },

    #[error("Unsupported processors encoding '{0}'. Only UTF-8 is supported")]
    UnsupportedEncoding(String),

    #[error("Cannot infer the type of the asset '{asset}' from {location}")]
    UnknownAssetType { asset: String, location: String },

    // Fetch errors
    #[error("Failed to fetch the asset '{asset}' from {location}: {reason}")]
    Fetch {
        asset: String,
        location: String,
        reason: String,
    },

    #[error("Timed out after {timeout_ms}ms fetching the asset '{asset}' from {location}")]
    FetchTimeout {
        asset: String,
        location: String,
        timeout_ms: u64,
    },

    // Processing errors
    #[error("Processor '{processor}' failed on the asset '{asset}': {reason}")]
    Processing {
        processor: String,
        asset: String,
        reason: String,
    },

    // Catalog errors
    #[error("The asset '{asset}' already exists in the scope '{scope}'")]
    AssetAlreadyExistsInScope { asset: String, scope: String },

    #[error("Scope not found: {0}")]
    ScopeNotFound(String),

    #[error("No stored entry for key {0}")]
    EntryNotFound(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DandelionError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch error for an asset location
    pub fn fetch(
        asset: impl Into<String>,
        location: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            asset: asset.into(),
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a processing error naming the failing processor
    pub fn processing(
        processor: impl Into<String>,
        asset: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Processing {
            processor: processor.into(),
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error comes from a misconfigured bundle or configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::NoLocationConfigured { .. }
                | Self::NoResolvableLocation { .. }
                | Self::UnknownLocationKind { .. }
                | Self::ConfigInvalid { .. }
                | Self::UnknownProcessor { .. }
                | Self::UnknownVersioningStrategy(_)
                | Self::UnknownMergingStrategy(_)
                | Self::UnknownStorage(_)
                | Self::InvalidFixedVersion { .. }
                | Self::UnsupportedEncoding(_)
                | Self::UnknownAssetType { .. }
        )
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::FetchTimeout { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoLocationConfigured { .. } => {
                Some("Add at least one location to the asset in its bundle definition")
            }
            Self::NoResolvableLocation { .. } => {
                Some("Check asset.locations_resolution_strategy in the configuration")
            }
            Self::UnknownLocationKind { .. } => {
                Some("Use one of the registered location keys: webapp, jar, cdn, api")
            }
            Self::FetchTimeout { .. } => Some("Increase asset.remote_timeout_ms"),
            Self::UnknownAssetType { .. } => Some("Set the asset type explicitly"),
            _ => None,
        }
    }
}
