//! Automatic versioning strategies

use crate::config::schema::VersioningConfig;
use crate::error::{DandelionError, DandelionResult};
use chrono::{NaiveDate, Utc};
use sha2::{Digest, Sha256};

/// Active strategy used when an asset has no explicit version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersioningStrategy {
    /// Hash of the asset's fetched content
    Content,
    /// Same value for every asset
    Fixed(String),
}

impl VersioningStrategy {
    /// Build the strategy named in the configuration
    pub fn from_config(config: &VersioningConfig) -> DandelionResult<Self> {
        match config.strategy.as_str() {
            "content" => Ok(Self::Content),
            "fixed" => fixed_version(config).map(Self::Fixed),
            other => Err(DandelionError::UnknownVersioningStrategy(other.to_string())),
        }
    }

    /// Whether the strategy needs the asset's content
    pub fn needs_content(&self) -> bool {
        matches!(self, Self::Content)
    }
}

fn fixed_version(config: &VersioningConfig) -> DandelionResult<String> {
    match config.fixed_type.as_str() {
        "string" => {
            let value = config.fixed_value.trim();
            if value.is_empty() {
                return Err(DandelionError::InvalidFixedVersion {
                    value: config.fixed_value.clone(),
                    format: "non-empty string".to_string(),
                });
            }
            Ok(value.to_string())
        }
        "date" => {
            let date = if config.fixed_value.trim().is_empty() {
                Utc::now().date_naive()
            } else {
                NaiveDate::parse_from_str(config.fixed_value.trim(), &config.date_format)
                    .map_err(|_| DandelionError::InvalidFixedVersion {
                        value: config.fixed_value.clone(),
                        format: config.date_format.clone(),
                    })?
            };
            Ok(date.format(&config.date_format).to_string())
        }
        other => Err(DandelionError::InvalidFixedVersion {
            value: config.fixed_value.clone(),
            format: format!("unknown fixed type '{other}'"),
        }),
    }
}

/// SHA256 of `bytes`, first 12 hex chars
pub fn short_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..6])
}
