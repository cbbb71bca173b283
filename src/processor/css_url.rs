//! Rewrites relative `url(...)` references in stylesheets
//!
//! Stylesheets are served from the asset URL, not from their original
//! location, so relative references are made absolute against the directory
//! of the stylesheet's public location.

use super::{AssetProcessor, ProcessingContext};
use crate::asset::AssetType;
use crate::error::{DandelionError, DandelionResult};
use regex::{Captures, Regex};

const URL_PATTERN: &str = r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"\s]*))\s*\)"#;

pub struct CssUrlRewriter {
    pattern: Regex,
}

impl CssUrlRewriter {
    pub const NAME: &'static str = "cssurlrewriting";

    pub fn new() -> DandelionResult<Self> {
        let pattern = Regex::new(URL_PATTERN)
            .map_err(|e| DandelionError::Internal(format!("invalid url pattern: {e}")))?;
        Ok(Self { pattern })
    }
}

impl AssetProcessor for CssUrlRewriter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn supports(&self, asset_type: AssetType) -> bool {
        asset_type == AssetType::Css
    }

    fn process(&self, content: &str, context: &ProcessingContext<'_>) -> Result<String, String> {
        let base = base_directory(context.location);
        let rewritten = self.pattern.replace_all(content, |caps: &Captures<'_>| {
            let url = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            if is_absolute(url) {
                caps[0].to_string()
            } else {
                format!("url(\"{}\")", resolve(base, url))
            }
        });
        Ok(rewritten.into_owned())
    }
}

fn is_absolute(url: &str) -> bool {
    url.is_empty()
        || url.starts_with('/')
        || url.starts_with('#')
        || url.starts_with("data:")
        || url.contains("://")
}

/// Directory part of a location, with trailing slash
fn base_directory(location: &str) -> &str {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    match path.rfind('/') {
        Some(i) => &path[..=i],
        None => "",
    }
}

/// Join `relative` onto `base`, collapsing `.` and `..` segments
fn resolve(base: &str, relative: &str) -> String {
    let (path, suffix) = match relative.find(['?', '#']) {
        Some(i) => relative.split_at(i),
        None => (relative, ""),
    };

    // Keep the scheme and authority of remote bases untouched
    let (root, base_path) = match base.find("://") {
        Some(i) => {
            let authority_end = base[i + 3..].find('/').map_or(base.len(), |j| i + 3 + j);
            base.split_at(authority_end)
        }
        None if base.starts_with("//") => {
            let authority_end = base[2..].find('/').map_or(base.len(), |j| 2 + j);
            base.split_at(authority_end)
        }
        None => ("", base),
    };

    let mut segments: Vec<&str> = base_path.split('/').filter(|s| !s.is_empty()).collect();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("{root}/{}{suffix}", segments.join("/"))
}
