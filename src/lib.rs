//! Dandelion - web asset pipeline
//!
//! Resolves asset declarations into versioned, optionally merged and
//! minified assets, stored once per cache key and reused across requests.

pub mod asset;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod locator;
pub mod merge;
pub mod pipeline;
pub mod processor;
pub mod request;
pub mod resolve;
pub mod storage;
pub mod version;

pub use context::AssetContext;
pub use error::{DandelionError, DandelionResult};
pub use request::RequestContext;
