//! Asset declarations, their catalog and their resolution

pub mod catalog;
pub mod filter;
pub mod mapper;
pub mod types;

pub use catalog::{AssetCatalog, Scope};
pub use mapper::{map_asset, process_asset};
pub use types::{
    final_url, name_from_location, AssetDeclaration, AssetType, DomPosition, ResolvedAsset,
    UNDEFINED_VERSION,
};
