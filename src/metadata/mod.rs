pub mod metadata_model;
pub mod metadata_registry;

pub use metadata_model::{AssetClass, RiskTier, SecurityMetadata};
pub use metadata_registry::{MetadataRegistry, MetadataRegistryTrait};
