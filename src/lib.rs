#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod manifest;
pub mod resolver;
pub mod runtime;
pub mod versioning;

pub use config::{ConfigError, FilterDefinition, RuntimeConfig, VersioningConfig};
pub use manifest::{AssetManifest, ManifestError};
pub use resolver::{CacheResolver, FilterOptions, ReferenceType};
pub use runtime::FilterUrlRuntime;
pub use versioning::{VersionStrategy, VersionToken, capture_version, insert_version};
