//! Declarative runtime configuration for filter URL resolution.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::manifest::{AssetManifest, ManifestError};
use crate::versioning::VersionStrategy;

const DEFAULT_CONFIG_FILE: &str = "imgfilter.config.json";

/// Driver names the transform engine is known to support.
const SUPPORTED_DRIVERS: &[&str] = &["gd", "imagick", "gmagick"];

/// Discoverable configuration describing the transform engine surface and
/// the versioning applied around it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Transform engine driver name.
    pub driver: String,
    /// URL prefix under which the engine exposes cached variants.
    pub cache_prefix: String,
    /// Cache-busting versioning applied around the engine.
    pub versioning: VersioningConfig,
    /// Named filter definitions passed through to the engine.
    pub filters: BTreeMap<String, FilterDefinition>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            driver: "gd".into(),
            cache_prefix: "/media/cache".into(),
            versioning: VersioningConfig::default(),
            filters: BTreeMap::new(),
        }
    }
}

/// How asset versions are embedded, at most one mode at a time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// Literal token the build pipeline appends to every asset path.
    pub suffix: Option<String>,
    /// Path to a JSON manifest of original → versioned paths.
    pub manifest: Option<PathBuf>,
}

/// A single named filter as declared in configuration.
///
/// Purely declarative; the contents are forwarded to the transform engine
/// and never interpreted here.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterDefinition {
    /// Filter implementation selector understood by the engine.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Optional source path override for the filter.
    pub path: Option<String>,
    /// Output quality, 0–100.
    pub quality: u8,
    /// Engine-specific options forwarded verbatim.
    pub options: BTreeMap<String, serde_json::Value>,
}

impl Default for FilterDefinition {
    fn default() -> Self {
        Self {
            kind: None,
            path: None,
            quality: 100,
            options: BTreeMap::new(),
        }
    }
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// Failed to parse the JSON configuration file.
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// The configured driver is not one of the supported set.
    UnknownDriver {
        /// The rejected driver name.
        driver: String,
    },
    /// A filter name cannot be used as a cache path segment.
    InvalidFilterName {
        /// The rejected filter name.
        name: String,
    },
    /// A filter declares a quality outside 0–100.
    InvalidQuality {
        /// The filter declaring the quality.
        name: String,
        /// The rejected quality value.
        quality: u8,
    },
    /// The suffix token is not safe to append to a query string.
    UnsafeSuffix {
        /// The rejected token.
        token: String,
    },
    /// Both suffix and manifest versioning were declared.
    ConflictingVersioning,
    /// The declared manifest could not be loaded.
    Manifest(ManifestError),
}

impl RuntimeConfig {
    /// Attempt to load configuration from the provided directory.
    pub fn discover(base_dir: &Path) -> Result<Self, ConfigError> {
        Self::load_from_path(base_dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from a specific JSON file.
    ///
    /// A missing file yields the documented defaults so callers can operate
    /// without a configuration file present.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        let config: Self = serde_json::from_str(&contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the declarative parts of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_DRIVERS.contains(&self.driver.as_str()) {
            return Err(ConfigError::UnknownDriver {
                driver: self.driver.clone(),
            });
        }

        for (name, definition) in &self.filters {
            if !filter_name_pattern().is_match(name) {
                return Err(ConfigError::InvalidFilterName { name: name.clone() });
            }
            if definition.quality > 100 {
                return Err(ConfigError::InvalidQuality {
                    name: name.clone(),
                    quality: definition.quality,
                });
            }
        }

        self.versioning.validate()
    }
}

impl VersioningConfig {
    /// Validate mutual exclusivity and token safety.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suffix.is_some() && self.manifest.is_some() {
            return Err(ConfigError::ConflictingVersioning);
        }
        if let Some(token) = &self.suffix {
            if token.is_empty() || !query_safe_pattern().is_match(token) {
                return Err(ConfigError::UnsafeSuffix {
                    token: token.clone(),
                });
            }
        }
        Ok(())
    }

    /// Build the versioning strategy, loading the manifest when declared.
    ///
    /// Relative manifest paths are resolved against `base_dir`.
    pub fn into_strategy(self, base_dir: &Path) -> Result<VersionStrategy, ConfigError> {
        self.validate()?;

        if let Some(token) = self.suffix {
            return Ok(VersionStrategy::suffix(token));
        }
        if let Some(declared) = self.manifest {
            let path = if declared.is_absolute() {
                declared
            } else {
                base_dir.join(declared)
            };
            let manifest = AssetManifest::load_from_path(&path).map_err(ConfigError::Manifest)?;
            return Ok(manifest.into_strategy());
        }
        Ok(VersionStrategy::None)
    }
}

/// Filter names become cache path segments, so restrict them to segment-safe
/// identifiers.
fn filter_name_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("invalid filter name regex")
    })
}

/// Characters permitted in a query-string component per RFC 3986.
fn query_safe_pattern() -> &'static Regex {
    use std::sync::OnceLock;

    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._~!$&'()*+,;=:@/?%-]+$").expect("invalid query token regex")
    })
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            Self::UnknownDriver { driver } => {
                write!(
                    f,
                    "unsupported driver '{driver}', expected one of: {}",
                    SUPPORTED_DRIVERS.join(", ")
                )
            }
            Self::InvalidFilterName { name } => {
                write!(f, "filter name '{name}' is not a valid cache path segment")
            }
            Self::InvalidQuality { name, quality } => {
                write!(
                    f,
                    "filter '{name}' declares quality {quality}, expected 0-100"
                )
            }
            Self::UnsafeSuffix { token } => {
                write!(f, "suffix token '{token}' is not query-string safe")
            }
            Self::ConflictingVersioning => {
                write!(f, "suffix and manifest versioning are mutually exclusive")
            }
            Self::Manifest(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Manifest(source) => Some(source),
            _ => None,
        }
    }
}
