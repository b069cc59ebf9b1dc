//! Loading and validating build-pipeline asset manifests.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::versioning::VersionStrategy;

/// Precomputed mapping of original asset paths to build-versioned paths.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    entries: BTreeMap<String, String>,
}

/// Errors that can occur while loading a manifest.
#[derive(Debug)]
pub enum ManifestError {
    /// Failed to read the manifest file from disk.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// Failed to parse the JSON manifest.
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// Two originals map to the same versioned path, which would corrupt
    /// the derived reverse lookup.
    DuplicateTarget {
        /// The versioned path declared twice.
        target: String,
        /// The original that claimed the target first.
        first: String,
        /// The original that claimed it again.
        second: String,
    },
}

impl AssetManifest {
    /// Load a manifest from a JSON object of original → versioned paths.
    ///
    /// A declared manifest is expected to exist; a missing file is an I/O
    /// error rather than a silent fallback.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| ManifestError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;

        let entries: BTreeMap<String, String> =
            serde_json::from_str(&contents).map_err(|err| ManifestError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?;
        Self::from_entries(entries)
    }

    /// Build a manifest from an in-memory mapping, rejecting duplicate
    /// versioned targets.
    ///
    /// Targets that are external references are kept but logged: the
    /// contiguous-insertion filename diff is unreliable across a scheme
    /// prefix.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Result<Self, ManifestError> {
        let mut claimed: BTreeMap<&str, &str> = BTreeMap::new();
        for (original, versioned) in &entries {
            if let Some(first) = claimed.insert(versioned.as_str(), original.as_str()) {
                return Err(ManifestError::DuplicateTarget {
                    target: versioned.clone(),
                    first: first.to_string(),
                    second: original.clone(),
                });
            }
            if is_external_target(versioned) {
                tracing::warn!(
                    "manifest target {versioned} for {original} is an external reference"
                );
            }
        }
        Ok(Self { entries })
    }

    /// Number of entries in the manifest.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Convert into the versioning strategy used by the runtime.
    ///
    /// An empty manifest disables versioning entirely.
    pub fn into_strategy(self) -> VersionStrategy {
        if self.entries.is_empty() {
            VersionStrategy::None
        } else {
            VersionStrategy::manifest(self.entries)
        }
    }
}

fn external_target_patterns() -> &'static [Regex] {
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            vec![
                Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"),
                Regex::new(r"^//").expect("invalid protocol-relative regex"),
                Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
            ]
        })
        .as_slice()
}

/// Determine whether a manifest target points outside the local asset tree.
pub fn is_external_target(value: &str) -> bool {
    external_target_patterns()
        .iter()
        .any(|pattern| pattern.is_match(value))
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            Self::DuplicateTarget {
                target,
                first,
                second,
            } => {
                write!(
                    f,
                    "manifest maps both {first} and {second} to {target}"
                )
            }
        }
    }
}

impl std::error::Error for ManifestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::DuplicateTarget { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_a_manifest_file() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("manifest.json");
        std::fs::write(
            &path,
            r#"{"/img/logo.png": "/img/logo-ab12.png", "/css/site.css": "/css/site-9f3e.css"}"#,
        )
        .expect("failed to write manifest file");

        let manifest = AssetManifest::load_from_path(&path).expect("manifest should load");
        assert_eq!(manifest.len(), 2);
        assert!(!manifest.is_empty());
    }

    #[test]
    fn missing_manifests_are_io_errors() {
        let temp = tempdir().expect("failed to create temp dir");
        let result = AssetManifest::load_from_path(temp.path().join("manifest.json"));
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join("manifest.json");
        std::fs::write(&path, "not json").expect("failed to write manifest file");

        let result = AssetManifest::load_from_path(&path);
        assert!(matches!(result, Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn rejects_duplicate_versioned_targets() {
        let mut entries = BTreeMap::new();
        entries.insert("/img/a.png".to_string(), "/img/shared.png".to_string());
        entries.insert("/img/b.png".to_string(), "/img/shared.png".to_string());

        let result = AssetManifest::from_entries(entries);
        match result {
            Err(ManifestError::DuplicateTarget {
                target,
                first,
                second,
            }) => {
                assert_eq!(target, "/img/shared.png");
                assert_eq!(first, "/img/a.png");
                assert_eq!(second, "/img/b.png");
            }
            other => panic!("expected a duplicate target error, got {other:?}"),
        }
    }

    #[test]
    fn keeps_external_targets() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "/img/logo.png".to_string(),
            "https://cdn.example/img/logo-ab12.png".to_string(),
        );

        let manifest = AssetManifest::from_entries(entries).expect("entries should be accepted");
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn recognises_external_targets() {
        assert!(is_external_target("https://cdn.example/logo.png"));
        assert!(is_external_target("HTTP://cdn.example/logo.png"));
        assert!(is_external_target("//cdn.example/logo.png"));
        assert!(is_external_target("data:image/png;base64,abc"));
        assert!(!is_external_target("/img/logo.png"));
        assert!(!is_external_target("img/logo.png"));
    }

    #[test]
    fn an_empty_manifest_disables_versioning() {
        let manifest = AssetManifest::from_entries(BTreeMap::new()).unwrap();
        assert!(matches!(manifest.into_strategy(), VersionStrategy::None));
    }

    #[test]
    fn a_populated_manifest_builds_the_manifest_strategy() {
        let mut entries = BTreeMap::new();
        entries.insert("/img/logo.png".to_string(), "/img/logo-ab12.png".to_string());

        let manifest = AssetManifest::from_entries(entries).unwrap();
        let strategy = manifest.into_strategy();
        assert_eq!(strategy.strip_version("/img/logo-ab12.png"), "/img/logo.png");
    }
}
