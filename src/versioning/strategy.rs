use std::collections::BTreeMap;

/// How cache-busting versions are embedded into asset paths.
///
/// Captured once at construction and read-only afterwards, so a single
/// strategy can serve concurrent callers without coordination.
#[derive(Debug, Clone, Default)]
pub enum VersionStrategy {
    /// No versioning; stripping and re-applying are both pass-through.
    #[default]
    None,
    /// Every versioned asset path ends with this literal token.
    Suffix(String),
    /// A build step produced a manifest of original → versioned paths.
    Manifest {
        /// Original path → versioned path, as read from the manifest.
        forward: BTreeMap<String, String>,
        /// Versioned path → original path, derived once at construction.
        reverse: BTreeMap<String, String>,
    },
}

impl VersionStrategy {
    /// Strategy using a literal suffix token.
    pub fn suffix(token: impl Into<String>) -> Self {
        Self::Suffix(token.into())
    }

    /// Strategy backed by a manifest of original → versioned paths.
    ///
    /// The mapping is expected to be a bijection; when two originals map to
    /// the same versioned path, the later entry wins the reverse slot and a
    /// warning is logged. [`crate::manifest::AssetManifest`] rejects such
    /// inputs at the file boundary.
    pub fn manifest(forward: BTreeMap<String, String>) -> Self {
        let mut reverse = BTreeMap::new();
        for (original, versioned) in &forward {
            if let Some(previous) = reverse.insert(versioned.clone(), original.clone()) {
                tracing::warn!(
                    "manifest maps both {previous} and {original} to {versioned}; keeping {original}"
                );
            }
        }
        Self::Manifest { forward, reverse }
    }

    /// Whether any versioning is active.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::None)
    }
}
