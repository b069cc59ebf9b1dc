//! Stripping embedded version markers from asset paths.
//!
//! The transform/cache engine operates on canonical paths, so the marker a
//! build pipeline embedded into the filename has to come off before the
//! engine sees the path. An absent marker is a normal, silent case.

use super::VersionStrategy;

impl VersionStrategy {
    /// Map an externally-supplied asset path to its canonical form.
    ///
    /// In suffix mode the token is removed only when the path ends with it,
    /// along with any trailing `?` left behind by a query-style token. In
    /// manifest mode the path is looked up in the derived reverse mapping.
    /// Idempotent: a path without a recognisable marker comes back
    /// unchanged.
    pub fn strip_version(&self, path: &str) -> String {
        match self {
            Self::None => path.to_string(),
            Self::Suffix(token) => match path.strip_suffix(token.as_str()) {
                Some(stripped) => stripped.trim_end_matches('?').to_string(),
                None => path.to_string(),
            },
            Self::Manifest { reverse, .. } => match reverse.get(path) {
                Some(original) => original.clone(),
                None => path.to_string(),
            },
        }
    }
}
