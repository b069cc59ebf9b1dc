//! Re-embedding version markers into resolved cache paths.
//!
//! The transform engine returns a path for the canonical asset; the marker
//! that was stripped during normalization has to be carried over so browsers
//! keep seeing a cache-busted URL, including when the transform changed the
//! file extension.

use super::VersionStrategy;
use super::token::{capture_version, insert_version};

impl VersionStrategy {
    /// Combine the engine's resolved output with the original asset path.
    ///
    /// In suffix mode the token is appended as a query parameter. In
    /// manifest mode `original_path` is looked up in the forward mapping
    /// and the marker recovered from the manifest pair is spliced into the
    /// resolved filename. Paths the manifest does not know stay
    /// unversioned; every branch falls back to a usable path rather than
    /// failing the request.
    pub fn apply_version(&self, resolved_path: &str, original_path: &str) -> String {
        match self {
            Self::None => resolved_path.to_string(),
            Self::Suffix(token) => {
                let separator = if resolved_path.contains('?') { '&' } else { '?' };
                format!("{resolved_path}{separator}{token}")
            }
            Self::Manifest { forward, .. } => match forward.get(original_path) {
                Some(versioned_path) => {
                    restore_manifest_version(resolved_path, original_path, versioned_path)
                }
                None => resolved_path.to_string(),
            },
        }
    }
}

/// Rebuild the resolved path with the marker recovered from a manifest pair.
fn restore_manifest_version(
    resolved_path: &str,
    original_path: &str,
    versioned_path: &str,
) -> String {
    // Keep both manifest paths in the same shape before diffing.
    let mut original = original_path.to_string();
    let mut versioned = if !original_path.starts_with('/') && versioned_path.starts_with('/') {
        versioned_path[1..].to_string()
    } else {
        versioned_path.to_string()
    };

    // The transform may have changed the format; diff filenames that carry
    // the resolved extension on both sides. A missing extension on either
    // side would turn the substitution into a bare `.` rewrite, so the
    // reconciliation is skipped in that case.
    let original_ext = extension_of(&original);
    let resolved_ext = extension_of(resolved_path);
    if !original_ext.is_empty() && !resolved_ext.is_empty() && original_ext != resolved_ext {
        let from = format!(".{original_ext}");
        let to = format!(".{resolved_ext}");
        original = original.replace(&from, &to);
        versioned = versioned.replace(&from, &to);
    }

    let Some(token) = capture_version(filename_of(&original), filename_of(&versioned)) else {
        return resolved_path.to_string();
    };

    let (resolved_dir, resolved_name) = split_filename(resolved_path);
    let versioned_name = insert_version(resolved_name, &token);
    match resolved_dir {
        Some(dir) => format!("{dir}/{versioned_name}"),
        None => versioned_name,
    }
}

/// Filename portion of a slash-separated path.
fn filename_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Split into directory portion (without the trailing slash) and filename.
fn split_filename(path: &str) -> (Option<&str>, &str) {
    match path.rfind('/') {
        Some(idx) => (Some(&path[..idx]), &path[idx + 1..]),
        None => (None, path),
    }
}

/// Extension of the filename portion, empty when there is none.
fn extension_of(path: &str) -> &str {
    let name = filename_of(path);
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn manifest_strategy(pairs: &[(&str, &str)]) -> VersionStrategy {
        let forward: BTreeMap<String, String> = pairs
            .iter()
            .map(|(original, versioned)| (original.to_string(), versioned.to_string()))
            .collect();
        VersionStrategy::manifest(forward)
    }

    #[test]
    fn passes_resolved_paths_through_without_versioning() {
        let strategy = VersionStrategy::None;
        assert_eq!(
            strategy.apply_version("/cache/logo.png", "/img/logo.png"),
            "/cache/logo.png"
        );
    }

    #[test]
    fn appends_the_suffix_token_as_a_query_parameter() {
        let strategy = VersionStrategy::suffix("v=123");
        assert_eq!(
            strategy.apply_version("/cache/logo.png", "/img/logo.png"),
            "/cache/logo.png?v=123"
        );
    }

    #[test]
    fn joins_with_an_ampersand_when_a_query_is_already_present() {
        let strategy = VersionStrategy::suffix("v=123");
        assert_eq!(
            strategy.apply_version("/cache/logo.png?s=abc", "/img/logo.png"),
            "/cache/logo.png?s=abc&v=123"
        );
    }

    #[test]
    fn restores_the_manifest_marker_into_the_resolved_path() {
        let strategy = manifest_strategy(&[("/img/logo.png", "/img/logo-ab12.png")]);
        assert_eq!(
            strategy.apply_version("/cache/logo.png", "/img/logo.png"),
            "/cache/logo-ab12.png"
        );
    }

    #[test]
    fn carries_the_marker_across_an_extension_change() {
        let strategy = manifest_strategy(&[("/img/logo.png", "/img/logo-ab12.png")]);
        assert_eq!(
            strategy.apply_version("/cache/logo.webp", "/img/logo.png"),
            "/cache/logo-ab12.webp"
        );
    }

    #[test]
    fn leaves_assets_the_manifest_does_not_know_unversioned() {
        let strategy = manifest_strategy(&[("/img/logo.png", "/img/logo-ab12.png")]);
        assert_eq!(
            strategy.apply_version("/cache/other.png", "/img/other.png"),
            "/cache/other.png"
        );
    }

    #[test]
    fn normalises_a_leading_slash_mismatch_between_manifest_sides() {
        let strategy = manifest_strategy(&[("img/logo.png", "/img/logo-ab12.png")]);
        assert_eq!(
            strategy.apply_version("/cache/img/logo.png", "img/logo.png"),
            "/cache/img/logo-ab12.png"
        );
    }

    #[test]
    fn returns_the_resolved_path_when_the_versioned_name_is_not_longer() {
        let strategy = manifest_strategy(&[("/img/logo.png", "/img/lg.png")]);
        assert_eq!(
            strategy.apply_version("/cache/logo.png", "/img/logo.png"),
            "/cache/logo.png"
        );
    }

    #[test]
    fn keeps_the_bare_filename_when_the_resolved_path_has_no_directory() {
        let strategy = manifest_strategy(&[("/img/logo.png", "/img/logo-ab12.png")]);
        assert_eq!(
            strategy.apply_version("logo.png", "/img/logo.png"),
            "logo-ab12.png"
        );
    }

    #[test]
    fn restores_markers_in_multibyte_filenames() {
        let strategy = manifest_strategy(&[("/img/privé.png", "/img/privé-ab12.png")]);
        assert_eq!(
            strategy.apply_version("/cache/privé.webp", "/img/privé.png"),
            "/cache/privé-ab12.webp"
        );
    }
}
