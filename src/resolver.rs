//! Seam to the external image transform/cache engine.
//!
//! This crate never transforms pixels or touches cache storage; it hands a
//! canonical path to the engine behind this trait and post-processes the
//! string the engine returns.

use std::collections::BTreeMap;

/// Per-call filter options forwarded verbatim to the transform engine.
pub type FilterOptions = BTreeMap<String, serde_json::Value>;

/// How the resolved browser URL should be generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferenceType {
    /// Fully qualified URL including scheme and host.
    #[default]
    AbsoluteUrl,
    /// Absolute path without scheme or host.
    AbsolutePath,
    /// Scheme-relative URL (`//host/path`).
    NetworkPath,
    /// Path relative to the current request.
    RelativePath,
}

/// Transform/cache engine collaborator.
///
/// Implementations resolve canonical asset paths into cached output paths
/// or URLs. Failures propagate to the caller unmodified; this crate adds no
/// timeout or retry policy of its own.
pub trait CacheResolver {
    /// Resolve the browser-facing URL for a filtered asset.
    fn resolve_browser_path(
        &self,
        path: &str,
        filter: &str,
        options: &FilterOptions,
        resolver: Option<&str>,
        reference: ReferenceType,
    ) -> anyhow::Result<String>;

    /// Resolve the cache path for a filtered asset without checking whether
    /// the cached file exists.
    fn resolve_cache_path(
        &self,
        path: &str,
        filter: &str,
        resolver: Option<&str>,
    ) -> anyhow::Result<String>;

    /// Rewrite a path for per-call runtime options prior to resolution.
    fn build_runtime_path(&self, path: &str, options: &FilterOptions) -> anyhow::Result<String>;
}
