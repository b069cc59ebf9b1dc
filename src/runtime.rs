//! Template-facing entry points wiring normalization, resolution and
//! version re-embedding together.

use anyhow::Result;

use crate::resolver::{CacheResolver, FilterOptions, ReferenceType};
use crate::versioning::VersionStrategy;

/// Runtime handed to templating/view code for resolving filter URLs.
///
/// Stateless apart from the immutable versioning strategy captured at
/// construction; a single instance can serve concurrent callers.
#[derive(Debug)]
pub struct FilterUrlRuntime<R> {
    resolver: R,
    versioning: VersionStrategy,
}

impl<R: CacheResolver> FilterUrlRuntime<R> {
    /// Create a runtime over the given engine and versioning strategy.
    pub fn new(resolver: R, versioning: VersionStrategy) -> Self {
        Self {
            resolver,
            versioning,
        }
    }

    /// Browser URL for the asset with the filter applied.
    ///
    /// The asset path is normalized before the engine sees it and the
    /// version marker is re-embedded into whatever the engine returns.
    /// Engine failures propagate unmodified.
    pub fn filter(
        &self,
        path: &str,
        filter: &str,
        options: &FilterOptions,
        resolver: Option<&str>,
        reference: ReferenceType,
    ) -> Result<String> {
        let clean = self.versioning.strip_version(path);
        tracing::debug!("resolving browser path for {clean} through filter {filter}");
        let resolved = self
            .resolver
            .resolve_browser_path(&clean, filter, options, resolver, reference)?;
        Ok(self.versioning.apply_version(&resolved, &clean))
    }

    /// Cache path for the asset with the filter applied.
    ///
    /// This does not check whether the cached image exists. Non-empty
    /// options are first rewritten into a runtime path before resolution.
    pub fn filter_cache(
        &self,
        path: &str,
        filter: &str,
        options: &FilterOptions,
        resolver: Option<&str>,
    ) -> Result<String> {
        let mut clean = self.versioning.strip_version(path);
        if !options.is_empty() {
            clean = self.resolver.build_runtime_path(&clean, options)?;
        }
        tracing::debug!("resolving cache path for {clean} through filter {filter}");
        let resolved = self.resolver.resolve_cache_path(&clean, filter, resolver)?;
        Ok(self.versioning.apply_version(&resolved, &clean))
    }

    /// The versioning strategy this runtime was built with.
    pub fn versioning(&self) -> &VersionStrategy {
        &self.versioning
    }
}
