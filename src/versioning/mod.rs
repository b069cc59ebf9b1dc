//! Version-preserving path rewrites for cached filter URLs.
//!
//! This module intentionally splits the responsibilities into focused
//! submodules so that the strategy selection, the stripping step, the
//! re-embedding step, and the filename-diff primitives can be tested
//! independently. The same code is shared between both template-facing
//! entry points.

mod reinsert;
mod strategy;
mod strip;
mod token;

pub use strategy::VersionStrategy;
pub use token::{VersionToken, capture_version, insert_version};
