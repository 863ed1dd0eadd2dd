//! Content-addressed cache keys.
//!
//! A key is computed as:
//!
//! ```text
//! key = hex(BLAKE3(canonical_json({ "deps"?, "mode", "source" })))
//! ```
//!
//! `deps` is the directive text exactly as written, present only for
//! dependency-resolved builds. The key names the artifact directory and is
//! the only invalidation mechanism: any change in source or dependencies
//! produces a fresh directory, and old directories are never touched.

use serde::{Deserialize, Serialize};

use crate::build::BuildMode;
use crate::prepare::PreparedSource;

/// Hex-encoded BLAKE3 digest naming a build artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Computes the key for a prepared source.
    pub fn compute(mode: BuildMode, deps: Option<&str>, source: &PreparedSource) -> Self {
        let canonical = canonical_material(mode, deps, source.as_str());
        Self(blake3::hash(canonical.as_bytes()).to_hex().to_string())
    }

    /// The 64-character lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical JSON encoding of the key material.
///
/// Keys are inserted in sorted order so the encoding is the same whether or
/// not `serde_json` preserves insertion order.
fn canonical_material(mode: BuildMode, deps: Option<&str>, source: &str) -> String {
    let mut material = serde_json::Map::new();
    if let Some(deps) = deps {
        material.insert("deps".into(), deps.into());
    }
    material.insert("mode".into(), mode.tag().into());
    material.insert("source".into(), source.into());
    serde_json::Value::Object(material).to_string()
}
