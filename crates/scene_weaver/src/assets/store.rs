//! Asset loading and lookup by URL

use std::collections::HashMap;
use std::path::PathBuf;

use super::document::{AssetDocument, AssetGraph};

/// Asset failures
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// Reading the asset failed
    #[error("failed to load asset '{url}': {reason}")]
    LoadFailed {
        /// Requested URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// The asset was read but is not a valid document
    #[error("failed to parse asset '{url}': {reason}")]
    Parse {
        /// Requested URL
        url: String,
        /// Underlying cause
        reason: String,
    },

    /// `get` before a successful `preload`
    #[error("asset '{0}' has not been preloaded")]
    NotLoaded(String),

    /// The asset has no node with that name
    #[error("asset '{url}' has no node named '{name}'")]
    MissingNode {
        /// Asset URL
        url: String,
        /// Requested node name
        name: String,
    },
}

/// Source of asset documents
pub trait AssetLoader {
    /// Load and parse the document at `url`
    fn load(&self, url: &str) -> Result<AssetDocument, AssetError>;
}

/// Loads RON documents from files under a base directory
#[derive(Debug, Clone, Default)]
pub struct RonAssetLoader {
    base_dir: PathBuf,
}

impl RonAssetLoader {
    /// Loader resolving URLs relative to `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl AssetLoader for RonAssetLoader {
    fn load(&self, url: &str) -> Result<AssetDocument, AssetError> {
        let path = self.base_dir.join(url);
        let contents = std::fs::read_to_string(&path).map_err(|e| AssetError::LoadFailed {
            url: url.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;
        parse_ron(url, &contents)
    }
}

/// Serves RON documents registered in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetLoader {
    sources: HashMap<String, String>,
}

impl MemoryAssetLoader {
    /// Empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register RON text under a URL (builder form)
    pub fn with(mut self, url: impl Into<String>, ron_text: impl Into<String>) -> Self {
        self.sources.insert(url.into(), ron_text.into());
        self
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load(&self, url: &str) -> Result<AssetDocument, AssetError> {
        let contents = self.sources.get(url).ok_or_else(|| AssetError::LoadFailed {
            url: url.to_string(),
            reason: "no such asset".to_string(),
        })?;
        parse_ron(url, contents)
    }
}

fn parse_ron(url: &str, contents: &str) -> Result<AssetDocument, AssetError> {
    ron::from_str(contents).map_err(|e| AssetError::Parse {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Loaded assets keyed by URL.
///
/// Entries live as long as the store. A later `preload` of the same URL
/// replaces the earlier entry.
#[derive(Debug, Default)]
pub struct AssetStore {
    graphs: HashMap<String, AssetGraph>,
}

impl AssetStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `url` through `loader` and index it. Failures are not retried and
    /// leave any previous entry in place.
    pub fn preload(&mut self, url: &str, loader: &dyn AssetLoader) -> Result<&AssetGraph, AssetError> {
        let document = loader.load(url).map_err(|err| {
            log::warn!("asset preload failed: {err}");
            err
        })?;
        let graph = AssetGraph::new(document);
        if self.graphs.contains_key(url) {
            log::debug!("replacing previously loaded asset '{url}'");
        }
        log::info!("loaded asset '{url}'");
        self.graphs.insert(url.to_string(), graph);
        self.get(url)
    }

    /// Previously preloaded asset
    pub fn get(&self, url: &str) -> Result<&AssetGraph, AssetError> {
        self.graphs.get(url).ok_or_else(|| AssetError::NotLoaded(url.to_string()))
    }

    /// Whether `url` is loaded
    pub fn contains(&self, url: &str) -> bool {
        self.graphs.contains_key(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = r#"(scene: (name: "root"))"#;

    #[test]
    fn test_get_before_preload_fails() {
        let store = AssetStore::new();
        assert_eq!(store.get("a.ron"), Err(AssetError::NotLoaded("a.ron".to_string())));
    }

    #[test]
    fn test_preload_then_get() {
        let loader = MemoryAssetLoader::new().with("a.ron", TINY);
        let mut store = AssetStore::new();
        store.preload("a.ron", &loader).unwrap();
        assert!(store.get("a.ron").unwrap().node("root").is_some());
    }

    #[test]
    fn test_failure_names_the_url() {
        let loader = MemoryAssetLoader::new().with("bad.ron", "(scene: ");
        let mut store = AssetStore::new();
        let missing = store.preload("missing.ron", &loader).unwrap_err();
        assert!(missing.to_string().contains("missing.ron"));
        let bad = store.preload("bad.ron", &loader).unwrap_err();
        assert!(matches!(bad, AssetError::Parse { ref url, .. } if url == "bad.ron"));
        assert!(!store.contains("bad.ron"));
    }

    #[test]
    fn test_later_load_replaces_entry() {
        let first = MemoryAssetLoader::new().with("a.ron", TINY);
        let second = MemoryAssetLoader::new().with("a.ron", r#"(scene: (name: "other"))"#);
        let mut store = AssetStore::new();
        store.preload("a.ron", &first).unwrap();
        store.preload("a.ron", &second).unwrap();
        assert!(store.get("a.ron").unwrap().node("other").is_some());
        assert!(store.get("a.ron").unwrap().node("root").is_none());
    }

    #[test]
    fn test_ron_file_loader_reports_path() {
        let loader = RonAssetLoader::new("/definitely/not/here");
        let err = loader.load("scene.ron").unwrap_err();
        assert!(matches!(err, AssetError::LoadFailed { ref url, .. } if url == "scene.ron"));
    }
}
