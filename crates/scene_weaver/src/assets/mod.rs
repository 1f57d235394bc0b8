//! Preloaded asset graphs
//!
//! Assets are RON documents describing a node hierarchy. They are loaded once
//! per URL into an [`AssetStore`] and instantiated into live nodes through
//! [`crate::Stage::instantiate`].

mod document;
mod store;

pub use document::{AssetDocument, AssetGeometry, AssetGraph, AssetMaterial, AssetMaterialKind, AssetNode};
pub use store::{AssetError, AssetLoader, AssetStore, MemoryAssetLoader, RonAssetLoader};
