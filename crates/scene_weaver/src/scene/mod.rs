//! Live scene-graph objects
//!
//! Everything a descriptor can be applied to: nodes ([`Object3D`]) owned by a
//! [`SceneGraph`], and the geometry, material, texture and light values they
//! carry.

mod color;
mod geometry;
mod graph;
mod helper;
mod light;
mod material;
mod object;
mod texture;
mod values;

pub use color::{linear_to_srgb, srgb_to_linear, Color, ColorSpace, LEGACY_LINEAR_ENCODING, LEGACY_SRGB_ENCODING};
pub use geometry::{Geometry, GeometryKind};
pub use graph::{NodeId, SceneGraph};
pub use helper::Helper;
pub use light::{Light, LightKind};
pub use material::{Material, MaterialKind, Side};
pub use object::{MeshData, Object3D, ObjectKind, PointerEvent};
pub use texture::Texture;
pub use values::{Euler, LayerMask, Layers};
