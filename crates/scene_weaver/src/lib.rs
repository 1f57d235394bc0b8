//! # Scene Weaver
//!
//! Declarative scene-graph construction on top of a retained node arena.
//!
//! ## Features
//!
//! - **Descriptors**: plain data (attributes, positional `args`, children) handed to every constructor
//! - **Property Reconciliation**: dashed nested paths, structured values, reset-to-default
//! - **Node Constructors**: geometries, materials, meshes, groups, lights and helpers
//! - **Picking**: camera raycasts with hover enter/move/exit and click dispatch
//! - **Frame Loop**: per-node `render` callbacks, resize notification, cooperative stop
//! - **Assets**: RON scene documents preloaded by URL and instantiated by name
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_weaver::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stage = Stage::new();
//!     let geometry = stage.box_geometry(Descriptor::new().args([1.0_f32, 1.0, 1.0]));
//!     let material = stage.standard_material(Descriptor::new().with("color", "orange"));
//!     let cube = stage.mesh(
//!         MeshArgs::new(geometry, material).with_descriptor(
//!             Descriptor::new()
//!                 .with("rotation-y", 0.5_f32)
//!                 .with("render", PropValue::on_frame(|node, t| node.rotation.x = (t / 1000.0) as f32)),
//!         ),
//!     );
//!     let light = stage.point_light(Descriptor::new().with("position", vec![2.0_f32, 4.0, 6.0]));
//!
//!     let mut canvas = stage.assemble([cube, light], HeadlessSurface::new(), Viewport::new(800, 600))?;
//!     canvas.run([HostEvent::Frame(0.0), HostEvent::PointerMove { x: 400.0, y: 300.0 }, HostEvent::Close])?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod descriptor;
pub mod reconcile;
pub mod scene;
pub mod construct;
pub mod render;
pub mod picking;
pub mod assets;
pub mod canvas;

pub use canvas::{Canvas, CanvasError, HostEvent, MountTarget, StopHandle};
pub use construct::{MeshArgs, Stage};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, AssetLoader, AssetStore, MemoryAssetLoader, RonAssetLoader},
        config::{Config, StageConfig},
        descriptor::{Descriptor, Element, PropValue},
        foundation::math::{Mat4, Vec3},
        picking::Intersection,
        reconcile::{Reconciler, Reflect},
        render::{Camera, HeadlessSurface, RenderSurface, Viewport, WorldViewport},
        scene::{Color, NodeId, Object3D, PointerEvent, SceneGraph},
        Canvas, CanvasError, HostEvent, MeshArgs, MountTarget, Stage, StopHandle,
    };
}
