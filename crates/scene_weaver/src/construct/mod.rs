//! # Node Construction
//!
//! A [`Stage`] owns the scene arena while nodes are being built, together with
//! the property applier and the asset store. Each constructor builds the
//! runtime object from the descriptor's positional `args`, then applies the
//! remaining attributes. When a descriptor carries children, the primary node
//! is wrapped: a group receives the attributes, the primary node and the
//! children (in that order), and the group is what the constructor returns.
//!
//! ```
//! use scene_weaver::prelude::*;
//!
//! let mut stage = Stage::new();
//! let geometry = stage.box_geometry(Descriptor::new().args([1.0_f32, 1.0, 1.0]));
//! let material = stage.standard_material(Descriptor::new().with("color", "red"));
//! let cube = stage.mesh(MeshArgs::new(geometry, material).with_descriptor(Descriptor::new().with("position-x", 2.0_f32)));
//! assert!(stage.graph().get(cube).is_some());
//! ```

mod instantiate;

use log::{debug, warn};

use crate::assets::{AssetError, AssetLoader, AssetStore};
use crate::canvas::{Canvas, CanvasError};
use crate::config::{Config, ConfigError, StageConfig};
use crate::descriptor::{Descriptor, Element};
use crate::reconcile::Reconciler;
use crate::render::{RenderSurface, Viewport};
use crate::scene::{
    Color, Geometry, GeometryKind, Helper, Light, LightKind, Material, MaterialKind, NodeId, Object3D, ObjectKind,
    SceneGraph,
};

/// Typed arguments of [`Stage::mesh`]
#[derive(Debug, Clone)]
pub struct MeshArgs {
    /// Shape
    pub geometry: Geometry,
    /// One material, or one per geometry group; empty means a default basic material
    pub materials: Vec<Material>,
    /// Attributes and children of the mesh
    pub descriptor: Descriptor,
}

impl MeshArgs {
    /// Single-material mesh with no attributes
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            materials: vec![material],
            descriptor: Descriptor::new(),
        }
    }

    /// Replace the descriptor (builder form)
    pub fn with_descriptor(mut self, descriptor: Descriptor) -> Self {
        self.descriptor = descriptor;
        self
    }
}

/// Construction context: node arena, property applier and asset store
#[derive(Debug)]
pub struct Stage {
    graph: SceneGraph,
    reconciler: Reconciler,
    assets: AssetStore,
    config: StageConfig,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    /// Stage with the default configuration
    pub fn new() -> Self {
        Self::build(StageConfig::default())
    }

    /// Stage with a custom configuration
    pub fn with_config(config: StageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Stage configured from a `.toml` or `.ron` file
    pub fn from_config_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        StageConfig::load_from_file(path).map(Self::build)
    }

    fn build(config: StageConfig) -> Self {
        Self {
            graph: SceneGraph::new(),
            reconciler: Reconciler::new(config.color_management),
            assets: AssetStore::new(),
            config,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Node arena
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable node arena
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Loaded assets
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Load an asset so that [`Stage::instantiate`] can use it
    pub fn preload(&mut self, url: &str, loader: &dyn AssetLoader) -> Result<(), AssetError> {
        self.assets.preload(url, loader).map(|_| ())
    }

    /// Apply a descriptor's attributes to an existing node. Returns `false`
    /// when the node does not exist.
    pub fn apply(&mut self, id: NodeId, descriptor: &Descriptor) -> bool {
        match self.graph.get_mut(id) {
            Some(node) => {
                self.reconciler.apply(node, descriptor);
                true
            }
            None => {
                warn!("apply: node {id:?} does not exist");
                false
            }
        }
    }

    // Geometries

    /// Box from `args = [width, height, depth]`
    pub fn box_geometry(&mut self, descriptor: Descriptor) -> Geometry {
        let kind = GeometryKind::box_from_args(descriptor.positional());
        self.geometry(kind, descriptor)
    }

    /// Sphere from `args = [radius, widthSegments, heightSegments]`
    pub fn sphere_geometry(&mut self, descriptor: Descriptor) -> Geometry {
        let kind = GeometryKind::sphere_from_args(descriptor.positional());
        self.geometry(kind, descriptor)
    }

    /// Plane from `args = [width, height]`
    pub fn plane_geometry(&mut self, descriptor: Descriptor) -> Geometry {
        let kind = GeometryKind::plane_from_args(descriptor.positional());
        self.geometry(kind, descriptor)
    }

    /// Raw buffer geometry from `args = [x0, y0, z0, x1, ...]`
    pub fn buffer_geometry(&mut self, descriptor: Descriptor) -> Geometry {
        let kind = GeometryKind::buffer_from_args(descriptor.positional());
        self.geometry(kind, descriptor)
    }

    fn geometry(&mut self, kind: GeometryKind, mut descriptor: Descriptor) -> Geometry {
        let mut geometry = Geometry::new(kind);
        drop_children(&mut descriptor, geometry.kind.type_name());
        self.reconciler.apply(&mut geometry, &descriptor);
        debug!("constructed {}", geometry.kind.type_name());
        geometry
    }

    // Materials

    /// Material of any kind; positional `args` are not used by materials
    pub fn material(&mut self, kind: MaterialKind, mut descriptor: Descriptor) -> Material {
        let mut material = Material::new(kind);
        if !descriptor.positional().is_empty() {
            debug!("{} ignores {} positional arguments", kind.type_name(), descriptor.positional().len());
        }
        drop_children(&mut descriptor, kind.type_name());
        self.reconciler.apply(&mut material, &descriptor);
        debug!("constructed {}", kind.type_name());
        material
    }

    /// Unlit material
    pub fn basic_material(&mut self, descriptor: Descriptor) -> Material {
        self.material(MaterialKind::Basic, descriptor)
    }

    /// Physically based material
    pub fn standard_material(&mut self, descriptor: Descriptor) -> Material {
        self.material(MaterialKind::Standard, descriptor)
    }

    /// Diffuse material
    pub fn lambert_material(&mut self, descriptor: Descriptor) -> Material {
        self.material(MaterialKind::Lambert, descriptor)
    }

    /// Specular material
    pub fn phong_material(&mut self, descriptor: Descriptor) -> Material {
        self.material(MaterialKind::Phong, descriptor)
    }

    /// Cel-shaded material
    pub fn toon_material(&mut self, descriptor: Descriptor) -> Material {
        self.material(MaterialKind::Toon, descriptor)
    }

    // Nodes

    /// Mesh node, wrapped in a group when the descriptor has children
    pub fn mesh(&mut self, args: MeshArgs) -> NodeId {
        let MeshArgs {
            geometry,
            mut materials,
            descriptor,
        } = args;
        if materials.is_empty() {
            materials.push(Material::new(MaterialKind::Basic));
        }
        self.finish(Object3D::mesh(geometry, materials), descriptor)
    }

    /// Group from a list of items, flattened one level.
    ///
    /// Node items become children in order. Descriptor items are applied to
    /// the group itself. Lists nested deeper than one level are skipped.
    pub fn group(&mut self, items: impl IntoIterator<Item = Element>) -> NodeId {
        let group = self.graph.insert(Object3D::group());
        for item in Element::flatten_once(items) {
            match item {
                Element::Node(child) => {
                    if !self.graph.add_child(group, child) {
                        warn!("group: cannot attach node {child:?}");
                    }
                }
                Element::Props(mut descriptor) => {
                    drop_children(&mut descriptor, "Group");
                    self.apply(group, &descriptor);
                }
                Element::List(inner) => {
                    warn!("group: skipping a list nested two levels deep ({} items)", inner.len());
                }
            }
        }
        debug!("constructed Group with {} children", self.graph.children(group).len());
        group
    }

    /// Ambient light from `args = [color, intensity]`
    pub fn ambient_light(&mut self, descriptor: Descriptor) -> NodeId {
        self.light(LightKind::Ambient, descriptor)
    }

    /// Hemisphere light from `args = [skyColor, groundColor, intensity]`
    pub fn hemisphere_light(&mut self, descriptor: Descriptor) -> NodeId {
        self.light(LightKind::Hemisphere, descriptor)
    }

    /// Point light from `args = [color, intensity, distance, decay]`.
    ///
    /// Without any `args` the light takes the configured fallback color.
    pub fn point_light(&mut self, descriptor: Descriptor) -> NodeId {
        self.light(LightKind::Point, descriptor)
    }

    /// Spot light from `args = [color, intensity, distance, angle, penumbra, decay]`
    pub fn spot_light(&mut self, descriptor: Descriptor) -> NodeId {
        self.light(LightKind::Spot, descriptor)
    }

    /// Directional light from `args = [color, intensity]`
    pub fn directional_light(&mut self, descriptor: Descriptor) -> NodeId {
        self.light(LightKind::Directional, descriptor)
    }

    fn light(&mut self, kind: LightKind, descriptor: Descriptor) -> NodeId {
        let color_managed = self.reconciler.color_management();
        let fallback = (kind == LightKind::Point).then(|| {
            let mut color = Color::BLACK;
            color.set_hex(self.config.point_light_fallback_color, color_managed);
            color
        });
        let light = Light::from_args(kind, descriptor.positional(), fallback, color_managed);
        self.finish(Object3D::light(light), descriptor)
    }

    /// Axes helper from `args = [size]`
    pub fn axes_helper(&mut self, descriptor: Descriptor) -> NodeId {
        let helper = Helper::axes(descriptor.positional());
        self.finish(Object3D::new(ObjectKind::Helper(helper)), descriptor)
    }

    /// Grid helper from `args = [size, divisions]`
    pub fn grid_helper(&mut self, descriptor: Descriptor) -> NodeId {
        let helper = Helper::grid(descriptor.positional());
        self.finish(Object3D::new(ObjectKind::Helper(helper)), descriptor)
    }

    /// Gizmo for a point light node, `args = [sphereSize]`. Returns `None`
    /// when `light` is not a point light.
    pub fn point_light_helper(&mut self, light: NodeId, descriptor: Descriptor) -> Option<NodeId> {
        if !self.is_light(light, LightKind::Point) {
            warn!("point light helper: node {light:?} is not a point light");
            return None;
        }
        let helper = Helper::point_light(light, descriptor.positional());
        Some(self.finish(Object3D::new(ObjectKind::Helper(helper)), descriptor))
    }

    /// Gizmo for a spot light node. Returns `None` when `light` is not a spot light.
    pub fn spot_light_helper(&mut self, light: NodeId, descriptor: Descriptor) -> Option<NodeId> {
        if !self.is_light(light, LightKind::Spot) {
            warn!("spot light helper: node {light:?} is not a spot light");
            return None;
        }
        let helper = Helper::SpotLight { light };
        Some(self.finish(Object3D::new(ObjectKind::Helper(helper)), descriptor))
    }

    fn is_light(&self, id: NodeId, kind: LightKind) -> bool {
        self.graph
            .get(id)
            .and_then(Object3D::light_data)
            .is_some_and(|light| light.kind == kind)
    }

    /// Insert the primary node and either apply the attributes to it or wrap
    /// it together with the children in a group that receives them.
    fn finish(&mut self, node: Object3D, mut descriptor: Descriptor) -> NodeId {
        let type_name = node.kind.type_name();
        let id = self.graph.insert(node);
        let has_children = descriptor.has_children();
        match descriptor.take_children() {
            Some(children) if has_children => {
                debug!("constructed {type_name}, wrapping with its children");
                self.group([Element::Props(descriptor), Element::Node(id), children])
            }
            _ => {
                self.apply(id, &descriptor);
                debug!("constructed {type_name}");
                id
            }
        }
    }

    /// Assemble the built nodes under a scene root with a camera and an
    /// output surface sized to `viewport`.
    pub fn assemble<S: RenderSurface>(
        self,
        roots: impl IntoIterator<Item = NodeId>,
        surface: S,
        viewport: Viewport,
    ) -> Result<Canvas<S>, CanvasError> {
        Canvas::assemble(self.graph, self.reconciler, self.assets, self.config, roots, surface, viewport)
    }
}

fn drop_children(descriptor: &mut Descriptor, holder: &str) {
    if descriptor.has_children() {
        warn!("{holder} cannot hold children; ignoring them");
    }
    descriptor.take_children();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PropValue;
    use crate::scene::srgb_to_linear;
    use approx::assert_relative_eq;

    fn red_mesh(stage: &mut Stage, descriptor: Descriptor) -> NodeId {
        let geometry = stage.box_geometry(Descriptor::new());
        let material = stage.basic_material(Descriptor::new().with("color", "red"));
        stage.mesh(MeshArgs::new(geometry, material).with_descriptor(descriptor))
    }

    #[test]
    fn test_leaf_mesh_with_red_material() {
        let mut stage = Stage::new();
        let id = red_mesh(&mut stage, Descriptor::new());
        let node = stage.graph().get(id).unwrap();
        assert!(node.children().is_empty());
        let color = node.mesh_data().unwrap().materials[0].color;
        assert_relative_eq!(color.r, 1.0);
        assert_relative_eq!(color.g, 0.0);
        assert_relative_eq!(color.b, 0.0);
    }

    #[test]
    fn test_mesh_with_child_is_wrapped() {
        let mut stage = Stage::new();
        let child = stage.axes_helper(Descriptor::new());
        let id = red_mesh(&mut stage, Descriptor::new().with("position-x", 3.0_f32).child(child));

        let group = stage.graph().get(id).unwrap();
        assert!(matches!(group.kind, ObjectKind::Group));
        let children = group.children();
        assert_eq!(children.len(), 2);
        assert!(stage.graph().get(children[0]).unwrap().mesh_data().is_some());
        assert_eq!(children[1], child);

        // Attributes land on the group, not on the mesh
        assert_relative_eq!(group.position.x, 3.0);
        assert_relative_eq!(stage.graph().get(children[0]).unwrap().position.x, 0.0);
    }

    #[test]
    fn test_group_flattens_one_level_and_merges_props() {
        let mut stage = Stage::new();
        let a = stage.axes_helper(Descriptor::new());
        let b = stage.grid_helper(Descriptor::new());
        let c = stage.axes_helper(Descriptor::new());
        let group = stage.group([
            Element::Node(a),
            Element::List(vec![Element::Node(b), Element::Props(Descriptor::new().with("name", "rig"))]),
            Element::List(vec![Element::List(vec![Element::Node(c)])]),
            Element::Props(Descriptor::new().with("visible", false)),
        ]);
        let node = stage.graph().get(group).unwrap();
        assert_eq!(node.children(), [a, b]);
        assert_eq!(node.name, "rig");
        assert!(!node.visible);
        assert!(stage.graph().get(c).unwrap().parent().is_none());
    }

    #[test]
    fn test_point_light_fallback_only_without_args() {
        let mut stage = Stage::new();
        let fallback = stage.point_light(Descriptor::new());
        let blue = stage.point_light(Descriptor::new().args([0x0000ff_u32]));
        let light = stage.graph().get(fallback).unwrap().light_data().unwrap();
        assert_eq!(light.color.to_hex(), 0xff0000);
        let light = stage.graph().get(blue).unwrap().light_data().unwrap();
        assert_eq!(light.color.to_hex(), 0x0000ff);
    }

    #[test]
    fn test_light_args_and_attributes() {
        let mut stage = Stage::new();
        let id = stage.spot_light(
            Descriptor::new()
                .args([PropValue::from("white"), PropValue::from(2.0_f32), PropValue::from(50.0_f32)])
                .with("position", vec![0.0_f32, 5.0, 0.0])
                .with("penumbra", 0.25_f32),
        );
        let node = stage.graph().get(id).unwrap();
        let light = node.light_data().unwrap();
        assert_relative_eq!(light.intensity, 2.0);
        assert_relative_eq!(light.distance, 50.0);
        assert_relative_eq!(light.penumbra, 0.25);
        assert_relative_eq!(node.position.y, 5.0);
    }

    #[test]
    fn test_light_helpers_check_their_light() {
        let mut stage = Stage::new();
        let point = stage.point_light(Descriptor::new());
        let spot = stage.spot_light(Descriptor::new());
        assert!(stage.point_light_helper(point, Descriptor::new().args([0.5_f32])).is_some());
        assert!(stage.point_light_helper(spot, Descriptor::new()).is_none());
        assert!(stage.spot_light_helper(spot, Descriptor::new()).is_some());
    }

    #[test]
    fn test_geometry_and_material_ignore_children() {
        let mut stage = Stage::new();
        let stray = stage.axes_helper(Descriptor::new());
        let geometry = stage.sphere_geometry(Descriptor::new().args([2.0_f32]).child(stray));
        assert!(matches!(geometry.kind, GeometryKind::Sphere { radius, .. } if radius == 2.0));
        let material = stage.phong_material(Descriptor::new().with("shininess", 80.0_f32).child(stray));
        assert_relative_eq!(material.shininess, 80.0);
        assert!(stage.graph().get(stray).unwrap().parent().is_none());
    }

    #[test]
    fn test_color_management_off_still_linearizes() {
        let config = StageConfig {
            color_management: false,
            ..StageConfig::default()
        };
        let mut stage = Stage::with_config(config).unwrap();
        let material = stage.standard_material(Descriptor::new().with("color", 0x808080_u32));
        assert_relative_eq!(material.color.r, srgb_to_linear(128.0 / 255.0), epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = StageConfig::default();
        config.camera.near = 0.0;
        assert!(Stage::with_config(config).is_err());
    }

    #[test]
    fn test_stage_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage.ron");
        std::fs::write(&path, "(point_light_fallback_color: 65280)").unwrap();
        let mut stage = Stage::from_config_file(&path).unwrap();
        let light = stage.point_light(Descriptor::new());
        let light = stage.graph().get(light).unwrap().light_data().unwrap();
        assert_eq!(light.color.to_hex(), 0x00ff00);

        std::fs::write(&path, "(camera: (near: 0.0))").unwrap();
        assert!(Stage::from_config_file(&path).is_err());
    }
}
