//! Building live nodes from preloaded asset graphs

use log::debug;

use super::Stage;
use crate::assets::{AssetError, AssetGeometry, AssetMaterial, AssetMaterialKind, AssetNode};
use crate::descriptor::{Descriptor, PropValue};
use crate::foundation::math::Vec3;
use crate::scene::{Euler, Geometry, GeometryKind, Material, MaterialKind, NodeId, Object3D};

impl Stage {
    /// Build live nodes for the sub-tree named `name` inside the asset at `url`.
    ///
    /// The asset must have been preloaded. Every call builds fresh nodes, so
    /// the same sub-tree can be instantiated any number of times.
    pub fn instantiate(&mut self, url: &str, name: &str) -> Result<NodeId, AssetError> {
        let node = self
            .assets
            .get(url)?
            .node(name)
            .cloned()
            .ok_or_else(|| AssetError::MissingNode {
                url: url.to_string(),
                name: name.to_string(),
            })?;
        let id = self.build_asset_node(&node);
        debug!("instantiated '{name}' from '{url}'");
        Ok(id)
    }

    fn build_asset_node(&mut self, node: &AssetNode) -> NodeId {
        let mut object = match &node.geometry {
            Some(geometry) => {
                let material = self.asset_material(node.material.as_ref());
                Object3D::mesh(asset_geometry(geometry), vec![material])
            }
            None => Object3D::group(),
        };
        object.name.clone_from(&node.name);
        object.position = Vec3::from(node.position);
        object.rotation = Euler::new(node.rotation[0], node.rotation[1], node.rotation[2]);
        object.scale = Vec3::from(node.scale);

        let id = self.graph.insert(object);
        for child in &node.children {
            let child_id = self.build_asset_node(child);
            self.graph.add_child(id, child_id);
        }
        id
    }

    fn asset_material(&mut self, material: Option<&AssetMaterial>) -> Material {
        let Some(material) = material else {
            return Material::new(MaterialKind::Standard);
        };
        let kind = match material.kind {
            AssetMaterialKind::Basic => MaterialKind::Basic,
            AssetMaterialKind::Standard => MaterialKind::Standard,
            AssetMaterialKind::Lambert => MaterialKind::Lambert,
            AssetMaterialKind::Phong => MaterialKind::Phong,
            AssetMaterialKind::Toon => MaterialKind::Toon,
        };
        // Colors go through the applier so they get the same sRGB handling as
        // descriptor input.
        let mut descriptor = Descriptor::new().with("name", material.name.as_str());
        if let Some(color) = material.color {
            descriptor.set("color", color);
        }
        if let Some(roughness) = material.roughness {
            descriptor.set("roughness", roughness);
        }
        if let Some(metalness) = material.metalness {
            descriptor.set("metalness", metalness);
        }
        self.material(kind, descriptor)
    }
}

fn asset_geometry(geometry: &AssetGeometry) -> Geometry {
    let kind = match geometry {
        AssetGeometry::Box { width, height, depth } => GeometryKind::Box {
            width: *width,
            height: *height,
            depth: *depth,
        },
        AssetGeometry::Sphere { radius } => GeometryKind::sphere_from_args(&[PropValue::Number(*radius)]),
        AssetGeometry::Plane { width, height } => GeometryKind::Plane {
            width: *width,
            height: *height,
        },
        AssetGeometry::Buffer { positions } => GeometryKind::Buffer {
            positions: positions.clone(),
        },
    };
    Geometry::new(kind)
}

#[cfg(test)]
mod tests {
    use crate::assets::{AssetError, MemoryAssetLoader};
    use crate::construct::Stage;
    use approx::assert_relative_eq;

    const LAMP: &str = r#"(
        scene: (
            name: "lamp",
            children: [
                (
                    name: "base",
                    geometry: Some(Box(width: 1.0, height: 0.2, depth: 1.0)),
                    material: Some((name: "brass", kind: Standard, color: Some(0xffffff), metalness: Some(1.0))),
                    children: [
                        (name: "bulb", geometry: Some(Sphere(radius: 0.3)), position: (0.0, 1.0, 0.0)),
                    ],
                ),
            ],
        ),
    )"#;

    #[test]
    fn test_instantiate_builds_subtree() {
        let mut stage = Stage::new();
        stage
            .preload("lamp.ron", &MemoryAssetLoader::new().with("lamp.ron", LAMP))
            .unwrap();
        let base = stage.instantiate("lamp.ron", "base").unwrap();
        let node = stage.graph().get(base).unwrap();
        assert_eq!(node.name, "base");
        let material = &node.mesh_data().unwrap().materials[0];
        assert_eq!(material.name, "brass");
        assert_relative_eq!(material.metalness, 1.0);
        assert_eq!(node.children().len(), 1);

        let bulb = stage.graph().find_by_name(base, "bulb").unwrap();
        assert_relative_eq!(stage.graph().get(bulb).unwrap().position.y, 1.0);

        // Fresh nodes on every call
        let again = stage.instantiate("lamp.ron", "base").unwrap();
        assert_ne!(base, again);
    }

    #[test]
    fn test_instantiate_errors() {
        let mut stage = Stage::new();
        assert!(matches!(stage.instantiate("lamp.ron", "base"), Err(AssetError::NotLoaded(_))));
        stage
            .preload("lamp.ron", &MemoryAssetLoader::new().with("lamp.ron", LAMP))
            .unwrap();
        assert!(matches!(
            stage.instantiate("lamp.ron", "shade"),
            Err(AssetError::MissingNode { ref name, .. }) if name == "shade"
        ));
    }
}
