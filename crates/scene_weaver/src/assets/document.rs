//! Parsed asset documents and their name index

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Shape of an asset mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetGeometry {
    /// Box with full extents
    Box {
        /// Size along X
        width: f32,
        /// Size along Y
        height: f32,
        /// Size along Z
        depth: f32,
    },
    /// Sphere
    Sphere {
        /// Radius
        radius: f32,
    },
    /// XY plane
    Plane {
        /// Size along X
        width: f32,
        /// Size along Y
        height: f32,
    },
    /// Raw positions (xyz triples)
    Buffer {
        /// Flat position array
        positions: Vec<f32>,
    },
}

/// Material model of an asset material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetMaterialKind {
    /// Unlit
    Basic,
    /// Physically based
    #[default]
    Standard,
    /// Diffuse
    Lambert,
    /// Specular
    Phong,
    /// Cel shaded
    Toon,
}

/// A named material inside an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMaterial {
    /// Name used for lookup (empty names are not indexed)
    #[serde(default)]
    pub name: String,
    /// Material model
    #[serde(default)]
    pub kind: AssetMaterialKind,
    /// Base color as `0xRRGGBB` (sRGB)
    #[serde(default)]
    pub color: Option<u32>,
    /// Roughness (standard only)
    #[serde(default)]
    pub roughness: Option<f32>,
    /// Metalness (standard only)
    #[serde(default)]
    pub metalness: Option<f32>,
}

/// One node of an asset hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetNode {
    /// Name used for lookup (empty names are not indexed)
    #[serde(default)]
    pub name: String,
    /// Mesh shape; `None` for plain groups
    #[serde(default)]
    pub geometry: Option<AssetGeometry>,
    /// Mesh material
    #[serde(default)]
    pub material: Option<AssetMaterial>,
    /// Local translation
    #[serde(default)]
    pub position: [f32; 3],
    /// Local rotation (XYZ Euler radians)
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    /// Child nodes
    #[serde(default)]
    pub children: Vec<AssetNode>,
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// A complete asset file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDocument {
    /// Top-level node
    pub scene: AssetNode,
}

/// A loaded asset with every named node and first-seen named material indexed
#[derive(Debug, Clone, PartialEq)]
pub struct AssetGraph {
    document: AssetDocument,
    nodes: HashMap<String, AssetNode>,
    materials: HashMap<String, AssetMaterial>,
}

impl AssetGraph {
    /// Index a document
    pub fn new(document: AssetDocument) -> Self {
        let mut nodes = HashMap::new();
        let mut materials = HashMap::new();
        let mut stack = vec![&document.scene];
        while let Some(node) = stack.pop() {
            if !node.name.is_empty() {
                nodes.insert(node.name.clone(), node.clone());
            }
            if let Some(material) = &node.material {
                if !material.name.is_empty() && !materials.contains_key(&material.name) {
                    materials.insert(material.name.clone(), material.clone());
                }
            }
            stack.extend(node.children.iter().rev());
        }
        Self {
            document,
            nodes,
            materials,
        }
    }

    /// Root node of the document
    pub fn scene(&self) -> &AssetNode {
        &self.document.scene
    }

    /// Named node lookup
    pub fn node(&self, name: &str) -> Option<&AssetNode> {
        self.nodes.get(name)
    }

    /// Named material lookup
    pub fn material(&self, name: &str) -> Option<&AssetMaterial> {
        self.materials.get(name)
    }

    /// Names of every indexed node
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROBOT: &str = r#"(
        scene: (
            name: "robot",
            children: [
                (
                    name: "head",
                    geometry: Some(Sphere(radius: 0.5)),
                    material: Some((name: "paint", color: Some(0xff0000))),
                    position: (0.0, 1.5, 0.0),
                ),
                (
                    name: "body",
                    geometry: Some(Box(width: 1.0, height: 2.0, depth: 0.5)),
                    material: Some((name: "paint", color: Some(0x00ff00))),
                ),
            ],
        ),
    )"#;

    #[test]
    fn test_index_named_nodes_and_first_material() {
        let document: AssetDocument = ron::from_str(ROBOT).unwrap();
        let graph = AssetGraph::new(document);
        assert!(graph.node("robot").is_some());
        assert_eq!(graph.node("head").unwrap().position, [0.0, 1.5, 0.0]);
        assert_eq!(graph.node("body").unwrap().scale, [1.0, 1.0, 1.0]);
        // First-seen wins
        assert_eq!(graph.material("paint").unwrap().color, Some(0xff0000));
        assert_eq!(graph.node_names().count(), 3);
    }
}
