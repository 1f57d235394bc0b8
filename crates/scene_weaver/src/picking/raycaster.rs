//! Recursive ray intersection against the scene graph

use crate::foundation::math::Vec3;
use crate::scene::{Layers, NodeId, SceneGraph};

use super::primitives::Ray;

/// One ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Node that was hit
    pub object: NodeId,
    /// World-space distance from the ray origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

/// Casts rays against meshes in a subtree
#[derive(Debug, Clone)]
pub struct Raycaster {
    /// World-space ray
    pub ray: Ray,
    /// Hits closer than this are ignored
    pub near: f32,
    /// Hits farther than this are ignored
    pub far: f32,
    /// Only nodes sharing a channel with these layers are tested
    pub layers: Layers,
}

impl Raycaster {
    /// Raycaster with an unbounded range on the default layer
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            near: 0.0,
            far: f32::INFINITY,
            layers: Layers::default(),
        }
    }

    /// Every mesh hit under `root` (root included), nearest first.
    ///
    /// A node with `visible == false` is skipped together with its whole
    /// subtree, even when its layers match, so hidden meshes never receive
    /// hover or click events. Hits at equal distance keep traversal order.
    pub fn intersect(&self, graph: &SceneGraph, root: NodeId) -> Vec<Intersection> {
        let mut hits = Vec::new();
        self.collect(graph, root, &mut hits);
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn collect(&self, graph: &SceneGraph, id: NodeId, hits: &mut Vec<Intersection>) {
        let Some(node) = graph.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        if node.layers.test(&self.layers) {
            if let Some(hit) = self.intersect_node(graph, id) {
                hits.push(hit);
            }
        }
        for child in node.children() {
            self.collect(graph, *child, hits);
        }
    }

    fn intersect_node(&self, graph: &SceneGraph, id: NodeId) -> Option<Intersection> {
        let bounds = graph.get(id)?.mesh_data()?.geometry.bounds()?;
        let world = graph.world_matrix(id);
        let inverse = world.try_inverse()?;

        let local_ray = self.ray.transformed(&inverse)?;
        let t = bounds.intersect_ray(&local_ray)?;
        let local_point = local_ray.point_at(t);

        let point = (world * local_point.push(1.0)).xyz();
        let distance = (point - self.ray.origin).norm();
        if distance < self.near || distance > self.far {
            return None;
        }
        Some(Intersection {
            object: id,
            distance,
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Geometry, GeometryKind, Material, MaterialKind, Object3D};
    use approx::assert_relative_eq;

    fn cube_at(graph: &mut SceneGraph, z: f32) -> NodeId {
        let mut cube = Object3D::mesh(
            Geometry::new(GeometryKind::box_from_args(&[])),
            vec![Material::new(MaterialKind::Basic)],
        );
        cube.position = Vec3::new(0.0, 0.0, z);
        graph.insert(cube)
    }

    fn forward_ray() -> Raycaster {
        Raycaster::new(Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0)))
    }

    #[test]
    fn test_hits_sorted_nearest_first() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Object3D::group());
        let far = cube_at(&mut graph, -2.0);
        let near = cube_at(&mut graph, 2.0);
        graph.add_child(root, far);
        graph.add_child(root, near);

        let hits = forward_ray().intersect(&graph, root);
        assert_eq!(hits.iter().map(|h| h.object).collect::<Vec<_>>(), [near, far]);
        assert_relative_eq!(hits[0].distance, 7.5, epsilon = 1e-4);
        assert_relative_eq!(hits[0].point, Vec3::new(0.0, 0.0, 2.5), epsilon = 1e-4);
    }

    #[test]
    fn test_parent_transform_applies() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Object3D::group());
        let cube = cube_at(&mut graph, 0.0);
        graph.add_child(root, cube);
        graph.get_mut(root).unwrap().position = Vec3::new(5.0, 0.0, 0.0);
        assert!(forward_ray().intersect(&graph, root).is_empty());

        graph.get_mut(root).unwrap().scale = Vec3::new(20.0, 1.0, 1.0);
        graph.get_mut(root).unwrap().position = Vec3::zeros();
        assert_eq!(forward_ray().intersect(&graph, root).len(), 1);
    }

    #[test]
    fn test_layers_and_visibility_filter() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Object3D::group());
        let a = cube_at(&mut graph, 0.0);
        let b = cube_at(&mut graph, 3.0);
        graph.add_child(root, a);
        graph.add_child(root, b);
        graph.get_mut(a).unwrap().layers = Layers::only(1);
        graph.get_mut(b).unwrap().visible = false;
        assert!(forward_ray().intersect(&graph, root).is_empty());

        let mut caster = forward_ray();
        caster.layers.enable(1);
        assert_eq!(caster.intersect(&graph, root).len(), 1);
    }

    #[test]
    fn test_hidden_parent_hides_visible_children() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Object3D::group());
        let holder = graph.insert(Object3D::group());
        let cube = cube_at(&mut graph, 0.0);
        graph.add_child(root, holder);
        graph.add_child(holder, cube);
        graph.get_mut(holder).unwrap().visible = false;
        assert!(forward_ray().intersect(&graph, root).is_empty());

        graph.get_mut(holder).unwrap().visible = true;
        assert_eq!(forward_ray().intersect(&graph, root).len(), 1);
    }

    #[test]
    fn test_equal_distances_keep_traversal_order() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Object3D::group());
        let first = cube_at(&mut graph, 0.0);
        let second = cube_at(&mut graph, 0.0);
        graph.add_child(root, first);
        graph.add_child(root, second);
        let hits = forward_ray().intersect(&graph, root);
        assert_eq!(hits[0].object, first);
        assert_eq!(hits[1].object, second);
    }
}
