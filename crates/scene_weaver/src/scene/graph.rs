//! Arena-backed scene graph
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]; parent
//! and child links are kept consistent by [`SceneGraph::add_child`] and
//! [`SceneGraph::detach`].

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Mat4;

use super::object::Object3D;

new_key_type! {
    /// Stable identity of a live node
    pub struct NodeId;
}

/// Owner of every live node
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Object3D>,
}

impl SceneGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a detached node
    pub fn insert(&mut self, mut object: Object3D) -> NodeId {
        object.parent = None;
        object.children.clear();
        self.nodes.insert(object)
    }

    /// Node lookup
    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.nodes.get(id)
    }

    /// Mutable node lookup
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.nodes.get_mut(id)
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a node in insertion order (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    ///
    /// Returns `false` (and changes nothing) if either id is dead, if they are
    /// equal or if `child` is an ancestor of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.ancestors(parent).any(|a| a == child) {
            log::warn!("refusing to attach a node beneath its own descendant");
            return false;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Remove a node from its parent's children (the node itself stays alive)
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes.get_mut(child).and_then(|node| node.parent.take()) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
    }

    /// Walk from a node's parent up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes.get(id).and_then(|n| n.parent), move |current| {
            self.nodes.get(*current).and_then(|n| n.parent)
        })
    }

    /// Depth-first pre-order listing of `root` and its descendants
    pub fn traverse(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// Local-to-world transform (parent chain applied)
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes.get(id).map_or_else(Mat4::identity, Object3D::local_matrix);
        for ancestor in self.ancestors(id) {
            if let Some(node) = self.nodes.get(ancestor) {
                matrix = node.local_matrix() * matrix;
            }
        }
        matrix
    }

    /// Whether a node and all its ancestors are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let self_visible = self.nodes.get(id).is_some_and(|n| n.visible);
        self_visible && self.ancestors(id).all(|a| self.nodes.get(a).is_some_and(|n| n.visible))
    }

    /// First node in the subtree of `root` with the given name
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.traverse(root)
            .into_iter()
            .find(|id| self.nodes.get(*id).is_some_and(|n| n.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    fn named(graph: &mut SceneGraph, name: &str) -> NodeId {
        let mut node = Object3D::group();
        node.name = name.to_string();
        graph.insert(node)
    }

    #[test]
    fn test_reparenting_moves_child() {
        let mut graph = SceneGraph::new();
        let a = named(&mut graph, "a");
        let b = named(&mut graph, "b");
        let c = named(&mut graph, "c");
        assert!(graph.add_child(a, c));
        assert!(graph.add_child(b, c));
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.children(b), [c]);
        assert_eq!(graph.get(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_cycles_refused() {
        let mut graph = SceneGraph::new();
        let a = named(&mut graph, "a");
        let b = named(&mut graph, "b");
        assert!(graph.add_child(a, b));
        assert!(!graph.add_child(b, a));
        assert!(!graph.add_child(a, a));
    }

    #[test]
    fn test_traverse_is_preorder() {
        let mut graph = SceneGraph::new();
        let root = named(&mut graph, "root");
        let x = named(&mut graph, "x");
        let x1 = named(&mut graph, "x1");
        let y = named(&mut graph, "y");
        graph.add_child(root, x);
        graph.add_child(x, x1);
        graph.add_child(root, y);
        assert_eq!(graph.traverse(root), [root, x, x1, y]);
        assert_eq!(graph.find_by_name(root, "y"), Some(y));
        graph.detach(x);
        assert_eq!(graph.traverse(root), [root, y]);
        assert_eq!(graph.traverse(x), [x, x1]);
    }

    #[test]
    fn test_world_matrix_chains_parents() {
        let mut graph = SceneGraph::new();
        let parent = named(&mut graph, "p");
        let child = named(&mut graph, "c");
        graph.add_child(parent, child);
        graph.get_mut(parent).unwrap().position = Vec3::new(1.0, 0.0, 0.0);
        graph.get_mut(parent).unwrap().scale = Vec3::new(2.0, 2.0, 2.0);
        graph.get_mut(child).unwrap().position = Vec3::new(0.0, 1.0, 0.0);

        let origin = graph.world_matrix(child).project_point(&Vec3::zeros()).unwrap();
        assert_relative_eq!(origin, Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_hidden_ancestor_hides_subtree() {
        let mut graph = SceneGraph::new();
        let parent = named(&mut graph, "p");
        let child = named(&mut graph, "c");
        graph.add_child(parent, child);
        assert!(graph.is_visible(child));
        graph.get_mut(parent).unwrap().visible = false;
        assert!(!graph.is_visible(child));
    }
}
