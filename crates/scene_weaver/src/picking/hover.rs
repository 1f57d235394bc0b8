//! Hover-set reconciliation and pointer-event dispatch

use slotmap::SecondaryMap;

use crate::scene::{NodeId, PointerEvent, SceneGraph};

use super::raycaster::Intersection;

/// Nodes currently under the pointer, with their latest hit record.
///
/// Membership always equals the intersection set of the most recent
/// [`HoverSet::reconcile`] call.
#[derive(Debug, Default)]
pub struct HoverSet {
    hovered: SecondaryMap<NodeId, Intersection>,
}

impl HoverSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a node is hovered
    pub fn contains(&self, id: NodeId) -> bool {
        self.hovered.contains_key(id)
    }

    /// Last hit record of a hovered node
    pub fn get(&self, id: NodeId) -> Option<&Intersection> {
        self.hovered.get(id)
    }

    /// Number of hovered nodes
    pub fn len(&self) -> usize {
        self.hovered.len()
    }

    /// Whether nothing is hovered
    pub fn is_empty(&self) -> bool {
        self.hovered.is_empty()
    }

    /// Hovered node ids
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hovered.keys()
    }

    /// Diff `hits` (nearest first) against the current members and fire
    /// callbacks: every exit first, then for each hit in order an enter (if
    /// new) followed by a move. Returns how many handlers ran.
    pub fn reconcile(&mut self, graph: &mut SceneGraph, hits: &[Intersection]) -> usize {
        let mut fired = 0;

        let gone: Vec<(NodeId, Intersection)> = self
            .hovered
            .iter()
            .filter(|(id, _)| !hits.iter().any(|h| h.object == *id))
            .map(|(id, hit)| (id, *hit))
            .collect();
        for (id, last) in gone {
            self.hovered.remove(id);
            fired += usize::from(dispatch(graph, id, PointerEvent::Out, &last));
        }

        for hit in hits {
            let entered = self.hovered.insert(hit.object, *hit).is_none();
            if entered {
                fired += usize::from(dispatch(graph, hit.object, PointerEvent::Over, hit));
            }
            fired += usize::from(dispatch(graph, hit.object, PointerEvent::Move, hit));
        }

        log::trace!("hover reconcile: {} hovered, {fired} handlers", self.hovered.len());
        fired
    }

    /// Empty the set, firing an exit for every member
    pub fn clear(&mut self, graph: &mut SceneGraph) -> usize {
        self.reconcile(graph, &[])
    }
}

/// Fire a click-style event on the nearest hit only
pub fn dispatch_nearest(graph: &mut SceneGraph, event: PointerEvent, hits: &[Intersection]) -> bool {
    hits.first()
        .is_some_and(|hit| dispatch(graph, hit.object, event, hit))
}

fn dispatch(graph: &mut SceneGraph, id: NodeId, event: PointerEvent, hit: &Intersection) -> bool {
    graph.get_mut(id).is_some_and(|node| node.dispatch(event, hit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::PropValue;
    use crate::foundation::math::Vec3;
    use crate::reconcile::Reflect;
    use crate::scene::Object3D;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, &'static str)>>>;

    fn tracked(graph: &mut SceneGraph, name: &str, log: &Log) -> NodeId {
        let mut node = Object3D::group();
        node.name = name.to_string();
        for (key, tag) in [("onPointerOver", "over"), ("onPointerOut", "out"), ("onPointerMove", "move")] {
            let log = Rc::clone(log);
            node.bind_handler(
                key,
                PropValue::on_pointer(move |n, _| log.borrow_mut().push((n.name.clone(), tag))),
            )
            .unwrap();
        }
        graph.insert(node)
    }

    fn hit(object: NodeId, distance: f32) -> Intersection {
        Intersection {
            object,
            distance,
            point: Vec3::zeros(),
        }
    }

    #[test]
    fn test_enter_move_exit_sequence() {
        let log: Log = Rc::default();
        let mut graph = SceneGraph::new();
        let a = tracked(&mut graph, "a", &log);
        let b = tracked(&mut graph, "b", &log);
        let mut hover = HoverSet::new();

        hover.reconcile(&mut graph, &[hit(a, 1.0), hit(b, 2.0)]);
        assert_eq!(
            *log.borrow(),
            [
                ("a".to_string(), "over"),
                ("a".to_string(), "move"),
                ("b".to_string(), "over"),
                ("b".to_string(), "move"),
            ]
        );
        log.borrow_mut().clear();

        hover.reconcile(&mut graph, &[hit(b, 2.0)]);
        assert_eq!(*log.borrow(), [("a".to_string(), "out"), ("b".to_string(), "move")]);
        assert!(!hover.contains(a));
        assert!(hover.contains(b));
    }

    #[test]
    fn test_membership_equals_last_hits() {
        let log: Log = Rc::default();
        let mut graph = SceneGraph::new();
        let ids: Vec<NodeId> = (0..4).map(|i| tracked(&mut graph, &i.to_string(), &log)).collect();
        let mut hover = HoverSet::new();
        for round in [vec![0, 1], vec![1, 2, 3], vec![], vec![3]] {
            let hits: Vec<Intersection> = round.iter().map(|i| hit(ids[*i], 1.0)).collect();
            hover.reconcile(&mut graph, &hits);
            let mut members: Vec<NodeId> = hover.ids().collect();
            let mut expected: Vec<NodeId> = round.iter().map(|i| ids[*i]).collect();
            members.sort();
            expected.sort();
            assert_eq!(members, expected);
        }
    }

    #[test]
    fn test_nearest_only_for_clicks() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let mut graph = SceneGraph::new();
        let mut ids = Vec::new();
        for name in ["near", "far"] {
            let mut node = Object3D::group();
            node.name = name.to_string();
            let clicked = Rc::clone(&clicked);
            node.bind_handler("onClick", PropValue::on_pointer(move |n, _| clicked.borrow_mut().push(n.name.clone())))
                .unwrap();
            ids.push(graph.insert(node));
        }
        assert!(dispatch_nearest(&mut graph, PointerEvent::Click, &[hit(ids[0], 1.0), hit(ids[1], 2.0)]));
        assert_eq!(*clicked.borrow(), ["near"]);
        assert!(!dispatch_nearest(&mut graph, PointerEvent::Click, &[]));
    }
}
