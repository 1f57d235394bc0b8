//! Descriptor model
//!
//! A [`Descriptor`] is the data-only description handed to every constructor:
//! an insertion-ordered bag of attributes, the reserved `args` slot (positional
//! constructor arguments) and the reserved `children` slot. The reserved slots
//! live in their own fields, so they can never be confused with attributes.

mod value;

pub use value::{Callback, FrameHandler, PointerHandler, PropValue, ResizeHandler};

use crate::scene::NodeId;

/// Key of the positional-argument slot
pub const ARGS_KEY: &str = "args";

/// Key of the children slot
pub const CHILDREN_KEY: &str = "children";

/// Data-only node description
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Descriptor {
    props: Vec<(String, PropValue)>,
    args: Vec<PropValue>,
    children: Option<Box<Element>>,
}

impl Descriptor {
    /// Empty descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute (builder form)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Set an attribute.
    ///
    /// Re-setting a key replaces its value in place, keeping its original
    /// position. The reserved `args`/`children` keys are refused here; use
    /// [`Descriptor::args`] and [`Descriptor::child`] instead.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        if key == ARGS_KEY || key == CHILDREN_KEY {
            log::warn!("descriptor key '{key}' is reserved; use the dedicated slot");
            return;
        }
        let value = value.into();
        match self.props.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.props.push((key, value)),
        }
    }

    /// Replace the positional constructor arguments
    pub fn args<I, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<PropValue>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Append one child (a node, a descriptor or a list)
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        let child = child.into();
        self.children = Some(Box::new(match self.children.take().map(|b| *b) {
            None => child,
            Some(Element::List(mut items)) => {
                items.push(child);
                Element::List(items)
            }
            Some(existing) => Element::List(vec![existing, child]),
        }));
        self
    }

    /// Replace the children slot
    pub fn children(mut self, children: impl Into<Element>) -> Self {
        self.children = Some(Box::new(children.into()));
        self
    }

    /// Attribute lookup
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.props.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Attributes in insertion order (reserved slots excluded)
    pub fn props(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether there are no attributes
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Positional constructor arguments
    pub fn positional(&self) -> &[PropValue] {
        &self.args
    }

    /// Whether the children slot holds anything (an empty list counts as nothing)
    pub fn has_children(&self) -> bool {
        match self.children.as_deref() {
            None => false,
            Some(Element::List(items)) => !items.is_empty(),
            Some(_) => true,
        }
    }

    /// Take the children slot, leaving it absent
    pub fn take_children(&mut self) -> Option<Element> {
        self.children.take().map(|b| *b)
    }
}

/// One item of a children slot or of a group's argument list
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    /// An already-constructed graph node
    Node(NodeId),
    /// Attributes to merge onto the containing group
    Props(Descriptor),
    /// Nested collection, flattened one level by groups
    List(Vec<Element>),
}

impl Element {
    /// Flatten one level: a list yields its items, anything else yields itself
    pub fn flatten_once(items: impl IntoIterator<Item = Element>) -> Vec<Element> {
        let mut flat = Vec::new();
        for item in items {
            match item {
                Self::List(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        flat
    }
}

impl From<NodeId> for Element {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<Descriptor> for Element {
    fn from(descriptor: Descriptor) -> Self {
        Self::Props(descriptor)
    }
}

impl From<Vec<Element>> for Element {
    fn from(items: Vec<Element>) -> Self {
        Self::List(items)
    }
}

impl From<Vec<NodeId>> for Element {
    fn from(ids: Vec<NodeId>) -> Self {
        Self::List(ids.into_iter().map(Self::Node).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_set_replaces_in_place() {
        let d = Descriptor::new()
            .with("a", 1.0_f32)
            .with("b", 2.0_f32)
            .with("a", 3.0_f32);
        let keys: Vec<&str> = d.props().map(|(k, _)| k).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(d.get("a"), Some(&PropValue::Number(3.0)));
    }

    #[test]
    fn test_reserved_keys_rejected_as_attributes() {
        let d = Descriptor::new().with("args", [1.0_f32]).with("children", "x");
        assert!(d.is_empty());
    }

    #[test]
    fn test_child_accumulates_into_list() {
        let mut ids: SlotMap<NodeId, ()> = SlotMap::with_key();
        let a = ids.insert(());
        let b = ids.insert(());
        let d = Descriptor::new().child(a).child(b);
        assert!(d.has_children());
        assert_eq!(
            d.clone().take_children(),
            Some(Element::List(vec![Element::Node(a), Element::Node(b)]))
        );
        assert!(!Descriptor::new().children(Vec::<Element>::new()).has_children());
    }

    #[test]
    fn test_flatten_once_keeps_deeper_lists() {
        let nested = Element::List(vec![Element::List(vec![Element::Props(Descriptor::new())])]);
        let flat = Element::flatten_once(vec![nested, Element::Props(Descriptor::new())]);
        assert_eq!(flat.len(), 2);
        assert!(matches!(flat[0], Element::List(_)));
    }

    #[test]
    fn test_props_child_nests_a_descriptor() {
        let inner = Descriptor::new().with("name", "inner").child(Descriptor::new().with("visible", false));
        let mut outer = Descriptor::new().child(inner.clone());
        assert!(outer.has_children());
        assert_eq!(outer.take_children(), Some(Element::Props(inner)));
        assert!(!outer.has_children());
    }
}
