//! Descriptor → change list

use crate::descriptor::{Descriptor, PropValue};

/// Path separator inside attribute keys
pub const PATH_SEPARATOR: char = '-';

const EVENT_STEMS: [&str; 5] = ["Pointer", "Click", "DoubleClick", "ContextMenu", "Wheel"];

/// One attribute write derived from a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Attribute key as written in the descriptor
    pub key: String,
    /// Value to write
    pub value: PropValue,
    /// Interaction handler (bound separately, never assigned)
    pub is_event: bool,
    /// Dashed-key segments; empty for plain keys and events
    pub path: Vec<String>,
}

/// Whether `key` names an interaction callback (`onPointer*`, `onClick`, ...)
pub fn is_event_key(key: &str) -> bool {
    key.strip_prefix("on")
        .is_some_and(|rest| EVENT_STEMS.iter().any(|stem| rest.starts_with(stem)))
}

/// Split a descriptor into its ordered change list.
///
/// The reserved `args`/`children` slots never appear. Values pass through
/// unchanged, `Undefined` included.
pub fn classify(descriptor: &Descriptor) -> Vec<Change> {
    descriptor
        .props()
        .map(|(key, value)| {
            let is_event = is_event_key(key);
            let path = if !is_event && key.contains(PATH_SEPARATOR) {
                key.split(PATH_SEPARATOR).map(str::to_string).collect()
            } else {
                Vec::new()
            };
            Change {
                key: key.to_string(),
                value: value.clone(),
                is_event,
                path,
            }
        })
        .collect()
}
