//! The property applier
//!
//! A [`Reconciler`] walks a descriptor's change list and writes each entry
//! onto a live holder. Writes that cannot be performed are skipped with a
//! warning; nothing propagates to the caller.

use log::{trace, warn};

use super::classify::{classify, Change};
use super::defaults::DefaultCache;
use super::path::PropPath;
use super::reflect::{PropertyError, Reflect, Slot, Structured, StructuredKind};
use crate::descriptor::{Descriptor, PropValue};
use crate::scene::ColorSpace;

/// Stateful applier: owns the reset-default cache and the color-management flag
#[derive(Debug)]
pub struct Reconciler {
    defaults: DefaultCache,
    color_management: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reconciler {
    /// Create an applier; `color_management` controls sRGB decoding of color inputs
    pub fn new(color_management: bool) -> Self {
        Self {
            defaults: DefaultCache::new(),
            color_management,
        }
    }

    /// Whether color inputs are decoded from sRGB by the color setters
    pub fn color_management(&self) -> bool {
        self.color_management
    }

    /// Reset-default cache
    pub fn defaults(&self) -> &DefaultCache {
        &self.defaults
    }

    /// Apply every attribute of `descriptor` to `target`.
    ///
    /// Plain and path entries are written in descriptor order; interaction
    /// handlers are bound afterwards in a separate pass.
    pub fn apply(&mut self, target: &mut dyn Reflect, descriptor: &Descriptor) {
        let changes = classify(descriptor);
        let (events, writes): (Vec<Change>, Vec<Change>) = changes.into_iter().partition(|c| c.is_event);

        for change in writes {
            if let Err(err) = self.apply_change(target, &change) {
                warn!("skipping '{}' on {}: {err}", change.key, target.holder_name());
            }
        }

        for change in events {
            if let Err(err) = target.bind_handler(&change.key, change.value) {
                warn!("skipping handler '{}': {err}", change.key);
            }
        }
    }

    /// Apply a single change entry (never an event entry)
    pub fn apply_change(&mut self, target: &mut dyn Reflect, change: &Change) -> Result<(), PropertyError> {
        debug_assert!(!change.is_event);
        if change.path.is_empty() {
            return self.write(target, &change.key, change.value.clone());
        }
        let path = PropPath::new(&change.path)?;
        self.write_path(target, &path, path.segments(), change.value.clone())
    }

    fn write_path(
        &mut self,
        holder: &mut dyn Reflect,
        path: &PropPath,
        segments: &[String],
        value: PropValue,
    ) -> Result<(), PropertyError> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(PropertyError::MalformedPath(path.to_string()));
        };
        if rest.is_empty() {
            // Deepest segment: structured values are written in place, anything
            // else is assigned on the parent under the last segment.
            return self.write(holder, head, value);
        }
        match holder.slot_mut(head) {
            Some(Slot::Object(child)) => self.write_path(child, path, rest, value),
            Some(Slot::Structured(child)) => self.write_path(child.as_reflect_mut(), path, rest, value),
            None => Err(PropertyError::UnresolvedPath {
                path: path.to_string(),
                segment: head.clone(),
            }),
        }
    }

    /// Write `value` to `key` on `holder`
    fn write(&mut self, holder: &mut dyn Reflect, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let (key, value) = alias_encoding(holder, key, value);
        let value = match value {
            PropValue::Reset => {
                let default = self.defaults.default_for(holder, &key);
                trace!("reset {}.{key} -> {default:?}", holder.holder_name());
                default
            }
            other => other,
        };

        let color_management = self.color_management;
        match holder.slot_mut(&key) {
            Some(Slot::Structured(target)) => write_structured(target, &key, value, color_management),
            _ => {
                trace!("assign {}.{key}", holder.holder_name());
                holder.set(&key, value)
            }
        }
    }
}

/// Structured-value write rules, in priority order
fn write_structured(
    target: &mut dyn Structured,
    key: &str,
    value: PropValue,
    color_management: bool,
) -> Result<(), PropertyError> {
    let kind = target.structured_kind();
    trace!("structured write {key} ({kind:?}) <- {}", value.kind_name());

    if value.is_undefined() {
        return Ok(());
    }
    if let PropValue::Array(values) = &value {
        target.from_array(values);
        return Ok(());
    }
    if target.copy_from(&value) {
        return Ok(());
    }
    if let PropValue::Layers(layers) = &value {
        return match target.as_layers_mut() {
            Some(mask) => {
                mask.mask = layers.mask;
                Ok(())
            }
            None => Err(PropertyError::TypeMismatch {
                field: key.to_string(),
                expected: "same-kind value",
                found: "layers",
            }),
        };
    }
    if let PropValue::Number(n) = value {
        if kind != StructuredKind::Color && target.set_scalar(n) {
            return Ok(());
        }
    }

    target.set_single(&value, color_management)?;
    if !color_management {
        if let Some(color) = target.as_color_mut() {
            color.convert_srgb_to_linear();
        }
    }
    Ok(())
}

/// Rewrite legacy `encoding`/`outputEncoding` writes on color-space holders
fn alias_encoding(holder: &dyn Reflect, key: &str, value: PropValue) -> (String, PropValue) {
    let aliased = match key {
        "encoding" => "colorSpace",
        "outputEncoding" => "outputColorSpace",
        _ => return (key.to_string(), value),
    };
    if !holder.has_color_space() {
        return (key.to_string(), value);
    }
    let value = match value {
        PropValue::Number(encoding) => {
            PropValue::Text(ColorSpace::from_legacy_encoding(encoding).token().to_string())
        }
        other => other,
    };
    (aliased.to_string(), value)
}
