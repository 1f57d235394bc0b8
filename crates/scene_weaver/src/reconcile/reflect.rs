//! Capability traits the applier resolves attribute writes against
//!
//! [`Reflect`] is implemented by every live object that can receive
//! attributes (scene objects, materials, geometries, textures, camera, surface
//! settings) and by the structured values they contain. [`Structured`] marks
//! values with component-wise set/copy semantics (vectors, rotations, colors,
//! layer masks).

use std::any::Any;

use crate::descriptor::PropValue;
use crate::foundation::math::{Vec2, Vec3};
use crate::scene::{Color, Euler, LayerMask, Layers};

/// Why a single attribute write was skipped
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    /// The holder has no such field
    #[error("unknown field '{field}' on {holder}")]
    UnknownField {
        /// Holder kind
        holder: &'static str,
        /// Requested field
        field: String,
    },

    /// The field exists but cannot be assigned
    #[error("field '{field}' on {holder} is read-only")]
    ReadOnly {
        /// Holder kind
        holder: &'static str,
        /// Requested field
        field: String,
    },

    /// The value kind does not fit the field
    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        /// Requested field
        field: String,
        /// Accepted kind(s)
        expected: &'static str,
        /// Supplied kind
        found: &'static str,
    },

    /// The value kind fits but its content does not
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Requested field
        field: String,
        /// What was wrong
        reason: String,
    },

    /// A dashed key with empty segments
    #[error("malformed path '{0}'")]
    MalformedPath(String),

    /// A dashed key whose intermediate segment does not exist
    #[error("path '{path}' does not resolve at segment '{segment}'")]
    UnresolvedPath {
        /// Full dashed key
        path: String,
        /// First segment that failed
        segment: String,
    },

    /// The holder cannot bind interaction handlers under this key
    #[error("'{key}' is not a bindable handler on {holder}")]
    UnsupportedHandler {
        /// Holder kind
        holder: &'static str,
        /// Handler key
        key: String,
    },
}

/// Navigation result for one field of a holder
pub enum Slot<'a> {
    /// A nested object with its own fields
    Object(&'a mut dyn Reflect),
    /// A structured value with set/copy semantics
    Structured(&'a mut dyn Structured),
}

/// A holder of named fields
pub trait Reflect: Any {
    /// Constructor identity; `None` for bare values without one
    fn type_name(&self) -> Option<&'static str>;

    /// A freshly constructed instance of the same kind
    fn blank(&self) -> Option<Box<dyn Reflect>>;

    /// Read a field as a value
    fn get(&self, key: &str) -> Option<PropValue>;

    /// Plain field assignment
    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError>;

    /// Navigate into a field that is itself an object or a structured value
    fn slot_mut(&mut self, _key: &str) -> Option<Slot<'_>> {
        None
    }

    /// Whether this holder carries a color space (enables `encoding` aliasing)
    fn has_color_space(&self) -> bool {
        false
    }

    /// Bind an interaction handler
    fn bind_handler(&mut self, key: &str, _value: PropValue) -> Result<(), PropertyError> {
        Err(PropertyError::UnsupportedHandler {
            holder: self.holder_name(),
            key: key.to_string(),
        })
    }

    /// Name used in diagnostics
    fn holder_name(&self) -> &'static str {
        self.type_name().unwrap_or("value")
    }
}

/// Kinds of structured values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredKind {
    /// `Vec2`
    Vector2,
    /// `Vec3`
    Vector3,
    /// [`Euler`]
    Euler,
    /// [`Color`]
    Color,
    /// [`Layers`]
    Layers,
}

/// A value with component-wise set and copy semantics
pub trait Structured: Reflect {
    /// Which structured kind this is
    fn structured_kind(&self) -> StructuredKind;

    /// View as a plain holder (used when a path continues into a component)
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    /// Positional unpack: the first `values.len()` components are written in order
    fn from_array(&mut self, values: &[f32]);

    /// Deep copy from a value of the same kind; `false` when the kind differs
    fn copy_from(&mut self, value: &PropValue) -> bool;

    /// Set every component to one scalar; `false` when unsupported
    fn set_scalar(&mut self, _value: f32) -> bool {
        false
    }

    /// Assign a single non-array, non-same-kind value
    fn set_single(&mut self, value: &PropValue, color_managed: bool) -> Result<(), PropertyError>;

    /// Downcast to a color
    fn as_color_mut(&mut self) -> Option<&mut Color> {
        None
    }

    /// Downcast to a layer set
    fn as_layers_mut(&mut self) -> Option<&mut Layers> {
        None
    }
}

pub(crate) fn expect_number(field: &str, value: &PropValue) -> Result<f32, PropertyError> {
    value.as_number().ok_or_else(|| mismatch(field, "number", value))
}

pub(crate) fn expect_bool(field: &str, value: &PropValue) -> Result<bool, PropertyError> {
    value.as_bool().ok_or_else(|| mismatch(field, "bool", value))
}

pub(crate) fn expect_text(field: &str, value: PropValue) -> Result<String, PropertyError> {
    match value {
        PropValue::Text(s) => Ok(s),
        other => Err(mismatch(field, "text", &other)),
    }
}

pub(crate) fn mismatch(field: &str, expected: &'static str, value: &PropValue) -> PropertyError {
    PropertyError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: value.kind_name(),
    }
}

pub(crate) fn unknown(holder: &'static str, field: &str) -> PropertyError {
    PropertyError::UnknownField {
        holder,
        field: field.to_string(),
    }
}

pub(crate) fn read_only(holder: &'static str, field: &str) -> PropertyError {
    PropertyError::ReadOnly {
        holder,
        field: field.to_string(),
    }
}

// Vec3 -------------------------------------------------------------------

impl Reflect for Vec3 {
    fn type_name(&self) -> Option<&'static str> {
        Some("Vector3")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::zeros()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match key {
            "x" => Some(PropValue::Number(self.x)),
            "y" => Some(PropValue::Number(self.y)),
            "z" => Some(PropValue::Number(self.z)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let n = expect_number(key, &value)?;
        match key {
            "x" => self.x = n,
            "y" => self.y = n,
            "z" => self.z = n,
            _ => return Err(unknown("Vector3", key)),
        }
        Ok(())
    }
}

impl Structured for Vec3 {
    fn structured_kind(&self) -> StructuredKind {
        StructuredKind::Vector3
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn from_array(&mut self, values: &[f32]) {
        for (component, value) in self.iter_mut().zip(values) {
            *component = *value;
        }
    }

    fn copy_from(&mut self, value: &PropValue) -> bool {
        match value {
            PropValue::Vector3(v) => {
                *self = *v;
                true
            }
            _ => false,
        }
    }

    fn set_scalar(&mut self, value: f32) -> bool {
        self.fill(value);
        true
    }

    fn set_single(&mut self, value: &PropValue, _color_managed: bool) -> Result<(), PropertyError> {
        Err(mismatch("Vector3", "array, vector3 or number", value))
    }
}

// Vec2 -------------------------------------------------------------------

impl Reflect for Vec2 {
    fn type_name(&self) -> Option<&'static str> {
        Some("Vector2")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::zeros()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match key {
            "x" => Some(PropValue::Number(self.x)),
            "y" => Some(PropValue::Number(self.y)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let n = expect_number(key, &value)?;
        match key {
            "x" => self.x = n,
            "y" => self.y = n,
            _ => return Err(unknown("Vector2", key)),
        }
        Ok(())
    }
}

impl Structured for Vec2 {
    fn structured_kind(&self) -> StructuredKind {
        StructuredKind::Vector2
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn from_array(&mut self, values: &[f32]) {
        for (component, value) in self.iter_mut().zip(values) {
            *component = *value;
        }
    }

    fn copy_from(&mut self, value: &PropValue) -> bool {
        match value {
            PropValue::Vector2(v) => {
                *self = *v;
                true
            }
            _ => false,
        }
    }

    fn set_scalar(&mut self, value: f32) -> bool {
        self.fill(value);
        true
    }

    fn set_single(&mut self, value: &PropValue, _color_managed: bool) -> Result<(), PropertyError> {
        Err(mismatch("Vector2", "array, vector2 or number", value))
    }
}

// Euler ------------------------------------------------------------------

impl Reflect for Euler {
    fn type_name(&self) -> Option<&'static str> {
        Some("Euler")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match key {
            "x" => Some(PropValue::Number(self.x)),
            "y" => Some(PropValue::Number(self.y)),
            "z" => Some(PropValue::Number(self.z)),
            "order" => Some(PropValue::Text("XYZ".to_string())),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        if key == "order" {
            return Err(read_only("Euler", key));
        }
        let n = expect_number(key, &value)?;
        match key {
            "x" => self.x = n,
            "y" => self.y = n,
            "z" => self.z = n,
            _ => return Err(unknown("Euler", key)),
        }
        Ok(())
    }
}

impl Structured for Euler {
    fn structured_kind(&self) -> StructuredKind {
        StructuredKind::Euler
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn from_array(&mut self, values: &[f32]) {
        for (component, value) in [&mut self.x, &mut self.y, &mut self.z].into_iter().zip(values) {
            *component = *value;
        }
    }

    fn copy_from(&mut self, value: &PropValue) -> bool {
        match value {
            PropValue::Euler(e) => {
                *self = *e;
                true
            }
            _ => false,
        }
    }

    // No broadcast for rotations: a lone number only sets the first angle.
    fn set_single(&mut self, value: &PropValue, _color_managed: bool) -> Result<(), PropertyError> {
        self.x = expect_number("Euler", value)?;
        Ok(())
    }
}

// Color ------------------------------------------------------------------

impl Reflect for Color {
    fn type_name(&self) -> Option<&'static str> {
        Some("Color")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match key {
            "r" => Some(PropValue::Number(self.r)),
            "g" => Some(PropValue::Number(self.g)),
            "b" => Some(PropValue::Number(self.b)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let n = expect_number(key, &value)?;
        match key {
            "r" => self.r = n,
            "g" => self.g = n,
            "b" => self.b = n,
            _ => return Err(unknown("Color", key)),
        }
        Ok(())
    }
}

impl Structured for Color {
    fn structured_kind(&self) -> StructuredKind {
        StructuredKind::Color
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn from_array(&mut self, values: &[f32]) {
        for (component, value) in [&mut self.r, &mut self.g, &mut self.b].into_iter().zip(values) {
            *component = *value;
        }
    }

    fn copy_from(&mut self, value: &PropValue) -> bool {
        match value {
            PropValue::Color(c) => {
                *self = *c;
                true
            }
            _ => false,
        }
    }

    fn set_single(&mut self, value: &PropValue, color_managed: bool) -> Result<(), PropertyError> {
        match value {
            PropValue::Number(hex) if *hex >= 0.0 => {
                self.set_hex(*hex as u32, color_managed);
                Ok(())
            }
            PropValue::Text(style) => {
                if self.set_style(style, color_managed) {
                    Ok(())
                } else {
                    Err(PropertyError::InvalidValue {
                        field: "Color".to_string(),
                        reason: format!("unrecognized color style '{style}'"),
                    })
                }
            }
            other => Err(mismatch("Color", "hex number or style text", other)),
        }
    }

    fn as_color_mut(&mut self) -> Option<&mut Color> {
        Some(self)
    }
}

// Layers -----------------------------------------------------------------

impl Reflect for Layers {
    fn type_name(&self) -> Option<&'static str> {
        Some("Layers")
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match key {
            // Masks travel whole; an f32 cannot hold every 32-bit pattern.
            "mask" => Some(PropValue::Layers(*self)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        match key {
            "mask" => {
                self.mask = match value {
                    PropValue::Layers(other) => other.mask,
                    other => LayerMask::from_bits_retain(expect_number(key, &other)? as u32),
                };
                Ok(())
            }
            _ => Err(unknown("Layers", key)),
        }
    }
}

impl Structured for Layers {
    fn structured_kind(&self) -> StructuredKind {
        StructuredKind::Layers
    }

    fn as_reflect_mut(&mut self) -> &mut dyn Reflect {
        self
    }

    fn from_array(&mut self, values: &[f32]) {
        if let Some(channel) = values.first() {
            self.set(*channel as u32);
        }
    }

    // Layer sets have no copy; the applier assigns the mask instead.
    fn copy_from(&mut self, _value: &PropValue) -> bool {
        false
    }

    fn set_single(&mut self, value: &PropValue, _color_managed: bool) -> Result<(), PropertyError> {
        let channel = expect_number("Layers", value)?;
        self.set(channel as u32);
        Ok(())
    }

    fn as_layers_mut(&mut self) -> Option<&mut Layers> {
        Some(self)
    }
}
