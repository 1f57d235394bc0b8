//! Attribute values carried by descriptors

use std::fmt;
use std::rc::Rc;

use crate::foundation::math::{Vec2, Vec3};
use crate::picking::Intersection;
use crate::render::WorldViewport;
use crate::scene::{Color, Euler, LayerMask, Layers, Object3D, Texture};

/// Pointer callback: receives the node it is bound to and the hit record
pub type PointerHandler = Rc<dyn Fn(&mut Object3D, &Intersection)>;

/// Per-frame callback: receives the node and the frame timestamp
pub type FrameHandler = Rc<dyn Fn(&mut Object3D, f64)>;

/// Resize callback: receives the node and the world-space viewport
pub type ResizeHandler = Rc<dyn Fn(&mut Object3D, &WorldViewport)>;

/// A callable attribute value
#[derive(Clone)]
pub enum Callback {
    /// Interaction handler (`onPointerOver`, `onClick`, ...)
    Pointer(PointerHandler),
    /// Animation slot (`render`)
    Frame(FrameHandler),
    /// Resize slot (`onResize`)
    Resize(ResizeHandler),
}

impl Callback {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Pointer(a), Self::Pointer(b)) => Rc::ptr_eq(a, b),
            (Self::Frame(a), Self::Frame(b)) => Rc::ptr_eq(a, b),
            (Self::Resize(a), Self::Resize(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer(_) => f.write_str("Callback::Pointer(..)"),
            Self::Frame(_) => f.write_str("Callback::Frame(..)"),
            Self::Resize(_) => f.write_str("Callback::Resize(..)"),
        }
    }
}

/// A descriptor attribute value
///
/// `Undefined` is distinct from "absent": it reaches the applier, which skips
/// it for structured fields. `Reset` is the reserved sentinel that restores a
/// field to its constructor default.
#[derive(Clone, Debug, Default)]
pub enum PropValue {
    /// Present but undefined
    #[default]
    Undefined,
    /// Boolean flag
    Bool(bool),
    /// Any number (integers included)
    Number(f32),
    /// String token, color style, name
    Text(String),
    /// Positional component list
    Array(Vec<f32>),
    /// 2-component vector
    Vector2(Vec2),
    /// 3-component vector
    Vector3(Vec3),
    /// Euler rotation
    Euler(Euler),
    /// RGB color
    Color(Color),
    /// Layer mask
    Layers(Layers),
    /// Texture instance
    Texture(Box<Texture>),
    /// Callable slot
    Callback(Callback),
    /// Restore the constructor default
    Reset,
}

impl PropValue {
    /// Wrap a pointer handler
    pub fn on_pointer(handler: impl Fn(&mut Object3D, &Intersection) + 'static) -> Self {
        Self::Callback(Callback::Pointer(Rc::new(handler)))
    }

    /// Wrap a per-frame handler
    pub fn on_frame(handler: impl Fn(&mut Object3D, f64) + 'static) -> Self {
        Self::Callback(Callback::Frame(Rc::new(handler)))
    }

    /// Wrap a resize handler
    pub fn on_resize(handler: impl Fn(&mut Object3D, &WorldViewport) + 'static) -> Self {
        Self::Callback(Callback::Resize(Rc::new(handler)))
    }

    /// Short name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Array(_) => "array",
            Self::Vector2(_) => "vector2",
            Self::Vector3(_) => "vector3",
            Self::Euler(_) => "euler",
            Self::Color(_) => "color",
            Self::Layers(_) => "layers",
            Self::Texture(_) => "texture",
            Self::Callback(_) => "callback",
            Self::Reset => "reset",
        }
    }

    /// Whether this is the undefined value
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Number payload
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Text payload
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Reset, Self::Reset) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Vector2(a), Self::Vector2(b)) => a == b,
            (Self::Vector3(a), Self::Vector3(b)) => a == b,
            (Self::Euler(a), Self::Euler(b)) => a == b,
            (Self::Color(a), Self::Color(b)) => a == b,
            (Self::Layers(a), Self::Layers(b)) => a == b,
            (Self::Texture(a), Self::Texture(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => a.same(b),
            _ => false,
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(value as f32)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        Self::Number(value as f32)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<const N: usize> From<[f32; N]> for PropValue {
    fn from(value: [f32; N]) -> Self {
        Self::Array(value.to_vec())
    }
}

impl From<Vec<f32>> for PropValue {
    fn from(value: Vec<f32>) -> Self {
        Self::Array(value)
    }
}

impl From<Vec2> for PropValue {
    fn from(value: Vec2) -> Self {
        Self::Vector2(value)
    }
}

impl From<Vec3> for PropValue {
    fn from(value: Vec3) -> Self {
        Self::Vector3(value)
    }
}

impl From<Euler> for PropValue {
    fn from(value: Euler) -> Self {
        Self::Euler(value)
    }
}

impl From<Color> for PropValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<Layers> for PropValue {
    fn from(value: Layers) -> Self {
        Self::Layers(value)
    }
}

impl From<LayerMask> for PropValue {
    fn from(mask: LayerMask) -> Self {
        Self::Layers(Layers { mask })
    }
}

impl From<Texture> for PropValue {
    fn from(value: Texture) -> Self {
        Self::Texture(Box::new(value))
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        Self::Callback(value)
    }
}
