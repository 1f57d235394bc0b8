//! Scene-graph nodes
//!
//! Every live node is an [`Object3D`]: a transform, visibility and layer state,
//! bound callbacks, plus kind-specific payload ([`ObjectKind`]). Kind payload
//! fields (mesh geometry and material, light parameters) are reachable through
//! the node itself, so `material-color` or `intensity` resolve on a node.

use std::collections::HashMap;
use std::fmt;

use crate::descriptor::{Callback, FrameHandler, PointerHandler, PropValue, ResizeHandler};
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::picking::Intersection;
use crate::reconcile::reflect::{expect_bool, expect_number, expect_text, mismatch, read_only, unknown};
use crate::reconcile::{PropertyError, Reflect, Slot};
use crate::render::WorldViewport;

use super::geometry::{Geometry, GeometryKind};
use super::graph::NodeId;
use super::helper::Helper;
use super::light::Light;
use super::material::{Material, MaterialKind};
use super::values::{Euler, Layers};

/// Pointer interactions a node can bind handlers for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    /// Pointer ray started intersecting the node
    Over,
    /// Pointer ray stopped intersecting the node
    Out,
    /// Pointer moved while intersecting the node
    Move,
    /// Button pressed over the node
    Down,
    /// Button released over the node
    Up,
    /// Primary click on the nearest hit
    Click,
    /// Double click on the nearest hit
    DoubleClick,
    /// Context-menu request on the nearest hit
    ContextMenu,
    /// Wheel over the nearest hit
    Wheel,
}

impl PointerEvent {
    /// Parse a handler key (`onPointerOver`, `onClick`, ...)
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "onPointerOver" => Self::Over,
            "onPointerOut" => Self::Out,
            "onPointerMove" => Self::Move,
            "onPointerDown" => Self::Down,
            "onPointerUp" => Self::Up,
            "onClick" => Self::Click,
            "onDoubleClick" => Self::DoubleClick,
            "onContextMenu" => Self::ContextMenu,
            "onWheel" => Self::Wheel,
            _ => return None,
        })
    }
}

/// Mesh payload
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Shape
    pub geometry: Geometry,
    /// One material, or one per geometry group
    pub materials: Vec<Material>,
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            geometry: Geometry::new(GeometryKind::buffer_from_args(&[])),
            materials: vec![Material::new(MaterialKind::Basic)],
        }
    }
}

/// What a node is
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// Root container
    Scene,
    /// Plain container
    Group,
    /// Renderable shape
    Mesh(MeshData),
    /// Light source
    Light(Light),
    /// Debug gizmo
    Helper(Helper),
}

impl ObjectKind {
    /// Constructor identity
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scene => "Scene",
            Self::Group => "Group",
            Self::Mesh(_) => "Mesh",
            Self::Light(light) => light.kind.type_name(),
            Self::Helper(helper) => helper.type_name(),
        }
    }

    fn blank(&self) -> Self {
        match self {
            Self::Scene => Self::Scene,
            Self::Group => Self::Group,
            Self::Mesh(_) => Self::Mesh(MeshData::default()),
            Self::Light(light) => Self::Light(Light::new(light.kind)),
            Self::Helper(helper) => Self::Helper(helper.factory_default()),
        }
    }
}

/// A live scene-graph node
#[derive(Clone)]
pub struct Object3D {
    /// Display name
    pub name: String,
    /// Kind payload
    pub kind: ObjectKind,
    /// Local translation
    pub position: Vec3,
    /// Local rotation
    pub rotation: Euler,
    /// Local scale
    pub scale: Vec3,
    /// Up direction used by look-at
    pub up: Vec3,
    /// Whether the node (and its subtree) is drawn and pickable
    pub visible: bool,
    /// Raycast/render channel membership
    pub layers: Layers,
    /// Draw-order override
    pub render_order: i32,
    /// Shadow casting
    pub cast_shadow: bool,
    /// Shadow receiving
    pub receive_shadow: bool,
    /// Frustum culling
    pub frustum_culled: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    handlers: HashMap<PointerEvent, PointerHandler>,
    on_frame: Option<FrameHandler>,
    on_resize: Option<ResizeHandler>,
}

impl Object3D {
    /// Node of the given kind with factory-default state
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            name: String::new(),
            kind,
            position: Vec3::zeros(),
            rotation: Euler::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            visible: true,
            layers: Layers::default(),
            render_order: 0,
            cast_shadow: false,
            receive_shadow: false,
            frustum_culled: true,
            parent: None,
            children: Vec::new(),
            handlers: HashMap::new(),
            on_frame: None,
            on_resize: None,
        }
    }

    /// Empty container
    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    /// Mesh node
    pub fn mesh(geometry: Geometry, materials: Vec<Material>) -> Self {
        Self::new(ObjectKind::Mesh(MeshData { geometry, materials }))
    }

    /// Light node
    pub fn light(light: Light) -> Self {
        Self::new(ObjectKind::Light(light))
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local transform
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::compose(&self.position, &self.rotation.to_matrix(), &self.scale)
    }

    /// Mesh payload, if this is a mesh
    pub fn mesh_data(&self) -> Option<&MeshData> {
        match &self.kind {
            ObjectKind::Mesh(data) => Some(data),
            _ => None,
        }
    }

    /// Light payload, if this is a light
    pub fn light_data(&self) -> Option<&Light> {
        match &self.kind {
            ObjectKind::Light(light) => Some(light),
            _ => None,
        }
    }

    /// Handler bound for an interaction
    pub fn handler(&self, event: PointerEvent) -> Option<PointerHandler> {
        self.handlers.get(&event).cloned()
    }

    /// Whether any pointer handler is bound
    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Per-frame callback
    pub fn frame_handler(&self) -> Option<FrameHandler> {
        self.on_frame.clone()
    }

    /// Resize callback
    pub fn resize_handler(&self) -> Option<ResizeHandler> {
        self.on_resize.clone()
    }

    /// Invoke the handler for `event` with this node and the hit record
    pub fn dispatch(&mut self, event: PointerEvent, hit: &Intersection) -> bool {
        match self.handler(event) {
            Some(handler) => {
                handler(self, hit);
                true
            }
            None => false,
        }
    }

    /// Invoke the per-frame callback
    pub fn tick(&mut self, timestamp: f64) {
        if let Some(handler) = self.frame_handler() {
            handler(self, timestamp);
        }
    }

    /// Invoke the resize callback
    pub fn notify_resize(&mut self, viewport: &WorldViewport) {
        if let Some(handler) = self.resize_handler() {
            handler(self, viewport);
        }
    }

    fn primary_material_mut(&mut self) -> Option<&mut Material> {
        match &mut self.kind {
            ObjectKind::Mesh(data) => data.materials.first_mut(),
            _ => None,
        }
    }
}

impl fmt::Debug for Object3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object3D")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("position", &self.position)
            .field("children", &self.children)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Reflect for Object3D {
    fn type_name(&self) -> Option<&'static str> {
        Some(self.kind.type_name())
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(Self::new(self.kind.blank())))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        let value = match key {
            "name" => PropValue::Text(self.name.clone()),
            "position" => PropValue::Vector3(self.position),
            "rotation" => PropValue::Euler(self.rotation),
            "scale" => PropValue::Vector3(self.scale),
            "up" => PropValue::Vector3(self.up),
            "visible" => PropValue::Bool(self.visible),
            "layers" => PropValue::Layers(self.layers),
            "renderOrder" => PropValue::Number(self.render_order as f32),
            "castShadow" => PropValue::Bool(self.cast_shadow),
            "receiveShadow" => PropValue::Bool(self.receive_shadow),
            "frustumCulled" => PropValue::Bool(self.frustum_culled),
            "type" => PropValue::Text(self.kind.type_name().to_string()),
            "render" => self
                .on_frame
                .clone()
                .map_or(PropValue::Undefined, |h| Callback::Frame(h).into()),
            "onResize" => self
                .on_resize
                .clone()
                .map_or(PropValue::Undefined, |h| Callback::Resize(h).into()),
            _ => {
                return match &self.kind {
                    ObjectKind::Light(light) => light.get(key),
                    ObjectKind::Helper(helper) => helper.get(key),
                    _ => None,
                }
            }
        };
        Some(value)
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        match key {
            "name" => self.name = expect_text(key, value)?,
            "visible" => self.visible = expect_bool(key, &value)?,
            "renderOrder" => self.render_order = expect_number(key, &value)? as i32,
            "castShadow" => self.cast_shadow = expect_bool(key, &value)?,
            "receiveShadow" => self.receive_shadow = expect_bool(key, &value)?,
            "frustumCulled" => self.frustum_culled = expect_bool(key, &value)?,
            "type" | "id" | "parent" | "children" => return Err(read_only(self.kind.type_name(), key)),
            "render" => {
                self.on_frame = match value {
                    PropValue::Callback(Callback::Frame(handler)) => Some(handler),
                    PropValue::Undefined => None,
                    other => return Err(mismatch(key, "frame callback", &other)),
                }
            }
            "onResize" => {
                self.on_resize = match value {
                    PropValue::Callback(Callback::Resize(handler)) => Some(handler),
                    PropValue::Undefined => None,
                    other => return Err(mismatch(key, "resize callback", &other)),
                }
            }
            // Replaced only by reconstruction; their fields stay writable via paths
            "geometry" | "material" if self.mesh_data().is_some() => {
                return Err(read_only(self.kind.type_name(), key))
            }
            _ => {
                return match &mut self.kind {
                    ObjectKind::Light(light) => light.set(key, value),
                    ObjectKind::Helper(helper) => helper.set(key, value),
                    kind => Err(unknown(kind.type_name(), key)),
                }
            }
        }
        Ok(())
    }

    fn slot_mut(&mut self, key: &str) -> Option<Slot<'_>> {
        match key {
            "position" => return Some(Slot::Structured(&mut self.position)),
            "rotation" => return Some(Slot::Structured(&mut self.rotation)),
            "scale" => return Some(Slot::Structured(&mut self.scale)),
            "up" => return Some(Slot::Structured(&mut self.up)),
            "layers" => return Some(Slot::Structured(&mut self.layers)),
            "material" => {
                return self
                    .primary_material_mut()
                    .map(|m| Slot::Object(m as &mut dyn Reflect))
            }
            _ => {}
        }
        match &mut self.kind {
            ObjectKind::Mesh(data) if key == "geometry" => Some(Slot::Object(&mut data.geometry)),
            ObjectKind::Light(light) => light.slot_mut(key),
            _ => None,
        }
    }

    fn bind_handler(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let event = PointerEvent::from_key(key).ok_or_else(|| PropertyError::UnsupportedHandler {
            holder: self.kind.type_name(),
            key: key.to_string(),
        })?;
        match value {
            PropValue::Callback(Callback::Pointer(handler)) => {
                self.handlers.insert(event, handler);
                Ok(())
            }
            PropValue::Undefined => {
                self.handlers.remove(&event);
                Ok(())
            }
            other => Err(mismatch(key, "pointer callback", &other)),
        }
    }
}
