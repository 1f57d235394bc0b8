//! Debug helpers (axes, grid, light gizmos)

use crate::descriptor::PropValue;
use crate::reconcile::reflect::{read_only, unknown};
use crate::reconcile::{PropertyError, Reflect};

use super::graph::NodeId;

/// Helper variants with their construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Helper {
    /// RGB axis lines
    Axes {
        /// Line length
        size: f32,
    },
    /// Floor grid
    Grid {
        /// Side length
        size: f32,
        /// Cells per side
        divisions: u32,
    },
    /// Gizmo following a point light
    PointLight {
        /// Light node visualized
        light: NodeId,
        /// Gizmo sphere radius
        sphere_size: f32,
    },
    /// Cone gizmo following a spot light
    SpotLight {
        /// Light node visualized
        light: NodeId,
    },
}

impl Helper {
    /// Axes from `[size]` (default 1)
    pub fn axes(args: &[PropValue]) -> Self {
        Self::Axes {
            size: number(args, 0, 1.0),
        }
    }

    /// Grid from `[size, divisions]` (defaults 10, 10)
    pub fn grid(args: &[PropValue]) -> Self {
        Self::Grid {
            size: number(args, 0, 10.0),
            divisions: number(args, 1, 10.0).max(1.0) as u32,
        }
    }

    /// Point-light gizmo from `[sphereSize]` (default 1)
    pub fn point_light(light: NodeId, args: &[PropValue]) -> Self {
        Self::PointLight {
            light,
            sphere_size: number(args, 0, 1.0),
        }
    }

    /// Constructor identity
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Axes { .. } => "AxesHelper",
            Self::Grid { .. } => "GridHelper",
            Self::PointLight { .. } => "PointLightHelper",
            Self::SpotLight { .. } => "SpotLightHelper",
        }
    }

    /// The light node a gizmo follows
    pub fn light(&self) -> Option<NodeId> {
        match self {
            Self::PointLight { light, .. } | Self::SpotLight { light } => Some(*light),
            _ => None,
        }
    }

    /// Same helper kind with default parameters
    pub fn factory_default(&self) -> Self {
        match self {
            Self::Axes { .. } => Self::axes(&[]),
            Self::Grid { .. } => Self::grid(&[]),
            Self::PointLight { light, .. } => Self::PointLight {
                light: *light,
                sphere_size: 1.0,
            },
            Self::SpotLight { light } => Self::SpotLight { light: *light },
        }
    }
}

fn number(args: &[PropValue], index: usize, default: f32) -> f32 {
    args.get(index).and_then(PropValue::as_number).unwrap_or(default)
}

impl Reflect for Helper {
    fn type_name(&self) -> Option<&'static str> {
        Some(Helper::type_name(self))
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        Some(Box::new(self.factory_default()))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match (key, self) {
            ("size", Self::Axes { size } | Self::Grid { size, .. }) => Some(PropValue::Number(*size)),
            ("divisions", Self::Grid { divisions, .. }) => Some(PropValue::Number(*divisions as f32)),
            ("sphereSize", Self::PointLight { sphere_size, .. }) => Some(PropValue::Number(*sphere_size)),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, _value: PropValue) -> Result<(), PropertyError> {
        let holder = Helper::type_name(self);
        if Reflect::get(self, key).is_some() {
            Err(read_only(holder, key))
        } else {
            Err(unknown(holder, key))
        }
    }
}
