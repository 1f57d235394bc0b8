//! Geometry kinds and their local hit volumes

use crate::descriptor::PropValue;
use crate::foundation::math::Vec3;
use crate::picking::{Aabb, BoundingSphere, Bounds};
use crate::reconcile::reflect::{expect_text, mismatch, read_only, unknown};
use crate::reconcile::{PropertyError, Reflect};

/// Shape parameters, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    /// Axis-aligned box centered on the origin
    Box {
        /// Size along X
        width: f32,
        /// Size along Y
        height: f32,
        /// Size along Z
        depth: f32,
    },
    /// UV sphere centered on the origin
    Sphere {
        /// Radius
        radius: f32,
        /// Longitudinal segments
        width_segments: u32,
        /// Latitudinal segments
        height_segments: u32,
    },
    /// Plane in XY facing +Z
    Plane {
        /// Size along X
        width: f32,
        /// Size along Y
        height: f32,
    },
    /// Raw vertex positions (xyz triples)
    Buffer {
        /// Flat position array
        positions: Vec<f32>,
    },
}

impl GeometryKind {
    /// Box from positional arguments `[width, height, depth]` (defaults 1)
    pub fn box_from_args(args: &[PropValue]) -> Self {
        Self::Box {
            width: arg(args, 0, 1.0),
            height: arg(args, 1, 1.0),
            depth: arg(args, 2, 1.0),
        }
    }

    /// Sphere from `[radius, widthSegments, heightSegments]` (defaults 1, 32, 16)
    pub fn sphere_from_args(args: &[PropValue]) -> Self {
        Self::Sphere {
            radius: arg(args, 0, 1.0),
            width_segments: (arg(args, 1, 32.0).max(3.0)) as u32,
            height_segments: (arg(args, 2, 16.0).max(2.0)) as u32,
        }
    }

    /// Plane from `[width, height]` (defaults 1)
    pub fn plane_from_args(args: &[PropValue]) -> Self {
        Self::Plane {
            width: arg(args, 0, 1.0),
            height: arg(args, 1, 1.0),
        }
    }

    /// Buffer geometry; a leading array argument provides positions
    pub fn buffer_from_args(args: &[PropValue]) -> Self {
        let positions = match args.first() {
            Some(PropValue::Array(values)) => values.clone(),
            _ => Vec::new(),
        };
        Self::Buffer { positions }
    }

    /// Constructor identity
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Box { .. } => "BoxGeometry",
            Self::Sphere { .. } => "SphereGeometry",
            Self::Plane { .. } => "PlaneGeometry",
            Self::Buffer { .. } => "BufferGeometry",
        }
    }
}

fn arg(args: &[PropValue], index: usize, default: f32) -> f32 {
    args.get(index).and_then(PropValue::as_number).unwrap_or(default)
}

/// A shape attached to meshes
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Display name
    pub name: String,
    /// Shape parameters
    pub kind: GeometryKind,
}

impl Geometry {
    /// Geometry of the given kind
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            name: String::new(),
            kind,
        }
    }

    /// Local-space hit volume; `None` for empty buffers
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.kind {
            GeometryKind::Box { width, height, depth } => {
                Some(Bounds::Box(Aabb::centered(Vec3::new(*width, *height, *depth))))
            }
            GeometryKind::Sphere { radius, .. } => {
                Some(Bounds::Sphere(BoundingSphere::new(Vec3::zeros(), *radius)))
            }
            GeometryKind::Plane { width, height } => {
                Some(Bounds::Box(Aabb::centered(Vec3::new(*width, *height, 0.0))))
            }
            GeometryKind::Buffer { positions } => Aabb::from_points(
                positions
                    .chunks_exact(3)
                    .map(|p| Vec3::new(p[0], p[1], p[2])),
            )
            .map(Bounds::Box),
        }
    }
}

impl Reflect for Geometry {
    fn type_name(&self) -> Option<&'static str> {
        Some(self.kind.type_name())
    }

    fn blank(&self) -> Option<Box<dyn Reflect>> {
        let kind = match self.kind {
            GeometryKind::Box { .. } => GeometryKind::box_from_args(&[]),
            GeometryKind::Sphere { .. } => GeometryKind::sphere_from_args(&[]),
            GeometryKind::Plane { .. } => GeometryKind::plane_from_args(&[]),
            GeometryKind::Buffer { .. } => GeometryKind::buffer_from_args(&[]),
        };
        Some(Box::new(Self::new(kind)))
    }

    fn get(&self, key: &str) -> Option<PropValue> {
        match (key, &self.kind) {
            ("name", _) => Some(PropValue::Text(self.name.clone())),
            ("positions", GeometryKind::Buffer { positions }) => Some(PropValue::Array(positions.clone())),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: PropValue) -> Result<(), PropertyError> {
        let holder = self.kind.type_name();
        match (key, &mut self.kind) {
            ("name", _) => self.name = expect_text(key, value)?,
            ("positions", GeometryKind::Buffer { positions }) => match value {
                PropValue::Array(values) => *positions = values,
                other => return Err(mismatch(key, "array", &other)),
            },
            // Shape parameters are constructor arguments
            ("parameters", _) => return Err(read_only(holder, key)),
            _ => return Err(unknown(holder, key)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_with_defaults() {
        let kind = GeometryKind::box_from_args(&[PropValue::Number(2.0)]);
        assert_eq!(
            kind,
            GeometryKind::Box {
                width: 2.0,
                height: 1.0,
                depth: 1.0
            }
        );
    }

    #[test]
    fn test_empty_buffer_has_no_bounds() {
        assert!(Geometry::new(GeometryKind::buffer_from_args(&[])).bounds().is_none());
        let tri = Geometry::new(GeometryKind::buffer_from_args(&[PropValue::Array(vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
        ])]));
        assert!(matches!(tri.bounds(), Some(Bounds::Box(_))));
    }

    #[test]
    fn test_buffer_positions_settable_shape_is_not() {
        let mut g = Geometry::new(GeometryKind::buffer_from_args(&[]));
        g.set("positions", PropValue::Array(vec![0.0; 3])).unwrap();
        let mut cube = Geometry::new(GeometryKind::box_from_args(&[]));
        assert!(cube.set("positions", PropValue::Array(vec![])).is_err());
    }
}
