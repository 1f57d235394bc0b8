//! Ray and bounding-volume primitives used for pointer picking

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// A ray in some coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Point at parameter `t`
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform into another space by an affine matrix.
    ///
    /// The direction is not renormalized, so parameters along the returned ray
    /// map back to the same points; use [`Ray::point_at`] and re-measure
    /// distances in the original space.
    pub fn transformed(&self, matrix: &Mat4) -> Option<Self> {
        let origin = matrix.project_point(&self.origin)?;
        let direction = matrix.transform_vector(&self.direction);
        Some(Self { origin, direction })
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Box from corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered on the origin with the given full size
    pub fn centered(size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: -half, max: half }
    }

    /// Smallest box containing every point; `None` for no points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(&p),
            max: acc.max.sup(&p),
        }))
    }

    /// Whether a point lies inside (boundary included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Slab test; returns the ray parameter of the entry point (0 when inside)
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            if dir == 0.0 {
                // Parallel to this slab: either always inside it or never
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let t1 = (self.min[axis] - origin) * inv;
            let t2 = (self.max[axis] - origin) * inv;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere from center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Nearest non-negative ray parameter hitting the sphere
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let t1 = (-b - sqrt_d) / (2.0 * a);
        let t2 = (-b + sqrt_d) / (2.0 * a);
        if t1 >= 0.0 {
            Some(t1)
        } else if t2 >= 0.0 {
            Some(t2)
        } else {
            None
        }
    }
}

/// Local-space hit volume of a geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Box volume
    Box(Aabb),
    /// Sphere volume
    Sphere(BoundingSphere),
}

impl Bounds {
    /// Ray parameter of the nearest hit
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        match self {
            Self::Box(aabb) => aabb.intersect_ray(ray),
            Self::Sphere(sphere) => sphere.intersect_ray(ray),
        }
    }
}
