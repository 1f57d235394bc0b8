//! Math utilities and types
//!
//! Provides fundamental math types for the scene graph, picking and camera code.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix4,
    Rotation3,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Rotation matrix applying X, then Y, then Z intrinsic rotations (`XYZ` order)
    fn rotation_xyz(x: f32, y: f32, z: f32) -> Mat4;

    /// Compose a translation * rotation * scale matrix
    fn compose(position: &Vec3, rotation: &Mat4, scale: &Vec3) -> Mat4;

    /// Right-handed, Y-up perspective projection with a [-1, 1] depth range
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Transform a point, applying the perspective divide
    fn project_point(&self, point: &Vec3) -> Option<Vec3>;
}

impl Mat4Ext for Mat4 {
    fn rotation_xyz(x: f32, y: f32, z: f32) -> Mat4 {
        let rx = Rotation3::from_axis_angle(&Vec3::x_axis(), x);
        let ry = Rotation3::from_axis_angle(&Vec3::y_axis(), y);
        let rz = Rotation3::from_axis_angle(&Vec3::z_axis(), z);
        (rx * ry * rz).to_homogeneous()
    }

    fn compose(position: &Vec3, rotation: &Mat4, scale: &Vec3) -> Mat4 {
        Mat4::new_translation(position) * rotation * Mat4::new_nonuniform_scaling(scale)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn project_point(&self, point: &Vec3) -> Option<Vec3> {
        let h = self * Vec4::new(point.x, point.y, point.z, 1.0);
        if h.w.abs() <= f32::EPSILON {
            return None;
        }
        Some(Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rotation_xyz_order() {
        // Rotating +X by 90 degrees around Z lands on +Y
        let m = Mat4::rotation_xyz(0.0, 0.0, constants::PI / 2.0);
        let v = m.transform_vector(&Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(v, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_compose_translates_after_scaling() {
        let m = Mat4::compose(
            &Vec3::new(1.0, 2.0, 3.0),
            &Mat4::identity(),
            &Vec3::new(2.0, 2.0, 2.0),
        );
        let p = m.project_point(&Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(p, Vec3::new(3.0, 4.0, 5.0), epsilon = 1e-6);
    }
}
